//! Form server binary
//!
//! Run with: cargo run -p assignment-ingest --bin assignment-ingest-server

use assignment_ingest::{config::AppConfig, server::FormServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "assignment_ingest=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match std::env::var("ASSIGNMENT_INGEST_CONFIG") {
        Ok(path) => {
            tracing::info!("Loading configuration from {}", path);
            AppConfig::from_file(&path)?
        }
        Err(_) => AppConfig::default(),
    };
    config.apply_env_overrides()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Max upload size: {} bytes", config.server.max_upload_size);

    let server = FormServer::new(config);

    println!("\nServer starting...");
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/ingest - Submit documents (fields: pdf, docx, pptx, text)");
    println!("  GET  /api/chunks - List collected chunks");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
