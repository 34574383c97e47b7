//! Embed text from the command line
//!
//! Run with: cargo run -p assignment-ingest --features cli --bin embed -- \
//!     --project my-project --location us-east4 "Hello World!"

use std::path::PathBuf;

use assignment_ingest::config::{CredentialsConfig, EmbeddingConfig};
use assignment_ingest::EmbeddingClient;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(version, about = "Embed text with a Vertex AI embedding model")]
struct Args {
    /// Embedding model name
    #[arg(long, default_value = "textembedding-gecko@003")]
    model: String,

    /// GCP project ID
    #[arg(long, env = "GCP_PROJECT")]
    project: String,

    /// GCP region
    #[arg(long, env = "GCP_LOCATION", default_value = "us-central1")]
    location: String,

    /// Service account key file (defaults to GOOGLE_APPLICATION_CREDENTIALS)
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Texts to embed; more than one uses the batch endpoint
    #[arg(required = true)]
    texts: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "assignment_ingest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut credentials = CredentialsConfig::from_env();
    if let Some(path) = args.credentials {
        credentials.service_account_key_path = Some(path);
    }

    let config = EmbeddingConfig {
        credentials,
        ..EmbeddingConfig::new(args.model, args.project, args.location)
    };
    let client = EmbeddingClient::from_config(&config)?;

    if let [text] = args.texts.as_slice() {
        let vector = client.embed_query(text).await?;
        print_vector(text, &vector);
    } else {
        match client.embed_documents(&args.texts).await? {
            Some(vectors) => {
                for (text, vector) in args.texts.iter().zip(&vectors) {
                    print_vector(text, vector);
                }
            }
            None => println!("Batch embedding is not available for this provider"),
        }
    }

    println!("Successfully used the embedding client!");
    Ok(())
}

fn print_vector(text: &str, vector: &[f32]) {
    let head: Vec<String> = vector.iter().take(5).map(|v| format!("{:.4}", v)).collect();
    println!("{:?}: {} dims [{}, ...]", text, vector.len(), head.join(", "));
}
