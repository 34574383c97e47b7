//! API routes for the form server

pub mod ingest;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/ingest",
            post(ingest::submit_form).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/chunks", get(list_chunks))
}

/// GET /api/chunks - chunks collected so far
async fn list_chunks(State(state): State<AppState>) -> Json<serde_json::Value> {
    let chunks = state.chunks().await;
    Json(serde_json::json!({
        "total_chunks": chunks.len(),
        "chunks": chunks,
    }))
}
