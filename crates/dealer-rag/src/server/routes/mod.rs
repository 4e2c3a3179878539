//! API routes for the RAG server

pub mod ask;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Liveness banner
        .route("/", get(root))
        // Upstream reachability and index status
        .route("/health", get(health::health_check))
        .route("/test-supabase", get(health::connection_check))
        // Question answering
        .route("/ask", post(ask::ask))
}

/// GET / - liveness banner
async fn root() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "message": "Dealer RAG API is running.",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
