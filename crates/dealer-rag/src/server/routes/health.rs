//! Health and connection check endpoints

use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{HealthResponse, RecordKind};

/// GET /health - check the record source and report index status
///
/// Always answers 200; an unreachable data source shows up in the body.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let reachable = state
        .record_source()
        .check_reachable(RecordKind::Product.table_name())
        .await;

    let (status, data_source) = match reachable {
        Ok(_) => ("healthy", "connected".to_string()),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            ("unhealthy", e.to_string())
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        data_source,
        vector_store: if state.is_ready() {
            "initialized"
        } else {
            "not initialized"
        }
        .to_string(),
        blocks: state.orchestrator().retriever().len(),
        models: state.orchestrator().models().to_vec(),
        timestamp: Utc::now(),
    })
}

/// GET /test-supabase - connection check against the products table
///
/// A missing table is reported in the body; any other failure is an error
/// response.
pub async fn connection_check(State(state): State<AppState>) -> Result<Json<Value>> {
    let source = state.record_source();

    match source.check_reachable(RecordKind::Product.table_name()).await {
        Ok(()) => Ok(Json(json!({
            "status": "success",
            "message": format!("Successfully connected to {}", source.name()),
        }))),
        Err(e) if e.to_string().contains("does not exist") => Ok(Json(json!({
            "status": "error",
            "message": "Products table does not exist",
        }))),
        Err(e) => {
            tracing::error!("Connection check failed: {}", e);
            Err(e)
        }
    }
}
