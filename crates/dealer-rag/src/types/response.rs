//! Response bodies returned by the HTTP surface

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Successful `/ask` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

/// Failed request body; every error kind collapses to this shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

/// `/health` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"
    pub status: String,
    /// "connected" or the reachability error
    pub data_source: String,
    /// "initialized" or "not initialized"
    pub vector_store: String,
    /// Number of indexed blocks
    pub blocks: usize,
    /// Configured fallback chain
    pub models: Vec<String>,
    pub timestamp: DateTime<Utc>,
}
