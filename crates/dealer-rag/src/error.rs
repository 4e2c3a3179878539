//! Error types for the dealer RAG backend

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for infrastructure operations
pub type Result<T> = std::result::Result<T, Error>;

/// Infrastructure errors (providers, index, storage, configuration)
///
/// Per-request failures seen by API callers live in
/// [`crate::orchestrator::AskError`].
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Index could not be built from the record snapshot
    #[error("Index build failed: {0}")]
    IndexBuild(String),

    /// Lookup against a built index failed
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    /// Generative model error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Upstream record store error
    #[error("Data source error: {0}")]
    DataSource(String),

    /// Local database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an index build error
    pub fn index_build(message: impl Into<String>) -> Self {
        Self::IndexBuild(message.into())
    }

    /// Create a retrieval error
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create a data source error
    pub fn data_source(message: impl Into<String>) -> Self {
        Self::DataSource(message.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Config(_) | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::Llm(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::DataSource(_) | Error::Http(_) => StatusCode::BAD_GATEWAY,
            Error::Embedding(_)
            | Error::IndexBuild(_)
            | Error::Retrieval(_)
            | Error::Database(_)
            | Error::Io(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Every failure at the HTTP boundary collapses to a single string field
        let body = Json(json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}
