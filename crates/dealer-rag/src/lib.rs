//! dealer-rag: retrieval-augmented question answering over a dealer database
//!
//! Records from five tables (products, inventory, sales, claims, dealers) are
//! rendered as text blocks, embedded with a local ONNX model and indexed once
//! at startup. Questions retrieve the nearest blocks, which ground a prompt
//! sent through an ordered chain of Gemini model variants.

pub mod config;
pub mod embeddings;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod orchestrator;
pub mod providers;
pub mod rate_limit;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod types;

#[cfg(test)]
mod test_support;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use orchestrator::{AnswerOrchestrator, AskError};
pub use types::{AskRequest, RecordKind, RecordSet, TextBlock};
