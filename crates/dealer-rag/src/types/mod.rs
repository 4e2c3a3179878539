//! Core types for the dealer RAG backend

pub mod document;
pub mod query;
pub mod record;
pub mod response;

pub use document::TextBlock;
pub use query::{AskRequest, ChatMessage, ChatRole, ValidatedQuestion, ValidationError};
pub use record::{Record, RecordKind, RecordSet};
pub use response::{AnswerResponse, ErrorResponse, HealthResponse};
