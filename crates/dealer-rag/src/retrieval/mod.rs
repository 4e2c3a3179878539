//! Vector index and context retrieval

pub mod index;
pub mod search;

pub use index::{RetrievalIndex, ScoredBlock};
pub use search::{ContextRetriever, NO_CONTEXT, RETRIEVAL_ERROR};
