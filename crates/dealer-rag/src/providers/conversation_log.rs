//! Conversation log trait for recording answered questions

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One answered question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationEntry {
    /// Entry stamped with the current time
    pub fn now(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Trait for the best-effort conversation sink
///
/// Implementations:
/// - `SupabaseClient`: inserts into a table over PostgREST
/// - `SqliteConversationLog`: local SQLite file
#[async_trait]
pub trait ConversationLog: Send + Sync {
    /// Insert one entry
    async fn record(&self, entry: &ConversationEntry) -> Result<()>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
