//! Provider abstractions for embeddings, generation, record fetching and
//! conversation logging
//!
//! Each external collaborator sits behind a trait so the retrieval pipeline
//! can be exercised without network access.

pub mod conversation_log;
pub mod embedding;
pub mod gemini;
pub mod llm;
pub mod record_source;
pub mod supabase;

pub use conversation_log::{ConversationEntry, ConversationLog};
pub use embedding::EmbeddingProvider;
pub use gemini::GeminiClient;
pub use llm::LlmProvider;
pub use record_source::RecordSource;
pub use supabase::SupabaseClient;
