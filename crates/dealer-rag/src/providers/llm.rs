//! LLM provider trait for generating answers

use async_trait::async_trait;
use crate::error::Result;

/// Trait for text generation against a named model variant
///
/// Implementations:
/// - `GeminiClient`: Google Generative Language API
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate text for a prompt using the given model
    ///
    /// An `Ok` with empty text is possible; callers decide how to treat it.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;

    /// List model names the backend currently exposes (diagnostics only)
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
