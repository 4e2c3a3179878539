//! Grounded answer generation with model fallback

pub mod fallback;
pub mod prompt;

pub use fallback::{AttemptOutcome, ChainAnswer, ChainExhausted, FailedAttempt, ModelChain};
pub use prompt::{truncate_for_log, PromptBuilder};
