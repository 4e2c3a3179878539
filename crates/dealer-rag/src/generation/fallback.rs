//! Ordered model fallback chain
//!
//! Variants are tried in configured order (fastest and cheapest first). Each
//! attempt produces an [`AttemptOutcome`]; the first non-empty answer wins.

use std::fmt;
use std::time::Duration;

use crate::providers::LlmProvider;

use super::prompt::truncate_for_log;

/// Result of asking one model variant
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// Non-empty answer text
    Answered(String),
    /// The call succeeded but returned no text
    Empty,
    /// The call returned an error
    Failed(String),
    /// The call did not finish within the attempt timeout
    TimedOut(Duration),
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Answered(_) => write!(f, "answered"),
            Self::Empty => write!(f, "empty response"),
            Self::Failed(message) => write!(f, "{}", message),
            Self::TimedOut(after) => write!(f, "timed out after {:?}", after),
        }
    }
}

/// One failed attempt, kept for diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct FailedAttempt {
    pub model: String,
    pub outcome: AttemptOutcome,
}

/// A model produced an answer
#[derive(Debug, Clone, PartialEq)]
pub struct ChainAnswer {
    pub model: String,
    pub answer: String,
    /// Variants that failed before this one
    pub failed: Vec<FailedAttempt>,
}

/// Every variant failed
#[derive(Debug, Clone, PartialEq)]
pub struct ChainExhausted {
    pub attempts: Vec<FailedAttempt>,
    pub last_error: String,
}

impl fmt::Display for ChainExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "all {} model variants failed; last error: {}",
            self.attempts.len(),
            self.last_error
        )
    }
}

impl std::error::Error for ChainExhausted {}

/// Prioritized list of model variants
#[derive(Debug, Clone)]
pub struct ModelChain {
    models: Vec<String>,
    attempt_timeout: Duration,
}

impl ModelChain {
    pub fn new(models: Vec<String>, attempt_timeout: Duration) -> Self {
        Self {
            models,
            attempt_timeout,
        }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Ask a single variant, bounded by the attempt timeout
    pub async fn attempt(&self, llm: &dyn LlmProvider, model: &str, prompt: &str) -> AttemptOutcome {
        match tokio::time::timeout(self.attempt_timeout, llm.generate(model, prompt)).await {
            Ok(Ok(text)) if text.trim().is_empty() => AttemptOutcome::Empty,
            Ok(Ok(text)) => AttemptOutcome::Answered(text),
            Ok(Err(e)) => AttemptOutcome::Failed(e.to_string()),
            Err(_) => AttemptOutcome::TimedOut(self.attempt_timeout),
        }
    }

    /// Try each variant in order until one answers
    pub async fn run(
        &self,
        llm: &dyn LlmProvider,
        prompt: &str,
    ) -> Result<ChainAnswer, ChainExhausted> {
        let mut failed = Vec::new();

        for model in &self.models {
            tracing::info!("Trying model: {}", model);

            match self.attempt(llm, model, prompt).await {
                AttemptOutcome::Answered(answer) => {
                    tracing::info!(
                        "Generated response with {}: {}",
                        model,
                        truncate_for_log(&answer, 100)
                    );
                    return Ok(ChainAnswer {
                        model: model.clone(),
                        answer,
                        failed,
                    });
                }
                outcome => {
                    tracing::warn!(
                        "Failed with model {}: {} (prompt: {})",
                        model,
                        outcome,
                        truncate_for_log(prompt, 200)
                    );
                    failed.push(FailedAttempt {
                        model: model.clone(),
                        outcome,
                    });
                }
            }
        }

        let last_error = failed
            .last()
            .map(|a| format!("{}: {}", a.model, a.outcome))
            .unwrap_or_else(|| "no models configured".to_string());

        tracing::error!("All models failed. Last error: {}", last_error);

        Err(ChainExhausted {
            attempts: failed,
            last_error,
        })
    }
}
