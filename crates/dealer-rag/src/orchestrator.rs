//! Per-request answer pipeline
//!
//! validate → rate limit → retrieve context → grounding prompt → model chain
//! → detached best-effort conversation log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use thiserror::Error;

use crate::generation::{truncate_for_log, ChainExhausted, ModelChain, PromptBuilder};
use crate::providers::{ConversationEntry, ConversationLog, LlmProvider};
use crate::rate_limit::SlidingWindowLimiter;
use crate::retrieval::ContextRetriever;
use crate::types::{AskRequest, ErrorResponse, ValidationError};

/// Why a question could not be answered
#[derive(Debug, Error)]
pub enum AskError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Rate limit exceeded. Please try again in a minute.")]
    RateLimited,

    #[error("Unable to generate response. Please try again later.")]
    GenerationExhausted(ChainExhausted),
}

impl AskError {
    pub fn status(&self) -> StatusCode {
        match self {
            AskError::Validation(_) => StatusCode::BAD_REQUEST,
            AskError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AskError::GenerationExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AskError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// A generated answer
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    /// Model variant that produced it
    pub model: String,
}

/// Turns questions into grounded answers
pub struct AnswerOrchestrator {
    retriever: ContextRetriever,
    llm: Arc<dyn LlmProvider>,
    chain: ModelChain,
    limiter: SlidingWindowLimiter,
    log: Option<Arc<dyn ConversationLog>>,
    top_k: usize,
}

impl AnswerOrchestrator {
    pub fn new(
        retriever: ContextRetriever,
        llm: Arc<dyn LlmProvider>,
        chain: ModelChain,
        limiter: SlidingWindowLimiter,
        top_k: usize,
    ) -> Self {
        Self {
            retriever,
            llm,
            chain,
            limiter,
            log: None,
            top_k,
        }
    }

    /// Record successful answers to `log`
    pub fn with_log(mut self, log: Arc<dyn ConversationLog>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn retriever(&self) -> &ContextRetriever {
        &self.retriever
    }

    pub fn models(&self) -> &[String] {
        self.chain.models()
    }

    /// Answer one question
    pub async fn answer(&self, request: &AskRequest) -> Result<Answer, AskError> {
        let validated = request.validate()?;

        if !self.limiter.try_acquire() {
            tracing::warn!(
                "Rate limit exceeded ({} requests per {:?})",
                self.limiter.max_requests(),
                self.limiter.window()
            );
            return Err(AskError::RateLimited);
        }

        tracing::info!("Processing question: {}", truncate_for_log(&validated.question, 200));

        let context = self.retriever.query(&validated.question, self.top_k).await;
        tracing::info!("Retrieved context: {}", truncate_for_log(&context, 200));

        let prompt = PromptBuilder::build_grounded_prompt(&validated.question, &context);

        let result = self
            .chain
            .run(self.llm.as_ref(), &prompt)
            .await
            .map_err(AskError::GenerationExhausted)?;

        if let Some(log) = &self.log {
            let log = Arc::clone(log);
            let entry = ConversationEntry::now(&validated.question, &result.answer);
            // Detached: the answer never waits on the log backend
            tokio::spawn(async move {
                if let Err(e) = log.record(&entry).await {
                    tracing::error!("Failed to store conversation in {}: {}", log.name(), e);
                }
            });
        }

        Ok(Answer {
            text: result.answer,
            model: result.model,
        })
    }
}
