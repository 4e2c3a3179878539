//! Application state for the RAG server

use std::sync::Arc;

use crate::config::{ConversationLogBackend, DataSourceBackend, RagConfig};
use crate::embeddings::OnnxEmbedder;
use crate::error::{Error, Result};
use crate::generation::ModelChain;
use crate::ingestion::{load_snapshot, DocumentFormatter, JsonSnapshotSource};
use crate::orchestrator::AnswerOrchestrator;
use crate::providers::{
    ConversationLog, EmbeddingProvider, GeminiClient, LlmProvider, RecordSource, SupabaseClient,
};
use crate::rate_limit::SlidingWindowLimiter;
use crate::retrieval::{ContextRetriever, RetrievalIndex};
use crate::storage::SqliteConversationLog;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Upstream records (also checked by `/health`)
    record_source: Arc<dyn RecordSource>,
    /// Request pipeline, holding the built index
    orchestrator: AnswerOrchestrator,
}

impl AppState {
    /// Create new application state
    ///
    /// Builds the retrieval index before returning. A snapshot or embedding
    /// failure leaves the index absent; the server still starts and answers
    /// with no database context.
    pub async fn new(config: RagConfig) -> Result<Self> {
        config.validate()?;

        tracing::info!(
            "Initializing RAG application state (data source: {:?}, conversation log: {:?})...",
            config.data_source.backend,
            config.conversation_log.backend
        );

        let record_source = create_record_source(&config)?;
        tracing::info!("Record source initialized ({})", record_source.name());

        let retriever = ContextRetriever::from_build(build_index(&config, record_source.as_ref()).await);

        let llm: Arc<dyn LlmProvider> = Arc::new(GeminiClient::new(&config.llm)?);
        log_available_models(llm.as_ref()).await;

        let mut orchestrator = AnswerOrchestrator::new(
            retriever,
            llm,
            ModelChain::new(config.llm.models.clone(), config.llm.attempt_timeout()),
            SlidingWindowLimiter::from_config(&config.rate_limit),
            config.retrieval.top_k,
        );

        if let Some(log) = create_conversation_log(&config) {
            tracing::info!("Conversation log: {}", log.name());
            orchestrator = orchestrator.with_log(log);
        }

        Ok(Self::from_parts(record_source, orchestrator))
    }

    /// Assemble state from already-built parts
    pub fn from_parts(
        record_source: Arc<dyn RecordSource>,
        orchestrator: AnswerOrchestrator,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                record_source,
                orchestrator,
            }),
        }
    }

    pub fn record_source(&self) -> &Arc<dyn RecordSource> {
        &self.inner.record_source
    }

    pub fn orchestrator(&self) -> &AnswerOrchestrator {
        &self.inner.orchestrator
    }

    /// Whether the retrieval index was built
    pub fn is_ready(&self) -> bool {
        self.inner.orchestrator.retriever().is_initialized()
    }
}

fn create_record_source(config: &RagConfig) -> Result<Arc<dyn RecordSource>> {
    match config.data_source.backend {
        DataSourceBackend::Supabase => {
            let (url, key) = config.data_source.supabase_credentials().ok_or_else(|| {
                Error::Config("Missing SUPABASE_URL or SUPABASE_KEY".to_string())
            })?;
            Ok(Arc::new(SupabaseClient::new(
                url,
                key,
                config.conversation_log.table.clone(),
                config.llm.timeout(),
            )?))
        }
        DataSourceBackend::Json => {
            let path = config.data_source.snapshot_path.as_ref().ok_or_else(|| {
                Error::Config("data_source.snapshot_path is required".to_string())
            })?;
            Ok(Arc::new(JsonSnapshotSource::from_file(path)?))
        }
    }
}

async fn build_index(config: &RagConfig, source: &dyn RecordSource) -> Result<RetrievalIndex> {
    let records = load_snapshot(source).await?;
    let blocks = DocumentFormatter::format(&records);
    tracing::info!("Formatted {} records into text blocks", blocks.len());

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OnnxEmbedder::new(&config.embeddings).await?);

    RetrievalIndex::build_persisted(blocks, embedder, &config.vector_db).await
}

/// Diagnostics only; the configured chain is used either way
async fn log_available_models(llm: &dyn LlmProvider) {
    match llm.list_models().await {
        Ok(models) => {
            tracing::info!("Available models ({}):", llm.name());
            for model in models {
                tracing::info!("  - {}", model);
            }
        }
        Err(e) => tracing::warn!("Could not list models: {}", e),
    }
}

/// A log that cannot be opened is skipped; the server runs without one
fn create_conversation_log(config: &RagConfig) -> Option<Arc<dyn ConversationLog>> {
    let log: Result<Arc<dyn ConversationLog>> = match config.conversation_log.backend {
        ConversationLogBackend::Disabled => return None,
        ConversationLogBackend::Supabase => config
            .data_source
            .supabase_credentials()
            .ok_or_else(|| Error::Config("Missing SUPABASE_URL or SUPABASE_KEY".to_string()))
            .and_then(|(url, key)| {
                SupabaseClient::new(
                    url,
                    key,
                    config.conversation_log.table.clone(),
                    config.llm.timeout(),
                )
            })
            .map(|client| Arc::new(client) as Arc<dyn ConversationLog>),
        ConversationLogBackend::Sqlite => SqliteConversationLog::new(
            &config.conversation_log.sqlite_path,
            &config.conversation_log.table,
        )
        .map(|log| Arc::new(log) as Arc<dyn ConversationLog>),
    };

    match log {
        Ok(log) => Some(log),
        Err(e) => {
            tracing::warn!("Conversation log unavailable, answers will not be recorded: {}", e);
            None
        }
    }
}
