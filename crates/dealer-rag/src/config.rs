//! Configuration for the dealer RAG backend

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Vector index configuration
    pub vector_db: VectorDbConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Generative model configuration
    pub llm: LlmConfig,
    /// Request rate limiting
    pub rate_limit: RateLimitConfig,
    /// Upstream record store
    pub data_source: DataSourceConfig,
    /// Conversation log sink
    pub conversation_log: ConversationLogConfig,
}

impl RagConfig {
    /// Load from a TOML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse a TOML file; missing sections take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&raw)
    }

    /// Parse TOML text
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Apply `GOOGLE_API_KEY`, `SUPABASE_URL` and `SUPABASE_KEY`
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("GOOGLE_API_KEY").filter(|v| !v.is_empty()) {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = lookup("SUPABASE_URL").filter(|v| !v.is_empty()) {
            self.data_source.supabase_url = Some(url);
        }
        if let Some(key) = lookup("SUPABASE_KEY").filter(|v| !v.is_empty()) {
            self.data_source.supabase_key = Some(key);
        }
    }

    /// Reject configurations the server cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(Error::Config("Missing GOOGLE_API_KEY".to_string()));
        }
        if self.llm.models.is_empty() {
            return Err(Error::Config("llm.models must list at least one model".to_string()));
        }

        let needs_supabase = self.data_source.backend == DataSourceBackend::Supabase
            || self.conversation_log.backend == ConversationLogBackend::Supabase;
        if needs_supabase && self.data_source.supabase_credentials().is_none() {
            return Err(Error::Config(
                "Missing SUPABASE_URL or SUPABASE_KEY".to_string(),
            ));
        }

        if self.data_source.backend == DataSourceBackend::Json
            && self.data_source.snapshot_path.is_none()
        {
            return Err(Error::Config(
                "data_source.snapshot_path is required for the json backend".to_string(),
            ));
        }

        if self.llm.attempt_timeout_secs == 0 {
            return Err(Error::Config(
                "llm.attempt_timeout_secs must be positive".to_string(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be positive".to_string()));
        }

        if self.rate_limit.max_requests == 0 || self.rate_limit.window_secs == 0 {
            return Err(Error::Config(
                "rate_limit.window_secs and rate_limit.max_requests must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            enable_cors: true,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// sentence-transformers model name
    pub model: String,
    /// Embedding dimensions (384 for MiniLM)
    pub dimensions: usize,
    /// Batch size for embedding generation
    pub batch_size: usize,
    /// Maximum sequence length
    pub max_length: usize,
    /// Cache directory for model files
    pub cache_dir: PathBuf,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            batch_size: 32,
            max_length: 256,
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("dealer-rag")
                .join("models"),
        }
    }
}

/// Distance used for nearest-neighbor ranking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// `1 - cosine similarity`
    #[default]
    Cosine,
    /// Euclidean distance
    L2,
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Directory the built index is written to
    pub persist_dir: PathBuf,
    /// Ranking metric
    pub metric: DistanceMetric,
    /// Reuse a persisted index when its fingerprint matches the snapshot
    pub reuse_persisted: bool,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            persist_dir: PathBuf::from("./vector_index"),
            metric: DistanceMetric::Cosine,
            reuse_persisted: false,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of blocks handed to the model as context
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

/// Generative model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Generative Language API base URL
    pub base_url: String,
    /// API key (usually from `GOOGLE_API_KEY`)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Fallback chain, tried in order
    pub models: Vec<String>,
    /// HTTP client timeout in seconds
    pub timeout_secs: u64,
    /// Upper bound on a single model attempt in seconds
    pub attempt_timeout_secs: u64,
    /// Sampling temperature
    pub temperature: f32,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: None,
            // Fastest and cheapest first
            models: vec![
                "gemini-1.5-flash".to_string(),
                "gemini-1.5-flash-001".to_string(),
                "gemini-1.5-flash-002".to_string(),
                "gemini-1.5-flash-8b".to_string(),
            ],
            timeout_secs: 60,
            attempt_timeout_secs: 30,
            temperature: 0.3,
        }
    }
}

/// Sliding window rate limit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Window length in seconds
    pub window_secs: u64,
    /// Requests admitted per window
    pub max_requests: usize,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 60,
            max_requests: 30,
        }
    }
}

/// Where records are fetched from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceBackend {
    /// Supabase PostgREST API
    #[default]
    Supabase,
    /// Local JSON snapshot file
    Json,
}

/// Upstream record store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSourceConfig {
    pub backend: DataSourceBackend,
    /// Project URL (usually from `SUPABASE_URL`)
    pub supabase_url: Option<String>,
    /// Service key (usually from `SUPABASE_KEY`)
    #[serde(skip_serializing)]
    pub supabase_key: Option<String>,
    /// Snapshot file for the json backend: `{"products": [...], ...}`
    pub snapshot_path: Option<PathBuf>,
}

impl DataSourceConfig {
    /// URL and key when both are set
    pub fn supabase_credentials(&self) -> Option<(&str, &str)> {
        match (self.supabase_url.as_deref(), self.supabase_key.as_deref()) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => Some((url, key)),
            _ => None,
        }
    }
}

/// Where answered questions are recorded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationLogBackend {
    /// Insert into a Supabase table
    #[default]
    Supabase,
    /// Local SQLite file
    Sqlite,
    /// Do not record conversations
    Disabled,
}

/// Conversation log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationLogConfig {
    pub backend: ConversationLogBackend,
    /// Table name (Supabase and SQLite)
    pub table: String,
    /// Database file for the sqlite backend
    pub sqlite_path: PathBuf,
}

impl Default for ConversationLogConfig {
    fn default() -> Self {
        Self {
            backend: ConversationLogBackend::Supabase,
            table: "conversations".to_string(),
            sqlite_path: PathBuf::from("./conversations.db"),
        }
    }
}
