//! In-process fakes for the provider traits

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use crate::embeddings::onnx_embedder::l2_normalize;
use crate::error::{Error, Result};
use crate::providers::{
    ConversationEntry, ConversationLog, EmbeddingProvider, LlmProvider, RecordSource,
};
use crate::types::{Record, RecordKind, TextBlock};

pub fn block(body: &str) -> TextBlock {
    TextBlock::new(body.to_string(), RecordKind::Product)
}

/// Bag-of-words embedder: each lowercase token hashes into a bucket
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() % self.dimensions as u64) as usize] += 1.0;
        }
        l2_normalize(&mut vector);
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        "hashing-test"
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

/// Returns preset vectors; unknown texts fail
pub struct FixedEmbedder {
    dimensions: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl FixedEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: HashMap::new(),
        }
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }
}

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| Error::embedding(format!("no vector for '{}'", text)))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        "fixed-test"
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Always fails, like a model that could not be loaded
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::embedding("model not loaded"))
    }

    fn dimensions(&self) -> usize {
        64
    }

    fn model(&self) -> &str {
        "failing-test"
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Behaviour of one scripted model
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Empty,
    Fail(String),
    /// Sleeps long enough to trip any attempt timeout used in tests
    Hang,
}

/// LLM whose models answer from a fixed script and record every call
#[derive(Default)]
pub struct ScriptedLlm {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<(String, String)>>,
    list_fails: bool,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, model: &str, reply: Reply) -> Self {
        self.replies.insert(model.to_string(), reply);
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.list_fails = true;
        self
    }

    /// Models called so far, in order
    pub fn called_models(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(m, _)| m.clone()).collect()
    }

    pub fn calls_to(&self, model: &str) -> usize {
        self.calls.lock().iter().filter(|(m, _)| m == model).count()
    }

    /// Prompts sent so far, in order
    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(_, p)| p.clone()).collect()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        self.calls.lock().push((model.to_string(), prompt.to_string()));
        match self.replies.get(model) {
            Some(Reply::Text(text)) => Ok(text.clone()),
            Some(Reply::Empty) => Ok(String::new()),
            Some(Reply::Fail(message)) => Err(Error::llm(message.clone())),
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok("too late".to_string())
            }
            None => Err(Error::llm(format!("model {} not found", model))),
        }
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        if self.list_fails {
            return Err(Error::llm("listing unavailable"));
        }
        let mut models: Vec<String> = self.replies.keys().cloned().collect();
        models.sort();
        Ok(models)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Conversation log kept in memory
#[derive(Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<ConversationEntry>>,
    fail: bool,
}

impl MemoryLog {
    pub fn failing() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn entries(&self) -> Vec<ConversationEntry> {
        self.entries.lock().clone()
    }
}

#[async_trait]
impl ConversationLog for MemoryLog {
    async fn record(&self, entry: &ConversationEntry) -> Result<()> {
        if self.fail {
            return Err(Error::data_source("conversations table missing"));
        }
        self.entries.lock().push(entry.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Conversation log whose writes never complete
pub struct StalledLog;

#[async_trait]
impl ConversationLog for StalledLog {
    async fn record(&self, _entry: &ConversationEntry) -> Result<()> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }

    fn name(&self) -> &str {
        "stalled"
    }
}

/// Record source over in-memory tables
#[derive(Default)]
pub struct MemoryRecordSource {
    tables: HashMap<String, Vec<Record>>,
    failing_table: Option<String>,
    offline: bool,
    fetches: Mutex<Vec<String>>,
    reachability_checks: Mutex<Vec<String>>,
}

impl MemoryRecordSource {
    pub fn with_table(mut self, table: &str, rows: Vec<serde_json::Value>) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect();
        self.tables.insert(table.to_string(), rows);
        self
    }

    /// Reads of `table` fail as if it were never created
    pub fn failing_on(mut self, table: &str) -> Self {
        self.failing_table = Some(table.to_string());
        self
    }

    /// Every read fails as if the host were unreachable
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    /// Tables read in full so far
    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().clone()
    }

    /// Tables checked for reachability so far
    pub fn reachability_checks(&self) -> Vec<String> {
        self.reachability_checks.lock().clone()
    }

    fn check(&self, table: &str) -> Result<()> {
        if self.offline {
            return Err(Error::data_source("connection refused"));
        }
        if self.failing_table.as_deref() == Some(table) {
            return Err(Error::data_source(format!("relation \"{}\" does not exist", table)));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordSource for MemoryRecordSource {
    async fn fetch_table(&self, table: &str) -> Result<Vec<Record>> {
        self.fetches.lock().push(table.to_string());
        self.check(table)?;
        Ok(self.tables.get(table).cloned().unwrap_or_default())
    }

    async fn check_reachable(&self, table: &str) -> Result<()> {
        self.reachability_checks.lock().push(table.to_string());
        self.check(table)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
