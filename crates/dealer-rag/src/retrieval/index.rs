//! Build-once vector index over formatted record blocks

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{DistanceMetric, VectorDbConfig};
use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::TextBlock;

/// File name of the persisted index inside `persist_dir`
pub const INDEX_FILE: &str = "index.json";

/// A block paired with its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    block: TextBlock,
    vector: Vec<f32>,
}

/// A retrieved block and its distance to the query
#[derive(Debug, Clone)]
pub struct ScoredBlock<'a> {
    pub block: &'a TextBlock,
    /// Lower is nearer
    pub distance: f32,
}

/// Immutable nearest-neighbor index
///
/// The embedder used at build time is kept inside the index, so questions are
/// always embedded into the same space as the blocks.
pub struct RetrievalIndex {
    entries: Vec<IndexEntry>,
    embedder: Arc<dyn EmbeddingProvider>,
    metric: DistanceMetric,
}

impl std::fmt::Debug for RetrievalIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalIndex")
            .field("entries", &self.entries.len())
            .field("embedder", &self.embedder.model())
            .field("metric", &self.metric)
            .finish()
    }
}

impl RetrievalIndex {
    /// Embed every block and build the index
    ///
    /// An empty block list yields an empty, queryable index.
    pub async fn build(
        blocks: Vec<TextBlock>,
        embedder: Arc<dyn EmbeddingProvider>,
        metric: DistanceMetric,
    ) -> Result<Self> {
        if blocks.is_empty() {
            tracing::warn!("Building an empty index: no records in snapshot");
            return Ok(Self {
                entries: Vec::new(),
                embedder,
                metric,
            });
        }

        tracing::info!(
            "Embedding {} blocks with {} ({})",
            blocks.len(),
            embedder.model(),
            embedder.name()
        );

        let bodies: Vec<String> = blocks.iter().map(|b| b.body.clone()).collect();
        let vectors = embedder
            .embed_batch(&bodies)
            .await
            .map_err(|e| Error::index_build(e.to_string()))?;

        if vectors.len() != blocks.len() {
            return Err(Error::index_build(format!(
                "Embedder returned {} vectors for {} blocks",
                vectors.len(),
                blocks.len()
            )));
        }

        let dimensions = embedder.dimensions();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimensions) {
            return Err(Error::index_build(format!(
                "Embedding has {} dimensions, expected {}",
                bad.len(),
                dimensions
            )));
        }

        let entries = blocks
            .into_iter()
            .zip(vectors)
            .map(|(block, vector)| IndexEntry { block, vector })
            .collect();

        Ok(Self {
            entries,
            embedder,
            metric,
        })
    }

    /// Build, reusing or writing the persisted copy as configured
    ///
    /// Persistence problems are logged and never fail the build.
    pub async fn build_persisted(
        blocks: Vec<TextBlock>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: &VectorDbConfig,
    ) -> Result<Self> {
        if config.reuse_persisted {
            match Self::load_matching(&config.persist_dir, &blocks, &embedder, config.metric) {
                Ok(Some(index)) => {
                    tracing::info!(
                        "Reusing persisted index ({} blocks) from {}",
                        index.len(),
                        config.persist_dir.display()
                    );
                    return Ok(index);
                }
                Ok(None) => tracing::info!("Persisted index is stale or absent, rebuilding"),
                Err(e) => tracing::warn!("Ignoring unreadable persisted index: {}", e),
            }
        }

        let index = Self::build(blocks, embedder, config.metric).await?;

        if let Err(e) = index.persist(&config.persist_dir) {
            tracing::warn!("Failed to persist index: {}", e);
        }

        Ok(index)
    }

    /// Number of indexed blocks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embed a question and return the `k` nearest blocks, nearest first
    pub async fn query(&self, question: &str, k: usize) -> Result<Vec<ScoredBlock<'_>>> {
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let query = self
            .embedder
            .embed(question)
            .await
            .map_err(|e| Error::retrieval(format!("Query embedding failed: {}", e)))?;

        self.search(&query, k)
    }

    /// Return the `k` nearest blocks to a query vector
    ///
    /// Ties keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredBlock<'_>>> {
        let dimensions = self.embedder.dimensions();
        if query.len() != dimensions {
            return Err(Error::retrieval(format!(
                "Query vector has {} dimensions, index expects {}",
                query.len(),
                dimensions
            )));
        }

        let mut scored: Vec<ScoredBlock<'_>> = self
            .entries
            .iter()
            .map(|entry| ScoredBlock {
                block: &entry.block,
                distance: distance(self.metric, query, &entry.vector),
            })
            .collect();

        // sort_by is stable, so equal distances stay in insertion order
        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(k);

        Ok(scored)
    }

    /// Write the index to `<dir>/index.json`
    pub fn persist(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(INDEX_FILE);

        let persisted = PersistedIndexRef {
            model: self.embedder.model(),
            dimensions: self.embedder.dimensions(),
            fingerprint: fingerprint(self.entries.iter().map(|e| &e.block)),
            entries: &self.entries,
        };

        let json = serde_json::to_string(&persisted)?;
        std::fs::write(&path, json)?;

        tracing::info!("Persisted {} index entries to {}", self.entries.len(), path.display());
        Ok(path)
    }

    /// Load `<dir>/index.json` if it was built from exactly these blocks
    /// with this embedder; `Ok(None)` when absent or stale
    pub fn load_matching(
        dir: &Path,
        blocks: &[TextBlock],
        embedder: &Arc<dyn EmbeddingProvider>,
        metric: DistanceMetric,
    ) -> Result<Option<Self>> {
        let path = dir.join(INDEX_FILE);
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(&path)?;
        let persisted: PersistedIndex = serde_json::from_str(&raw)?;

        let matches = persisted.model == embedder.model()
            && persisted.dimensions == embedder.dimensions()
            && persisted.fingerprint == fingerprint(blocks.iter())
            && persisted.entries.len() == blocks.len()
            && persisted
                .entries
                .iter()
                .all(|e| e.vector.len() == persisted.dimensions);

        if !matches {
            return Ok(None);
        }

        Ok(Some(Self {
            entries: persisted.entries,
            embedder: Arc::clone(embedder),
            metric,
        }))
    }
}

#[derive(Serialize)]
struct PersistedIndexRef<'a> {
    model: &'a str,
    dimensions: usize,
    fingerprint: String,
    entries: &'a [IndexEntry],
}

#[derive(Deserialize)]
struct PersistedIndex {
    model: String,
    dimensions: usize,
    fingerprint: String,
    entries: Vec<IndexEntry>,
}

/// SHA-256 over all block bodies in order
fn fingerprint<'a>(blocks: impl Iterator<Item = &'a TextBlock>) -> String {
    let mut hasher = Sha256::new();
    for block in blocks {
        hasher.update(block.body.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

/// Distance between two equal-length vectors under a metric
pub fn distance(metric: DistanceMetric, a: &[f32], b: &[f32]) -> f32 {
    match metric {
        DistanceMetric::Cosine => {
            let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
            let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
            let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm_a == 0.0 || norm_b == 0.0 {
                1.0
            } else {
                1.0 - dot / (norm_a * norm_b)
            }
        }
        DistanceMetric::L2 => a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt(),
    }
}
