//! Context retrieval with degraded-mode sentinels

use std::sync::Arc;

use super::index::RetrievalIndex;

/// Returned when no index was built or it holds no blocks
pub const NO_CONTEXT: &str = "No database context available.";

/// Returned when a lookup against the index fails
pub const RETRIEVAL_ERROR: &str = "Error retrieving database context.";

/// Separator between retrieved block bodies
const BLOCK_SEPARATOR: &str = "\n\n";

/// Turns a question into a context string; never fails
///
/// Holds the process-wide index, or nothing when the build failed.
#[derive(Debug, Clone, Default)]
pub struct ContextRetriever {
    index: Option<Arc<RetrievalIndex>>,
}

impl ContextRetriever {
    /// Retriever over a built index
    pub fn new(index: Arc<RetrievalIndex>) -> Self {
        Self { index: Some(index) }
    }

    /// Retriever for a process whose index could not be built
    pub fn absent() -> Self {
        Self { index: None }
    }

    /// Wrap a build result; failures degrade to the absent state
    pub fn from_build(result: crate::error::Result<RetrievalIndex>) -> Self {
        match result {
            Ok(index) => {
                tracing::info!("Vector index initialized with {} blocks", index.len());
                Self::new(Arc::new(index))
            }
            Err(e) => {
                tracing::error!("Vector index unavailable, answering without context: {}", e);
                Self::absent()
            }
        }
    }

    /// Whether an index was built
    pub fn is_initialized(&self) -> bool {
        self.index.is_some()
    }

    /// Number of indexed blocks (0 when absent)
    pub fn len(&self) -> usize {
        self.index.as_ref().map_or(0, |i| i.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bodies of the `k` nearest blocks, nearest first, blank-line separated
    ///
    /// Returns [`NO_CONTEXT`] for an absent or empty index and
    /// [`RETRIEVAL_ERROR`] when the lookup fails. A `k` of 0 is treated as 1.
    pub async fn query(&self, question: &str, k: usize) -> String {
        let index = match &self.index {
            Some(index) if !index.is_empty() => index,
            _ => return NO_CONTEXT.to_string(),
        };

        match index.query(question, k.max(1)).await {
            Ok(hits) if hits.is_empty() => NO_CONTEXT.to_string(),
            Ok(hits) => {
                tracing::debug!(
                    "Retrieved {} blocks (nearest distance {:.4})",
                    hits.len(),
                    hits[0].distance
                );
                hits.iter()
                    .map(|hit| hit.block.body.as_str())
                    .collect::<Vec<_>>()
                    .join(BLOCK_SEPARATOR)
            }
            Err(e) => {
                tracing::error!("Error getting context: {}", e);
                RETRIEVAL_ERROR.to_string()
            }
        }
    }
}
