//! Record source trait for the upstream relational store

use async_trait::async_trait;
use crate::error::Result;
use crate::types::Record;

/// Trait for fetching full table snapshots
///
/// Implementations:
/// - `SupabaseClient`: PostgREST `select=*`
/// - `JsonSnapshotSource`: local JSON file
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch every row of the named table
    async fn fetch_table(&self, table: &str) -> Result<Vec<Record>>;

    /// Check the table is reachable, reading at most one row
    ///
    /// The default reads the whole table; remote sources should override it.
    async fn check_reachable(&self, table: &str) -> Result<()> {
        self.fetch_table(table).await.map(|_| ())
    }

    /// Get provider name for logging
    fn name(&self) -> &str;
}
