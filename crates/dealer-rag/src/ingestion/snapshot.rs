//! Full-snapshot loading of the five record collections

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::providers::supabase::rows_to_records;
use crate::providers::RecordSource;
use crate::types::{Record, RecordKind, RecordSet};

/// Fetch every record kind from the source
///
/// Any failing table fails the whole snapshot; a partial index would break
/// the one-block-per-record guarantee.
pub async fn load_snapshot(source: &dyn RecordSource) -> Result<RecordSet> {
    let mut set = RecordSet::default();

    for kind in RecordKind::ALL {
        let rows = source.fetch_table(kind.table_name()).await?;
        tracing::info!(
            "Fetched {} rows from {} ({})",
            rows.len(),
            kind.table_name(),
            source.name()
        );
        *set.get_mut(kind) = rows;
    }

    Ok(set)
}

/// Record source backed by a local JSON file
///
/// The file holds one array per table: `{"products": [...], "sales": [...]}`.
/// Missing tables read as empty.
pub struct JsonSnapshotSource {
    tables: HashMap<String, Vec<Record>>,
}

impl JsonSnapshotSource {
    /// Read and parse the snapshot file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::data_source(format!("Failed to read snapshot {}: {}", path.display(), e))
        })?;
        let value: Value = serde_json::from_str(&raw)?;
        let tables = Self::parse_tables(value)?;
        tracing::info!("Loaded snapshot {} ({} tables)", path.display(), tables.len());
        Ok(Self { tables })
    }

    /// Build from an in-memory JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(Self {
            tables: Self::parse_tables(value)?,
        })
    }

    fn parse_tables(value: Value) -> Result<HashMap<String, Vec<Record>>> {
        let Value::Object(map) = value else {
            return Err(Error::data_source("Snapshot must be a JSON object of tables"));
        };

        map.into_iter()
            .map(|(table, rows)| match rows {
                Value::Array(rows) => Ok((table, rows_to_records(rows))),
                _ => Err(Error::data_source(format!(
                    "Snapshot table '{}' is not an array",
                    table
                ))),
            })
            .collect()
    }
}

#[async_trait]
impl RecordSource for JsonSnapshotSource {
    async fn fetch_table(&self, table: &str) -> Result<Vec<Record>> {
        Ok(self.tables.get(table).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "json-snapshot"
    }
}
