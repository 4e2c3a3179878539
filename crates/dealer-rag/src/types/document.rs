//! Text blocks produced from structured records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::record::RecordKind;

/// Metadata value for `source`
pub const SOURCE_DATABASE: &str = "database";
/// Metadata value for `type`
pub const TYPE_STRUCTURED: &str = "structured_data";

/// A formatted, embeddable rendering of one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Human-readable multi-line text
    pub body: String,
    /// Provenance metadata
    pub metadata: BTreeMap<String, String>,
}

impl TextBlock {
    /// Create a block for a record of the given kind
    pub fn new(body: String, kind: RecordKind) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert("source".to_string(), SOURCE_DATABASE.to_string());
        metadata.insert("type".to_string(), TYPE_STRUCTURED.to_string());
        metadata.insert("kind".to_string(), kind.as_str().to_string());
        Self { body, metadata }
    }

    /// Record kind recorded in metadata, if any
    pub fn kind(&self) -> Option<&str> {
        self.metadata.get("kind").map(String::as_str)
    }
}
