//! Structured record types fetched from the relational store

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single row: field name to JSON value
pub type Record = Map<String, Value>;

/// The five record kinds ingested into the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Catalogue product
    Product,
    /// Warehouse stock entry
    InventoryEntry,
    /// Dealer sale
    Sale,
    /// Warranty or damage claim
    Claim,
    /// Dealer account
    Dealer,
}

impl RecordKind {
    /// All kinds in formatting order
    pub const ALL: [RecordKind; 5] = [
        RecordKind::Product,
        RecordKind::InventoryEntry,
        RecordKind::Sale,
        RecordKind::Claim,
        RecordKind::Dealer,
    ];

    /// Backing table name in the data store
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Product => "products",
            Self::InventoryEntry => "inventory",
            Self::Sale => "sales",
            Self::Claim => "claims",
            Self::Dealer => "dealers",
        }
    }

    /// Short identifier stored in block metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::InventoryEntry => "inventory",
            Self::Sale => "sale",
            Self::Claim => "claim",
            Self::Dealer => "dealer",
        }
    }
}

/// Full snapshot of all record collections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub products: Vec<Record>,
    pub inventory: Vec<Record>,
    pub sales: Vec<Record>,
    pub claims: Vec<Record>,
    pub dealers: Vec<Record>,
}

impl RecordSet {
    /// Records of a given kind, in fetch order
    pub fn get(&self, kind: RecordKind) -> &[Record] {
        match kind {
            RecordKind::Product => &self.products,
            RecordKind::InventoryEntry => &self.inventory,
            RecordKind::Sale => &self.sales,
            RecordKind::Claim => &self.claims,
            RecordKind::Dealer => &self.dealers,
        }
    }

    /// Mutable access to the collection for a kind
    pub fn get_mut(&mut self, kind: RecordKind) -> &mut Vec<Record> {
        match kind {
            RecordKind::Product => &mut self.products,
            RecordKind::InventoryEntry => &mut self.inventory,
            RecordKind::Sale => &mut self.sales,
            RecordKind::Claim => &mut self.claims,
            RecordKind::Dealer => &mut self.dealers,
        }
    }

    /// Total number of records across kinds
    pub fn len(&self) -> usize {
        RecordKind::ALL.iter().map(|k| self.get(*k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
