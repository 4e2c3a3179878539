//! Renders structured records as embeddable text blocks
//!
//! Each record kind has a fixed template: a heading line followed by one
//! `- Label: value` line per known field. Absent and null fields render as
//! [`PLACEHOLDER`], currency fields carry the [`CURRENCY_MARKER`] prefix.
//! Formatting never fails; malformed rows degrade to placeholders.

use serde_json::Value;

use crate::types::{Record, RecordKind, RecordSet, TextBlock};

/// Rendered for absent or null fields
pub const PLACEHOLDER: &str = "N/A";

/// Prefix for currency-valued fields
pub const CURRENCY_MARKER: &str = "₹";

/// How a field value is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldStyle {
    Plain,
    Currency,
}

/// One templated line: human label, source column, style
struct Field {
    label: &'static str,
    column: &'static str,
    style: FieldStyle,
}

const fn plain(label: &'static str, column: &'static str) -> Field {
    Field { label, column, style: FieldStyle::Plain }
}

const fn currency(label: &'static str, column: &'static str) -> Field {
    Field { label, column, style: FieldStyle::Currency }
}

const PRODUCT_FIELDS: &[Field] = &[
    plain("SKU ID", "sku_id"),
    plain("Name", "product_name"),
    plain("Category", "category"),
    plain("Description", "description"),
    currency("Unit Price", "unit_price"),
    plain("Created At", "created_at"),
];

const INVENTORY_FIELDS: &[Field] = &[
    plain("Inventory ID", "inventory_id"),
    plain("SKU ID", "sku_id"),
    plain("Warehouse Location", "warehouse_location"),
    plain("Zone", "zone"),
    plain("Quantity", "quantity"),
    plain("Last Updated", "last_updated"),
];

const SALE_FIELDS: &[Field] = &[
    plain("Sale ID", "sale_id"),
    plain("Dealer ID", "dealer_id"),
    plain("SKU ID", "sku_id"),
    plain("Quantity", "quantity"),
    currency("Sale Amount", "sale_amount"),
    plain("Sale Date", "sale_date"),
    plain("Created At", "created_at"),
    plain("Payment Status", "payment_status"),
];

const CLAIM_FIELDS: &[Field] = &[
    plain("Claim ID", "claim_id"),
    plain("Dealer ID", "dealer_id"),
    plain("SKU ID", "sku_id"),
    currency("Claim Amount", "claim_amount"),
    plain("Claim Type", "claim_type"),
    plain("Status", "status"),
    plain("Submission Date", "submission_date"),
    plain("Resolution Date", "resolution_date"),
    plain("Description", "description"),
];

const DEALER_FIELDS: &[Field] = &[
    plain("Dealer ID", "dealer_id"),
    plain("Name", "dealer_name"),
    plain("Region", "region"),
    plain("City", "city"),
    plain("State", "state"),
    plain("Contact Person", "contact_person"),
    plain("Email", "email"),
    plain("Phone", "phone"),
    plain("Created At", "created_at"),
];

fn template(kind: RecordKind) -> (&'static str, &'static [Field]) {
    match kind {
        RecordKind::Product => ("Product:", PRODUCT_FIELDS),
        RecordKind::InventoryEntry => ("Inventory:", INVENTORY_FIELDS),
        RecordKind::Sale => ("Sale:", SALE_FIELDS),
        RecordKind::Claim => ("Claim:", CLAIM_FIELDS),
        RecordKind::Dealer => ("Dealer:", DEALER_FIELDS),
    }
}

/// Stateless record-to-text formatter
pub struct DocumentFormatter;

impl DocumentFormatter {
    /// Format a full snapshot
    ///
    /// Blocks are ordered Products, Inventory, Sales, Claims, Dealers, and
    /// keep input order within a kind.
    pub fn format(records: &RecordSet) -> Vec<TextBlock> {
        let mut blocks = Vec::with_capacity(records.len());
        for kind in RecordKind::ALL {
            blocks.extend(
                records
                    .get(kind)
                    .iter()
                    .map(|record| Self::format_record(kind, record)),
            );
        }
        blocks
    }

    /// Format a single record of the given kind
    pub fn format_record(kind: RecordKind, record: &Record) -> TextBlock {
        let (heading, fields) = template(kind);

        let mut body = String::from(heading);
        for field in fields {
            body.push_str("\n- ");
            body.push_str(field.label);
            body.push_str(": ");
            body.push_str(&render_value(record.get(field.column), field.style));
        }

        TextBlock::new(body, kind)
    }
}

fn render_value(value: Option<&Value>, style: FieldStyle) -> String {
    let text = match value {
        None | Some(Value::Null) => return PLACEHOLDER.to_string(),
        Some(Value::String(s)) => s.clone(),
        // Number, bool and nested values use their compact JSON form
        Some(other) => other.to_string(),
    };

    match style {
        FieldStyle::Plain => text,
        FieldStyle::Currency => format!("{CURRENCY_MARKER}{text}"),
    }
}
