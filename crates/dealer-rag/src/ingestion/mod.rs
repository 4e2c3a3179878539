//! Record ingestion: snapshot loading and text formatting

pub mod formatter;
pub mod snapshot;

pub use formatter::DocumentFormatter;
pub use snapshot::{load_snapshot, JsonSnapshotSource};
