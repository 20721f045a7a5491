//! Per-folder report export: CSV table and raw body dump.

pub mod csv;
pub mod folder;
pub mod normalize;
pub mod path;
pub mod text;

use crate::model::record::MessageRecord;

pub use folder::{ExportOutcome, FolderExporter};
pub use path::OutputLayout;

/// A record selected for export, paired with its normalized body.
#[derive(Debug)]
pub struct ReportRow<'a> {
    pub record: &'a MessageRecord,
    pub body: String,
}
