//! Export of one folder's messages.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use encoding_rs::Encoding;
use serde::Serialize;
use tracing::info;

use crate::error::{PstError, Result};
use crate::model::record::MessageRecord;

use super::normalize::{normalize_body, resolve_charset};
use super::path::OutputLayout;
use super::{csv, text, ReportRow};

/// Default timestamp format for report cells.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes the two report files for a folder.
#[derive(Debug, Clone)]
pub struct FolderExporter {
    layout: OutputLayout,
    date_format: String,
    charset: &'static Encoding,
}

/// What the export of one folder produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportOutcome {
    pub folder: String,
    /// Messages handed to the exporter.
    pub messages: usize,
    /// Messages with a non-empty body, i.e. rows written.
    pub with_body: usize,
    pub report: Option<PathBuf>,
    pub body_dump: Option<PathBuf>,
    pub bytes_written: u64,
}

impl ExportOutcome {
    /// Number of files created or overwritten.
    pub fn files_written(&self) -> usize {
        usize::from(self.report.is_some()) + usize::from(self.body_dump.is_some())
    }
}

impl FolderExporter {
    /// Create an exporter writing into `layout`.
    ///
    /// Fails if `date_format` cannot format a UTC timestamp. Parse-only
    /// specifiers such as `%#z` are rejected here too.
    pub fn new(layout: OutputLayout, date_format: &str, body_charset: &str) -> Result<Self> {
        let invalid = || PstError::Export(format!("invalid date format '{date_format}'"));
        if StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
            return Err(invalid());
        }
        let mut sample = String::new();
        write!(sample, "{}", DateTime::<Utc>::default().format(date_format))
            .map_err(|_| invalid())?;
        Ok(Self {
            layout,
            date_format: date_format.to_string(),
            charset: resolve_charset(body_charset),
        })
    }

    /// Exporter with default formatting into `layout`.
    pub fn with_layout(layout: OutputLayout) -> Self {
        Self {
            layout,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            charset: encoding_rs::UTF_8,
        }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Export the messages of `folder_name`.
    ///
    /// Only messages with a non-empty body are written, in their original
    /// order. When none qualify, no file is touched. I/O errors abort the
    /// export and may leave a partially written file behind.
    pub fn export(&self, records: Vec<MessageRecord>, folder_name: &str) -> Result<ExportOutcome> {
        let mut outcome = ExportOutcome {
            folder: folder_name.to_string(),
            messages: records.len(),
            ..ExportOutcome::default()
        };

        if records.is_empty() {
            info!(folder = folder_name, "Empty folder not processed");
            return Ok(outcome);
        }

        let rows: Vec<ReportRow<'_>> = records
            .iter()
            .filter_map(|record| {
                let body = record.body.as_ref().filter(|b| !b.is_empty())?;
                Some(ReportRow {
                    record,
                    body: normalize_body(body, self.charset),
                })
            })
            .collect();

        outcome.with_body = rows.len();
        info!(
            folder = folder_name,
            with_body = rows.len(),
            "Total messages with body"
        );

        if rows.is_empty() {
            return Ok(outcome);
        }

        let report = self.layout.report_path(folder_name)?;
        outcome.bytes_written += csv::write_report(&rows, &report, &self.date_format)?;
        outcome.report = Some(report);

        let body_dump = self.layout.body_dump_path(folder_name)?;
        outcome.bytes_written += text::write_body_dump(&rows, &body_dump)?;
        outcome.body_dump = Some(body_dump);

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::body::MessageBody;

    fn record(body: Option<&str>) -> MessageRecord {
        MessageRecord {
            body: body.map(MessageBody::from),
            ..MessageRecord::default()
        }
    }

    fn exporter(dir: &std::path::Path) -> FolderExporter {
        FolderExporter::with_layout(OutputLayout::new(dir, true).unwrap())
    }

    #[test]
    fn test_empty_input_is_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("output");
        let outcome = exporter(&out).export(Vec::new(), "Inbox").unwrap();
        assert_eq!(outcome.messages, 0);
        assert_eq!(outcome.files_written(), 0);
        assert!(!out.exists());
    }

    #[test]
    fn test_no_bodies_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let outcome = exporter(tmp.path())
            .export(vec![record(None), record(Some(""))], "Drafts")
            .unwrap();
        assert_eq!(outcome.messages, 2);
        assert_eq!(outcome.with_body, 0);
        assert_eq!(outcome.files_written(), 0);
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_keeps_order_and_skips_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let records = vec![
            record(Some("A")),
            record(Some("")),
            record(Some("B")),
            record(Some("C")),
        ];
        let outcome = exporter(tmp.path()).export(records, "Inbox").unwrap();
        assert_eq!(outcome.with_body, 3);
        assert_eq!(outcome.files_written(), 2);

        let dump = std::fs::read_to_string(outcome.body_dump.unwrap()).unwrap();
        assert_eq!(dump, "A\n\nB\n\nC\n\n");

        let report = std::fs::read_to_string(outcome.report.unwrap()).unwrap();
        let lines: Vec<&str> = report.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], ",,,,,A,0");
        assert_eq!(lines[2], ",,,,,B,0");
        assert_eq!(lines[3], ",,,,,C,0");
    }

    #[test]
    fn test_invalid_date_format() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(tmp.path(), true).unwrap();
        assert!(matches!(
            FolderExporter::new(layout, "%Y-%Q", "utf-8"),
            Err(PstError::Export(_))
        ));
    }

    #[test]
    fn test_parse_only_date_format_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(tmp.path(), true).unwrap();
        assert!(matches!(
            FolderExporter::new(layout.clone(), "%#z", "utf-8"),
            Err(PstError::Export(_))
        ));
        assert!(FolderExporter::new(layout, "%d/%m/%Y %H:%M", "utf-8").is_ok());
    }
}
