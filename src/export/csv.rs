//! Per-folder tabular report.
//!
//! Output is UTF-8 with BOM for Excel compatibility, RFC 4180 quoting and
//! CRLF row terminators.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::{PstError, Result};

use super::ReportRow;

/// Header row of every folder report, in column order.
pub const REPORT_COLUMNS: [&str; 7] = [
    "creation_time",
    "submit_time",
    "delivery_time",
    "sender",
    "subject",
    "body",
    "attachment_count",
];

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Write the report for one folder, replacing any existing file.
///
/// Returns the number of bytes written. `date_format` must already be a
/// valid `strftime` string.
pub fn write_report(rows: &[ReportRow<'_>], path: &Path, date_format: &str) -> Result<u64> {
    let file = File::create(path).map_err(|e| PstError::io(path, e))?;
    let mut out = BufWriter::new(file);
    let mut written = 0u64;

    let header = format!("{}\r\n", REPORT_COLUMNS.join(","));
    for chunk in [UTF8_BOM, header.as_bytes()] {
        out.write_all(chunk).map_err(|e| PstError::io(path, e))?;
        written += chunk.len() as u64;
    }

    for row in rows {
        let record = row.record;
        let line = format!(
            "{},{},{},{},{},{},{}\r\n",
            format_time(record.creation_time, date_format)?,
            format_time(record.submit_time, date_format)?,
            format_time(record.delivery_time, date_format)?,
            csv_escape(record.sender.as_deref().unwrap_or("")),
            csv_escape(record.subject.as_deref().unwrap_or("")),
            csv_escape(&row.body),
            record.attachment_count,
        );
        out.write_all(line.as_bytes())
            .map_err(|e| PstError::io(path, e))?;
        written += line.len() as u64;
    }

    out.flush().map_err(|e| PstError::io(path, e))?;
    Ok(written)
}

fn format_time(time: Option<DateTime<Utc>>, date_format: &str) -> Result<String> {
    let Some(t) = time else {
        return Ok(String::new());
    };
    let mut cell = String::new();
    write!(cell, "{}", t.format(date_format))
        .map_err(|_| PstError::Export(format!("cannot format timestamp with '{date_format}'")))?;
    Ok(csv_escape(&cell))
}

/// Escape a value for CSV (RFC 4180).
///
/// Wraps in double quotes if the value contains commas, quotes, or newlines.
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
