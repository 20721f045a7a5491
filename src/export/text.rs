//! Per-folder raw body dump.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{PstError, Result};

use super::ReportRow;

/// Separator written after every body.
pub const BODY_SEPARATOR: &str = "\n\n";

/// Write every body as plain UTF-8 followed by a blank line, replacing any
/// existing file. Returns the number of bytes written.
pub fn write_body_dump(rows: &[ReportRow<'_>], path: &Path) -> Result<u64> {
    let file = File::create(path).map_err(|e| PstError::io(path, e))?;
    let mut out = BufWriter::new(file);
    let mut written = 0u64;

    for row in rows {
        for chunk in [row.body.as_str(), BODY_SEPARATOR] {
            out.write_all(chunk.as_bytes())
                .map_err(|e| PstError::io(path, e))?;
            written += chunk.len() as u64;
        }
    }

    out.flush().map_err(|e| PstError::io(path, e))?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::MessageRecord;

    #[test]
    fn test_write_body_dump() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("message_body_Inbox.txt");
        let record = MessageRecord::default();
        let rows = [
            ReportRow {
                record: &record,
                body: "first".to_string(),
            },
            ReportRow {
                record: &record,
                body: "second\nbody".to_string(),
            },
        ];

        let written = write_body_dump(&rows, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\n\nsecond\nbody\n\n");
        assert_eq!(written, content.len() as u64);
    }

    #[test]
    fn test_unwritable_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("missing").join("dump.txt");
        assert!(matches!(
            write_body_dump(&[], &path),
            Err(PstError::Io { .. })
        ));
    }
}
