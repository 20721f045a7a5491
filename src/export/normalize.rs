//! Body text normalization before export.
//!
//! This step is lossy on purpose and the loss is silent:
//! - text bodies lose a leading byte-order mark and are otherwise unchanged;
//! - byte bodies in UTF-8 lose a leading BOM and every malformed sequence;
//! - byte bodies in another charset are decoded by `encoding_rs`, which maps
//!   malformed input to U+FFFD.

use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};

use crate::model::body::MessageBody;

const BOM: char = '\u{feff}';
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Look up a charset label (`"utf-8"`, `"windows-1255"`, `"latin1"`, ...).
///
/// Unknown labels fall back to UTF-8.
pub fn resolve_charset(label: &str) -> &'static Encoding {
    match Encoding::for_label(label.trim().as_bytes()) {
        Some(encoding) => encoding,
        None => {
            warn!(
                charset = label,
                "Unknown body charset, falling back to UTF-8"
            );
            UTF_8
        }
    }
}

/// Turn a body into the text that goes into both report files.
pub fn normalize_body(body: &MessageBody, charset: &'static Encoding) -> String {
    match body {
        MessageBody::Text(text) => text.strip_prefix(BOM).unwrap_or(text).to_string(),
        MessageBody::Bytes(bytes) if charset == UTF_8 => decode_utf8_ignoring_errors(bytes),
        MessageBody::Bytes(bytes) => {
            let (decoded, used, had_errors) = charset.decode(bytes);
            if had_errors {
                debug!(charset = used.name(), "Malformed bytes replaced in body");
            }
            decoded.into_owned()
        }
    }
}

/// Decode UTF-8, skipping a leading BOM and dropping malformed sequences.
fn decode_utf8_ignoring_errors(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable_text_unchanged() {
        let text = "Meeting moved to 10:30, room B. Thanks!";
        assert_eq!(normalize_body(&MessageBody::from(text), UTF_8), text);
    }

    #[test]
    fn test_non_ascii_text_unchanged() {
        let text = "שלום, café, 東京";
        assert_eq!(normalize_body(&MessageBody::from(text), UTF_8), text);
    }

    #[test]
    fn test_text_bom_removed() {
        let body = MessageBody::from("\u{feff}hello");
        assert_eq!(normalize_body(&body, UTF_8), "hello");
    }

    #[test]
    fn test_utf8_bytes_drop_malformed() {
        let body = MessageBody::Bytes(b"ab\xffc\xc3".to_vec());
        assert_eq!(normalize_body(&body, UTF_8), "abc");
    }

    #[test]
    fn test_utf8_bytes_bom_removed() {
        let body = MessageBody::Bytes(b"\xef\xbb\xbfhi".to_vec());
        assert_eq!(normalize_body(&body, UTF_8), "hi");
    }

    #[test]
    fn test_legacy_charset() {
        // "caf\xe9" in windows-1252
        let body = MessageBody::Bytes(b"caf\xe9".to_vec());
        let charset = resolve_charset("windows-1252");
        assert_eq!(normalize_body(&body, charset), "café");
    }

    #[test]
    fn test_resolve_charset_fallback() {
        assert_eq!(resolve_charset("no-such-charset"), UTF_8);
        assert_eq!(resolve_charset(" UTF-8 "), UTF_8);
        assert_eq!(resolve_charset("latin1").name(), "windows-1252");
    }
}
