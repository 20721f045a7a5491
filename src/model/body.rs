//! Message body payload as handed over by a container backend.

use serde::{Deserialize, Serialize};

/// The plain-text body of a message.
///
/// Backends that already decoded the body hand over `Text`; backends that
/// only have the stored bytes hand over `Bytes` and leave decoding to the
/// exporter's normalization step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageBody {
    /// Already-decoded text.
    Text(String),
    /// Raw stored bytes, charset unknown to the backend.
    Bytes(Vec<u8>),
}

impl MessageBody {
    /// `true` if the body carries no content at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Bytes(b) => b.is_empty(),
        }
    }
}

impl From<&str> for MessageBody {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for MessageBody {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<u8>> for MessageBody {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_empty() {
        assert!(MessageBody::from("").is_empty());
        assert!(MessageBody::from(Vec::new()).is_empty());
        assert!(!MessageBody::from("x").is_empty());
        assert!(!MessageBody::from(vec![0x41]).is_empty());
    }

    #[test]
    fn test_untagged_deserialize() {
        let text: MessageBody = serde_json::from_str("\"hello\"").unwrap();
        assert_eq!(text, MessageBody::Text("hello".to_string()));

        let bytes: MessageBody = serde_json::from_str("[104, 105]").unwrap();
        assert_eq!(bytes, MessageBody::Bytes(b"hi".to_vec()));
    }
}
