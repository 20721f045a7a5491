//! In-memory container backend.
//!
//! Holds a complete folder tree in memory. Serves as the JSON snapshot
//! format (a tree dumped by any external PST tool) and as the fake archive
//! for tests.

use std::io::Read;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::body::MessageBody;

use super::{MailContainer, MailFolder, MailMessage};

/// A whole mailbox held in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryContainer {
    pub root: Rc<MemoryFolder>,
}

/// One folder of an in-memory mailbox.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryFolder {
    pub name: String,
    pub sub_folders: Vec<Rc<MemoryFolder>>,
    pub messages: Vec<Rc<MemoryMessage>>,
}

/// One message of an in-memory mailbox. Field names follow the
/// [`MailMessage`] accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryMessage {
    pub subject: Option<String>,
    pub sender_name: Option<String>,
    pub transport_headers: Option<String>,
    pub plain_text_body: Option<MessageBody>,
    pub creation_time: Option<DateTime<Utc>>,
    pub client_submit_time: Option<DateTime<Utc>>,
    pub delivery_time: Option<DateTime<Utc>>,
    pub number_of_attachments: u32,
}

impl MemoryContainer {
    /// Wrap a root folder.
    pub fn new(root: MemoryFolder) -> Self {
        Self {
            root: Rc::new(root),
        }
    }

    /// Deserialize a JSON snapshot.
    pub fn from_reader<R: Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }
}

impl MemoryFolder {
    /// An empty folder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a sub-folder.
    pub fn with_folder(mut self, folder: MemoryFolder) -> Self {
        self.sub_folders.push(Rc::new(folder));
        self
    }

    /// Append a message.
    pub fn with_message(mut self, message: MemoryMessage) -> Self {
        self.messages.push(Rc::new(message));
        self
    }
}

impl MemoryMessage {
    /// A message with only a text body set.
    pub fn with_body(body: impl Into<MessageBody>) -> Self {
        Self {
            plain_text_body: Some(body.into()),
            ..Self::default()
        }
    }

    /// A message without a body.
    pub fn without_body() -> Self {
        Self::default()
    }
}

impl MailContainer for MemoryContainer {
    type Folder = Rc<MemoryFolder>;

    fn root_folder(&self) -> Result<Self::Folder> {
        Ok(Rc::clone(&self.root))
    }
}

impl MailFolder for Rc<MemoryFolder> {
    type Message = Rc<MemoryMessage>;

    fn name(&self) -> Result<String> {
        Ok(self.name.clone())
    }

    fn number_of_sub_folders(&self) -> Result<usize> {
        Ok(self.sub_folders.len())
    }

    fn sub_folders(&self) -> Result<Vec<Self>> {
        Ok(self.sub_folders.clone())
    }

    fn sub_messages(&self) -> Result<Vec<Self::Message>> {
        Ok(self.messages.clone())
    }
}

impl MailMessage for MemoryMessage {
    fn subject(&self) -> Result<Option<String>> {
        Ok(self.subject.clone())
    }

    fn sender_name(&self) -> Result<Option<String>> {
        Ok(self.sender_name.clone())
    }

    fn transport_headers(&self) -> Result<Option<String>> {
        Ok(self.transport_headers.clone())
    }

    fn plain_text_body(&self) -> Result<Option<MessageBody>> {
        Ok(self.plain_text_body.clone())
    }

    fn creation_time(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.creation_time)
    }

    fn client_submit_time(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.client_submit_time)
    }

    fn delivery_time(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.delivery_time)
    }

    fn number_of_attachments(&self) -> Result<u32> {
        Ok(self.number_of_attachments)
    }
}

impl MailMessage for Rc<MemoryMessage> {
    fn subject(&self) -> Result<Option<String>> {
        (**self).subject()
    }

    fn sender_name(&self) -> Result<Option<String>> {
        (**self).sender_name()
    }

    fn transport_headers(&self) -> Result<Option<String>> {
        (**self).transport_headers()
    }

    fn plain_text_body(&self) -> Result<Option<MessageBody>> {
        (**self).plain_text_body()
    }

    fn creation_time(&self) -> Result<Option<DateTime<Utc>>> {
        (**self).creation_time()
    }

    fn client_submit_time(&self) -> Result<Option<DateTime<Utc>>> {
        (**self).client_submit_time()
    }

    fn delivery_time(&self) -> Result<Option<DateTime<Utc>>> {
        (**self).delivery_time()
    }

    fn number_of_attachments(&self) -> Result<u32> {
        (**self).number_of_attachments()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_tree() {
        let container = MemoryContainer::new(
            MemoryFolder::new("Top of Personal Folders")
                .with_folder(
                    MemoryFolder::new("Inbox")
                        .with_message(MemoryMessage::with_body("hi"))
                        .with_folder(MemoryFolder::new("Receipts")),
                )
                .with_folder(MemoryFolder::new("Sent Items")),
        );

        let root = container.root_folder().unwrap();
        assert_eq!(root.number_of_sub_folders().unwrap(), 2);
        let children = root.sub_folders().unwrap();
        assert_eq!(children[0].name().unwrap(), "Inbox");
        assert_eq!(children[0].number_of_sub_folders().unwrap(), 1);
        assert_eq!(children[0].sub_messages().unwrap().len(), 1);
        assert_eq!(children[1].name().unwrap(), "Sent Items");
    }

    #[test]
    fn test_snapshot_json() {
        let json = r#"{
            "root": {
                "name": "Root",
                "sub_folders": [
                    {
                        "name": "Inbox",
                        "messages": [
                            {
                                "subject": "Lunch",
                                "sender_name": "Ori",
                                "plain_text_body": "Noon?",
                                "delivery_time": "2022-06-01T12:00:00Z",
                                "number_of_attachments": 1
                            },
                            { "plain_text_body": [78, 111] }
                        ]
                    }
                ]
            }
        }"#;

        let container = MemoryContainer::from_reader(json.as_bytes()).unwrap();
        let folders = container.root_folder().unwrap().sub_folders().unwrap();
        let messages = folders[0].sub_messages().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].subject().unwrap().as_deref(), Some("Lunch"));
        assert_eq!(messages[0].number_of_attachments().unwrap(), 1);
        assert!(messages[0].delivery_time().unwrap().is_some());
        assert_eq!(
            messages[1].plain_text_body().unwrap(),
            Some(MessageBody::Bytes(b"No".to_vec()))
        );
        assert_eq!(messages[1].subject().unwrap(), None);
    }

    #[test]
    fn test_snapshot_rejects_garbage() {
        assert!(MemoryContainer::from_reader(&b"!BDN\x00\x01"[..]).is_err());
    }
}
