//! Native PST/OST backend on top of the `outlook-pst` crate.
//!
//! Folders are enumerated through their hierarchy tables and messages through
//! their contents tables. The exported fields are read as MAPI properties.

use std::path::Path;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use outlook_pst::ltp::prop_context::PropertyValue;
use outlook_pst::messaging::folder::UnicodeFolder;
use outlook_pst::messaging::message::UnicodeMessage;
use outlook_pst::messaging::store::UnicodeStore;
use outlook_pst::ndb::node_id::{NodeId, NodeIdType};
use outlook_pst::UnicodePstFile;
use tracing::debug;

use crate::error::{PstError, Result};
use crate::model::body::MessageBody;

use super::{MailContainer, MailFolder, MailMessage};

// MAPI property tags (MS-OXPROPS)
const PR_SUBJECT: u16 = 0x0037;
const PR_CLIENT_SUBMIT_TIME: u16 = 0x0039;
const PR_TRANSPORT_MESSAGE_HEADERS: u16 = 0x007D;
const PR_SENDER_NAME: u16 = 0x0C1A;
const PR_MESSAGE_DELIVERY_TIME: u16 = 0x0E06;
const PR_BODY: u16 = 0x1000;
const PR_CREATION_TIME: u16 = 0x3007;

/// 100ns intervals between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_EPOCH: i64 = 116_444_736_000_000_000;

/// An opened PST or OST file.
pub struct PstContainer {
    store: Rc<UnicodeStore>,
}

/// Folder handle bound to its store.
pub struct PstFolder {
    store: Rc<UnicodeStore>,
    folder: Rc<UnicodeFolder>,
}

/// A fully read message.
pub struct PstMessage {
    message: Rc<UnicodeMessage>,
}

impl PstContainer {
    /// Open a PST/OST file and read its message store.
    pub fn open(path: &Path) -> Result<Self> {
        let invalid = |e: &dyn std::fmt::Display| PstError::InvalidContainer {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let pst = UnicodePstFile::open(path).map_err(|e| invalid(&e))?;
        let store = UnicodeStore::read(Rc::new(pst)).map_err(|e| invalid(&e))?;

        if let Ok(name) = store.properties().display_name() {
            debug!(store = %name, "Opened PST store");
        }

        Ok(Self { store })
    }
}

impl MailContainer for PstContainer {
    type Folder = PstFolder;

    fn root_folder(&self) -> Result<Self::Folder> {
        let entry_id = self
            .store
            .properties()
            .ipm_sub_tree_entry_id()
            .map_err(|e| PstError::field("root_folder", e))?;
        let folder = UnicodeFolder::read(Rc::clone(&self.store), &entry_id)
            .map_err(|e| PstError::field("root_folder", e))?;
        Ok(PstFolder {
            store: Rc::clone(&self.store),
            folder,
        })
    }
}

impl PstFolder {
    /// Row ids of the hierarchy table (direct sub-folders).
    fn sub_folder_ids(&self) -> Vec<u32> {
        self.folder
            .hierarchy_table()
            .map(|table| table.rows_matrix().map(|row| row.id().into()).collect())
            .unwrap_or_default()
    }

    /// Row ids of the contents table (direct messages).
    fn message_ids(&self) -> Vec<u32> {
        self.folder
            .contents_table()
            .map(|table| table.rows_matrix().map(|row| row.id().into()).collect())
            .unwrap_or_default()
    }
}

impl MailFolder for PstFolder {
    type Message = PstMessage;

    fn name(&self) -> Result<String> {
        self.folder
            .properties()
            .display_name()
            .map(|name| name.to_string())
            .map_err(|e| PstError::field("name", e))
    }

    fn number_of_sub_folders(&self) -> Result<usize> {
        Ok(self.sub_folder_ids().len())
    }

    fn sub_folders(&self) -> Result<Vec<Self>> {
        let mut folders = Vec::new();
        for row_id in self.sub_folder_ids() {
            let node_id = NodeId::new(NodeIdType::NormalFolder, row_id)
                .map_err(|e| PstError::field("sub_folders", e))?;
            let entry_id = self
                .store
                .properties()
                .make_entry_id(node_id)
                .map_err(|e| PstError::field("sub_folders", e))?;
            let folder = UnicodeFolder::read(Rc::clone(&self.store), &entry_id)
                .map_err(|e| PstError::field("sub_folders", e))?;
            folders.push(PstFolder {
                store: Rc::clone(&self.store),
                folder,
            });
        }
        Ok(folders)
    }

    fn sub_messages(&self) -> Result<Vec<Self::Message>> {
        let mut messages = Vec::new();
        for row_id in self.message_ids() {
            let node_id = NodeId::new(NodeIdType::NormalMessage, row_id)
                .map_err(|e| PstError::field("sub_messages", e))?;
            let entry_id = self
                .store
                .properties()
                .make_entry_id(node_id)
                .map_err(|e| PstError::field("sub_messages", e))?;
            let message = UnicodeMessage::read(Rc::clone(&self.store), &entry_id, None)
                .map_err(|e| PstError::field("sub_messages", e))?;
            messages.push(PstMessage { message });
        }
        Ok(messages)
    }
}

impl PstMessage {
    fn string(&self, tag: u16) -> Option<String> {
        match self.message.properties().get(tag) {
            Some(PropertyValue::String8(s)) => Some(s.to_string()),
            Some(PropertyValue::Unicode(s)) => Some(s.to_string()),
            _ => None,
        }
    }

    fn time(&self, tag: u16) -> Option<DateTime<Utc>> {
        match self.message.properties().get(tag) {
            Some(PropertyValue::Time(filetime)) => filetime_to_utc(*filetime),
            _ => None,
        }
    }
}

impl MailMessage for PstMessage {
    fn subject(&self) -> Result<Option<String>> {
        Ok(self.string(PR_SUBJECT).map(|s| strip_subject_prefix(&s).to_string()))
    }

    fn sender_name(&self) -> Result<Option<String>> {
        Ok(self.string(PR_SENDER_NAME))
    }

    fn transport_headers(&self) -> Result<Option<String>> {
        Ok(self.string(PR_TRANSPORT_MESSAGE_HEADERS))
    }

    fn plain_text_body(&self) -> Result<Option<MessageBody>> {
        Ok(self.string(PR_BODY).map(MessageBody::Text))
    }

    fn creation_time(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.time(PR_CREATION_TIME))
    }

    fn client_submit_time(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.time(PR_CLIENT_SUBMIT_TIME))
    }

    fn delivery_time(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.time(PR_MESSAGE_DELIVERY_TIME))
    }

    fn number_of_attachments(&self) -> Result<u32> {
        let count = self
            .message
            .attachment_table()
            .map(|table| table.rows_matrix().count())
            .unwrap_or(0);
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}

/// Convert a Windows FILETIME to UTC. Zero means "not set".
fn filetime_to_utc(filetime: i64) -> Option<DateTime<Utc>> {
    if filetime == 0 {
        return None;
    }
    let since_epoch = filetime.checked_sub(FILETIME_UNIX_EPOCH)?;
    let secs = since_epoch.div_euclid(10_000_000);
    let nanos = (since_epoch.rem_euclid(10_000_000) * 100) as u32;
    DateTime::from_timestamp(secs, nanos)
}

/// PST subjects may start with a `\u{1}` marker followed by one length char.
fn strip_subject_prefix(subject: &str) -> &str {
    let mut chars = subject.chars();
    if chars.next() == Some('\u{1}') {
        chars.next();
        return chars.as_str();
    }
    subject
}
