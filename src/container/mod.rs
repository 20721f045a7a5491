//! Mailbox container capability interface and its backends.
//!
//! Decoding the archive format is the job of a backend. Traversal and export
//! only see these traits, so they run the same against a real PST file, a
//! JSON snapshot, or an in-memory tree built in a test.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::body::MessageBody;

pub mod loader;
pub mod memory;
#[cfg(feature = "pst")]
pub mod pst;

/// An opened mailbox archive.
pub trait MailContainer {
    /// Folder handle type produced by this backend.
    type Folder: MailFolder;

    /// The top of the folder hierarchy.
    fn root_folder(&self) -> Result<Self::Folder>;
}

/// A node in the folder tree.
pub trait MailFolder: Sized {
    /// Message handle type produced by this backend.
    type Message: MailMessage;

    /// Display name. Not unique among siblings.
    fn name(&self) -> Result<String>;

    fn number_of_sub_folders(&self) -> Result<usize>;

    /// Direct children, in backend order.
    fn sub_folders(&self) -> Result<Vec<Self>>;

    /// Messages directly contained in this folder, in backend order.
    fn sub_messages(&self) -> Result<Vec<Self::Message>>;
}

/// Read access to the message properties that end up in a report.
pub trait MailMessage {
    fn subject(&self) -> Result<Option<String>>;
    fn sender_name(&self) -> Result<Option<String>>;
    fn transport_headers(&self) -> Result<Option<String>>;
    fn plain_text_body(&self) -> Result<Option<MessageBody>>;
    fn creation_time(&self) -> Result<Option<DateTime<Utc>>>;
    fn client_submit_time(&self) -> Result<Option<DateTime<Utc>>>;
    fn delivery_time(&self) -> Result<Option<DateTime<Utc>>>;
    fn number_of_attachments(&self) -> Result<u32>;
}
