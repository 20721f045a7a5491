//! The flat per-message record produced by projection.

use chrono::{DateTime, Utc};

use crate::container::MailMessage;
use crate::error::Result;

use super::body::MessageBody;

/// Fixed-shape projection of one message, the unit of export.
///
/// Values are copied from the backend unchanged. A record lives only as long
/// as the export of its folder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageRecord {
    pub subject: Option<String>,
    /// Sender display name.
    pub sender: Option<String>,
    /// Raw transport headers.
    pub header: Option<String>,
    /// Plain-text body.
    pub body: Option<MessageBody>,
    pub creation_time: Option<DateTime<Utc>>,
    /// Client submit time.
    pub submit_time: Option<DateTime<Utc>>,
    pub delivery_time: Option<DateTime<Utc>>,
    pub attachment_count: u32,
}

impl MessageRecord {
    /// Read the eight exported fields off a message handle.
    ///
    /// Any field access failure propagates; there is no partial record.
    pub fn project<M: MailMessage + ?Sized>(message: &M) -> Result<Self> {
        Ok(Self {
            subject: message.subject()?,
            sender: message.sender_name()?,
            header: message.transport_headers()?,
            body: message.plain_text_body()?,
            creation_time: message.creation_time()?,
            submit_time: message.client_submit_time()?,
            delivery_time: message.delivery_time()?,
            attachment_count: message.number_of_attachments()?,
        })
    }

    /// `true` if the record has a body with at least one byte/char.
    pub fn has_body(&self) -> bool {
        self.body.as_ref().is_some_and(|b| !b.is_empty())
    }
}
