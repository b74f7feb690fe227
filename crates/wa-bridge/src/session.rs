//! The WhatsApp session seam
//!
//! The bridge only needs two things from WhatsApp: sending a text and
//! downloading an attachment. Inbound messages arrive on a channel fed
//! by [`crate::EventListener`].

use async_trait::async_trait;

use crate::error::Result;
use crate::message::InboundMessage;

/// Result of a text send that did not error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Accepted; carries the WhatsApp message id
    Sent(String),
    /// The session could not format the message (open-wa returns `false`)
    Rejected,
}

/// A live WhatsApp session shared by the inbound loop and the HTTP API
#[async_trait]
pub trait WhatsAppSession: Send + Sync {
    /// Send a plain text message to a contact id (`<digits>@c.us`)
    async fn send_text(&self, to: &str, body: &str) -> Result<SendOutcome>;

    /// Download and decrypt the attachment of a media message
    async fn download_media(&self, message: &InboundMessage) -> Result<Vec<u8>>;
}
