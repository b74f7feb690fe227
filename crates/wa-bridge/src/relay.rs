//! Outbound relay: HTTP send requests -> WhatsApp text messages

use serde::Deserialize;
use tracing::info;

use crate::error::{BridgeError, Result};
use crate::message::to_contact_id;
use crate::session::{SendOutcome, WhatsAppSession};

/// Body of `POST /messages/create`
#[derive(Debug, Clone, Deserialize)]
pub struct SendRequest {
    /// Phone number, digits with an optional leading `+`
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub body: String,
}

/// Normalise the recipient and send the body as a text message
pub async fn relay(session: &dyn WhatsAppSession, request: &SendRequest) -> Result<()> {
    info!("Send message to {}", request.recipient);

    let recipient = validate_recipient(&request.recipient)?;
    match session.send_text(&to_contact_id(recipient), &request.body).await? {
        SendOutcome::Sent(_) => Ok(()),
        SendOutcome::Rejected => Err(BridgeError::InvalidFormat),
    }
}

fn validate_recipient(recipient: &str) -> Result<&str> {
    let trimmed = recipient.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BridgeError::InvalidRecipient(recipient.to_string()));
    }
    Ok(trimmed)
}
