//! Inbound WhatsApp messages and WhatsApp address helpers

use serde::{Deserialize, Serialize};

/// Domain suffix of individual WhatsApp contact ids
pub const CONTACT_DOMAIN: &str = "c.us";

/// Scheme prefix of Twilio-style WhatsApp addresses
pub const WEBHOOK_ADDRESS_PREFIX: &str = "whatsapp:+";

/// A message received by the WhatsApp session
///
/// Field names follow the open-wa message object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    /// Serialized message id, e.g. `false_491234567@c.us_3EB0...`
    pub id: String,
    /// Sender contact id (`<digits>@c.us`)
    pub from: String,
    /// Recipient contact id (`<digits>@c.us`)
    pub to: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_media: bool,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub mimetype: Option<String>,
}

/// `+491234567` or `491234567` -> `491234567@c.us`
pub fn to_contact_id(phone: &str) -> String {
    let digits = phone.trim().strip_prefix('+').unwrap_or(phone.trim());
    format!("{}@{}", digits, CONTACT_DOMAIN)
}

/// `491234567@c.us` -> `whatsapp:+491234567`
pub fn to_webhook_address(contact_id: &str) -> String {
    let user = contact_id.split('@').next().unwrap_or(contact_id);
    format!("{}{}", WEBHOOK_ADDRESS_PREFIX, user)
}
