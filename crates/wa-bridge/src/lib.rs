//! wa-bridge: WhatsApp <-> Twilio-style webhook translation
//!
//! Inbound WhatsApp messages are turned into Twilio-compatible webhook
//! form posts, and outbound send requests are relayed to the WhatsApp
//! session. The session itself lives in an open-wa sidecar that is
//! reached over HTTP.

pub mod admin;
pub mod bridge;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod media;
pub mod message;
pub mod openwa;
pub mod relay;
pub mod session;
pub mod translator;

#[cfg(test)]
pub(crate) mod testing;

pub use admin::AdminGate;
pub use bridge::WhatsAppBridge;
pub use dispatcher::WebhookDispatcher;
pub use error::{BridgeError, Result};
pub use events::EventListener;
pub use media::{MediaStore, StoredMedia};
pub use message::InboundMessage;
pub use openwa::OpenWaClient;
pub use relay::{relay, SendRequest};
pub use session::{SendOutcome, WhatsAppSession};
pub use translator::{InboundTranslator, WebhookForm};
