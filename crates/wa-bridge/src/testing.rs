//! Test doubles shared by the unit tests

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{BridgeError, Result};
use crate::message::InboundMessage;
use crate::session::{SendOutcome, WhatsAppSession};

/// Records sends and serves a fixed attachment
#[derive(Default)]
pub struct MockSession {
    pub sent: Mutex<Vec<(String, String)>>,
    pub media: Vec<u8>,
    pub reject: bool,
    pub fail: bool,
}

impl MockSession {
    pub fn with_media(media: &[u8]) -> Self {
        Self {
            media: media.to_vec(),
            ..Default::default()
        }
    }

    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl WhatsAppSession for MockSession {
    async fn send_text(&self, to: &str, body: &str) -> Result<SendOutcome> {
        if self.fail {
            return Err(BridgeError::Session("session closed".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        if self.reject {
            Ok(SendOutcome::Rejected)
        } else {
            Ok(SendOutcome::Sent("true_msg_id".to_string()))
        }
    }

    async fn download_media(&self, _message: &InboundMessage) -> Result<Vec<u8>> {
        if self.fail {
            return Err(BridgeError::Media("download failed".to_string()));
        }
        Ok(self.media.clone())
    }
}

pub fn text_message(from: &str, body: Option<&str>) -> InboundMessage {
    InboundMessage {
        id: "false_491234567@c.us_3EB0C431D5A3E8C7F2A1B9E0D4C6F8A2".to_string(),
        from: from.to_string(),
        to: "497654321@c.us".to_string(),
        body: body.map(str::to_string),
        is_media: false,
        caption: None,
        mimetype: None,
    }
}

pub fn media_message(caption: Option<&str>, mimetype: &str) -> InboundMessage {
    InboundMessage {
        is_media: true,
        body: Some("/9j/4AAQSkZJRgABAQ".to_string()),
        caption: caption.map(str::to_string),
        mimetype: Some(mimetype.to_string()),
        ..text_message("491234567@c.us", None)
    }
}
