//! Inbound translation: WhatsApp message -> Twilio-style webhook form

use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::media::MediaStore;
use crate::message::{to_webhook_address, InboundMessage};
use crate::session::WhatsAppSession;

/// Prefix of every generated `MessageSid`
pub const MESSAGE_SID_PREFIX: &str = "SU";

/// Number of trailing id characters kept in a `MessageSid`
pub const MESSAGE_SID_LEN: usize = 32;

/// Attachment part of a webhook form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    pub content_type: String,
    pub url: String,
}

/// Form posted to the webhook endpoint
///
/// At most one attachment; `NumMedia` is derived from it so the count
/// and the media fields cannot disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookForm {
    pub account_sid: String,
    pub message_sid: String,
    pub from: String,
    pub to: String,
    pub body: String,
    pub media: Option<MediaAttachment>,
}

impl WebhookForm {
    pub fn num_media(&self) -> usize {
        usize::from(self.media.is_some())
    }

    /// Form fields in wire order
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("AccountSid", self.account_sid.clone()),
            ("MessageSid", self.message_sid.clone()),
            ("From", self.from.clone()),
            ("To", self.to.clone()),
            ("Body", self.body.clone()),
            ("NumMedia", self.num_media().to_string()),
        ];
        if let Some(media) = &self.media {
            fields.push(("MediaContentType0", media.content_type.clone()));
            fields.push(("MediaUrl0", media.url.clone()));
        }
        fields
    }

    pub fn to_multipart(&self) -> reqwest::multipart::Form {
        self.fields()
            .into_iter()
            .fold(reqwest::multipart::Form::new(), |form, (name, value)| {
                form.text(name, value)
            })
    }
}

/// `SU` + the last 32 characters of the raw id
///
/// Shorter ids are left-padded with `0` so the sid keeps its shape.
pub fn message_sid(raw_id: &str) -> String {
    let chars: Vec<char> = raw_id.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(MESSAGE_SID_LEN)..]
        .iter()
        .collect();
    format!(
        "{}{:0>width$}",
        MESSAGE_SID_PREFIX,
        tail,
        width = MESSAGE_SID_LEN
    )
}

/// Builds webhook forms, downloading attachments into the media store
pub struct InboundTranslator {
    session: Arc<dyn WhatsAppSession>,
    media: MediaStore,
    account_sid: String,
}

impl InboundTranslator {
    pub fn new(
        session: Arc<dyn WhatsAppSession>,
        media: MediaStore,
        account_sid: impl Into<String>,
    ) -> Self {
        Self {
            session,
            media,
            account_sid: account_sid.into(),
        }
    }

    pub async fn translate(&self, message: &InboundMessage) -> Result<WebhookForm> {
        info!("New message from {}", message.from);

        let mut form = WebhookForm {
            account_sid: self.account_sid.clone(),
            message_sid: message_sid(&message.id),
            from: to_webhook_address(&message.from),
            to: to_webhook_address(&message.to),
            body: String::new(),
            media: None,
        };

        if message.is_media {
            let bytes = self.session.download_media(message).await?;
            let stored = self.media.store(&bytes).await?;

            form.body = message.caption.clone().unwrap_or_default();
            form.media = Some(MediaAttachment {
                content_type: message
                    .mimetype
                    .clone()
                    .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string()),
                url: stored.url,
            });
        } else {
            form.body = message.body.clone().unwrap_or_default();
        }

        Ok(form)
    }
}
