//! Webhook dispatcher: posts translated messages to the configured endpoint

use reqwest::Client;
use tracing::{debug, error};

use crate::error::{BridgeError, Result};
use crate::translator::WebhookForm;

/// Header carrying the shared secret
pub const SHARED_SECRET_HEADER: &str = "X-Shared-Secret";

/// Webhook HTTP client
#[derive(Debug, Clone)]
pub struct WebhookDispatcher {
    client: Client,
    endpoint: String,
    shared_secret: String,
}

impl WebhookDispatcher {
    pub fn new(endpoint: impl Into<String>, shared_secret: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            shared_secret: shared_secret.into(),
        }
    }

    /// POST the form as multipart; any non-2xx status is a [`BridgeError::Dispatch`]
    pub async fn dispatch(&self, form: &WebhookForm) -> Result<()> {
        debug!("Posting {} to {}", form.message_sid, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header(SHARED_SECRET_HEADER, &self.shared_secret)
            .multipart(form.to_multipart())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let status_text = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_str().to_string());
            error!("Webhook answered {} for {}", status, form.message_sid);
            return Err(BridgeError::Dispatch(status_text));
        }

        Ok(())
    }
}
