//! open-wa EASY API client
//!
//! The WhatsApp Web session is owned by an open-wa sidecar. Every client
//! method is exposed there as `POST /<method>` taking `{"args": {...}}`
//! and answering `{"success": bool, "response": ...}`.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::error::{BridgeError, Result};
use crate::message::InboundMessage;
use crate::session::{SendOutcome, WhatsAppSession};

/// Header carrying the open-wa API key, in both directions
pub(crate) const API_KEY_HEADER: &str = "api_key";

/// open-wa API client
#[derive(Debug, Clone)]
pub struct OpenWaClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    response: Value,
}

impl OpenWaClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Whether the sidecar reports a connected WhatsApp session
    pub async fn health_check(&self) -> bool {
        match self.call("isConnected", json!({})).await {
            Ok(value) => value.as_bool().unwrap_or(false),
            Err(e) => {
                debug!("Health check failed: {}", e);
                false
            }
        }
    }

    async fn call(&self, method: &str, args: Value) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, method);

        let mut request = self.client.post(&url).json(&json!({ "args": args }));
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("open-wa {} failed: {} - {}", method, status, error_text);
            return Err(BridgeError::Session(format!(
                "{} failed: {} - {}",
                method, status, error_text
            )));
        }

        let body: ApiResponse = response.json().await?;
        if !body.success {
            return Err(BridgeError::Session(format!(
                "{} failed: {}",
                method, body.response
            )));
        }

        Ok(body.response)
    }
}

#[async_trait]
impl WhatsAppSession for OpenWaClient {
    async fn send_text(&self, to: &str, body: &str) -> Result<SendOutcome> {
        info!("Sending WhatsApp message to {}", to);

        let response = self
            .call("sendText", json!({ "to": to, "content": body }))
            .await?;

        Ok(match response {
            Value::Bool(false) | Value::Null => SendOutcome::Rejected,
            Value::String(id) => SendOutcome::Sent(id),
            other => SendOutcome::Sent(other.to_string()),
        })
    }

    async fn download_media(&self, message: &InboundMessage) -> Result<Vec<u8>> {
        let response = self
            .call("decryptMedia", json!({ "message": message.id }))
            .await?;

        let data_url = response
            .as_str()
            .ok_or_else(|| BridgeError::Media(format!("unexpected decryptMedia response for {}", message.id)))?;

        decode_data_url(data_url)
    }
}

/// `data:<mime>;base64,<payload>` (or bare base64) -> bytes
fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let payload = match data_url.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, payload)| payload)
            .ok_or_else(|| BridgeError::Media("malformed data URL".to_string()))?,
        None => data_url,
    };

    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| BridgeError::Media(format!("invalid base64 payload: {}", e)))
}
