//! Event listener for open-wa session webhooks
//!
//! open-wa posts every session event to this listener. `onMessage`
//! events become [`InboundMessage`]s on the bridge channel; the rest
//! are ignored. When an API key is configured, posts without a matching
//! `api_key` header are answered with 401.

use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{BridgeError, Result};
use crate::message::InboundMessage;
use crate::openwa::API_KEY_HEADER;

const MESSAGE_EVENT: &str = "onMessage";

/// Envelope of an open-wa webhook call
#[derive(Debug, Deserialize)]
struct SessionEvent {
    event: String,
    #[serde(default)]
    data: Value,
}

/// Event listener state
#[derive(Clone)]
struct EventState {
    sender: mpsc::Sender<InboundMessage>,
    api_key: Option<String>,
}

/// Event listener server
pub struct EventListener {
    addr: SocketAddr,
    state: EventState,
}

impl EventListener {
    pub fn new(
        addr: SocketAddr,
        sender: mpsc::Sender<InboundMessage>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            addr,
            state: EventState { sender, api_key },
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/events", post(handle_event))
            .with_state(self.state.clone())
    }

    /// Start the event listener
    pub async fn start(self) -> Result<()> {
        info!("Starting WhatsApp event listener on {}", self.addr);
        if self.state.api_key.is_none() {
            warn!("No API key configured, session events are not authenticated");
        }

        let app = self.router();

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| BridgeError::Config(e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| BridgeError::Http(e.to_string()))?;

        Ok(())
    }
}

fn is_authorized(headers: &HeaderMap, expected: Option<&str>) -> bool {
    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match (provided, expected) {
        (_, None) => true,
        (Some(p), Some(e)) => p == e,
        (None, Some(_)) => false,
    }
}

async fn handle_event(
    State(state): State<EventState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if !is_authorized(&headers, state.api_key.as_deref()) {
        warn!("Rejected session event without a valid API key");
        return StatusCode::UNAUTHORIZED;
    }

    let event: SessionEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!("Malformed session event: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    if event.event != MESSAGE_EVENT {
        debug!("Ignoring session event {}", event.event);
        return StatusCode::OK;
    }

    let message: InboundMessage = match serde_json::from_value(event.data) {
        Ok(message) => message,
        Err(e) => {
            warn!("Malformed onMessage payload: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    if state.sender.send(message).await.is_err() {
        warn!("Inbound channel closed, dropping message");
        return StatusCode::SERVICE_UNAVAILABLE;
    }

    StatusCode::OK
}
