//! Error types for wa-bridge

use thiserror::Error;

/// wa-bridge error type
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The webhook endpoint answered with a non-2xx status
    #[error("Webhook rejected message: {0}")]
    Dispatch(String),

    /// The WhatsApp session refused to format the outgoing message
    #[error("Wrong message format")]
    InvalidFormat,

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("WhatsApp session error: {0}")]
    Session(String),

    #[error("Media error: {0}")]
    Media(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        BridgeError::Http(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, BridgeError>;
