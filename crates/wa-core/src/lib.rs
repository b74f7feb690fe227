//! wa-core: shared configuration for the WhatsApp webhook proxy
//!
//! Loads the proxy settings from the environment (or an optional TOML
//! file) and defines the startup error type.

pub mod config;
pub mod error;

pub use config::{Config, MediaConfig, ServerConfig, WebhookConfig, WhatsAppConfig};
pub use error::{Error, Result};
