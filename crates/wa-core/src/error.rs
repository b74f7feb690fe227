//! Error types for wa-core

use thiserror::Error;

/// Main error type for wa-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for wa-core
pub type Result<T> = std::result::Result<T, Error>;
