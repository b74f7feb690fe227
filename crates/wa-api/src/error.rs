//! Error types for wa-api

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// wa-api error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Send(#[from] wa_bridge::BridgeError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            // every send failure is the caller's 400
            ApiError::Send(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;
