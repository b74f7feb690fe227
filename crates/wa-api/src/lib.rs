//! wa-api: HTTP surface of the WhatsApp webhook proxy
//!
//! Serves the help page, stored media files and the send endpoint.
//! Built with axum.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::{ApiError, Result};
pub use server::{start_server, AppState};
