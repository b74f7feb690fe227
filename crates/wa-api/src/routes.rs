//! Route definitions

use std::path::Path;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::handlers::{create_message, help};
use crate::server::AppState;

/// Create the API router
pub fn routes(media_dir: &Path) -> Router<AppState> {
    Router::new()
        .route("/", get(help))
        .route("/messages/create", post(create_message))
        .nest_service("/media", ServeDir::new(media_dir))
}
