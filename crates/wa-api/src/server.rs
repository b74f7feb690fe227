//! HTTP API Server
//!
//! Starts and manages the axum-based HTTP server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use wa_bridge::WhatsAppSession;

use crate::handlers::HELP;
use crate::routes::routes;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<dyn WhatsAppSession>,
    pub media_dir: PathBuf,
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes(&state.media_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP API server
pub async fn start_server(
    port: u16,
    session: Arc<dyn WhatsAppSession>,
    media_dir: PathBuf,
) -> anyhow::Result<()> {
    let app = app(AppState { session, media_dir });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("{}\nServer listening at http://localhost:{}\n", HELP, port);

    axum::serve(listener, app).await?;

    Ok(())
}
