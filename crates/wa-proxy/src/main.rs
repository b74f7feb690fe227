//! wa-proxy: WhatsApp <-> Twilio-style webhook proxy
//!
//! Usage:
//!   wa-proxy             - Start the proxy (event listener + HTTP API)
//!   wa-proxy --help      - Show help
//!   wa-proxy --version   - Show version

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use wa_bridge::{EventListener, MediaStore, OpenWaClient, WhatsAppBridge, WhatsAppSession};
use wa_core::Config;

/// Capacity of the inbound message channel
const INBOUND_QUEUE: usize = 256;

/// Run mode
enum RunMode {
    Server,
    Help,
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match parse_args() {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("wa-proxy {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Server => {}
    }

    // Load .env file before the filter reads RUST_LOG
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    run_server(config).await
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Server
}

/// Print help message
fn print_help() {
    println!("wa-proxy - WhatsApp to Twilio-style webhook proxy");
    println!();
    println!("Usage:");
    println!("  wa-proxy             Start the proxy");
    println!("  wa-proxy --help      Show this help message");
    println!("  wa-proxy --version   Show version");
    println!();
    println!("Environment Variables:");
    println!("  SULLA_ADMIN_SENDER   Administrator phone number (required)");
    println!("  SULLA_MEDIA_DIR      Directory for downloaded media (required)");
    println!("  SULLA_MEDIA_ROOT     Public URL prefix of the media files (required)");
    println!("  SULLA_ENDPOINT       Webhook endpoint URL (required)");
    println!("  SULLA_SHARED_SECRET  Value of the X-Shared-Secret header (required)");
    println!("  SULLA_SERVER_PORT    HTTP API port (required)");
    println!("  SULLA_WA_API_URL     open-wa API URL (default: http://127.0.0.1:8002)");
    println!("  SULLA_WA_API_KEY     open-wa API key, also required on open-wa webhooks");
    println!("  SULLA_EVENTS_HOST    Address for open-wa webhooks (default: 127.0.0.1)");
    println!("  SULLA_EVENTS_PORT    Port for open-wa webhooks (default: 8003)");
    println!("  SULLA_ACCOUNT_SID    AccountSid sent to the webhook (default: sulla)");
    println!();
    println!("Settings may also be given in ./{}", wa_core::config::DEFAULT_CONFIG_FILE);
}

/// Run the event listener, the inbound bridge and the HTTP API
async fn run_server(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting wa-proxy...");

    MediaStore::new(&config.media.dir, &config.media.root)
        .ensure_dir()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create media dir: {}", e))?;

    let client = OpenWaClient::new(&config.whatsapp.api_url, config.whatsapp.api_key.clone())
        .map_err(|e| anyhow::anyhow!("Failed to create WhatsApp client: {}", e))?;
    if client.health_check().await {
        tracing::info!("WhatsApp session connected at {}", config.whatsapp.api_url);
    } else {
        tracing::warn!("WhatsApp session at {} is not connected yet", config.whatsapp.api_url);
    }
    let session: Arc<dyn WhatsAppSession> = Arc::new(client);

    let (sender, receiver) = mpsc::channel(INBOUND_QUEUE);
    let mut service_handles = Vec::new();

    // Session events from open-wa
    let events_addr = SocketAddr::new(config.whatsapp.events_host, config.whatsapp.events_port);
    let listener = EventListener::new(events_addr, sender, config.whatsapp.api_key.clone());
    service_handles.push(tokio::spawn(async move {
        if let Err(e) = listener.start().await {
            tracing::error!("Event listener error: {}", e);
        }
    }));

    // Inbound messages -> webhook
    let bridge = Arc::new(WhatsAppBridge::from_config(&config, Arc::clone(&session)));
    service_handles.push(tokio::spawn(bridge.run(receiver)));

    // HTTP API
    let api_port = config.server.port;
    let media_dir = config.media.dir.clone();
    service_handles.push(tokio::spawn(async move {
        if let Err(e) = wa_api::start_server(api_port, session, media_dir).await {
            tracing::error!("HTTP API error: {}", e);
        }
    }));

    tracing::info!("wa-proxy initialized successfully");
    tracing::info!("Press Ctrl+C to exit");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    for handle in service_handles {
        handle.abort();
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
