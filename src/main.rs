//! Media Convert Server
//!
//! An HTTP service that fetches media from a URL with yt-dlp and hands back
//! either an MP3 audio extract or an MP4 whose audio track has been re-encoded
//! to AAC, leaving the video stream untouched.

mod config;
mod config_file;
mod error;
mod http;
mod integration;
mod limits;
mod naming;
mod pipeline;
mod probe;
mod state;
mod tools;

#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::http::create_router;
use crate::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "media-convert-server";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration before logging so the file can pick the log format
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let loaded = config_file::load(&config_path);
    let config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => ServerConfig::default(),
    };

    init_logging(&config);

    tracing::info!("{} v{} starting", APP_NAME, VERSION);
    match loaded {
        Ok(Some(_)) => tracing::info!("Loaded config file {}", config_path),
        Ok(None) => tracing::info!("No config file at {}, using defaults", config_path),
        Err(e) => tracing::warn!(
            "Failed to load config file {}: {}. Using defaults.",
            config_path,
            e
        ),
    }
    tracing::info!("Configuration loaded: {:?}", config);

    std::fs::create_dir_all(&config.output_dir)?;
    tracing::info!("Writing output to {}", config.output_dir.display());

    // Create application state
    let state = Arc::new(AppState::new(config.clone()));

    // Build router
    let app = create_router(state);

    // Start server
    let addr: SocketAddr = config
        .socket_addr()
        .parse()
        .map_err(|e| ServerError::Config(format!("invalid listen address: {}", e)))?;
    tracing::info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize logging with tracing
fn init_logging(config: &ServerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "media_convert_server={},tower_http=debug",
            config.log_level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
