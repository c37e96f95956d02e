//! # him-server
//!
//! Server-rendered variant of the HIM admin console.
//!
//! The admin session lives in httpOnly cookies. Page routes answer with the
//! page state as JSON, and form actions forward one admin call to the HIM
//! backend before redirecting back with an optional `error` code.

mod actions;
mod api;
mod auth;
mod config;
mod error;
mod session;
mod views;

#[cfg(test)]
mod testing;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,him_server=debug,him_client=debug")),
        )
        .init();

    info!("Starting HIM admin console v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");
    if config.dev_show_otp {
        tracing::warn!("DEV_SHOW_OTP is on; one-time codes will be shown on the login page");
    }

    let http_addr = config.http_addr;
    let app_state = AppState::new(config);
    info!(backend = %app_state.api.base_url(), "Using HIM backend");

    // -----------------------------------------------------------------------
    // 3. Run the HTTP server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
