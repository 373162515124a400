//! # Bulwark - comment submission gate
//!
//! Renders a human-verification challenge on the comment form and refuses
//! to persist any comment whose challenge token the provider does not
//! confirm.
//!
//! ## Architecture
//! ```text
//! Browser ──form──> Bulwark ──siteverify──> hCaptcha / reCAPTCHA / Turnstile
//!                      │
//!              Credential store (memory / file / Redis)
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod comments;
mod config;
mod routes;
mod state;
mod store;
mod verify;

#[cfg(test)]
mod testing;

use crate::config::AppConfig;
use crate::state::AppState;

/// Bulwark - human verification for comment submissions
#[derive(Parser, Debug)]
#[command(name = "bulwark")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/bulwark.toml")]
    config: String,

    /// Listen address (overrides config)
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen: Option<String>,

    /// Redis URL for the redis credential store (overrides config)
    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,

    /// Public site key to seed into the credential store
    #[arg(long, env = "BULWARK_SITE_KEY")]
    site_key: Option<String>,

    /// Secret key to seed into the credential store
    #[arg(long, env = "BULWARK_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// Bearer token for the admin settings routes
    #[arg(long, env = "BULWARK_ADMIN_TOKEN", hide_env_values = true)]
    admin_token: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    info!("Starting Bulwark v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::load(&args.config, &args)?;
    info!(
        provider = %config.captcha.provider,
        store = ?config.store.backend,
        admin = config.admin_token.is_some(),
        "Configuration loaded from {}",
        args.config
    );

    // Initialize application state
    let state = AppState::new(config.clone()).await?;
    info!(
        store = state.store.backend(),
        verify_url = state.gate.verify_url(),
        "Verification gate ready"
    );
    let credentials = state
        .credentials()
        .await
        .context("Failed to read credential store")?;
    if !credentials.has_secret() {
        tracing::warn!("No secret key configured: every submission will be rejected");
    }

    // Build router
    let app = routes::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("Bulwark listening on {}", config.listen_addr);

    // Handle graceful shutdown
    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received");
    };

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await
    .context("Server error")?;

    info!("Bulwark shutdown complete");
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .init();
    }

    Ok(())
}
