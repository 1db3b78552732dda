//! Hyperliquid Big Trader Monitor
//!
//! Read-only web dashboard showing recent fills and open positions for a
//! list of trader addresses, fetched from the public Hyperliquid info API.

mod api;
mod models;
mod monitor;
mod web;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::api::InfoClient;
use crate::monitor::Monitor;
use crate::web::AppState;

/// Hyperliquid big trader monitor.
#[derive(Parser)]
#[command(name = "hlwatch")]
#[command(about = "Read-only dashboard for recent fills and open positions of Hyperliquid traders", long_about = None)]
#[command(version)]
struct Cli {
    /// Address to serve the dashboard on
    #[arg(short, long, env = "HLWATCH_BIND", default_value = "127.0.0.1:8501")]
    bind: String,

    /// Hyperliquid API base URL (defaults to mainnet)
    #[arg(long, env = "HYPERLIQUID_API_URL")]
    api_url: Option<String>,

    /// Seconds API responses are reused across page loads (0 disables)
    #[arg(long, env = "HLWATCH_CACHE_TTL_SECS", default_value = "30")]
    cache_ttl_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // RUST_LOG wins over --log-level
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt().with_env_filter(filter).with_target(false).init();

    let client = match cli.api_url {
        Some(url) => InfoClient::with_base_url(url)?,
        None => InfoClient::new()?,
    };
    let api_url = client.base_url().to_string();
    let monitor = Monitor::new(Arc::new(client), Duration::from_secs(cli.cache_ttl_secs));

    info!(
        api_url = %api_url,
        cache_ttl_secs = cli.cache_ttl_secs,
        "Starting trader monitor"
    );

    let state = Arc::new(AppState::new(monitor, api_url));
    web::start_server(state, &cli.bind).await
}
