//! Admission gateway binary.
//!
//! ```text
//!     Client ──▶ request id ─▶ trace ─▶ timeout ─▶ ┌──────────────────────┐
//!                                                   │  admission pipeline  │
//!                                                   │  1. authenticate     │──401──▶ Client
//!                                                   │  2. rate limit ◀─────┼──▶ counter store
//!                                                   └──────────┬───────────┘        (Redis)
//!                                                              │           ──429──▶ Client
//!                                                              ▼
//!                                                    forwarder ──▶ upstream service
//! ```

use std::path::PathBuf;

use clap::Parser;

use admission_gateway::config::{default_config, load_config};
use admission_gateway::lifecycle::{spawn_signal_listener, Shutdown};
use admission_gateway::observability::init_tracing;

#[derive(Parser)]
#[command(name = "admission-gateway")]
#[command(about = "Authenticating, rate-limiting API gateway", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => default_config()?,
    };

    init_tracing(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?args.config,
        bind_address = %config.listener.bind_address,
        store = ?config.store.backend,
        limit = config.rate_limit.requests_per_window,
        window_secs = config.rate_limit.window_secs,
        "admission-gateway starting"
    );

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    admission_gateway::run(config, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
