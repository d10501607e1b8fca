//! Overlay Hub Server
//!
//! Run with: cargo run -- [--config path] [--host addr] [--port n]
//!
//! # Configuration
//!
//! Settings come from the first config file found (`--config`, then the
//! user config dir, `/etc/overlay-hub/config.toml`, `./config.toml`), then
//! environment variables (`PORT`, `OVERLAY_HUB_*`), then command-line flags.
//! `RUST_LOG` overrides the configured log level.

use anyhow::Context;
use clap::Parser;
use overlay_hub::api::{serve, AppState};
use overlay_hub::config::{generate_default_config, Config, LoggingConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "overlay-hub")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Real-time relay between a live-stream event producer and browser overlays")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Print a commented default config and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_default(),
    };
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_tracing(&config.logging);

    tracing::info!("Starting overlay hub v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        max_connections = config.hub.max_connections,
        like_goal = config.hub.like_goal,
        follow_goal = config.hub.follow_goal,
        secret_required = config.auth.secret_key.is_some(),
        "Hub configured"
    );

    let api_config = config.api_config();
    let state = AppState::with_hub_config(api_config.clone(), config.hub_config());

    serve(state, &api_config)
        .await
        .context("running HTTP server")?;

    tracing::info!("Overlay hub stopped");
    Ok(())
}

/// Initialize tracing; `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "overlay_hub={level},tower_http={level}",
            level = logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
