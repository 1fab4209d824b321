//! Cinema seating server entry point.
//!
//! Loads the configuration, creates the start-up cinema, and serves the binary
//! seating protocol over TCP until Ctrl+C.
//!
//! # Usage
//!
//! ```text
//! cinema-server [OPTIONS]
//!
//! Options:
//!   --config <PATH>   Config file [default: platform config dir]/server.toml
//!   --bind   <ADDR>   Bind address, overrides `[server] bind_address`
//!   --port   <PORT>   TCP port, overrides `[server] port`
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable      | Overrides   |
//! |---------------|-------------|
//! | `CINEMA_BIND` | `--bind`    |
//! | `CINEMA_PORT` | `--port`    |
//! | `RUST_LOG`    | `[server] log_level` |
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()            -- file or defaults, then CLI overrides
//!  └─ start_up_service()       -- Dispatcher + start-up cinema from [cinema],
//!                                 both held to the grid size limit
//!  └─ serve()                  -- accept loop, one task per connection
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cinema_server::application::dispatch::Dispatcher;
use cinema_server::application::repository::{CinemaRepository, SeatRepository};
use cinema_server::infrastructure::network;
use cinema_server::infrastructure::storage::config::{load_config, ServerConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Cinema seating server.
///
/// Manages one cinema in memory and answers seat search and reservation
/// requests from `cinema-client`.
#[derive(Debug, Parser)]
#[command(name = "cinema-server", about = "Cinema seating reservation server", version)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// IP address to bind to, e.g. `127.0.0.1` for local connections only.
    #[arg(long, env = "CINEMA_BIND")]
    bind: Option<String>,

    /// TCP port to listen on.
    #[arg(long, env = "CINEMA_PORT")]
    port: Option<u16>,
}

impl Cli {
    /// Applies the command-line overrides on top of `config`.
    fn apply_to(&self, mut config: ServerConfig) -> ServerConfig {
        if let Some(bind) = &self.bind {
            config.server.bind_address = bind.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        config
    }
}

/// Builds the listen address from the `[server]` section.
///
/// # Errors
///
/// Returns an error if `bind_address` is not a valid IP address.
fn listen_addr(config: &ServerConfig) -> anyhow::Result<SocketAddr> {
    let raw = format!("{}:{}", config.server.bind_address, config.server.port);
    raw.parse()
        .with_context(|| format!("invalid bind address: '{raw}'"))
}

/// Builds the dispatcher and the start-up cinema from `[cinema]`.
///
/// # Errors
///
/// Returns an error if the configured grid exceeds the `max_cells` limit.
fn start_up_service(config: &ServerConfig) -> anyhow::Result<Dispatcher> {
    let repository = Arc::new(CinemaRepository::new());
    let dispatcher = Dispatcher::new(repository.clone(), config.server.max_cells);

    let cinema = &config.cinema;
    dispatcher
        .check_grid(cinema.rows, cinema.columns)
        .map_err(|status| anyhow!("invalid [cinema] section: {}", status.message))?;
    repository
        .create_cinema(cinema.rows, cinema.columns, cinema.minimum_distance)
        .context("failed to create the start-up cinema")?;
    info!(
        "initialised cinema {}x{} (minimum distance {})",
        cinema.rows, cinema.columns, cinema.minimum_distance
    );
    Ok(dispatcher)
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    let config = cli.apply_to(config);

    // `RUST_LOG` wins; otherwise use the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let addr = listen_addr(&config)?;

    let dispatcher = Arc::new(start_up_service(&config)?);

    let listener = network::bind(addr).await?;

    // ── Graceful shutdown flag ─────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => tracing::error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    network::serve(listener, dispatcher, running).await?;

    info!("cinema seating server stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
