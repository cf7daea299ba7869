//! Othello-Over-IP game server entry point.
//!
//! Hosts a two-player Othello game over TCP. The first client to connect
//! plays Black, the second White; the server owns the board and validates
//! every move.
//!
//! # Usage
//!
//! ```text
//! othello-server [OPTIONS]
//!
//! Options:
//!   --config <PATH>         TOML config file [default: othello-server.toml]
//!   --host <HOST>           Bind address (overrides the config file)
//!   --port <PORT>           TCP port (overrides the config file)
//!   --surrender-any-turn    Allow surrender on the opponent's turn
//!   --restart-after-game    Host a new game after each one ends
//! ```
//!
//! Each option can also be set through the environment variable shown in
//! `--help`. `RUST_LOG` takes precedence over the configured log level.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use othello_server::infrastructure::network::listener::{serve, ServerOptions};
use othello_server::infrastructure::storage::config::{load_config_from, ServerConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Othello-Over-IP game server.
#[derive(Debug, Parser)]
#[command(
    name = "othello-server",
    about = "Authoritative server for two-player Othello over TCP",
    version
)]
struct Cli {
    /// Path to the TOML configuration file. A missing file means defaults.
    #[arg(long, default_value = "othello-server.toml", env = "OTHELLO_CONFIG")]
    config: PathBuf,

    /// Address to bind to, e.g. `0.0.0.0` for every interface.
    #[arg(long, env = "OTHELLO_HOST")]
    host: Option<String>,

    /// TCP port to listen on.
    #[arg(long, env = "OTHELLO_PORT")]
    port: Option<u16>,

    /// Allow a player to surrender while the opponent is to move.
    #[arg(long)]
    surrender_any_turn: bool,

    /// Start a fresh game after each game ends instead of exiting.
    #[arg(long)]
    restart_after_game: bool,
}

impl Cli {
    /// Loads the config file and applies the command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    fn into_config(self) -> anyhow::Result<ServerConfig> {
        let mut config = load_config_from(&self.config)
            .with_context(|| format!("failed to load config from {}", self.config.display()))?;
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut ServerConfig) {
        if let Some(host) = &self.host {
            config.network.bind_address = host.clone();
        }
        if let Some(port) = self.port {
            config.network.port = port;
        }
        if self.surrender_any_turn {
            config.session.surrender_on_any_turn = true;
        }
        if self.restart_after_game {
            config.session.restart_after_game = true;
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind game listener on {addr}"))?;

    let options = ServerOptions::from(&config);
    info!(
        "Othello server starting: surrender policy {:?}, restart after game: {}",
        options.surrender_policy, options.restart_after_game
    );

    tokio::select! {
        result = serve(listener, options) => result?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl+C")?;
            info!("received Ctrl+C, shutting down");
        }
    }

    info!("Othello server stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
