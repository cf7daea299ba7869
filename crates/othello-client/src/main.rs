//! Othello-Over-IP terminal client entry point.
//!
//! Connects to the game server, prints the board whenever the server pushes a
//! new state and reads commands from stdin. Logs go to stderr so stdout only
//! carries the game.
//!
//! ```text
//! main()
//!  └─ ClientConnection::connect()  -- TCP + read task
//!  └─ select loop
//!       ├─ stdin line      -> parse_command -> PlaySession::on_command
//!       └─ NetworkEvent    -> PlaySession::on_message -> terminal::present
//! ```

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use othello_client::application::commands::{parse_command, CommandError, HELP_TEXT};
use othello_client::application::game_view::{GameView, ViewEvent};
use othello_client::application::play::{CommandOutcome, PlaySession};
use othello_client::infrastructure::network::{ClientConnection, NetworkEvent};
use othello_client::infrastructure::terminal::present;
use othello_core::Player;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Which colour this client expects to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Seat {
    /// First to connect, plays Black.
    First,
    /// Second to connect, plays White.
    Second,
}

impl From<Seat> for Player {
    fn from(seat: Seat) -> Self {
        match seat {
            Seat::First => Player::Black,
            Seat::Second => Player::White,
        }
    }
}

/// Othello-Over-IP terminal client.
#[derive(Debug, Parser)]
#[command(
    name = "othello-client",
    about = "Play Othello against another player through an Othello-Over-IP server",
    version
)]
struct Cli {
    /// Server hostname or IP address.
    #[arg(long, default_value = "127.0.0.1", env = "OTHELLO_HOST")]
    host: String,

    /// Server TCP port.
    #[arg(long, default_value_t = 12345, env = "OTHELLO_PORT")]
    port: u16,

    /// Seat you expect; the server's assignment wins on a mismatch.
    #[arg(long, value_enum, default_value_t = Seat::First)]
    seat: Seat,
}

impl Cli {
    fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let addr = cli.server_addr();
    let (connection, mut events) = ClientConnection::connect(&addr)
        .await
        .with_context(|| format!("could not reach the Othello server at {addr}"))?;
    let connection = Arc::new(connection);

    let mut session = PlaySession::new(GameView::new(cli.seat.into()), connection.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    println!("Connected to {addr}. Type 'help' for commands.");

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line.context("failed to read stdin")? else {
                    stdin_open = false;
                    continue;
                };
                let command = match parse_command(&line) {
                    Ok(command) => command,
                    Err(CommandError::Empty) => continue,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                match session.on_command(command).await {
                    Ok(CommandOutcome::Sent) => {}
                    Ok(CommandOutcome::Refused(reason)) => println!("Not sent: {reason}."),
                    Ok(CommandOutcome::ShowBoard) => println!("{}", session.view().render()),
                    Ok(CommandOutcome::ShowHelp) => println!("{HELP_TEXT}"),
                    Ok(CommandOutcome::Quit) => {
                        info!("leaving at the user's request");
                        break;
                    }
                    Err(e) => {
                        warn!("send failed: {e}");
                        println!("Lost connection to the server.");
                        break;
                    }
                }
            }
            event = events.recv() => match event {
                Some(NetworkEvent::MessageReceived(msg)) => {
                    if let Some(event) = session.on_message(msg) {
                        println!("{}", present(&event, session.view()));
                        if matches!(event, ViewEvent::GameOver(_)) {
                            break;
                        }
                    }
                }
                Some(NetworkEvent::Connected { server_addr }) => {
                    info!("connection to {server_addr} is up");
                }
                Some(NetworkEvent::Disconnected) | None => {
                    println!("The server closed the connection.");
                    break;
                }
            },
        }
    }

    connection.close().await;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_point_at_local_server() {
        let cli = Cli::parse_from(["othello-client"]);

        assert_eq!(cli.server_addr(), "127.0.0.1:12345");
        assert_eq!(cli.seat, Seat::First);
    }

    #[test]
    fn test_cli_second_seat_expects_white() {
        let cli = Cli::parse_from(["othello-client", "--seat", "second", "--port", "4000"]);

        assert_eq!(Player::from(cli.seat), Player::White);
        assert_eq!(cli.port, 4000);
    }

    #[test]
    fn test_cli_rejects_unknown_seat() {
        let result = Cli::try_parse_from(["othello-client", "--seat", "third"]);
        assert!(result.is_err());
    }
}
