//! Parsing of the lines typed at the client prompt.

use othello_core::protocol::messages::MAX_TEXT_LEN;
use thiserror::Error;

pub const HELP_TEXT: &str = "\
Commands:
  move <row> <col>   place a disc (alias: m), rows and columns are 0-7
  chat <text>        send a chat line (alias: say)
  surrender          give up the game (only on your turn)
  board              redraw the board
  help               show this help
  quit               leave the game";

/// One user command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move { row: u8, col: u8 },
    Chat(String),
    Surrender,
    Board,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}', type 'help' for a list")]
    Unknown(String),
    #[error("'{command}' needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },
    #[error("'{0}' is not a number between 0 and 255")]
    InvalidNumber(String),
    #[error("chat line is {len} bytes, the limit is {MAX_TEXT_LEN}")]
    ChatTooLong { len: usize },
}

/// Parses one input line.
///
/// Keywords are case-insensitive. Chat text keeps its inner spacing.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    if word.is_empty() {
        return Err(CommandError::Empty);
    }

    match word.to_ascii_lowercase().as_str() {
        "move" | "m" => {
            let mut args = rest.split_whitespace();
            let (Some(row), Some(col)) = (args.next(), args.next()) else {
                return Err(CommandError::MissingArgument {
                    command: "move",
                    what: "a row and a column",
                });
            };
            Ok(Command::Move {
                row: parse_index(row)?,
                col: parse_index(col)?,
            })
        }
        "chat" | "say" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "chat",
                    what: "some text",
                });
            }
            if rest.len() > MAX_TEXT_LEN {
                return Err(CommandError::ChatTooLong { len: rest.len() });
            }
            Ok(Command::Chat(rest.to_string()))
        }
        "surrender" => Ok(Command::Surrender),
        "board" => Ok(Command::Board),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_index(text: &str) -> Result<u8, CommandError> {
    text.parse()
        .map_err(|_| CommandError::InvalidNumber(text.to_string()))
}
