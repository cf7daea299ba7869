//! The client's copy of the game.
//!
//! [`GameView`] is rebuilt from every STATE the server sends and is never
//! advanced locally; a move only shows up once the server has accepted it.

use othello_core::protocol::messages::{InfoKind, MoveRequest, RejectReason};
use othello_core::{rules, Board, Coord, GameResult, OthelloMessage, Player, BOARD_SIZE};
use thiserror::Error;
use tracing::{debug, warn};

/// Why the client refused to send an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocalReject {
    #[error("the game is already over")]
    GameOver,
    #[error("the server has not assigned a colour yet")]
    NotSeated,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("({row}, {col}) is off the board")]
    OffBoard { row: u8, col: u8 },
    #[error("{0} does not flip any disc")]
    IllegalMove(Coord),
}

/// What changed after applying one server message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// The server seated us. `mismatch` is set when it differs from the
    /// colour requested on the command line.
    Welcomed {
        seat: Player,
        text: String,
        mismatch: bool,
    },
    BoardChanged,
    Info(String),
    Chat { sender: Player, text: String },
    Rejected(RejectReason),
    GameOver(GameResult),
}

/// Local mirror of the authoritative game.
#[derive(Debug, Clone)]
pub struct GameView {
    expected: Player,
    seat: Option<Player>,
    board: Board,
    active: Option<Player>,
    result: Option<GameResult>,
}

impl GameView {
    /// A view for a client that expects to play `expected`.
    pub fn new(expected: Player) -> Self {
        Self {
            expected,
            seat: None,
            board: Board::new(),
            active: None,
            result: None,
        }
    }

    /// The colour the server assigned, once WELCOME has arrived.
    pub fn seat(&self) -> Option<Player> {
        self.seat
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<Player> {
        self.active
    }

    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.result.is_some()
    }

    pub fn is_my_turn(&self) -> bool {
        self.seat.is_some() && self.seat == self.active
    }

    /// Legal cells for us, or nothing when it is not our turn.
    pub fn hints(&self) -> Vec<Coord> {
        match self.seat {
            Some(me) if self.is_my_turn() => rules::legal_moves(&self.board, me),
            _ => Vec::new(),
        }
    }

    /// Folds one server message into the view.
    ///
    /// Returns `None` for messages that only a client may send.
    pub fn apply(&mut self, msg: OthelloMessage) -> Option<ViewEvent> {
        match msg {
            OthelloMessage::Welcome(welcome) => {
                let mismatch = welcome.player != self.expected;
                if mismatch {
                    warn!(
                        "asked to play {} but the server assigned {}",
                        self.expected, welcome.player
                    );
                }
                self.seat = Some(welcome.player);
                Some(ViewEvent::Welcomed {
                    seat: welcome.player,
                    text: welcome.text,
                    mismatch,
                })
            }
            OthelloMessage::State(state) => {
                self.board = state.board();
                self.active = state.active;
                Some(ViewEvent::BoardChanged)
            }
            OthelloMessage::Info(info) => {
                if let InfoKind::Pass { next, .. } = info.kind {
                    self.active = Some(next);
                }
                Some(ViewEvent::Info(info.text))
            }
            OthelloMessage::Chat(chat) => Some(ViewEvent::Chat {
                sender: chat.sender,
                text: chat.text,
            }),
            OthelloMessage::MoveRejected { reason } => Some(ViewEvent::Rejected(reason)),
            OthelloMessage::GameOver(result) => {
                self.result = Some(result);
                self.active = None;
                Some(ViewEvent::GameOver(result))
            }
            other => {
                debug!("ignoring client-only {:?} from server", other.message_type());
                None
            }
        }
    }

    /// Builds a MOVE if the local view says it can succeed.
    pub fn check_move(&self, row: u8, col: u8) -> Result<MoveRequest, LocalReject> {
        let me = self.ready_to_act()?;
        let coord = Coord::new(row, col).ok_or(LocalReject::OffBoard { row, col })?;
        if !rules::is_legal(&self.board, coord, me) {
            return Err(LocalReject::IllegalMove(coord));
        }
        Ok(MoveRequest {
            row,
            col,
            claimed: me,
        })
    }

    /// Surrender is only offered on our own turn.
    pub fn check_surrender(&self) -> Result<(), LocalReject> {
        self.ready_to_act().map(|_| ())
    }

    fn ready_to_act(&self) -> Result<Player, LocalReject> {
        if self.is_over() {
            return Err(LocalReject::GameOver);
        }
        let me = self.seat.ok_or(LocalReject::NotSeated)?;
        if self.active != Some(me) {
            return Err(LocalReject::NotYourTurn);
        }
        Ok(me)
    }

    /// Text rendering of the board with `*` on our legal cells.
    pub fn render(&self) -> String {
        let hints = self.hints();
        let mut out = String::from("  0 1 2 3 4 5 6 7\n");
        for row in 0..BOARD_SIZE as u8 {
            out.push_str(&row.to_string());
            for col in 0..BOARD_SIZE as u8 {
                let Some(coord) = Coord::new(row, col) else {
                    continue;
                };
                let symbol = if hints.contains(&coord) {
                    '*'
                } else {
                    self.board.get(coord).symbol()
                };
                out.push(' ');
                out.push(symbol);
            }
            out.push('\n');
        }
        let discs = self.board.count_discs();
        out.push_str(&format!("Black (X) {}  White (O) {}", discs.black, discs.white));
        out
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use othello_core::protocol::messages::{InfoMessage, StateMessage, WelcomeMessage};
    use othello_core::{Game, Move};

    fn welcome(player: Player) -> OthelloMessage {
        OthelloMessage::Welcome(WelcomeMessage {
            player,
            text: format!("You play {player}."),
        })
    }

    fn state_of(game: &Game) -> OthelloMessage {
        OthelloMessage::State(StateMessage::from_game(game))
    }

    fn seated(player: Player) -> GameView {
        let mut view = GameView::new(player);
        view.apply(welcome(player));
        view.apply(state_of(&Game::new()));
        view
    }

    #[test]
    fn test_welcome_records_seat_and_flags_mismatch() {
        // Arrange
        let mut view = GameView::new(Player::White);

        // Act
        let event = view.apply(welcome(Player::Black));

        // Assert
        assert_eq!(view.seat(), Some(Player::Black));
        assert!(matches!(
            event,
            Some(ViewEvent::Welcomed {
                seat: Player::Black,
                mismatch: true,
                ..
            })
        ));
    }

    #[test]
    fn test_state_replaces_board_and_active_player() {
        // Arrange
        let mut view = seated(Player::White);
        let mut game = Game::new();
        game.play(Move {
            coord: Coord::new(2, 3).unwrap(),
            player: Player::Black,
        })
        .unwrap();

        // Act
        let event = view.apply(state_of(&game));

        // Assert
        assert_eq!(event, Some(ViewEvent::BoardChanged));
        assert_eq!(view.board(), game.board());
        assert!(view.is_my_turn());
    }

    #[test]
    fn test_move_refused_when_not_my_turn() {
        let view = seated(Player::White);

        assert_eq!(view.check_move(2, 4), Err(LocalReject::NotYourTurn));
    }

    #[test]
    fn test_move_refused_before_welcome() {
        let mut view = GameView::new(Player::Black);
        view.apply(state_of(&Game::new()));

        assert_eq!(view.check_move(2, 3), Err(LocalReject::NotSeated));
    }

    #[test]
    fn test_illegal_and_off_board_moves_are_refused() {
        let view = seated(Player::Black);

        assert_eq!(
            view.check_move(0, 0),
            Err(LocalReject::IllegalMove(Coord::new(0, 0).unwrap()))
        );
        assert_eq!(
            view.check_move(9, 1),
            Err(LocalReject::OffBoard { row: 9, col: 1 })
        );
    }

    #[test]
    fn test_legal_move_builds_request_for_own_colour() {
        let view = seated(Player::Black);

        let request = view.check_move(2, 3).unwrap();

        assert_eq!(
            request,
            MoveRequest {
                row: 2,
                col: 3,
                claimed: Player::Black
            }
        );
    }

    #[test]
    fn test_pass_info_hands_turn_to_next_player() {
        // Arrange
        let mut view = seated(Player::Black);
        view.apply(OthelloMessage::State(StateMessage {
            cells: *Board::new().cells(),
            active: Some(Player::White),
        }));

        // Act
        view.apply(OthelloMessage::Info(InfoMessage::pass(
            Player::White,
            Player::Black,
        )));

        // Assert
        assert_eq!(view.active(), Some(Player::Black));
        assert!(view.check_surrender().is_ok());
    }

    #[test]
    fn test_game_over_blocks_further_intents() {
        // Arrange
        let mut view = seated(Player::Black);
        let mut game = Game::new();
        let result = game
            .surrender(Player::Black, othello_core::SurrenderPolicy::OwnTurnOnly)
            .unwrap();

        // Act
        view.apply(OthelloMessage::GameOver(result));

        // Assert
        assert!(view.is_over());
        assert_eq!(view.check_surrender(), Err(LocalReject::GameOver));
        assert_eq!(view.check_move(2, 3), Err(LocalReject::GameOver));
    }

    #[test]
    fn test_render_marks_legal_cells_only_on_my_turn() {
        // Arrange
        let mine = seated(Player::Black);
        let theirs = seated(Player::White);

        // Act
        let with_hints = mine.render();
        let without_hints = theirs.render();

        // Assert
        assert_eq!(with_hints.matches('*').count(), 4);
        assert_eq!(without_hints.matches('*').count(), 0);
        assert!(with_hints.lines().nth(3).unwrap().starts_with("2 . . . * "));
        assert!(without_hints.ends_with("Black (X) 2  White (O) 2"));
    }

    #[test]
    fn test_client_only_messages_are_ignored() {
        let mut view = seated(Player::Black);

        let event = view.apply(OthelloMessage::Surrender);

        assert_eq!(event, None);
        assert!(!view.is_over());
    }
}
