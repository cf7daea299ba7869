//! Turn state machine.
//!
//! [`Game`] owns one [`Board`] and one [`TurnState`]. After every applied move
//! it decides, in a fixed priority order, whether the game is over, whether
//! the next player has to pass, or whether play simply alternates.
//!
//! ```text
//!            move by P (legal)
//! Active(P) ──────────────────► board full?           ──► GameOver(BoardFull)
//!                               a colour wiped out?   ──► GameOver(OneColorEliminated)
//!                               nobody can move?      ──► GameOver(NoLegalMoves)
//!                               opponent cannot move? ──► pass, Active(P)
//!                               otherwise             ──► Active(opponent)
//! ```
//!
//! `GameOver` is terminal: every later move or surrender is rejected.

use thiserror::Error;
use tracing::debug;

use crate::domain::board::{Board, Coord, DiscCount, Player};
use crate::domain::rules::{self, MoveError};

// ── Results ───────────────────────────────────────────────────────────────────

/// How a finished game turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    BlackWins,
    WhiteWins,
    Draw,
    /// The named player surrendered; the opponent wins.
    Surrendered(Player),
    /// The named player disconnected mid-game; the opponent wins.
    Abandoned(Player),
}

impl Outcome {
    /// Winner by disc count. Equal counts are a draw.
    pub fn by_count(discs: DiscCount) -> Self {
        use std::cmp::Ordering;
        match discs.black.cmp(&discs.white) {
            Ordering::Greater => Outcome::BlackWins,
            Ordering::Less => Outcome::WhiteWins,
            Ordering::Equal => Outcome::Draw,
        }
    }

    /// The winning player, or `None` for a draw.
    pub fn winner(self) -> Option<Player> {
        match self {
            Outcome::BlackWins => Some(Player::Black),
            Outcome::WhiteWins => Some(Player::White),
            Outcome::Draw => None,
            Outcome::Surrendered(by) | Outcome::Abandoned(by) => Some(by.opponent()),
        }
    }
}

/// Why the game ended. The discriminants double as the wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EndReason {
    BoardFull = 0x01,
    OneColorEliminated = 0x02,
    NoLegalMoves = 0x03,
    Surrender = 0x04,
    Disconnect = 0x05,
}

impl TryFrom<u8> for EndReason {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(EndReason::BoardFull),
            0x02 => Ok(EndReason::OneColorEliminated),
            0x03 => Ok(EndReason::NoLegalMoves),
            0x04 => Ok(EndReason::Surrender),
            0x05 => Ok(EndReason::Disconnect),
            _ => Err(()),
        }
    }
}

/// Final result carried by [`TurnState::GameOver`] and the GAME_OVER message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    pub outcome: Outcome,
    pub reason: EndReason,
    pub discs: DiscCount,
}

impl GameResult {
    fn scored(reason: EndReason, discs: DiscCount) -> Self {
        Self {
            outcome: Outcome::by_count(discs),
            reason,
            discs,
        }
    }
}

// ── Turn state ────────────────────────────────────────────────────────────────

/// Whose turn it is, or how the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Active(Player),
    GameOver(GameResult),
}

impl TurnState {
    /// The player to move, or `None` once the game is over.
    pub fn active_player(&self) -> Option<Player> {
        match self {
            TurnState::Active(player) => Some(*player),
            TurnState::GameOver(_) => None,
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self, TurnState::GameOver(_))
    }

    pub fn result(&self) -> Option<&GameResult> {
        match self {
            TurnState::Active(_) => None,
            TurnState::GameOver(result) => Some(result),
        }
    }
}

/// A forced skip: `skipped` had no legal move, so `next` plays again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassNotice {
    pub skipped: Player,
    pub next: Player,
}

/// A placement request for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub coord: Coord,
    pub player: Player,
}

/// What an accepted move did to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Discs flipped across every qualifying direction.
    pub flipped: u32,
    /// Set when the opponent had to pass.
    pub pass: Option<PassNotice>,
    /// The turn state after the move.
    pub turn: TurnState,
}

/// Whether a player may surrender while the opponent is to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurrenderPolicy {
    /// Surrender only on your own turn.
    #[default]
    OwnTurnOnly,
    /// Surrender at any time before the game ends.
    AnyTurn,
}

/// Why a surrender was not accepted.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SurrenderError {
    #[error("the game is already over")]
    GameOver,
    #[error("{got} may only surrender on their own turn; {expected} is to move")]
    NotYourTurn { expected: Player, got: Player },
    /// Raised by the session before the second player has joined.
    #[error("the game has not started yet")]
    NotStarted,
}

// ── Game ──────────────────────────────────────────────────────────────────────

/// One board plus the turn state machine that drives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    turn: TurnState,
    moves_played: u32,
}

impl Game {
    /// A fresh game in the opening position with Black to move.
    pub fn new() -> Self {
        Self::from_position(Board::new(), Player::Black)
    }

    /// Starts from an arbitrary position with `to_move` active.
    pub fn from_position(board: Board, to_move: Player) -> Self {
        Self {
            board,
            turn: TurnState::Active(to_move),
            moves_played: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> TurnState {
        self.turn
    }

    pub fn moves_played(&self) -> u32 {
        self.moves_played
    }

    /// Validates and applies a move, then advances the turn.
    ///
    /// # Errors
    ///
    /// Returns a [`MoveError`] and leaves the game untouched if the game is
    /// over, it is not `mv.player`'s turn, or the placement is illegal.
    pub fn play(&mut self, mv: Move) -> Result<MoveOutcome, MoveError> {
        let active = match self.turn {
            TurnState::GameOver(_) => return Err(MoveError::GameOver),
            TurnState::Active(player) => player,
        };
        if mv.player != active {
            return Err(MoveError::NotYourTurn {
                expected: active,
                got: mv.player,
            });
        }

        let flipped = rules::apply(&mut self.board, mv.coord, mv.player)?;
        self.moves_played += 1;

        let (turn, pass) = self.next_turn(mv.player);
        self.turn = turn;
        debug!(
            "{} played {} flipping {flipped}; turn now {:?}",
            mv.player, mv.coord, self.turn
        );

        Ok(MoveOutcome {
            flipped,
            pass,
            turn,
        })
    }

    /// Termination and pass checks after `mover` has played, in priority order.
    fn next_turn(&self, mover: Player) -> (TurnState, Option<PassNotice>) {
        let discs = self.board.count_discs();
        let opponent = mover.opponent();

        if discs.empty == 0 {
            return (
                TurnState::GameOver(GameResult::scored(EndReason::BoardFull, discs)),
                None,
            );
        }
        if discs.black == 0 || discs.white == 0 {
            return (
                TurnState::GameOver(GameResult::scored(EndReason::OneColorEliminated, discs)),
                None,
            );
        }

        let mover_can_move = rules::has_any_legal_move(&self.board, mover);
        let opponent_can_move = rules::has_any_legal_move(&self.board, opponent);

        if !mover_can_move && !opponent_can_move {
            return (
                TurnState::GameOver(GameResult::scored(EndReason::NoLegalMoves, discs)),
                None,
            );
        }
        if !opponent_can_move {
            let pass = PassNotice {
                skipped: opponent,
                next: mover,
            };
            return (TurnState::Active(mover), Some(pass));
        }
        (TurnState::Active(opponent), None)
    }

    /// Ends the game with `player` surrendering; the opponent wins.
    ///
    /// # Errors
    ///
    /// [`SurrenderError::GameOver`] if the game already ended, and
    /// [`SurrenderError::NotYourTurn`] when `policy` restricts surrender to the
    /// player's own turn and the opponent is to move.
    pub fn surrender(
        &mut self,
        player: Player,
        policy: SurrenderPolicy,
    ) -> Result<GameResult, SurrenderError> {
        let active = match self.turn {
            TurnState::GameOver(_) => return Err(SurrenderError::GameOver),
            TurnState::Active(active) => active,
        };
        if policy == SurrenderPolicy::OwnTurnOnly && active != player {
            return Err(SurrenderError::NotYourTurn {
                expected: active,
                got: player,
            });
        }
        let result = GameResult {
            outcome: Outcome::Surrendered(player),
            reason: EndReason::Surrender,
            discs: self.board.count_discs(),
        };
        self.turn = TurnState::GameOver(result);
        Ok(result)
    }

    /// Ends the game because `player` left. Returns `None` if it was already over.
    pub fn abandon(&mut self, player: Player) -> Option<GameResult> {
        if self.turn.is_over() {
            return None;
        }
        let result = GameResult {
            outcome: Outcome::Abandoned(player),
            reason: EndReason::Disconnect,
            discs: self.board.count_discs(),
        };
        self.turn = TurnState::GameOver(result);
        Some(result)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::Cell;

    fn c(row: u8, col: u8) -> Coord {
        Coord::new(row, col).unwrap()
    }

    fn mv(row: u8, col: u8, player: Player) -> Move {
        Move {
            coord: c(row, col),
            player,
        }
    }

    #[test]
    fn test_opening_move_passes_turn_to_white() {
        // Arrange
        let mut game = Game::new();

        // Act
        let outcome = game.play(mv(2, 3, Player::Black)).unwrap();

        // Assert
        assert_eq!(outcome.flipped, 1);
        assert_eq!(outcome.pass, None);
        assert_eq!(outcome.turn, TurnState::Active(Player::White));
        assert_eq!(game.board().get(c(3, 3)), Cell::Black);
        assert_eq!(game.moves_played(), 1);
    }

    #[test]
    fn test_wrong_player_is_rejected_without_change() {
        let mut game = Game::new();
        let before = game.clone();

        let result = game.play(mv(2, 4, Player::White));

        assert_eq!(
            result,
            Err(MoveError::NotYourTurn {
                expected: Player::Black,
                got: Player::White
            })
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_illegal_cell_is_rejected_without_change() {
        let mut game = Game::new();
        let before = game.clone();

        assert_eq!(
            game.play(mv(0, 0, Player::Black)),
            Err(MoveError::NoFlips(c(0, 0)))
        );
        assert_eq!(
            game.play(mv(3, 3, Player::Black)),
            Err(MoveError::Occupied(c(3, 3)))
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_move_that_eliminates_opponent_ends_game() {
        // Arrange – B W . : Black takes the only White disc
        let mut board = Board::empty();
        board.set(c(0, 0), Cell::Black);
        board.set(c(0, 1), Cell::White);
        let mut game = Game::from_position(board, Player::Black);

        // Act
        let outcome = game.play(mv(0, 2, Player::Black)).unwrap();

        // Assert
        let result = outcome.turn.result().copied().unwrap();
        assert_eq!(result.reason, EndReason::OneColorEliminated);
        assert_eq!(result.outcome, Outcome::BlackWins);
        assert_eq!(result.discs.black, 3);
        assert_eq!(result.discs.white, 0);
    }

    #[test]
    fn test_opponent_without_moves_triggers_pass() {
        // Arrange – row 0: . W B, row 2: B W . with Black to move
        let mut board = Board::empty();
        board.set(c(0, 1), Cell::White);
        board.set(c(0, 2), Cell::Black);
        board.set(c(2, 0), Cell::Black);
        board.set(c(2, 1), Cell::White);
        let mut game = Game::from_position(board, Player::Black);

        // Act – after (0,0) White's lone disc flanks nothing, Black can still
        // play (2,2)
        let outcome = game.play(mv(0, 0, Player::Black)).unwrap();

        // Assert
        assert_eq!(
            outcome.pass,
            Some(PassNotice {
                skipped: Player::White,
                next: Player::Black
            })
        );
        assert_eq!(outcome.turn, TurnState::Active(Player::Black));
    }

    #[test]
    fn test_no_moves_for_either_player_ends_game() {
        // Arrange – B W . in row 0 and a stranded White disc in the corner
        let mut board = Board::empty();
        board.set(c(0, 0), Cell::Black);
        board.set(c(0, 1), Cell::White);
        board.set(c(7, 7), Cell::White);
        let mut game = Game::from_position(board, Player::Black);

        // Act
        let outcome = game.play(mv(0, 2, Player::Black)).unwrap();

        // Assert
        let result = outcome.turn.result().copied().unwrap();
        assert_eq!(result.reason, EndReason::NoLegalMoves);
        assert_eq!(result.outcome, Outcome::BlackWins);
        assert_eq!(outcome.pass, None);
    }

    #[test]
    fn test_full_board_with_equal_counts_is_draw() {
        // Arrange – rows 0..4 Black, rows 4..8 White, then (0,0) empty and
        // (0,1) White: 30 Black, 33 White, one hole
        let mut board = Board::empty();
        for coord in Coord::all() {
            let cell = if coord.row() < 4 { Cell::Black } else { Cell::White };
            board.set(coord, cell);
        }
        board.set(c(0, 0), Cell::Empty);
        board.set(c(0, 1), Cell::White);
        let mut game = Game::from_position(board, Player::Black);
        assert_eq!(
            game.board().count_discs(),
            DiscCount {
                black: 30,
                white: 33,
                empty: 1
            }
        );

        // Act
        let outcome = game.play(mv(0, 0, Player::Black)).unwrap();

        // Assert – only (0,1) flips, leaving 32/32
        let result = outcome.turn.result().copied().unwrap();
        assert_eq!(result.reason, EndReason::BoardFull);
        assert_eq!(result.discs.black, 32);
        assert_eq!(result.discs.white, 32);
        assert_eq!(result.outcome, Outcome::Draw);
        assert_eq!(result.outcome.winner(), None);
    }

    #[test]
    fn test_surrender_on_own_turn_ends_game_for_opponent() {
        // Arrange – Black is ahead on discs after one move
        let mut game = Game::new();
        game.play(mv(2, 3, Player::Black)).unwrap();

        // Act – White surrenders on their turn
        let result = game.surrender(Player::White, SurrenderPolicy::OwnTurnOnly).unwrap();

        // Assert
        assert_eq!(result.outcome, Outcome::Surrendered(Player::White));
        assert_eq!(result.outcome.winner(), Some(Player::Black));
        assert_eq!(result.reason, EndReason::Surrender);
        assert!(game.turn().is_over());
    }

    #[test]
    fn test_surrender_wins_for_opponent_regardless_of_counts() {
        // Arrange – Black leads 4–1
        let mut game = Game::new();
        game.play(mv(2, 3, Player::Black)).unwrap();

        // Act
        let result = game.surrender(Player::Black, SurrenderPolicy::AnyTurn).unwrap();

        // Assert
        assert_eq!(result.discs.black, 4);
        assert_eq!(result.outcome.winner(), Some(Player::White));
    }

    #[test]
    fn test_surrender_off_turn_respects_policy() {
        let mut game = Game::new();

        assert_eq!(
            game.surrender(Player::White, SurrenderPolicy::OwnTurnOnly),
            Err(SurrenderError::NotYourTurn {
                expected: Player::Black,
                got: Player::White
            })
        );
        assert!(!game.turn().is_over());

        let result = game.surrender(Player::White, SurrenderPolicy::AnyTurn).unwrap();
        assert_eq!(result.outcome, Outcome::Surrendered(Player::White));
    }

    #[test]
    fn test_game_over_is_terminal() {
        let mut game = Game::new();
        game.surrender(Player::Black, SurrenderPolicy::AnyTurn).unwrap();

        assert_eq!(game.play(mv(2, 3, Player::Black)), Err(MoveError::GameOver));
        assert_eq!(
            game.surrender(Player::White, SurrenderPolicy::AnyTurn),
            Err(SurrenderError::GameOver)
        );
        assert_eq!(game.abandon(Player::White), None);
    }

    #[test]
    fn test_abandon_awards_game_to_remaining_player() {
        let mut game = Game::new();
        let result = game.abandon(Player::White).unwrap();
        assert_eq!(result.outcome, Outcome::Abandoned(Player::White));
        assert_eq!(result.outcome.winner(), Some(Player::Black));
        assert_eq!(result.reason, EndReason::Disconnect);
    }
}
