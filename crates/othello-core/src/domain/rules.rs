//! Move rule engine: legality and disc flipping.
//!
//! A placement is legal when the target cell is empty and, in at least one of
//! the eight directions, a contiguous run of opponent discs starts right next
//! to it and is closed off by one of the mover's own discs. Every direction is
//! judged independently, so one move can flip several runs at once.

use thiserror::Error;

use crate::domain::board::{Board, Cell, Coord, Direction, Player};

/// Why a move was not applied.
///
/// Every variant is a no-op from the game's point of view: the board and the
/// turn are left exactly as they were.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MoveError {
    /// The game has already ended.
    #[error("the game is already over")]
    GameOver,

    /// It is the other player's turn.
    #[error("not your turn: {expected} is to move, got {got}")]
    NotYourTurn { expected: Player, got: Player },

    /// The target cell already holds a disc.
    #[error("cell {0} is already occupied")]
    Occupied(Coord),

    /// Placing here would not flip a single disc.
    #[error("placing at {0} flips no discs")]
    NoFlips(Coord),

    /// The requested row or column is off the board.
    #[error("coordinate ({row}, {col}) is off the board")]
    OutOfBounds { row: u8, col: u8 },

    /// The move names a different colour than the one the sender is seated as.
    #[error("seat plays {seat} but the move claims {claimed}")]
    WrongSeat { seat: Player, claimed: Player },

    /// The second player has not joined yet.
    #[error("the game has not started yet")]
    NotStarted,
}

/// Length of the flippable opponent run from `origin` in `direction`.
///
/// Returns 0 when the direction does not qualify: the neighbour is not an
/// opponent disc, or the run reaches the edge or an empty cell before a disc
/// of `player`'s colour.
pub fn run_length(board: &Board, origin: Coord, direction: Direction, player: Player) -> u32 {
    let opponent = Cell::from(player.opponent());
    let own = Cell::from(player);
    let mut run = 0;
    let mut cursor = origin.step(direction);
    while let Some(coord) = cursor {
        let cell = board.get(coord);
        if cell == opponent {
            run += 1;
        } else if cell == own {
            return run;
        } else {
            return 0;
        }
        cursor = coord.step(direction);
    }
    0
}

/// Returns `true` if `player` may place a disc at `coord`.
pub fn is_legal(board: &Board, coord: Coord, player: Player) -> bool {
    board.get(coord).is_empty()
        && Direction::ALL
            .iter()
            .any(|&direction| run_length(board, coord, direction, player) > 0)
}

/// Places `player`'s disc at `coord` and flips every qualifying run.
///
/// Returns the total number of discs flipped across all directions. A
/// placement that would flip nothing is refused with [`MoveError::NoFlips`]
/// and the board is left untouched, so a zero-flip move can never be applied.
///
/// # Errors
///
/// [`MoveError::Occupied`] if the cell is taken, [`MoveError::NoFlips`] if no
/// direction qualifies.
pub fn apply(board: &mut Board, coord: Coord, player: Player) -> Result<u32, MoveError> {
    if !board.get(coord).is_empty() {
        return Err(MoveError::Occupied(coord));
    }

    // Runs are measured before anything is flipped; the origin cell is never
    // part of a run, so placing first or last makes no difference.
    let runs: Vec<(Direction, u32)> = Direction::ALL
        .iter()
        .map(|&direction| (direction, run_length(board, coord, direction, player)))
        .filter(|&(_, len)| len > 0)
        .collect();

    if runs.is_empty() {
        return Err(MoveError::NoFlips(coord));
    }

    board.place(coord, player);
    let flipped = runs
        .iter()
        .map(|&(direction, _)| board.flip_run(coord, direction, player))
        .sum();
    Ok(flipped)
}

/// Returns `true` if `player` has at least one legal placement anywhere.
pub fn has_any_legal_move(board: &Board, player: Player) -> bool {
    Coord::all().any(|coord| is_legal(board, coord, player))
}

/// Every legal placement for `player`, in row-major order.
pub fn legal_moves(board: &Board, player: Player) -> Vec<Coord> {
    Coord::all()
        .filter(|&coord| is_legal(board, coord, player))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
