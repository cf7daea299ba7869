//! Board model: the 8×8 grid of cells.
//!
//! The board is plain data. It knows how to read a cell, place a disc, flip a
//! run of discs in one direction, and count what is on it. Deciding *whether*
//! a placement or a flip is allowed is the job of [`crate::domain::rules`].

use std::fmt;

/// Number of rows and columns on the board.
pub const BOARD_SIZE: usize = 8;

// ── Players and cells ─────────────────────────────────────────────────────────

/// One of the two sides. Black always moves first.
///
/// The discriminants double as the wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Player {
    Black = 0x01,
    White = 0x02,
}

impl Player {
    /// Both players in seating order (first connection plays Black).
    pub const ALL: [Player; 2] = [Player::Black, Player::White];

    /// Returns the other player.
    pub const fn opponent(self) -> Self {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Zero-based seat index: 0 for Black, 1 for White.
    pub const fn seat(self) -> usize {
        match self {
            Player::Black => 0,
            Player::White => 1,
        }
    }
}

impl TryFrom<u8> for Player {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Player::Black),
            0x02 => Ok(Player::White),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Black => f.write_str("Black"),
            Player::White => f.write_str("White"),
        }
    }
}

/// The state of a single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Cell {
    #[default]
    Empty = 0x00,
    Black = 0x01,
    White = 0x02,
}

impl Cell {
    /// Returns `true` if no disc occupies the cell.
    pub const fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Returns the player whose disc occupies the cell, if any.
    pub const fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Black => Some(Player::Black),
            Cell::White => Some(Player::White),
        }
    }

    /// One-character rendering: `.` empty, `X` Black, `O` White.
    pub const fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Black => 'X',
            Cell::White => 'O',
        }
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::Black => Cell::Black,
            Player::White => Cell::White,
        }
    }
}

impl TryFrom<u8> for Cell {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Cell::Empty),
            0x01 => Ok(Cell::Black),
            0x02 => Ok(Cell::White),
            _ => Err(()),
        }
    }
}

// ── Coordinates and directions ────────────────────────────────────────────────

/// A validated board coordinate. Both `row` and `col` are always in `0..8`.
///
/// Because a `Coord` can only be built through [`Coord::new`] or by stepping
/// from another valid coordinate, board reads never need a bounds check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    row: u8,
    col: u8,
}

impl Coord {
    /// Builds a coordinate, or `None` if either index is off the board.
    pub const fn new(row: u8, col: u8) -> Option<Self> {
        if (row as usize) < BOARD_SIZE && (col as usize) < BOARD_SIZE {
            Some(Self { row, col })
        } else {
            None
        }
    }

    pub const fn row(self) -> u8 {
        self.row
    }

    pub const fn col(self) -> u8 {
        self.col
    }

    /// Returns the neighbouring coordinate in `direction`, or `None` at the edge.
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dr, dc) = direction.delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        Self::new(row, col)
    }

    /// Iterates over all 64 coordinates in row-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..BOARD_SIZE as u8)
            .flat_map(|row| (0..BOARD_SIZE as u8).map(move |col| Coord { row, col }))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The eight compass directions a run of discs can extend in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// `(row delta, column delta)`; rows grow downwards.
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 1),
            Direction::South => (1, 0),
            Direction::SouthWest => (1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (-1, -1),
        }
    }
}

// ── Disc counts ───────────────────────────────────────────────────────────────

/// How many cells hold each colour and how many are still empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiscCount {
    pub black: u8,
    pub white: u8,
    pub empty: u8,
}

impl DiscCount {
    /// Discs on the board, of either colour.
    pub const fn total(self) -> u8 {
        self.black + self.white
    }

    pub const fn of(self, player: Player) -> u8 {
        match player {
            Player::Black => self.black,
            Player::White => self.white,
        }
    }
}

// ── Board ─────────────────────────────────────────────────────────────────────

/// The 8×8 Othello board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Returns the canonical opening position: White on (3,3) and (4,4),
    /// Black on (3,4) and (4,3).
    pub fn new() -> Self {
        let mut cells = [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE];
        cells[3][3] = Cell::White;
        cells[4][4] = Cell::White;
        cells[3][4] = Cell::Black;
        cells[4][3] = Cell::Black;
        Self { cells }
    }

    /// Returns a board with no discs at all.
    pub fn empty() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Rebuilds a board from a raw snapshot, e.g. one received in a STATE message.
    pub fn from_cells(cells: [[Cell; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Self { cells }
    }

    /// Row-major view of every cell.
    pub fn cells(&self) -> &[[Cell; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    pub fn get(&self, coord: Coord) -> Cell {
        self.cells[coord.row as usize][coord.col as usize]
    }

    /// Overwrites a cell unconditionally. Used to set up positions.
    pub fn set(&mut self, coord: Coord, cell: Cell) {
        self.cells[coord.row as usize][coord.col as usize] = cell;
    }

    /// Puts `player`'s disc on an empty cell.
    ///
    /// The caller must already have checked that the cell is empty.
    pub fn place(&mut self, coord: Coord, player: Player) {
        debug_assert!(self.get(coord).is_empty(), "place on occupied cell {coord}");
        self.set(coord, Cell::from(player));
    }

    /// Flips the opponent run that starts one step from `origin` in `direction`.
    ///
    /// Stops at the first cell that is not the opponent's colour. The caller
    /// must already have confirmed that this run is bounded by `player`'s
    /// colour. Returns the number of discs flipped.
    pub fn flip_run(&mut self, origin: Coord, direction: Direction, player: Player) -> u32 {
        let opponent = Cell::from(player.opponent());
        let own = Cell::from(player);
        let mut flipped = 0;
        let mut cursor = origin.step(direction);
        while let Some(coord) = cursor {
            if self.get(coord) != opponent {
                break;
            }
            self.set(coord, own);
            flipped += 1;
            cursor = coord.step(direction);
        }
        flipped
    }

    pub fn count_discs(&self) -> DiscCount {
        let mut count = DiscCount::default();
        for cell in self.cells.iter().flatten() {
            match cell {
                Cell::Empty => count.empty += 1,
                Cell::Black => count.black += 1,
                Cell::White => count.white += 1,
            }
        }
        count
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("  0 1 2 3 4 5 6 7\n")?;
        for (row, cells) in self.cells.iter().enumerate() {
            write!(f, "{row}")?;
            for cell in cells {
                write!(f, " {}", cell.symbol())?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn c(row: u8, col: u8) -> Coord {
        Coord::new(row, col).unwrap()
    }

    #[test]
    fn test_new_board_has_canonical_opening() {
        // Arrange / Act
        let board = Board::new();

        // Assert
        assert_eq!(board.get(c(3, 3)), Cell::White);
        assert_eq!(board.get(c(4, 4)), Cell::White);
        assert_eq!(board.get(c(3, 4)), Cell::Black);
        assert_eq!(board.get(c(4, 3)), Cell::Black);
        assert_eq!(
            board.count_discs(),
            DiscCount {
                black: 2,
                white: 2,
                empty: 60
            }
        );
    }

    #[test]
    fn test_coord_new_rejects_out_of_range() {
        assert!(Coord::new(8, 0).is_none());
        assert!(Coord::new(0, 8).is_none());
        assert!(Coord::new(255, 255).is_none());
        assert!(Coord::new(7, 7).is_some());
    }

    #[test]
    fn test_coord_step_stops_at_edges() {
        assert_eq!(c(0, 0).step(Direction::North), None);
        assert_eq!(c(0, 0).step(Direction::West), None);
        assert_eq!(c(7, 7).step(Direction::SouthEast), None);
        assert_eq!(c(0, 0).step(Direction::SouthEast), Some(c(1, 1)));
        assert_eq!(c(3, 4).step(Direction::NorthWest), Some(c(2, 3)));
    }

    #[test]
    fn test_coord_all_yields_64_unique_cells() {
        let all: Vec<Coord> = Coord::all().collect();
        assert_eq!(all.len(), 64);
        assert_eq!(all[0], c(0, 0));
        assert_eq!(all[63], c(7, 7));
    }

    #[test]
    fn test_flip_run_stops_at_first_non_opponent_cell() {
        // Arrange – row 0: B W W B W . . .
        let mut board = Board::empty();
        board.set(c(0, 0), Cell::Black);
        board.set(c(0, 1), Cell::White);
        board.set(c(0, 2), Cell::White);
        board.set(c(0, 3), Cell::Black);
        board.set(c(0, 4), Cell::White);

        // Act
        let flipped = board.flip_run(c(0, 0), Direction::East, Player::Black);

        // Assert – the White disc beyond the bounding Black disc is untouched
        assert_eq!(flipped, 2);
        assert_eq!(board.get(c(0, 1)), Cell::Black);
        assert_eq!(board.get(c(0, 2)), Cell::Black);
        assert_eq!(board.get(c(0, 4)), Cell::White);
    }

    #[test]
    fn test_place_sets_cell_to_player_colour() {
        let mut board = Board::empty();
        board.place(c(5, 2), Player::White);
        assert_eq!(board.get(c(5, 2)), Cell::White);
        assert_eq!(board.count_discs().white, 1);
    }

    #[test]
    fn test_player_opponent_and_wire_values() {
        assert_eq!(Player::Black.opponent(), Player::White);
        assert_eq!(Player::White.opponent(), Player::Black);
        assert_eq!(Player::try_from(0x01), Ok(Player::Black));
        assert_eq!(Player::try_from(0x02), Ok(Player::White));
        assert!(Player::try_from(0x00).is_err());
    }

    #[test]
    fn test_display_renders_eight_rows() {
        let text = Board::new().to_string();
        assert_eq!(text.lines().count(), 9);
        assert!(text.contains("3 . . . O X . . ."));
    }
}
