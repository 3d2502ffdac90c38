//! Core domain types for five-in-a-row.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width and height of the board.
pub const BOARD_SIZE: usize = 15;

/// The center intersection, where the first stone usually goes.
pub const CENTER: Coord = Coord { row: 7, col: 7 };

/// Player (stone color). Black always moves first.
///
/// On the wire a player is its seat number: Black is `1`, White is `2`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::Display,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum Player {
    /// Black (seat 1, moves first).
    Black,
    /// White (seat 2).
    White,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Seat number of this player (1 or 2).
    pub fn number(self) -> u8 {
        match self {
            Player::Black => 1,
            Player::White => 2,
        }
    }

    /// Parses a seat number.
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Player::Black),
            2 => Some(Player::White),
            _ => None,
        }
    }
}

impl From<Player> for u8 {
    fn from(player: Player) -> Self {
        player.number()
    }
}

impl TryFrom<u8> for Player {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Player::from_number(n).ok_or_else(|| format!("player must be 1 or 2, got {}", n))
    }
}

/// A single intersection of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Cell {
    /// No stone.
    #[default]
    Empty,
    /// A stone of the given color.
    Stone(Player),
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Empty => 0,
            Cell::Stone(player) => player.number(),
        }
    }
}

impl TryFrom<u8> for Cell {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            0 => Ok(Cell::Empty),
            n => Player::try_from(n).map(Cell::Stone),
        }
    }
}

/// Board coordinate, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
}

impl Coord {
    /// Creates a coordinate (not bounds checked).
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Converts signed wire coordinates, returning `None` when off the board.
    pub fn from_signed(row: i32, col: i32) -> Option<Self> {
        let in_range = |v: i32| v >= 0 && (v as usize) < BOARD_SIZE;
        (in_range(row) && in_range(col)).then(|| Self::new(row as usize, col as usize))
    }

    /// Steps `steps` times along `(dr, dc)`, returning `None` when leaving the board.
    pub fn offset(self, dr: isize, dc: isize, steps: isize) -> Option<Self> {
        let row = self.row as isize + dr * steps;
        let col = self.col as isize + dc * steps;
        let size = BOARD_SIZE as isize;
        (row >= 0 && row < size && col >= 0 && col < size)
            .then(|| Self::new(row as usize, col as usize))
    }

    /// King-move distance between two coordinates.
    pub fn chebyshev(self, other: Coord) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }

    /// Taxicab distance between two coordinates.
    pub fn manhattan(self, other: Coord) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Every on-board coordinate within `radius` (Chebyshev) of `self`,
    /// including `self`, in row-major order.
    pub fn square_around(self, radius: usize) -> impl Iterator<Item = Coord> {
        let rows = self.row.saturating_sub(radius)..=(self.row + radius).min(BOARD_SIZE - 1);
        let cols = self.col.saturating_sub(radius)..=(self.col + radius).min(BOARD_SIZE - 1);
        rows.flat_map(move |row| cols.clone().map(move |col| Coord::new(row, col)))
    }

    /// All board coordinates in row-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Coord::new(row, col)))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// 15x15 board. Serializes as nested arrays of `0`/`1`/`2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Gets the cell at the given coordinate.
    pub fn get(&self, at: Coord) -> Cell {
        self.cells[at.row][at.col]
    }

    /// Sets the cell at the given coordinate.
    pub fn set(&mut self, at: Coord, cell: Cell) {
        self.cells[at.row][at.col] = cell;
    }

    /// Checks if a cell is empty.
    pub fn is_empty(&self, at: Coord) -> bool {
        self.get(at) == Cell::Empty
    }

    /// Checks whether a coordinate holds a stone of `player`.
    pub fn is_stone(&self, at: Coord, player: Player) -> bool {
        self.get(at) == Cell::Stone(player)
    }

    /// Checks if no empty cell remains.
    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(|c| *c != Cell::Empty)
    }

    /// Number of stones on the board.
    pub fn stone_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| **c != Cell::Empty).count()
    }

    /// Turns every black stone white and every white stone black.
    pub fn swap_colors(&mut self) {
        for cell in self.cells.iter_mut().flatten() {
            if let Cell::Stone(player) = *cell {
                *cell = Cell::Stone(player.opponent());
            }
        }
    }

    /// Returns a copy with the given coordinates shown as empty.
    pub fn masked(&self, hidden: impl IntoIterator<Item = Coord>) -> Board {
        let mut board = self.clone();
        for at in hidden {
            board.set(at, Cell::Empty);
        }
        board
    }

    /// Formats the board as a human-readable grid (`X` black, `O` white).
    pub fn display(&self) -> String {
        let mut out = String::from("   ");
        for col in 0..BOARD_SIZE {
            out.push_str(&format!("{:>2}", col % 10));
        }
        out.push('\n');
        for (row, cells) in self.cells.iter().enumerate() {
            out.push_str(&format!("{:>2} ", row));
            for cell in cells {
                let symbol = match cell {
                    Cell::Empty => '.',
                    Cell::Stone(Player::Black) => 'X',
                    Cell::Stone(Player::White) => 'O',
                };
                out.push(' ');
                out.push(symbol);
            }
            out.push('\n');
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
