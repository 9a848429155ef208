//! That Time You Killed Me rules engine.
//!
//! Three 4x4 boards share one game: Past, Present and Future. A turn picks a
//! piece on the player's declared board, applies two actions to it (slide,
//! jump forward in time, clone backward in time) and declares which board the
//! player will act on next.
//!
//! # Coordinates
//!
//! ```text
//! Cell indices (row-major order, row 0 at the top):
//!   (0,0)=0   (0,1)=1   (0,2)=2   (0,3)=3
//!   (1,0)=4   (1,1)=5   (1,2)=6   (1,3)=7
//!   (2,0)=8   (2,1)=9   (2,2)=10  (2,3)=11
//!   (3,0)=12  (3,1)=13  (3,2)=14  (3,3)=15
//! ```
//!
//! # Timelines
//!
//! ```text
//! Past --Jump--> Present --Jump--> Future
//! Past <-Clone-- Present <-Clone-- Future
//! ```

use serde::{Deserialize, Serialize};

pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod history;
pub mod position;
pub mod state;

pub use board::{Board, Piece, PieceId};
pub use config::{GameConfig, Opening};
pub use error::{EngineError, EngineResult};
pub use game::{Game, Phase, Status, TurnPlan};
pub use history::{History, Snapshot};
pub use position::{ActionReport, Position, Removal, RemovalCause};
pub use state::{BoardState, CellRef, GameState, PlayerView};

/// Side length of every board.
pub const BOARD_SIZE: usize = 4;

/// Number of cells on one board.
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// Player identifier. `One` plays White, `Two` plays Black.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Player {
    #[serde(rename = "white")]
    One = 1,
    #[serde(rename = "black")]
    Two = 2,
}

impl Player {
    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Convert from u8 (1 or 2) to Player.
    #[inline]
    pub fn from_bits(bits: u8) -> Option<Player> {
        match bits {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }

    /// Zero-based slot used by per-player arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize - 1
    }

    /// Display name of the colour this player controls.
    pub fn name(self) -> &'static str {
        match self {
            Player::One => "White",
            Player::Two => "Black",
        }
    }

    pub fn both() -> impl Iterator<Item = Player> {
        [Player::One, Player::Two].into_iter()
    }
}

/// Per-player bookkeeping that survives across turns.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct PlayerState {
    pub id: Player,
    /// Board this player must act on at the start of their next turn.
    pub next_board: Timeline,
    /// Remaining clone tokens.
    pub clones: u8,
}

impl PlayerState {
    pub fn new(id: Player, next_board: Timeline, clones: u8) -> PlayerState {
        PlayerState { id, next_board, clones }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.id.name()
    }
}

/// One of the three boards.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Timeline {
    Past = 0,
    Present = 1,
    Future = 2,
}

impl Timeline {
    /// Board reached by a Jump, if any.
    #[inline]
    pub fn forward(self) -> Option<Timeline> {
        match self {
            Timeline::Past => Some(Timeline::Present),
            Timeline::Present => Some(Timeline::Future),
            Timeline::Future => None,
        }
    }

    /// Board reached by a Clone, if any.
    #[inline]
    pub fn backward(self) -> Option<Timeline> {
        match self {
            Timeline::Past => None,
            Timeline::Present => Some(Timeline::Past),
            Timeline::Future => Some(Timeline::Present),
        }
    }

    /// True when `other` is the board directly after this one.
    #[inline]
    pub fn precedes(self, other: Timeline) -> bool {
        self.forward() == Some(other)
    }

    /// True when `other` is the board directly before this one.
    #[inline]
    pub fn follows(self, other: Timeline) -> bool {
        self.backward() == Some(other)
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// All timelines in Past, Present, Future order.
    pub fn all() -> impl Iterator<Item = Timeline> {
        [Timeline::Past, Timeline::Present, Timeline::Future].into_iter()
    }

    /// The two timelines other than this one.
    pub fn others(self) -> impl Iterator<Item = Timeline> {
        Timeline::all().filter(move |&t| t != self)
    }
}

/// Orthogonal slide direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// (row, col) offset of one step.
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn all() -> impl Iterator<Item = Direction> {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right].into_iter()
    }
}

/// Position on a 4x4 board (0-15).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Pos(u8);

impl Pos {
    /// Bounds-checked constructor from signed coordinates.
    #[inline]
    pub fn new(row: i32, col: i32) -> Option<Pos> {
        let size = BOARD_SIZE as i32;
        if (0..size).contains(&row) && (0..size).contains(&col) {
            Some(Pos((row * size + col) as u8))
        } else {
            None
        }
    }

    /// Create a position from row and column (0-3 each).
    #[inline]
    pub fn from_row_col(row: u8, col: u8) -> Pos {
        debug_assert!((row as usize) < BOARD_SIZE && (col as usize) < BOARD_SIZE);
        Pos(row * BOARD_SIZE as u8 + col)
    }

    #[inline]
    pub fn row(self) -> u8 {
        self.0 / BOARD_SIZE as u8
    }

    #[inline]
    pub fn col(self) -> u8 {
        self.0 % BOARD_SIZE as u8
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Neighbouring cell in `dir`, or `None` past the edge.
    #[inline]
    pub fn step(self, dir: Direction) -> Option<Pos> {
        let (dr, dc) = dir.delta();
        Pos::new(self.row() as i32 + dr, self.col() as i32 + dc)
    }

    /// Corner cells.
    #[inline]
    pub fn is_corner(self) -> bool {
        let last = BOARD_SIZE as u8 - 1;
        (self.row() == 0 || self.row() == last) && (self.col() == 0 || self.col() == last)
    }

    /// Cells on the outer ring, corners included.
    #[inline]
    pub fn is_edge(self) -> bool {
        let last = BOARD_SIZE as u8 - 1;
        self.row() == 0 || self.row() == last || self.col() == 0 || self.col() == last
    }

    /// Iterate over all 16 positions.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..CELL_COUNT as u8).map(Pos)
    }
}

impl TryFrom<u8> for Pos {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (value as usize) < CELL_COUNT {
            Ok(Pos(value))
        } else {
            Err(format!("cell index {} out of range", value))
        }
    }
}

impl From<Pos> for u8 {
    fn from(pos: Pos) -> u8 {
        pos.0
    }
}

/// One action applied to a piece.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "direction", rename_all = "lowercase")]
pub enum Action {
    /// Move one cell orthogonally, pushing whatever is in the way.
    Slide(Direction),
    /// Travel forward one timeline, leaving nothing behind.
    Jump,
    /// Travel backward one timeline, leaving the original in place.
    Clone,
}

impl Action {
    /// Every action a piece could possibly take, before legality.
    pub fn all() -> impl Iterator<Item = Action> {
        Direction::all()
            .map(Action::Slide)
            .chain([Action::Jump, Action::Clone])
    }
}

/// An action bound to the piece performing it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Move {
    pub timeline: Timeline,
    pub from: Pos,
    pub action: Action,
}

impl Move {
    #[inline]
    pub fn new(timeline: Timeline, from: Pos, action: Action) -> Move {
        Move { timeline, from, action }
    }
}
