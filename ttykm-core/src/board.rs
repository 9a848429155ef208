//! A single timeline's 4x4 grid with cached per-colour piece counts.

use serde::{Deserialize, Serialize};

use crate::{Player, Pos, Timeline, CELL_COUNT};

/// Stable piece identity. Jumps keep it, clones get a fresh one.
pub type PieceId = u32;

/// A piece as stored in a board cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub owner: Player,
}

impl Piece {
    #[inline]
    pub fn new(id: PieceId, owner: Player) -> Piece {
        Piece { id, owner }
    }
}

/// One timeline's grid.
///
/// Every write goes through [`Board::set`], which updates `counts` in the same
/// call, so `counts[p]` always equals the number of cells owned by `p`.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Board {
    timeline: Timeline,
    cells: [Option<Piece>; CELL_COUNT],
    counts: [u8; 2],
}

impl Board {
    /// Create an empty board.
    pub fn new(timeline: Timeline) -> Board {
        Board {
            timeline,
            cells: [None; CELL_COUNT],
            counts: [0; 2],
        }
    }

    #[inline]
    pub fn timeline(&self) -> Timeline {
        self.timeline
    }

    #[inline]
    pub fn get(&self, pos: Pos) -> Option<Piece> {
        self.cells[pos.index()]
    }

    /// Bounds-checked lookup by signed coordinates.
    #[inline]
    pub fn get_at(&self, row: i32, col: i32) -> Option<Piece> {
        Pos::new(row, col).and_then(|pos| self.get(pos))
    }

    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.cells[pos.index()].is_none()
    }

    /// Replace the content of `pos`, returning what was there.
    pub fn set(&mut self, pos: Pos, piece: Option<Piece>) -> Option<Piece> {
        let old = std::mem::replace(&mut self.cells[pos.index()], piece);
        if let Some(p) = old {
            self.counts[p.owner.index()] -= 1;
        }
        if let Some(p) = piece {
            self.counts[p.owner.index()] += 1;
        }
        old
    }

    /// Put a piece on an empty cell.
    #[inline]
    pub fn place(&mut self, pos: Pos, piece: Piece) {
        let displaced = self.set(pos, Some(piece));
        debug_assert!(displaced.is_none(), "placed onto occupied cell {:?}", pos);
    }

    /// Take the piece off `pos`.
    #[inline]
    pub fn remove(&mut self, pos: Pos) -> Option<Piece> {
        self.set(pos, None)
    }

    /// Cached number of pieces `player` has on this board.
    #[inline]
    pub fn count(&self, player: Player) -> u8 {
        self.counts[player.index()]
    }

    #[inline]
    pub fn is_occupied_by(&self, player: Player) -> bool {
        self.count(player) > 0
    }

    /// All occupied cells in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Pos, Piece)> + '_ {
        Pos::all().filter_map(move |pos| self.get(pos).map(|piece| (pos, piece)))
    }

    /// Cells holding a piece owned by `player`.
    pub fn pieces_of(&self, player: Player) -> impl Iterator<Item = (Pos, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.owner == player)
    }

    /// Recount the grid and compare with the cached counters.
    pub fn is_consistent(&self) -> bool {
        Player::both().all(|p| self.pieces_of(p).count() == self.count(p) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(id: PieceId) -> Piece {
        Piece::new(id, Player::One)
    }

    fn black(id: PieceId) -> Piece {
        Piece::new(id, Player::Two)
    }

    #[test]
    fn test_board_new() {
        let board = Board::new(Timeline::Present);
        assert_eq!(board.timeline(), Timeline::Present);
        assert_eq!(board.count(Player::One), 0);
        assert_eq!(board.count(Player::Two), 0);
        assert_eq!(board.pieces().count(), 0);
    }

    #[test]
    fn test_place_and_remove_track_counts() {
        let mut board = Board::new(Timeline::Past);
        let pos = Pos::from_row_col(1, 2);

        board.place(pos, white(0));
        assert_eq!(board.get(pos), Some(white(0)));
        assert_eq!(board.count(Player::One), 1);
        assert!(board.is_occupied_by(Player::One));
        assert!(!board.is_occupied_by(Player::Two));

        assert_eq!(board.remove(pos), Some(white(0)));
        assert_eq!(board.count(Player::One), 0);
        assert!(board.is_empty(pos));
        assert!(board.is_consistent());
    }

    #[test]
    fn test_set_replacing_other_colour() {
        let mut board = Board::new(Timeline::Future);
        let pos = Pos::from_row_col(3, 3);
        board.place(pos, white(0));

        let old = board.set(pos, Some(black(1)));
        assert_eq!(old, Some(white(0)));
        assert_eq!(board.count(Player::One), 0);
        assert_eq!(board.count(Player::Two), 1);
        assert!(board.is_consistent());
    }

    #[test]
    fn test_remove_empty_is_noop() {
        let mut board = Board::new(Timeline::Past);
        assert_eq!(board.remove(Pos::from_row_col(2, 2)), None);
        assert_eq!(board.count(Player::One), 0);
    }

    #[test]
    fn test_get_at_out_of_bounds() {
        let mut board = Board::new(Timeline::Past);
        board.place(Pos::from_row_col(0, 0), white(0));
        assert_eq!(board.get_at(0, 0), Some(white(0)));
        assert_eq!(board.get_at(-1, 0), None);
        assert_eq!(board.get_at(0, 4), None);
        assert_eq!(board.get_at(100, -100), None);
    }

    #[test]
    fn test_pieces_of() {
        let mut board = Board::new(Timeline::Present);
        board.place(Pos::from_row_col(0, 0), white(0));
        board.place(Pos::from_row_col(0, 1), black(1));
        board.place(Pos::from_row_col(2, 3), white(2));

        let whites: Vec<_> = board.pieces_of(Player::One).map(|(pos, _)| pos).collect();
        assert_eq!(whites, vec![Pos::from_row_col(0, 0), Pos::from_row_col(2, 3)]);
        assert_eq!(board.pieces_of(Player::Two).count(), 1);
    }
}
