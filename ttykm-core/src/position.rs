//! Rules state: three boards, two players, and the action primitives.
//!
//! `Position` knows nothing about turn phases. It answers "what can this piece
//! do" and "do it", and it is what the search clones and mutates.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::{Board, Piece, PieceId};
use crate::config::{GameConfig, Opening};
use crate::error::{EngineError, EngineResult};
use crate::{Action, Direction, Move, Player, PlayerState, Pos, Timeline};

/// Why a piece left the game.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalCause {
    /// Pushed over the board edge.
    PushedOff,
    /// Collided with a piece of its own colour.
    Paradox,
}

/// A piece removed while resolving an action.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Removal {
    pub timeline: Timeline,
    pub pos: Pos,
    pub piece: Piece,
    pub cause: RemovalCause,
}

/// Outcome of one applied action.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct ActionReport {
    /// Where the acting piece ended up, `None` if it was destroyed.
    pub focus: Option<(Timeline, Pos)>,
    pub removals: Vec<Removal>,
}

#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Position {
    boards: [Board; 3],
    players: [PlayerState; 2],
    next_piece_id: PieceId,
}

impl Position {
    /// Build the opening layout described by `config`.
    pub fn new(config: &GameConfig) -> Position {
        let mut pos = Position::empty(config.clone_tokens);
        let white_home = Pos::from_row_col(0, 0);
        let black_home = Pos::from_row_col(3, 3);

        match config.opening {
            Opening::Classic => {
                for t in Timeline::all() {
                    pos.spawn(t, white_home, Player::One);
                    pos.spawn(t, black_home, Player::Two);
                }
            }
            Opening::Sparse => {
                pos.spawn(Timeline::Past, white_home, Player::One);
                pos.spawn(Timeline::Future, black_home, Player::Two);
            }
        }
        pos
    }

    /// Three empty boards. White starts on Past, Black on Future.
    pub fn empty(clone_tokens: u8) -> Position {
        Position {
            boards: [
                Board::new(Timeline::Past),
                Board::new(Timeline::Present),
                Board::new(Timeline::Future),
            ],
            players: [
                PlayerState::new(Player::One, Timeline::Past, clone_tokens),
                PlayerState::new(Player::Two, Timeline::Future, clone_tokens),
            ],
            next_piece_id: 0,
        }
    }

    /// Reassemble a position from parts. Callers validate consistency.
    pub(crate) fn from_parts(
        boards: [Board; 3],
        players: [PlayerState; 2],
        next_piece_id: PieceId,
    ) -> Position {
        Position { boards, players, next_piece_id }
    }

    /// Place a brand new piece for `owner`. Used for setups and tests.
    pub fn spawn(&mut self, t: Timeline, pos: Pos, owner: Player) -> Piece {
        let piece = Piece::new(self.allocate_id(), owner);
        self.boards[t.index()].place(pos, piece);
        piece
    }

    fn allocate_id(&mut self) -> PieceId {
        let id = self.next_piece_id;
        self.next_piece_id += 1;
        id
    }

    #[inline]
    pub fn board(&self, t: Timeline) -> &Board {
        &self.boards[t.index()]
    }

    pub fn boards(&self) -> &[Board; 3] {
        &self.boards
    }

    #[inline]
    pub fn player(&self, p: Player) -> &PlayerState {
        &self.players[p.index()]
    }

    #[inline]
    pub fn player_mut(&mut self, p: Player) -> &mut PlayerState {
        &mut self.players[p.index()]
    }

    #[inline]
    pub fn next_piece_id(&self) -> PieceId {
        self.next_piece_id
    }

    #[inline]
    pub fn piece_at(&self, t: Timeline, pos: Pos) -> Option<Piece> {
        self.board(t).get(pos)
    }

    /// Total pieces `player` has across all boards.
    pub fn total_count(&self, player: Player) -> u32 {
        self.boards.iter().map(|b| b.count(player) as u32).sum()
    }

    /// Number of boards holding at least one of `player`'s pieces.
    pub fn occupied_boards(&self, player: Player) -> usize {
        self.boards.iter().filter(|b| b.is_occupied_by(player)).count()
    }

    pub fn is_consistent(&self) -> bool {
        self.boards.iter().all(Board::is_consistent)
    }

    // ========================================================================
    // Legality
    // ========================================================================

    /// Whether the piece at (`t`, `pos`) may take `action`.
    ///
    /// Slides only look at the adjacent cell: an opposing piece there is fine
    /// whatever the chain behind it does, an own piece never is.
    pub fn is_legal(&self, t: Timeline, pos: Pos, action: Action) -> bool {
        let Some(piece) = self.piece_at(t, pos) else {
            return false;
        };
        match action {
            Action::Slide(dir) => match pos.step(dir) {
                Some(to) => match self.piece_at(t, to) {
                    None => true,
                    Some(other) => other.owner != piece.owner,
                },
                None => false,
            },
            Action::Jump => travel_target(t, action).is_some_and(|dest| self.board(dest).is_empty(pos)),
            Action::Clone => {
                self.player(piece.owner).clones > 0
                    && travel_target(t, action).is_some_and(|dest| self.board(dest).is_empty(pos))
            }
        }
    }

    /// Legal actions for the piece at (`t`, `pos`); empty for an empty cell.
    pub fn legal_actions(&self, t: Timeline, pos: Pos) -> Vec<Action> {
        Action::all().filter(|&a| self.is_legal(t, pos, a)).collect()
    }

    /// True if `player` can act with any of their pieces on board `t`.
    pub fn has_legal_action(&self, player: Player, t: Timeline) -> bool {
        self.board(t)
            .pieces_of(player)
            .any(|(pos, _)| Action::all().any(|a| self.is_legal(t, pos, a)))
    }

    /// Player who has won, checking `mover` first.
    ///
    /// A side wins once the other side is present on at most one board.
    pub fn winner(&self, mover: Player) -> Option<Player> {
        [mover, mover.opponent()]
            .into_iter()
            .find(|p| self.occupied_boards(p.opponent()) <= 1)
    }

    // ========================================================================
    // Application
    // ========================================================================

    /// Apply one action. Nothing changes if it is illegal.
    pub fn apply(&mut self, mv: Move) -> EngineResult<ActionReport> {
        if !self.is_legal(mv.timeline, mv.from, mv.action) {
            return Err(EngineError::IllegalMove(format!(
                "{:?} is not available at {:?} ({}, {})",
                mv.action,
                mv.timeline,
                mv.from.row(),
                mv.from.col()
            )));
        }

        let mut removals = Vec::new();
        let focus = match (mv.action, travel_target(mv.timeline, mv.action)) {
            (Action::Slide(dir), _) => self
                .slide(mv.timeline, mv.from, dir, &mut removals)
                .map(|to| (mv.timeline, to)),
            (Action::Jump, Some(dest)) => Some(self.jump(mv.timeline, dest, mv.from)),
            (Action::Clone, Some(dest)) => Some(self.clone_back(mv.timeline, dest, mv.from)),
            (_, None) => None,
        };
        let report = ActionReport { focus, removals };

        debug!(
            timeline = ?mv.timeline,
            row = mv.from.row(),
            col = mv.from.col(),
            action = ?mv.action,
            removed = report.removals.len(),
            "applied action"
        );
        Ok(report)
    }

    /// Move the piece at `from` one step, resolving the chain ahead of it.
    ///
    /// Returns where the piece ended, or `None` if it left the board. Depth is
    /// bounded by the board side since every level advances one cell.
    fn slide(
        &mut self,
        t: Timeline,
        from: Pos,
        dir: Direction,
        removals: &mut Vec<Removal>,
    ) -> Option<Pos> {
        let piece = self.piece_at(t, from)?;

        let Some(to) = from.step(dir) else {
            self.boards[t.index()].remove(from);
            removals.push(Removal { timeline: t, pos: from, piece, cause: RemovalCause::PushedOff });
            debug!(?t, id = piece.id, "pushed off the board");
            return None;
        };

        match self.piece_at(t, to) {
            None => {}
            Some(ahead) if ahead.owner != piece.owner => {
                self.slide(t, to, dir, removals);
            }
            Some(ahead) => {
                let board = &mut self.boards[t.index()];
                board.remove(from);
                board.remove(to);
                removals.push(Removal { timeline: t, pos: from, piece, cause: RemovalCause::Paradox });
                removals.push(Removal { timeline: t, pos: to, piece: ahead, cause: RemovalCause::Paradox });
                debug!(?t, a = piece.id, b = ahead.id, "paradox");
                return None;
            }
        }

        let board = &mut self.boards[t.index()];
        board.remove(from);
        board.place(to, piece);
        Some(to)
    }

    fn jump(&mut self, t: Timeline, dest: Timeline, pos: Pos) -> (Timeline, Pos) {
        if let Some(piece) = self.boards[t.index()].remove(pos) {
            self.boards[dest.index()].place(pos, piece);
        }
        (dest, pos)
    }

    fn clone_back(&mut self, t: Timeline, dest: Timeline, pos: Pos) -> (Timeline, Pos) {
        if let Some(original) = self.piece_at(t, pos) {
            self.player_mut(original.owner).clones -= 1;
            self.spawn(dest, pos, original.owner);
        }
        (dest, pos)
    }
}

/// Board a Jump or Clone from `t` lands on: the next board for a Jump, the
/// previous one for a Clone. `None` for slides and at the ends of time.
fn travel_target(t: Timeline, action: Action) -> Option<Timeline> {
    match action {
        Action::Slide(_) => None,
        Action::Jump => Timeline::all().find(|&dest| t.precedes(dest)),
        Action::Clone => Timeline::all().find(|&dest| t.follows(dest)),
    }
}
