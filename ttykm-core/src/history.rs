//! Snapshot-based undo/redo.
//!
//! The undo stack always holds at least the starting snapshot. Its top is the
//! state at the start of the turn currently being played.

use crate::game::Status;
use crate::position::Position;
use crate::Player;

/// Full copy of the rules state at a turn boundary.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Snapshot {
    pub position: Position,
    pub to_move: Player,
    pub status: Status,
}

#[derive(Clone, Debug)]
pub struct History {
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
    turns: u32,
}

impl History {
    /// Start a history whose base is `initial`.
    pub fn new(initial: Snapshot) -> History {
        History::with_turns(initial, 0)
    }

    /// Start a history at an arbitrary turn number (used by state import).
    pub fn with_turns(initial: Snapshot, turns: u32) -> History {
        History {
            undo: vec![initial],
            redo: Vec::new(),
            turns,
        }
    }

    /// Record a completed turn. Any redo history is dropped.
    pub fn commit(&mut self, snapshot: Snapshot) {
        self.undo.push(snapshot);
        self.redo.clear();
        self.turns = self.turns.saturating_add(1);
    }

    /// Snapshot at the start of the current turn.
    pub fn current(&self) -> &Snapshot {
        // `undo` is never empty: new() seeds it and step_back() keeps one.
        &self.undo[self.undo.len() - 1]
    }

    /// Undo one completed turn and return the snapshot to restore.
    pub fn step_back(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        let top = self.undo.pop()?;
        self.redo.push(top);
        self.turns = self.turns.saturating_sub(1);
        Some(self.current())
    }

    /// Redo one undone turn and return the snapshot to restore.
    pub fn step_forward(&mut self) -> Option<&Snapshot> {
        let next = self.redo.pop()?;
        self.undo.push(next);
        self.turns = self.turns.saturating_add(1);
        Some(self.current())
    }

    /// Drop redo history once a new line of play starts.
    pub fn discard_redo(&mut self) {
        self.redo.clear();
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Completed turns up to the current point.
    #[inline]
    pub fn turns(&self) -> u32 {
        self.turns
    }

    /// Number of snapshots on the undo stack.
    #[inline]
    pub fn boundaries(&self) -> usize {
        self.undo.len()
    }
}
