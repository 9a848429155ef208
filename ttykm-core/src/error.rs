//! Error types for engine commands.
//!
//! Every command validates completely before it mutates anything, so an
//! `Err` always leaves the game exactly as it was.

use thiserror::Error;

use crate::Player;

/// Errors returned by [`crate::Game`] commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Bad cell, empty cell, foreign piece, wrong board or wrong turn phase.
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// The action is not available to the selected piece.
    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("Not {}'s turn", .0.name())]
    NotYourTurn(Player),

    #[error("Game is already over")]
    GameAlreadyOver,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    /// An imported state does not describe a reachable data model.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
