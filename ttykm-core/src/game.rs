//! Turn engine: piece selection, two actions, next-board declaration.
//!
//! ```text
//! AwaitingPieceSelection -> AwaitingAction1 -> AwaitingAction2 -> AwaitingNextBoard
//!          ^                                                          |
//!          +------------------- commit, switch player ----------------+
//! ```
//!
//! The second action is skipped when the turn's piece has nothing left to do.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::error::{EngineError, EngineResult};
use crate::history::{History, Snapshot};
use crate::position::{ActionReport, Position};
use crate::{Action, Move, Player, Pos, Timeline};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingPieceSelection,
    AwaitingAction1,
    AwaitingAction2,
    AwaitingNextBoard,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "winner", rename_all = "snake_case")]
pub enum Status {
    InProgress,
    Won(Player),
}

/// A complete turn, as produced by the search.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct TurnPlan {
    pub board: Timeline,
    pub from: Pos,
    pub first: Action,
    /// `None` when the piece has no second action or the game ended first.
    pub second: Option<Action>,
    pub next_board: Timeline,
}

#[derive(Clone, Debug)]
pub struct Game {
    pub(crate) config: GameConfig,
    pub(crate) position: Position,
    pub(crate) to_move: Player,
    pub(crate) phase: Phase,
    pub(crate) status: Status,
    /// Board the turn's piece is on, or was on when it was destroyed.
    pub(crate) active: Timeline,
    /// The turn's piece once selected. `None` after it was destroyed.
    pub(crate) focus: Option<Pos>,
    pub(crate) history: History,
}

impl Game {
    pub fn new(config: GameConfig) -> Game {
        let position = Position::new(&config);
        Game::from_position(config, position, config.first_player)
    }

    /// Start a game at a turn boundary of an arbitrary position.
    pub fn from_position(config: GameConfig, position: Position, to_move: Player) -> Game {
        let active = position.player(to_move).next_board;
        let status = if position.has_legal_action(to_move, active) {
            Status::InProgress
        } else {
            Status::Won(to_move.opponent())
        };
        let history = History::new(Snapshot { position: position.clone(), to_move, status });

        Game {
            config,
            position,
            to_move,
            phase: Phase::AwaitingPieceSelection,
            status,
            active,
            focus: None,
            history,
        }
    }

    /// Start over with the same configuration.
    pub fn reset(&mut self) {
        *self = Game::new(self.config);
        info!("game reset");
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline]
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        matches!(self.status, Status::Won(_))
    }

    pub fn winner(&self) -> Option<Player> {
        match self.status {
            Status::Won(p) => Some(p),
            Status::InProgress => None,
        }
    }

    /// Board the current turn is being played on.
    #[inline]
    pub fn active_board(&self) -> Timeline {
        self.active
    }

    /// Cell of the turn's piece, if one is selected and still alive.
    pub fn focus(&self) -> Option<(Timeline, Pos)> {
        self.focus.map(|pos| (self.active, pos))
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Turn boundaries recorded so far, including the starting position.
    pub fn history_len(&self) -> usize {
        self.history.boundaries()
    }

    /// Mid-turn undo is always possible; at a boundary it needs a committed turn.
    pub fn can_undo(&self) -> bool {
        self.phase != Phase::AwaitingPieceSelection || self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Legal actions for whatever stands on (`board`, `row`, `col`).
    pub fn legal_moves(&self, board: Timeline, row: i32, col: i32) -> EngineResult<Vec<Action>> {
        let pos = cell(row, col)?;
        Ok(self.position.legal_actions(board, pos))
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Pick the piece for this turn. Allowed again until the first action.
    pub fn select_piece(&mut self, player: Player, board: Timeline, row: i32, col: i32) -> EngineResult<()> {
        self.ensure_can_act(player)?;
        let pos = cell(row, col)?;
        if !matches!(self.phase, Phase::AwaitingPieceSelection | Phase::AwaitingAction1) {
            return Err(EngineError::InvalidSelection(
                "this turn's piece has already acted".to_string(),
            ));
        }
        self.check_selection(player, board, pos)?;

        self.active = board;
        self.focus = Some(pos);
        self.phase = Phase::AwaitingAction1;
        debug!(player = player.name(), ?board, row, col, "piece selected");
        Ok(())
    }

    /// Apply one action to the piece at (`board`, `row`, `col`).
    ///
    /// At the start of a turn this also selects the piece.
    pub fn apply_move(
        &mut self,
        player: Player,
        board: Timeline,
        row: i32,
        col: i32,
        action: Action,
    ) -> EngineResult<ActionReport> {
        self.ensure_can_act(player)?;
        let pos = cell(row, col)?;

        let first = match self.phase {
            Phase::AwaitingPieceSelection | Phase::AwaitingAction1 => {
                self.check_selection(player, board, pos)?;
                true
            }
            Phase::AwaitingAction2 => {
                if self.focus() != Some((board, pos)) {
                    return Err(EngineError::InvalidSelection(
                        "the second action must use the piece that just moved".to_string(),
                    ));
                }
                false
            }
            Phase::AwaitingNextBoard => {
                return Err(EngineError::InvalidSelection(
                    "both actions are done, declare the next board".to_string(),
                ));
            }
        };

        let report = self.position.apply(Move::new(board, pos, action))?;
        if first {
            self.history.discard_redo();
        }

        match report.focus {
            Some((t, p)) => {
                self.active = t;
                self.focus = Some(p);
            }
            None => {
                self.active = board;
                self.focus = None;
            }
        }

        let can_continue = self
            .focus
            .is_some_and(|p| !self.position.legal_actions(self.active, p).is_empty());
        self.phase = if first && can_continue {
            Phase::AwaitingAction2
        } else {
            Phase::AwaitingNextBoard
        };

        if let Some(winner) = self.position.winner(player) {
            self.status = Status::Won(winner);
            info!(winner = winner.name(), "game over");
        }
        Ok(report)
    }

    /// Finish the turn by naming the board to play on next time.
    pub fn declare_next_board(&mut self, player: Player, board: Timeline) -> EngineResult<()> {
        self.ensure_can_act(player)?;
        if self.phase != Phase::AwaitingNextBoard {
            return Err(EngineError::InvalidSelection(format!(
                "cannot declare a board during {:?}",
                self.phase
            )));
        }
        if board == self.active {
            return Err(EngineError::IllegalMove(format!(
                "next board must differ from {:?}",
                self.active
            )));
        }

        self.position.player_mut(player).next_board = board;
        self.to_move = player.opponent();
        self.phase = Phase::AwaitingPieceSelection;
        self.focus = None;
        self.active = self.position.player(self.to_move).next_board;

        if !self.position.has_legal_action(self.to_move, self.active) {
            self.status = Status::Won(player);
            info!(winner = player.name(), "opponent has no legal action");
        }

        self.history.commit(self.snapshot());
        info!(player = player.name(), next = ?board, turn = self.history.turns(), "turn committed");
        Ok(())
    }

    /// Play a whole turn atomically. On error the game is untouched.
    pub fn apply_turn(&mut self, player: Player, plan: &TurnPlan) -> EngineResult<Vec<ActionReport>> {
        let mut next = self.clone();
        let mut reports = Vec::with_capacity(2);

        if next.phase == Phase::AwaitingAction1 {
            next.phase = Phase::AwaitingPieceSelection;
        }
        let (row, col) = (plan.from.row() as i32, plan.from.col() as i32);
        reports.push(next.apply_move(player, plan.board, row, col, plan.first)?);

        if !next.is_over() {
            match (next.phase, plan.second) {
                (Phase::AwaitingAction2, Some(second)) => {
                    let (t, pos) = next
                        .focus()
                        .ok_or_else(|| EngineError::InvalidState("turn piece vanished".to_string()))?;
                    reports.push(next.apply_move(player, t, pos.row() as i32, pos.col() as i32, second)?);
                }
                (Phase::AwaitingAction2, None) => {
                    return Err(EngineError::IllegalMove("turn is missing its second action".to_string()));
                }
                (_, Some(_)) => {
                    return Err(EngineError::IllegalMove("no second action is available".to_string()));
                }
                (_, None) => {}
            }
        }

        if !next.is_over() {
            next.declare_next_board(player, plan.next_board)?;
        }

        *self = next;
        Ok(reports)
    }

    /// Roll back the turn in progress, or the last completed turn at a boundary.
    pub fn undo(&mut self) -> EngineResult<()> {
        let snapshot = if self.phase == Phase::AwaitingPieceSelection {
            self.history.step_back().ok_or(EngineError::NothingToUndo)?.clone()
        } else {
            self.history.current().clone()
        };
        self.restore(snapshot);
        info!(turn = self.history.turns(), "undo");
        Ok(())
    }

    pub fn redo(&mut self) -> EngineResult<()> {
        let snapshot = self.history.step_forward().ok_or(EngineError::NothingToRedo)?.clone();
        self.restore(snapshot);
        info!(turn = self.history.turns(), "redo");
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            position: self.position.clone(),
            to_move: self.to_move,
            status: self.status,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.position = snapshot.position;
        self.to_move = snapshot.to_move;
        self.status = snapshot.status;
        self.phase = Phase::AwaitingPieceSelection;
        self.focus = None;
        self.active = self.position.player(self.to_move).next_board;
    }

    fn ensure_can_act(&self, player: Player) -> EngineResult<()> {
        if self.is_over() {
            return Err(EngineError::GameAlreadyOver);
        }
        if player != self.to_move {
            return Err(EngineError::NotYourTurn(player));
        }
        Ok(())
    }

    fn check_selection(&self, player: Player, board: Timeline, pos: Pos) -> EngineResult<()> {
        let expected = self.position.player(player).next_board;
        if board != expected {
            return Err(EngineError::InvalidSelection(format!(
                "{} must play on {:?} this turn",
                player.name(),
                expected
            )));
        }
        match self.position.piece_at(board, pos) {
            None => Err(EngineError::InvalidSelection(format!(
                "no piece at {:?} ({}, {})",
                board,
                pos.row(),
                pos.col()
            ))),
            Some(piece) if piece.owner != player => Err(EngineError::InvalidSelection(format!(
                "piece at ({}, {}) belongs to {}",
                pos.row(),
                pos.col(),
                piece.owner.name()
            ))),
            Some(_) => Ok(()),
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new(GameConfig::default())
    }
}

fn cell(row: i32, col: i32) -> EngineResult<Pos> {
    Pos::new(row, col)
        .ok_or_else(|| EngineError::InvalidSelection(format!("({}, {}) is off the board", row, col)))
}
