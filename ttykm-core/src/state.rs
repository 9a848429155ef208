//! Serializable view of a game, and rebuilding a game from one.
//!
//! [`Game::state`] and [`Game::from_state`] are inverses over the rules data:
//! boards, counters, players, turn phase, focus and piece ids. Undo/redo
//! history is not part of the exported state; an imported game starts with a
//! fresh history rooted at the imported turn boundary.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Piece, PieceId};
use crate::error::{EngineError, EngineResult};
use crate::game::{Game, Phase, Status};
use crate::history::{History, Snapshot};
use crate::position::Position;
use crate::{GameConfig, Player, PlayerState, Pos, Timeline, BOARD_SIZE};

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BoardState {
    pub timeline: Timeline,
    /// `cells[row][col]`
    pub cells: Vec<Vec<Option<Piece>>>,
    pub white: u8,
    pub black: u8,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: Player,
    pub name: String,
    pub next_board: Timeline,
    pub clones: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CellRef {
    pub board: Timeline,
    pub row: u8,
    pub col: u8,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct GameState {
    /// Past, Present, Future in that order.
    pub boards: Vec<BoardState>,
    /// White then Black.
    pub players: Vec<PlayerView>,
    pub to_move: Player,
    pub phase: Phase,
    pub status: Status,
    pub active_board: Timeline,
    pub focus: Option<CellRef>,
    pub next_piece_id: PieceId,
    pub turn: u32,
    #[serde(default)]
    pub can_undo: bool,
    #[serde(default)]
    pub can_redo: bool,
}

impl BoardState {
    fn from_board(board: &Board) -> BoardState {
        let cells = (0..BOARD_SIZE as u8)
            .map(|row| {
                (0..BOARD_SIZE as u8)
                    .map(|col| board.get(Pos::from_row_col(row, col)))
                    .collect()
            })
            .collect();
        BoardState {
            timeline: board.timeline(),
            cells,
            white: board.count(Player::One),
            black: board.count(Player::Two),
        }
    }

    fn to_board(&self, expected: Timeline) -> EngineResult<Board> {
        if self.timeline != expected {
            return Err(invalid(format!("expected {:?} board, found {:?}", expected, self.timeline)));
        }
        if self.cells.len() != BOARD_SIZE || self.cells.iter().any(|row| row.len() != BOARD_SIZE) {
            return Err(invalid(format!("{:?} board is not {}x{}", expected, BOARD_SIZE, BOARD_SIZE)));
        }

        let mut board = Board::new(expected);
        for (row, cells) in self.cells.iter().enumerate() {
            for (col, piece) in cells.iter().enumerate() {
                if let Some(piece) = piece {
                    board.place(Pos::from_row_col(row as u8, col as u8), *piece);
                }
            }
        }

        if board.count(Player::One) != self.white || board.count(Player::Two) != self.black {
            return Err(invalid(format!(
                "{:?} counters ({}, {}) disagree with the grid ({}, {})",
                expected,
                self.white,
                self.black,
                board.count(Player::One),
                board.count(Player::Two)
            )));
        }
        Ok(board)
    }
}

impl PlayerView {
    fn from_state(state: &PlayerState) -> PlayerView {
        PlayerView {
            id: state.id,
            name: state.name().to_string(),
            next_board: state.next_board,
            clones: state.clones,
        }
    }
}

impl Game {
    /// Serializable snapshot of everything the rules depend on.
    pub fn state(&self) -> GameState {
        GameState {
            boards: self.position.boards().iter().map(BoardState::from_board).collect(),
            players: Player::both()
                .map(|p| PlayerView::from_state(self.position.player(p)))
                .collect(),
            to_move: self.to_move,
            phase: self.phase,
            status: self.status,
            active_board: self.active,
            focus: self.focus.map(|pos| CellRef {
                board: self.active,
                row: pos.row(),
                col: pos.col(),
            }),
            next_piece_id: self.position.next_piece_id(),
            turn: self.history.turns(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    /// Rebuild a game from an exported state, validating it first.
    pub fn from_state(state: GameState) -> EngineResult<Game> {
        Game::from_state_with_config(state, GameConfig::default())
    }

    pub fn from_state_with_config(state: GameState, config: GameConfig) -> EngineResult<Game> {
        if state.boards.len() != 3 {
            return Err(invalid(format!("expected 3 boards, found {}", state.boards.len())));
        }
        let boards = [
            state.boards[0].to_board(Timeline::Past)?,
            state.boards[1].to_board(Timeline::Present)?,
            state.boards[2].to_board(Timeline::Future)?,
        ];

        let mut seen = HashSet::new();
        for (_, piece) in boards.iter().flat_map(|b| b.pieces()) {
            if piece.id >= state.next_piece_id {
                return Err(invalid(format!("piece id {} was never allocated", piece.id)));
            }
            if !seen.insert(piece.id) {
                return Err(invalid(format!("piece id {} appears twice", piece.id)));
            }
        }

        if state.players.len() != 2 {
            return Err(invalid(format!("expected 2 players, found {}", state.players.len())));
        }
        let mut players = [
            PlayerState::new(Player::One, Timeline::Past, 0),
            PlayerState::new(Player::Two, Timeline::Future, 0),
        ];
        for (slot, view) in players.iter_mut().zip(&state.players) {
            if view.id != slot.id {
                return Err(invalid(format!("player {} listed out of order", view.id.name())));
            }
            slot.next_board = view.next_board;
            slot.clones = view.clones;
        }

        // Every clone allocates one id, so the counter must have room for
        // all remaining tokens.
        let budget: u32 = players.iter().map(|p| p.clones as u32).sum();
        if state.next_piece_id.checked_add(budget).is_none() {
            return Err(invalid(format!(
                "next piece id {} leaves no room for {} clones",
                state.next_piece_id, budget
            )));
        }

        let position = Position::from_parts(boards, players, state.next_piece_id);

        let focus = match (state.phase, state.focus) {
            (Phase::AwaitingPieceSelection, Some(_)) => {
                return Err(invalid("focus set before a piece was selected".to_string()));
            }
            (Phase::AwaitingAction1 | Phase::AwaitingAction2, None) => {
                return Err(invalid(format!("{:?} needs a focus piece", state.phase)));
            }
            (_, Some(cell)) => {
                let pos = Pos::new(cell.row as i32, cell.col as i32)
                    .ok_or_else(|| invalid(format!("focus ({}, {}) is off the board", cell.row, cell.col)))?;
                if cell.board != state.active_board {
                    return Err(invalid("focus is not on the active board".to_string()));
                }
                match position.piece_at(cell.board, pos) {
                    Some(piece) if piece.owner == state.to_move => Some(pos),
                    _ => return Err(invalid("focus does not hold a piece of the player to move".to_string())),
                }
            }
            (_, None) => None,
        };

        if state.phase == Phase::AwaitingPieceSelection
            && state.active_board != position.player(state.to_move).next_board
        {
            return Err(invalid("active board does not match the declared next board".to_string()));
        }

        // A mid-turn import roots history at the imported position, so undo
        // lands there as a turn boundary.
        let base = Snapshot {
            position: position.clone(),
            to_move: state.to_move,
            status: state.status,
        };

        Ok(Game {
            config,
            position,
            to_move: state.to_move,
            phase: state.phase,
            status: state.status,
            active: state.active_board,
            focus,
            history: History::with_turns(base, state.turn),
        })
    }
}

fn invalid(msg: String) -> EngineError {
    EngineError::InvalidState(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Action, Direction};

    #[test]
    fn test_state_shape() {
        let game = Game::default();
        let state = game.state();
        assert_eq!(state.boards.len(), 3);
        assert_eq!(state.boards[1].timeline, Timeline::Present);
        assert_eq!(state.boards[0].white, 1);
        assert_eq!(state.players[0].name, "White");
        assert_eq!(state.players[1].clones, 4);
        assert_eq!(state.phase, Phase::AwaitingPieceSelection);
        assert_eq!(state.focus, None);
    }

    #[test]
    fn test_state_json_roundtrip_mid_turn() {
        let mut game = Game::default();
        game.apply_move(Player::One, Timeline::Past, 0, 0, Action::Slide(Direction::Down)).unwrap();

        let json = serde_json::to_string(&game.state()).unwrap();
        let parsed: GameState = serde_json::from_str(&json).unwrap();
        let rebuilt = Game::from_state(parsed).unwrap();

        assert_eq!(rebuilt.position(), game.position());
        assert_eq!(rebuilt.phase(), Phase::AwaitingAction2);
        assert_eq!(rebuilt.focus(), game.focus());
        let mut a = rebuilt.state();
        let mut b = game.state();
        a.can_undo = false;
        b.can_undo = false;
        assert_eq!(a, b);
    }

    #[test]
    fn test_import_rejects_bad_counters() {
        let mut state = Game::default().state();
        state.boards[2].black = 5;
        let err = Game::from_state(state).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));
    }

    #[test]
    fn test_import_rejects_duplicate_ids() {
        let mut state = Game::default().state();
        let piece = state.boards[0].cells[0][0];
        state.boards[0].cells[2][2] = piece;
        state.boards[0].white = 2;
        let err = Game::from_state(state).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));
    }

    #[test]
    fn test_import_rejects_exhausted_piece_ids() {
        let mut state = Game::default().state();
        state.next_piece_id = PieceId::MAX;
        let err = Game::from_state(state).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));
    }

    #[test]
    fn test_import_with_tight_piece_ids_can_clone() {
        let mut state = Game::default().state();
        state.next_piece_id = PieceId::MAX - 8;
        let mut game = Game::from_state(state).unwrap();

        game.apply_move(Player::One, Timeline::Past, 0, 0, Action::Slide(Direction::Down)).unwrap();
        game.apply_move(Player::One, Timeline::Past, 1, 0, Action::Jump).unwrap();
        game.declare_next_board(Player::One, Timeline::Future).unwrap();

        game.apply_move(Player::Two, Timeline::Future, 3, 3, Action::Slide(Direction::Up)).unwrap();
        game.apply_move(Player::Two, Timeline::Future, 2, 3, Action::Clone).unwrap();
        let copy = game.position().piece_at(Timeline::Present, Pos::from_row_col(2, 3)).unwrap();
        assert_eq!(copy.id, PieceId::MAX - 8);
        assert_eq!(game.position().next_piece_id(), PieceId::MAX - 7);
    }

    #[test]
    fn test_import_at_last_turn_number_keeps_playing() {
        let mut state = Game::default().state();
        state.turn = u32::MAX;
        let mut game = Game::from_state(state).unwrap();
        game.apply_move(Player::One, Timeline::Past, 0, 0, Action::Slide(Direction::Down)).unwrap();
        game.apply_move(Player::One, Timeline::Past, 1, 0, Action::Slide(Direction::Right)).unwrap();
        game.declare_next_board(Player::One, Timeline::Present).unwrap();
        assert_eq!(game.history().turns(), u32::MAX);
        assert_eq!(game.to_move(), Player::Two);
    }

    #[test]
    fn test_import_rejects_misordered_boards() {
        let mut state = Game::default().state();
        state.boards.swap(0, 2);
        assert!(Game::from_state(state).is_err());
    }
}
