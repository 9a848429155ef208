//! Random-play fuzzing of the turn engine.
//!
//! Plays many seeded games with random legal choices, occasionally undoing,
//! and checks after every command that the cached counters match the grids.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use ttykm_core::{Action, Game, GameState, Phase, Player, Pos, Timeline};

const GAMES: u64 = 200;
const MAX_COMMANDS: usize = 400;

fn assert_consistent(game: &Game) {
    let position = game.position();
    for board in position.boards() {
        for player in Player::both() {
            let on_grid = board.pieces_of(player).count();
            assert_eq!(
                on_grid,
                board.count(player) as usize,
                "{:?} counter for {:?} drifted",
                board.timeline(),
                player
            );
        }
    }
}

/// Pieces of the player to move that have at least one action.
fn movable(game: &Game) -> Vec<(Pos, Vec<Action>)> {
    let board = game.active_board();
    game.position()
        .board(board)
        .pieces_of(game.to_move())
        .map(|(pos, _)| (pos, game.position().legal_actions(board, pos)))
        .filter(|(_, actions)| !actions.is_empty())
        .collect()
}

/// Issue one random legal command. Returns false once nothing is possible.
fn random_command(game: &mut Game, rng: &mut StdRng) -> bool {
    let player = game.to_move();
    match game.phase() {
        Phase::AwaitingPieceSelection | Phase::AwaitingAction1 => {
            let options = movable(game);
            let Some((pos, actions)) = options.choose(rng) else {
                return false;
            };
            let Some(&action) = actions.choose(rng) else {
                return false;
            };
            let board = game.active_board();
            game.apply_move(player, board, pos.row() as i32, pos.col() as i32, action)
                .expect("chosen action is legal");
        }
        Phase::AwaitingAction2 => {
            let Some((board, pos)) = game.focus() else {
                return false;
            };
            let actions = game.position().legal_actions(board, pos);
            let Some(&action) = actions.choose(rng) else {
                return false;
            };
            game.apply_move(player, board, pos.row() as i32, pos.col() as i32, action)
                .expect("chosen second action is legal");
        }
        Phase::AwaitingNextBoard => {
            let others: Vec<Timeline> = game.active_board().others().collect();
            let Some(&next) = others.choose(rng) else {
                return false;
            };
            game.declare_next_board(player, next).expect("declared board differs");
        }
    }
    true
}

#[test]
fn test_counters_match_grid_under_random_play() {
    let mut finished = 0;
    for seed in 0..GAMES {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = Game::default();

        for _ in 0..MAX_COMMANDS {
            if game.is_over() {
                finished += 1;
                break;
            }
            if rng.random_range(0..20) == 0 && game.can_undo() {
                game.undo().expect("undo allowed");
            } else if !random_command(&mut game, &mut rng) {
                break;
            }
            assert_consistent(&game);
        }
    }
    assert!(finished > 0, "no random game reached a result");
}

#[test]
fn test_undo_redo_walks_history_exactly() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut game = Game::default();
    let mut boundaries = vec![game.position().clone()];

    while boundaries.len() < 12 && !game.is_over() {
        let before = game.history().turns();
        if !random_command(&mut game, &mut rng) {
            break;
        }
        if game.history().turns() > before {
            boundaries.push(game.position().clone());
        }
    }
    if game.phase() != Phase::AwaitingPieceSelection {
        game.undo().expect("mid-turn undo");
    }

    let committed = game.history().turns() as usize;
    for expected in boundaries[..committed].iter().rev() {
        game.undo().expect("undo a committed turn");
        assert_eq!(game.position(), expected);
    }
    assert!(game.undo().is_err());

    for expected in boundaries[1..=committed].iter() {
        game.redo().expect("redo");
        assert_eq!(game.position(), expected);
    }
    assert!(game.redo().is_err());
}

#[test]
fn test_state_import_export_during_random_play() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut game = Game::default();

    for _ in 0..120 {
        if game.is_over() || !random_command(&mut game, &mut rng) {
            break;
        }
        let json = serde_json::to_string(&game.state()).expect("serialize");
        let parsed: GameState = serde_json::from_str(&json).expect("deserialize");
        let rebuilt = Game::from_state(parsed).expect("exported state imports");
        assert_eq!(rebuilt.position(), game.position());
        assert_eq!(rebuilt.phase(), game.phase());
        assert_eq!(rebuilt.status(), game.status());
        assert_eq!(rebuilt.focus(), game.focus());
    }
}
