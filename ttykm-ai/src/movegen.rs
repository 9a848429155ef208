//! Whole-turn enumeration for the search.
//!
//! A turn is one piece on the mover's declared board, a first action, a second
//! action when the piece still has one, and a next-board declaration. Every
//! generated turn carries the position it produces, computed on a clone.

use ttykm_core::{Move, Player, Position, Timeline, TurnPlan};

/// A legal turn and its result.
#[derive(Clone, Debug)]
pub struct Turn {
    pub plan: TurnPlan,
    pub child: Position,
    /// Set when the turn ends the game before the next-board declaration.
    pub winner: Option<Player>,
}

/// All legal turns for `player` from a turn boundary.
pub fn turns(position: &Position, player: Player) -> Vec<Turn> {
    let board = position.player(player).next_board;
    let mut out = Vec::new();

    for (from, _) in position.board(board).pieces_of(player) {
        for first in position.legal_actions(board, from) {
            let mut after_first = position.clone();
            let Ok(report) = after_first.apply(Move::new(board, from, first)) else {
                continue;
            };
            let base = TurnPlan {
                board,
                from,
                first,
                second: None,
                next_board: board,
            };

            if let Some(winner) = after_first.winner(player) {
                out.push(terminal(base, after_first, winner, board));
                continue;
            }

            let Some((t, pos)) = report.focus else {
                declare(&mut out, base, after_first, player, board);
                continue;
            };
            let seconds = after_first.legal_actions(t, pos);
            if seconds.is_empty() {
                declare(&mut out, base, after_first, player, t);
                continue;
            }

            for second in seconds {
                let mut after_second = after_first.clone();
                let Ok(report) = after_second.apply(Move::new(t, pos, second)) else {
                    continue;
                };
                let plan = TurnPlan { second: Some(second), ..base };
                let end_board = report.focus.map_or(t, |(end, _)| end);

                match after_second.winner(player) {
                    Some(winner) => out.push(terminal(plan, after_second, winner, end_board)),
                    None => declare(&mut out, plan, after_second, player, end_board),
                }
            }
        }
    }
    out
}

/// True if `player` has at least one turn, without building them.
pub fn has_turn(position: &Position, player: Player) -> bool {
    position.has_legal_action(player, position.player(player).next_board)
}

fn terminal(plan: TurnPlan, child: Position, winner: Player, end_board: Timeline) -> Turn {
    // The declaration is never played once the game is won; any other board will do.
    let next_board = end_board.others().next().unwrap_or(end_board);
    Turn {
        plan: TurnPlan { next_board, ..plan },
        child,
        winner: Some(winner),
    }
}

fn declare(out: &mut Vec<Turn>, plan: TurnPlan, position: Position, player: Player, end_board: Timeline) {
    for next_board in end_board.others() {
        let mut child = position.clone();
        child.player_mut(player).next_board = next_board;
        out.push(Turn {
            plan: TurnPlan { next_board, ..plan },
            child,
            winner: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttykm_core::{Action, Direction, Game, GameConfig, Opening, Pos};

    #[test]
    fn test_opening_turn_count() {
        let game = Game::default();
        let all = turns(game.position(), Player::One);
        // White's Past piece: Down or Right first (Jump is blocked by
        // Present (0,0)), then every second action, then two boards.
        assert!(!all.is_empty());
        assert!(all.iter().all(|t| t.plan.board == Timeline::Past));
        assert!(all.iter().all(|t| t.plan.from == Pos::from_row_col(0, 0)));
        assert!(all.iter().all(|t| t.winner.is_none()));
        assert!(all.iter().all(|t| t.plan.second.is_some()));
        assert!(all
            .iter()
            .all(|t| t.child.player(Player::One).next_board == t.plan.next_board));
    }

    #[test]
    fn test_every_plan_replays_through_game() {
        let game = Game::default();
        for turn in turns(game.position(), Player::One) {
            let mut replay = game.clone();
            replay
                .apply_turn(Player::One, &turn.plan)
                .expect("generated turn is legal");
            assert_eq!(replay.position(), &turn.child);
        }
    }

    #[test]
    fn test_winning_first_action_stops_turn() {
        let config = GameConfig {
            opening: Opening::Sparse,
            ..GameConfig::default()
        };
        let game = Game::new(config);
        let all = turns(game.position(), Player::One);
        let jump = all
            .iter()
            .find(|t| t.plan.first == Action::Jump)
            .expect("jump is available");
        assert_eq!(jump.winner, Some(Player::One));
        assert_eq!(jump.plan.second, None);

        // Sliding keeps White on a single board, which is still a win for the mover.
        let slide = all
            .iter()
            .find(|t| t.plan.first == Action::Slide(Direction::Down))
            .expect("slide is available");
        assert_eq!(slide.winner, Some(Player::One));
    }

    #[test]
    fn test_no_pieces_no_turns() {
        let mut position = Position::empty(4);
        position.spawn(Timeline::Future, Pos::from_row_col(1, 1), Player::One);
        assert!(turns(&position, Player::One).is_empty());
        assert!(!has_turn(&position, Player::One));
    }
}
