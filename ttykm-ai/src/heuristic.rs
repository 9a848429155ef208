//! Static evaluation from one player's point of view.

use ttykm_core::{Player, Position};

/// Cell weight: corners are cramped, the centre four are the strongest squares.
const CORNER: i32 = -2;
const EDGE: i32 = 0;
const INTERIOR: i32 = 2;

const MATERIAL_WEIGHT: i32 = 2;
const BOARD_LEAD_WEIGHT: i32 = 10;

/// Heuristic score of `position` for `player`. Higher is better for `player`.
pub fn evaluate(position: &Position, player: Player) -> i32 {
    let opponent = player.opponent();

    let material =
        position.player(player).clones as i32 + MATERIAL_WEIGHT * position.total_count(player) as i32;

    let placement: i32 = position
        .boards()
        .iter()
        .flat_map(|board| board.pieces_of(player))
        .map(|(pos, _)| {
            if pos.is_corner() {
                CORNER
            } else if pos.is_edge() {
                EDGE
            } else {
                INTERIOR
            }
        })
        .sum();

    let presence = match position.occupied_boards(player) {
        1 => -2,
        2 => 2,
        3 => 4,
        _ => 0,
    };

    let lead: i32 = position
        .boards()
        .iter()
        .map(|board| board.count(player) as i32 - board.count(opponent) as i32)
        .sum();

    material + placement + presence + BOARD_LEAD_WEIGHT * lead
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttykm_core::{GameConfig, Pos, Timeline};

    #[test]
    fn test_opening_is_symmetric() {
        let position = ttykm_core::Position::new(&GameConfig::default());
        // 4 clones + 2*3 pieces + 3 corners * -2 + presence 4 + lead 0
        assert_eq!(evaluate(&position, Player::One), 4 + 6 - 6 + 4);
        assert_eq!(evaluate(&position, Player::One), evaluate(&position, Player::Two));
    }

    #[test]
    fn test_interior_beats_corner() {
        let mut corner = Position::empty(0);
        corner.spawn(Timeline::Present, Pos::from_row_col(0, 0), Player::One);
        let mut centre = Position::empty(0);
        centre.spawn(Timeline::Present, Pos::from_row_col(1, 2), Player::One);
        assert_eq!(evaluate(&centre, Player::One) - evaluate(&corner, Player::One), 4);
    }

    #[test]
    fn test_piece_lead_dominates() {
        let mut position = Position::empty(0);
        position.spawn(Timeline::Past, Pos::from_row_col(1, 1), Player::One);
        position.spawn(Timeline::Past, Pos::from_row_col(2, 2), Player::One);
        position.spawn(Timeline::Past, Pos::from_row_col(0, 3), Player::Two);
        let white = evaluate(&position, Player::One);
        let black = evaluate(&position, Player::Two);
        assert!(white > black);
        // 0 clones + 4 material + 4 placement - 2 presence + 10 lead
        assert_eq!(white, 16);
    }
}
