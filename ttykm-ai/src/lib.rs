//! Search-based opponent for That Time You Killed Me.
//!
//! [`request_ai_move`] scores every whole turn available to the player with
//! depth-limited alpha-beta, drops the turns that fall too far below the best
//! for the configured [`Difficulty`], and samples one of the rest with the
//! caller's random source.

pub mod config;
pub mod heuristic;
pub mod movegen;
pub mod search;
pub mod stats;

use rand::Rng;
use tracing::{debug, info};

use ttykm_core::{EngineError, EngineResult, Game, Phase, Player, Position, TurnPlan};

pub use config::{AiConfig, Difficulty, MAX_DEPTH};
pub use search::{ScoredTurn, WIN_SCORE};
pub use stats::SearchStats;

/// What the AI decided for its turn.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AiDecision {
    Play { plan: TurnPlan, score: i32 },
    /// The player has no legal turn, which loses the game.
    NoLegalTurn { winner: Player },
}

/// Full result of one decision, for callers that want the numbers.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub decision: AiDecision,
    pub scored: Vec<ScoredTurn>,
    pub stats: SearchStats,
}

/// Choose a turn for `player` in `position`.
pub fn choose_turn<R: Rng + ?Sized>(
    position: &Position,
    player: Player,
    config: &AiConfig,
    rng: &mut R,
) -> SearchReport {
    let (scored, stats) = search::score_roots(position, player, config.depth, config.parallel);
    stats.log_summary();

    let decision = match search::select(&scored, config.difficulty, rng) {
        Some(choice) => AiDecision::Play {
            plan: choice.plan,
            score: choice.score,
        },
        None => AiDecision::NoLegalTurn {
            winner: player.opponent(),
        },
    };
    debug!(?decision, candidates = scored.len(), "ai decision");

    SearchReport { decision, scored, stats }
}

/// Check that `player` may hand the current turn to the AI.
///
/// The AI only plans from a turn boundary: calling it mid-turn is an
/// `InvalidSelection`, out of turn a `NotYourTurn`.
pub fn check_ai_turn(game: &Game, player: Player) -> EngineResult<()> {
    if game.is_over() {
        return Err(EngineError::GameAlreadyOver);
    }
    if player != game.to_move() {
        return Err(EngineError::NotYourTurn(player));
    }
    if game.phase() != Phase::AwaitingPieceSelection {
        return Err(EngineError::InvalidSelection(
            "the AI plays whole turns and the current turn has started".to_string(),
        ));
    }
    Ok(())
}

/// Ask the AI for a whole turn. The game is not modified.
pub fn request_ai_move<R: Rng + ?Sized>(
    game: &Game,
    player: Player,
    config: &AiConfig,
    rng: &mut R,
) -> EngineResult<AiDecision> {
    check_ai_turn(game, player)?;

    info!(
        player = player.name(),
        depth = config.depth,
        difficulty = ?config.difficulty,
        "ai thinking"
    );
    Ok(choose_turn(game.position(), player, config, rng).decision)
}
