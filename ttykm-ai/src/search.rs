//! Alpha-beta minimax over whole turns, plus satisficing root selection.
//!
//! Each tree level is one complete turn. Scores are always from the AI's point
//! of view: the AI maximizes, its opponent minimizes.

use rand::seq::IndexedRandom;
use rand::Rng;
use rayon::prelude::*;
use tracing::trace;

use ttykm_core::{Player, Position, TurnPlan};

use crate::config::Difficulty;
use crate::heuristic::evaluate;
use crate::movegen::{self, Turn};
use crate::stats::SearchStats;

/// Magnitude of a decided game. Heuristic scores stay far below it.
pub const WIN_SCORE: i32 = 1_000_000;

/// A root turn with its exact minimax score.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ScoredTurn {
    pub plan: TurnPlan,
    pub score: i32,
}

/// Depth-limited alpha-beta searcher for one side.
pub struct Searcher {
    ai: Player,
    pub stats: SearchStats,
}

impl Searcher {
    pub fn new(ai: Player) -> Self {
        Self {
            ai,
            stats: SearchStats::default(),
        }
    }

    /// Score for a side that has run out of turns, preferring later losses.
    fn stuck_score(&self, to_move: Player, depth: u8) -> i32 {
        if to_move == self.ai {
            -WIN_SCORE - depth as i32
        } else {
            WIN_SCORE + depth as i32
        }
    }

    /// Score for a finished game, preferring quicker wins.
    fn won_score(&self, winner: Player, depth: u8) -> i32 {
        if winner == self.ai {
            WIN_SCORE + depth as i32
        } else {
            -WIN_SCORE - depth as i32
        }
    }

    /// Score one turn played at a node with `depth` turns left.
    pub fn score_turn(&mut self, turn: &Turn, mover: Player, depth: u8, alpha: i32, beta: i32) -> i32 {
        match turn.winner {
            Some(winner) => {
                self.stats.terminal_positions += 1;
                self.won_score(winner, depth)
            }
            None => self.alphabeta(&turn.child, mover.opponent(), depth.saturating_sub(1), alpha, beta),
        }
    }

    /// Minimax value of `position` with `to_move` about to start a turn.
    pub fn alphabeta(&mut self, position: &Position, to_move: Player, depth: u8, mut alpha: i32, mut beta: i32) -> i32 {
        if depth == 0 {
            if !movegen::has_turn(position, to_move) {
                self.stats.terminal_positions += 1;
                return self.stuck_score(to_move, depth);
            }
            self.stats.leaves += 1;
            return evaluate(position, self.ai);
        }

        let turns = movegen::turns(position, to_move);
        if turns.is_empty() {
            self.stats.terminal_positions += 1;
            return self.stuck_score(to_move, depth);
        }
        self.stats.nodes += 1;

        let maximizing = to_move == self.ai;
        let mut best = if maximizing { i32::MIN } else { i32::MAX };

        for turn in &turns {
            let score = self.score_turn(turn, to_move, depth, alpha, beta);
            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if alpha >= beta {
                self.stats.cutoffs += 1;
                trace!(depth, "cutoff");
                break;
            }
        }
        best
    }
}

/// Exact scores for every root turn of `ai` in `position`.
///
/// Each root gets a full window so the tier filter compares true values.
/// With `parallel` the roots are spread over the rayon pool, each worker
/// owning its own searcher and cloned positions.
pub fn score_roots(position: &Position, ai: Player, depth: u8, parallel: bool) -> (Vec<ScoredTurn>, SearchStats) {
    let mut stats = SearchStats::new();
    let roots = movegen::turns(position, ai);
    stats.root_turns = roots.len() as u64;

    let score_one = |turn: &Turn| {
        let mut searcher = Searcher::new(ai);
        let score = searcher.score_turn(turn, ai, depth, i32::MIN, i32::MAX);
        (ScoredTurn { plan: turn.plan, score }, searcher.stats)
    };

    let results: Vec<(ScoredTurn, SearchStats)> = if parallel {
        roots.par_iter().map(score_one).collect()
    } else {
        roots.iter().map(score_one).collect()
    };

    let scored = results
        .into_iter()
        .map(|(scored, worker)| {
            stats.merge(&worker);
            scored
        })
        .collect();
    stats.finish();
    (scored, stats)
}

/// Root turns good enough to be played at `difficulty`.
///
/// A turn survives when it scores at least `best - |best| * (1 - factor)`,
/// which keeps the best turn for negative scores too.
pub fn survivors(scored: &[ScoredTurn], difficulty: Difficulty) -> Vec<ScoredTurn> {
    let Some(best) = scored.iter().map(|s| s.score).max() else {
        return Vec::new();
    };
    match difficulty.keep_factor() {
        None => scored.to_vec(),
        Some(factor) => {
            let best = best as f64;
            let threshold = best - best.abs() * (1.0 - factor);
            scored
                .iter()
                .copied()
                .filter(|s| s.score as f64 >= threshold)
                .collect()
        }
    }
}

/// Pick uniformly among the survivors.
pub fn select<R: Rng + ?Sized>(scored: &[ScoredTurn], difficulty: Difficulty, rng: &mut R) -> Option<ScoredTurn> {
    survivors(scored, difficulty).choose(rng).copied()
}
