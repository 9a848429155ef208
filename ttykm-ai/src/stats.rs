//! Search statistics.

use std::time::{Duration, Instant};

use tracing::info;

/// Counters collected during one AI decision.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Interior nodes whose turns were generated
    pub nodes: u64,

    /// Positions scored by the heuristic
    pub leaves: u64,

    /// Won or stuck positions
    pub terminal_positions: u64,

    /// Branches cut by alpha-beta
    pub cutoffs: u64,

    /// Root turns considered
    pub root_turns: u64,

    pub elapsed: Duration,

    start_time: Option<Instant>,
}

impl SearchStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Fold a worker's counters into this one.
    pub fn merge(&mut self, other: &SearchStats) {
        self.nodes += other.nodes;
        self.leaves += other.leaves;
        self.terminal_positions += other.terminal_positions;
        self.cutoffs += other.cutoffs;
    }

    /// Stop the clock.
    pub fn finish(&mut self) {
        if let Some(start) = self.start_time.take() {
            self.elapsed = start.elapsed();
        }
    }

    pub fn positions(&self) -> u64 {
        self.nodes + self.leaves + self.terminal_positions
    }

    pub fn positions_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.positions() as f64 / secs
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        info!(
            roots = self.root_turns,
            nodes = self.nodes,
            leaves = self.leaves,
            terminal = self.terminal_positions,
            cutoffs = self.cutoffs,
            elapsed_ms = self.elapsed.as_millis() as u64,
            per_sec = self.positions_per_sec() as u64,
            "search complete"
        );
    }
}
