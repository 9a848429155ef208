//! Search configuration.

use serde::{Deserialize, Serialize};

/// Deepest search, in full turns.
pub const MAX_DEPTH: u8 = 3;

/// How far below the best root score a move may fall and still be played.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Monotonic mapping from a numeric level: 0-1 easy, 2 medium, 3+ hard.
    pub fn from_level(level: u8) -> Difficulty {
        match level {
            0 | 1 => Difficulty::Easy,
            2 => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }

    /// Fraction of the best score a move must keep, `None` for no filtering.
    pub fn keep_factor(self) -> Option<f64> {
        match self {
            Difficulty::Easy => None,
            Difficulty::Medium => Some(0.5),
            Difficulty::Hard => Some(0.95),
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => other
                .parse::<u8>()
                .map(Difficulty::from_level)
                .map_err(|_| format!("unknown difficulty '{}'", other)),
        }
    }
}

/// Per-call search settings. Nothing about the AI lives in globals.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Full turns to look ahead, 1..=MAX_DEPTH.
    pub depth: u8,
    pub difficulty: Difficulty,
    /// Score root turns on the rayon pool.
    pub parallel: bool,
}

impl AiConfig {
    pub fn from_level(level: u8) -> AiConfig {
        AiConfig {
            depth: level.clamp(1, MAX_DEPTH),
            difficulty: Difficulty::from_level(level),
            parallel: true,
        }
    }

    pub fn new(depth: u8, difficulty: Difficulty) -> AiConfig {
        AiConfig {
            depth: depth.clamp(1, MAX_DEPTH),
            difficulty,
            parallel: true,
        }
    }

    pub fn sequential(mut self) -> AiConfig {
        self.parallel = false;
        self
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig::from_level(2)
    }
}
