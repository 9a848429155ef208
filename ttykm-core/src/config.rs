//! Game setup options.

use serde::{Deserialize, Serialize};

use crate::Player;

/// Starting clone tokens per player.
pub const DEFAULT_CLONE_TOKENS: u8 = 4;

/// Initial piece layout.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Opening {
    /// White at (0,0) and Black at (3,3) on each of the three boards.
    #[default]
    Classic,
    /// White only at Past (0,0), Black only at Future (3,3).
    ///
    /// Each side starts on a single board, so whichever player acts first
    /// wins as soon as their first action is applied.
    Sparse,
}

impl std::str::FromStr for Opening {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classic" => Ok(Opening::Classic),
            "sparse" => Ok(Opening::Sparse),
            other => Err(format!("unknown opening '{}'", other)),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub opening: Opening,
    pub clone_tokens: u8,
    pub first_player: Player,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            opening: Opening::Classic,
            clone_tokens: DEFAULT_CLONE_TOKENS,
            first_player: Player::One,
        }
    }
}
