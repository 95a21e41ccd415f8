use serde::{Deserialize, Serialize};

use crate::*;

/// How the first, guaranteed-safe opening of a new board is chosen.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafeStartPolicy {
    /// Random candidates tried before scanning the board in order.
    pub attempts: u32,
    /// Cascade depth of the opening move.
    pub depth: u32,
}

impl Default for SafeStartPolicy {
    fn default() -> Self {
        Self {
            attempts: 1000,
            depth: 1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinCondition {
    /// Every mine flagged and every safe field opened.
    FlagAllMines,
    /// Every safe field opened, flags optional.
    OpenAllSafe,
}

impl WinCondition {
    pub fn is_met(self, board: &Board) -> bool {
        match self {
            Self::FlagAllMines => board.is_won(),
            Self::OpenAllSafe => board.is_cleared(),
        }
    }
}

impl Default for WinCondition {
    fn default() -> Self {
        Self::FlagAllMines
    }
}

/// Every tunable table the state machine consults.
///
/// Missing sections fall back to the defaults, so a rules file only needs the values it changes:
///
/// ```toml
/// [ranks.beginner]
/// difficulty = "easy"
/// victories_needed = 5
/// countdown = 300
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub difficulties: DifficultyTable,
    pub ranks: RankTable,
    pub scoring: ScoringPolicy,
    pub safe_start: SafeStartPolicy,
    pub win_condition: WinCondition,
}

impl Rules {
    pub fn from_toml_str(text: &str) -> core::result::Result<Self, ConfigError> {
        let rules: Self = toml::from_str(text)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        self.difficulties.validate()?;
        self.ranks.validate()
    }

    pub fn params(&self, difficulty: Difficulty) -> &DifficultyParams {
        self.difficulties.params(difficulty)
    }

    pub fn policy(&self, rank: Rank) -> &RankPolicy {
        self.ranks.policy(rank)
    }
}
