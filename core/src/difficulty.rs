use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::*;

/// Named board difficulty, replacing the numeric `0.1/0.2/0.3` level.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Key used in storage (`bestTime_<key>`) and on the command line.
    pub const fn key(self) -> &'static str {
        use Difficulty::*;
        match self {
            Easy => "easy",
            Medium => "medium",
            Hard => "hard",
        }
    }

    /// Legacy numeric level, still found in older saved data.
    pub const fn level(self) -> f64 {
        use Difficulty::*;
        match self {
            Easy => 0.1,
            Medium => 0.2,
            Hard => 0.3,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|difficulty| difficulty.key() == key)
    }

    /// Nearest difficulty for a legacy numeric level, without relying on float equality.
    pub fn from_level(level: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|difficulty| (difficulty.level() - level).abs() < 0.05)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Easy
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        Self::from_key(s)
            .or_else(|| s.parse().ok().and_then(Self::from_level))
            .ok_or_else(|| format!("unknown difficulty {s:?}, expected easy, medium or hard"))
    }
}

/// Board shape and mine count for one difficulty.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyParams {
    pub rows: Coord,
    pub columns: Coord,
    pub mines: CellCount,
    /// Suggested on-screen size of one field, in points.
    pub block_size: u16,
}

impl DifficultyParams {
    pub const fn new(rows: Coord, columns: Coord, mines: CellCount, block_size: u16) -> Self {
        Self {
            rows,
            columns,
            mines,
            block_size,
        }
    }

    pub const fn total_fields(&self) -> CellCount {
        mult(self.rows, self.columns)
    }

    /// At least one field, and at least one of them left without a mine.
    pub const fn is_valid(&self) -> bool {
        self.rows > 0 && self.columns > 0 && self.mines < self.total_fields()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTable {
    pub easy: DifficultyParams,
    pub medium: DifficultyParams,
    pub hard: DifficultyParams,
}

impl DifficultyTable {
    pub const fn params(&self, difficulty: Difficulty) -> &DifficultyParams {
        use Difficulty::*;
        match difficulty {
            Easy => &self.easy,
            Medium => &self.medium,
            Hard => &self.hard,
        }
    }

    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        for difficulty in Difficulty::ALL {
            if !self.params(difficulty).is_valid() {
                return Err(ConfigError::InvalidDifficulty(difficulty));
            }
        }
        Ok(())
    }
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: DifficultyParams::new(6, 6, 5, 45),
            medium: DifficultyParams::new(9, 9, 17, 36),
            hard: DifficultyParams::new(12, 12, 29, 30),
        }
    }
}
