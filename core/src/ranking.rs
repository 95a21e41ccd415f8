use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Casual,
    Competitive,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Competitive
    }
}

/// Competitive tier, in promotion order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Beginner,
    Amateur,
    Expert,
    MinefieldKing,
}

impl Rank {
    pub const ALL: [Self; 4] = [
        Self::Beginner,
        Self::Amateur,
        Self::Expert,
        Self::MinefieldKing,
    ];

    /// Rank reached by promotion, `None` at the top.
    pub const fn next(self) -> Option<Self> {
        use Rank::*;
        match self {
            Beginner => Some(Amateur),
            Amateur => Some(Expert),
            Expert => Some(MinefieldKing),
            MinefieldKing => None,
        }
    }

    /// The top rank plays for score instead of promotion.
    pub const fn is_top(self) -> bool {
        self.next().is_none()
    }

    pub const fn label(self) -> &'static str {
        use Rank::*;
        match self {
            Beginner => "Beginner",
            Amateur => "Amateur",
            Expert => "Expert",
            MinefieldKing => "Minefield King",
        }
    }
}

impl Default for Rank {
    fn default() -> Self {
        Self::Beginner
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankPolicy {
    /// Board played while holding this rank.
    pub difficulty: Difficulty,
    /// Wins needed to leave this rank. Ignored at the top rank.
    pub victories_needed: u32,
    /// Seconds on the clock per game, `None` for untimed ranks.
    pub countdown: Option<u32>,
}

impl RankPolicy {
    pub const fn new(difficulty: Difficulty, victories_needed: u32, countdown: Option<u32>) -> Self {
        Self {
            difficulty,
            victories_needed,
            countdown,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankTable {
    pub beginner: RankPolicy,
    pub amateur: RankPolicy,
    pub expert: RankPolicy,
    pub minefield_king: RankPolicy,
}

impl RankTable {
    pub const fn policy(&self, rank: Rank) -> &RankPolicy {
        use Rank::*;
        match rank {
            Beginner => &self.beginner,
            Amateur => &self.amateur,
            Expert => &self.expert,
            MinefieldKing => &self.minefield_king,
        }
    }

    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        match Rank::ALL
            .into_iter()
            .find(|&rank| !rank.is_top() && self.policy(rank).victories_needed == 0)
        {
            Some(rank) => Err(ConfigError::InvalidThreshold(rank)),
            None => Ok(()),
        }
    }
}

impl Default for RankTable {
    fn default() -> Self {
        use Difficulty::*;
        Self {
            beginner: RankPolicy::new(Easy, 1, None),
            amateur: RankPolicy::new(Medium, 1, None),
            expert: RankPolicy::new(Hard, 1, Some(210)),
            minefield_king: RankPolicy::new(Hard, 0, Some(180)),
        }
    }
}

/// Points won and lost while holding the top rank.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub win_points: u32,
    pub loss_penalty: u32,
    pub exit_penalty: u32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            win_points: 3,
            loss_penalty: 1,
            exit_penalty: 1,
        }
    }
}
