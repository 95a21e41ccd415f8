use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::*;

/// Best casual time per difficulty, in seconds.
pub type BestTimes = BTreeMap<Difficulty, f64>;

/// Snapshot of a whole play session.
///
/// Snapshots are never mutated in place: every transition builds a new one, and the board is shared between snapshots
/// until a transition deep-clones it to make a move.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub board: Option<Arc<Board>>,
    /// Field opened by the last `NewGame`.
    pub start_position: Option<Position>,
    pub won: bool,
    pub lost: bool,
    pub game_started: bool,
    pub is_win: bool,
    pub game_over_visible: bool,
    pub level: Difficulty,
    pub mode: Mode,
    pub ranking: Rank,
    pub victories_count: u32,
    pub countdown_time: Option<u32>,
    pub score: u32,
    pub best_times: BestTimes,
    pub promotion_visible: bool,
    pub previous_ranking: Option<Rank>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Won or lost; moves are rejected until the next `NewGame`.
    pub const fn is_finished(&self) -> bool {
        self.won || self.lost
    }

    /// Difficulty the next board is built with: the rank's in competitive mode, the selected level otherwise.
    pub fn effective_difficulty(&self, rules: &Rules) -> Difficulty {
        match self.mode {
            Mode::Competitive => rules.policy(self.ranking).difficulty,
            Mode::Casual => self.level,
        }
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_deref()
    }

    pub fn best_time(&self, difficulty: Difficulty) -> Option<f64> {
        self.best_times.get(&difficulty).copied()
    }

    /// Mines not yet covered by a flag; negative when more flags than mines are placed.
    pub fn mines_left(&self) -> i32 {
        self.board().map_or(0, |board| {
            i32::from(board.mine_count()) - i32::from(board.count_flags())
        })
    }

    /// Competitive progress worth keeping across app restarts.
    pub fn session(&self) -> SavedSession {
        SavedSession {
            ranking: self.ranking,
            victories_count: self.victories_count,
            score: self.score,
            level: self.level,
            previous_ranking: self.previous_ranking,
        }
    }
}

/// Competitive progress as stored under the `gameState` key.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSession {
    pub ranking: Rank,
    pub victories_count: u32,
    pub score: u32,
    pub level: Difficulty,
    pub previous_ranking: Option<Rank>,
}
