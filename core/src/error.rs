use thiserror::Error;

use crate::{CellCount, Coord, Difficulty, Rank};

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Position ({row}, {column}) is outside the {rows}x{columns} board")]
    OutOfBounds {
        row: Coord,
        column: Coord,
        rows: Coord,
        columns: Coord,
    },
    #[error("Cannot place {requested} mines, only {available} free fields")]
    TooManyMines {
        requested: CellCount,
        available: CellCount,
    },
    #[error("Board must have at least one row and one column")]
    EmptyBoard,
}

pub type Result<T> = core::result::Result<T, GameError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt stored data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not parse rules: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Difficulty {0:?} must be at least 1x1 with at least one mine-free field")]
    InvalidDifficulty(Difficulty),
    #[error("Rank {0} needs at least one victory to be promoted")]
    InvalidThreshold(Rank),
}
