use serde::{Deserialize, Serialize};

use crate::*;

/// One cell of the board.
///
/// Coordinates never change after creation, `mined` is fixed once mines are placed and `opened` only ever goes from
/// `false` to `true`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub(crate) row: Coord,
    pub(crate) column: Coord,
    pub(crate) mined: bool,
    pub(crate) opened: bool,
    pub(crate) flagged: bool,
    pub(crate) exploded: bool,
    pub(crate) near_mines: u8,
}

impl Field {
    pub(crate) const fn new(position: Position) -> Self {
        Self {
            row: position.row,
            column: position.column,
            mined: false,
            opened: false,
            flagged: false,
            exploded: false,
            near_mines: 0,
        }
    }

    pub const fn row(&self) -> Coord {
        self.row
    }

    pub const fn column(&self) -> Coord {
        self.column
    }

    pub const fn position(&self) -> Position {
        Position::new(self.row, self.column)
    }

    pub const fn is_mined(&self) -> bool {
        self.mined
    }

    pub const fn is_opened(&self) -> bool {
        self.opened
    }

    pub const fn is_flagged(&self) -> bool {
        self.flagged
    }

    pub const fn is_exploded(&self) -> bool {
        self.exploded
    }

    pub const fn near_mines(&self) -> u8 {
        self.near_mines
    }

    /// Still blocks a win: an unflagged mine or a safe field that was not opened.
    pub const fn is_pending(&self) -> bool {
        (self.mined && !self.flagged) || (!self.mined && !self.opened)
    }

    /// Safe starting candidate: no mine on it and none around it.
    pub const fn is_safe_start(&self) -> bool {
        !self.mined && self.near_mines == 0
    }
}
