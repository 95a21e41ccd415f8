use std::collections::VecDeque;
use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// How far [`Board::open_field`] may cascade through zero-count fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpenDepth {
    Unbounded,
    Limited(u32),
}

impl OpenDepth {
    const fn can_cascade(self) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Limited(depth) => depth > 0,
        }
    }

    const fn decrement(self) -> Self {
        match self {
            Self::Unbounded => Self::Unbounded,
            Self::Limited(depth) => Self::Limited(depth.saturating_sub(1)),
        }
    }
}

impl Default for OpenDepth {
    fn default() -> Self {
        Self::Unbounded
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Rectangular grid of [`Field`]s, indexed by `(row, column)`.
///
/// Cloning is a deep, field-level copy, which is what the state machine relies on to keep earlier snapshots intact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    fields: Array2<Field>,
}

impl Board {
    /// Grid of closed, unflagged, unmined fields.
    pub fn new(rows: Coord, columns: Coord) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(GameError::EmptyBoard);
        }
        let fields = Array2::from_shape_fn((rows.into(), columns.into()), |(row, column)| {
            // both fit in Coord because the shape does
            Field::new(Position::new(row as Coord, column as Coord))
        });
        Ok(Self { fields })
    }

    /// Builds a board with mines exactly at `mines` and neighbor counts already computed.
    pub fn with_mines(rows: Coord, columns: Coord, mines: &[Position]) -> Result<Self> {
        let mut board = Self::new(rows, columns)?;
        for &position in mines {
            let position = board.validate(position)?;
            board.fields[position.to_nd_index()].mined = true;
        }
        board.compute_near_mines();
        Ok(board)
    }

    pub fn rows(&self) -> Coord {
        // construction guarantees the dimensions fit
        self.fields.dim().0 as Coord
    }

    pub fn columns(&self) -> Coord {
        self.fields.dim().1 as Coord
    }

    /// Board size as a position one past the last row and column.
    pub fn bounds(&self) -> Position {
        Position::new(self.rows(), self.columns())
    }

    pub fn total_fields(&self) -> CellCount {
        mult(self.rows(), self.columns())
    }

    pub fn validate(&self, position: Position) -> Result<Position> {
        if position.row < self.rows() && position.column < self.columns() {
            Ok(position)
        } else {
            Err(GameError::OutOfBounds {
                row: position.row,
                column: position.column,
                rows: self.rows(),
                columns: self.columns(),
            })
        }
    }

    pub fn get(&self, position: Position) -> Option<&Field> {
        self.validate(position)
            .ok()
            .map(|position| &self.fields[position.to_nd_index()])
    }

    /// Fields in row-major order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn iter_neighbors(&self, position: Position) -> NeighborIter {
        self.fields.iter_neighbors(position)
    }

    pub fn mine_count(&self) -> CellCount {
        self.count_where(|field| field.mined)
    }

    /// Fields that are neither mined nor excluded, i.e. where another mine could still go.
    pub fn free_positions(&self, excluded: &[Position]) -> Vec<Position> {
        self.fields
            .iter()
            .filter(|field| !field.mined && !excluded.contains(&field.position()))
            .map(Field::position)
            .collect()
    }

    pub(crate) fn set_mined(&mut self, position: Position) {
        self.fields[position.to_nd_index()].mined = true;
    }

    /// Sets every field's `near_mines` from the current mine layout. Running it twice gives the same result.
    pub fn compute_near_mines(&mut self) {
        let counts = self.fields.map(|field| {
            self.iter_neighbors(field.position())
                .filter(|&pos| self[pos].mined)
                .count() as u8
        });
        self.fields
            .zip_mut_with(&counts, |field, &count| field.near_mines = count);
    }

    /// Opens a field and cascades through zero-count neighbors, at most `depth` steps away.
    ///
    /// Opened or flagged fields are left alone. A mined field explodes and never cascades.
    pub fn open_field(&mut self, position: Position, depth: OpenDepth) -> Result<RevealOutcome> {
        let position = self.validate(position)?;

        let target = self[position];
        if target.opened || target.flagged {
            return Ok(RevealOutcome::NoChange);
        }

        if target.mined {
            let field = &mut self.fields[position.to_nd_index()];
            field.opened = true;
            field.exploded = true;
            log::debug!("mine exploded at {:?}", position);
            return Ok(RevealOutcome::HitMine);
        }

        let mut to_visit = VecDeque::from([(position, depth)]);
        while let Some((visit, remaining)) = to_visit.pop_front() {
            let field = &mut self.fields[visit.to_nd_index()];
            if field.opened || field.flagged {
                continue;
            }
            field.opened = true;

            if field.near_mines == 0 && remaining.can_cascade() {
                let next: SmallVec<[Position; 8]> = self
                    .iter_neighbors(visit)
                    .filter(|&pos| !self[pos].opened && !self[pos].flagged)
                    .collect();
                to_visit.extend(next.into_iter().map(|pos| (pos, remaining.decrement())));
            }
        }

        Ok(RevealOutcome::Revealed)
    }

    /// Flips the flag on a closed field; opened fields are not touched.
    pub fn toggle_flag(&mut self, position: Position) -> Result<MarkOutcome> {
        let position = self.validate(position)?;
        let field = &mut self.fields[position.to_nd_index()];
        if field.opened {
            return Ok(MarkOutcome::NoChange);
        }
        field.flagged = !field.flagged;
        Ok(MarkOutcome::Changed)
    }

    pub fn had_explosion(&self) -> bool {
        self.fields.iter().any(|field| field.exploded)
    }

    /// True when no field is pending: every mine flagged and every safe field opened.
    pub fn is_won(&self) -> bool {
        self.fields.iter().all(|field| !field.is_pending())
    }

    /// True when every safe field is opened and nothing exploded, whether or not mines carry flags.
    pub fn is_cleared(&self) -> bool {
        !self.had_explosion()
            && self
                .fields
                .iter()
                .all(|field| field.mined || field.opened)
    }

    /// Opens every mined field so a lost board shows where the mines were.
    pub fn reveal_mines(&mut self) {
        self.fields
            .iter_mut()
            .filter(|field| field.mined)
            .for_each(|field| field.opened = true);
    }

    pub fn count_flags(&self) -> CellCount {
        self.count_where(|field| field.flagged)
    }

    /// First safe starting field in row-major order, if the board has any.
    pub fn first_safe_start(&self) -> Option<Position> {
        self.fields
            .iter()
            .find(|field| field.is_safe_start())
            .map(Field::position)
    }

    /// First unmined field in row-major order, if the board has any.
    pub fn first_unmined(&self) -> Option<Position> {
        self.fields
            .iter()
            .find(|field| !field.mined)
            .map(Field::position)
    }

    fn count_where(&self, predicate: impl Fn(&Field) -> bool) -> CellCount {
        // a board never holds more than Coord::MAX^2 fields
        self.fields.iter().filter(|field| predicate(field)).count() as CellCount
    }
}

impl Index<Position> for Board {
    type Output = Field;

    fn index(&self, position: Position) -> &Self::Output {
        &self.fields[position.to_nd_index()]
    }
}
