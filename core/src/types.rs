use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Single coordinate axis used for board rows, columns and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-field counts.
pub type CellCount = u16;

/// Location of a field on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: Coord,
    pub column: Coord,
}

impl Position {
    pub const fn new(row: Coord, column: Coord) -> Self {
        Self { row, column }
    }
}

impl From<(Coord, Coord)> for Position {
    fn from((row, column): (Coord, Coord)) -> Self {
        Self { row, column }
    }
}

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Position {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.row.into(), self.column.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Moore neighborhood of a position, clipped at the board edges, in row-major order.
#[derive(Debug, Clone)]
pub struct NeighborIter {
    center: Position,
    first_column: Coord,
    last: Position,
    cursor: Option<Position>,
}

impl NeighborIter {
    /// `bounds` holds the board size as `(rows, columns)`. A center outside of it has no neighbors.
    pub fn new(center: Position, bounds: Position) -> Self {
        let inside = center.row < bounds.row && center.column < bounds.column;
        let first = Position::new(center.row.saturating_sub(1), center.column.saturating_sub(1));
        let last = Position::new(
            center.row.saturating_add(1).min(bounds.row.saturating_sub(1)),
            center.column.saturating_add(1).min(bounds.column.saturating_sub(1)),
        );
        Self {
            center,
            first_column: first.column,
            last,
            cursor: inside.then_some(first),
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let current = self.cursor?;
            self.cursor = if current.column < self.last.column {
                Some(Position::new(current.row, current.column + 1))
            } else if current.row < self.last.row {
                Some(Position::new(current.row + 1, self.first_column))
            } else {
                None
            };

            if current != self.center {
                return Some(current);
            }
        }
    }
}

/// Position-based lookups on a 2D grid.
pub trait GridExt {
    /// Grid size as a position one past the last row and column.
    fn grid_bounds(&self) -> Position;

    fn iter_neighbors(&self, center: Position) -> NeighborIter {
        NeighborIter::new(center, self.grid_bounds())
    }
}

impl<T> GridExt for Array2<T> {
    fn grid_bounds(&self) -> Position {
        let (rows, columns) = self.dim();
        Position::new(
            Coord::try_from(rows).unwrap_or(Coord::MAX),
            Coord::try_from(columns).unwrap_or(Coord::MAX),
        )
    }
}
