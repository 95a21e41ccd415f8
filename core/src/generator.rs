use rand::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::index;

use crate::*;

/// Source of freshly mined boards and their safe starting positions.
pub trait MinefieldGenerator {
    /// Builds a board for `params` with mines placed and neighbor counts computed.
    fn generate(&mut self, params: &DifficultyParams) -> Result<Board>;

    /// Candidate starting position on `board`, not necessarily safe.
    fn random_position(&mut self, board: &Board) -> Position;

    /// Picks where the opening move goes.
    ///
    /// Exactly `attempts` random candidates are drawn, then the board is scanned in order for a safe start, and if it
    /// has none the first mine-free field is used. Only a board made entirely of mines falls back to the last random
    /// candidate.
    fn find_safe_position(&mut self, board: &Board, attempts: u32) -> Position {
        let mut candidate = None;
        for _ in 0..attempts {
            let position = self.random_position(board);
            if board[position].is_safe_start() {
                return position;
            }
            candidate = Some(position);
        }

        if let Some(position) = board.first_safe_start() {
            log::debug!("no random safe start after {} attempts, using {:?}", attempts, position);
            return position;
        }
        log::warn!("board has no field without neighboring mines");
        board
            .first_unmined()
            .or(candidate)
            .unwrap_or(Position::new(0, 0))
    }
}

/// Uniform random mine placement driven by a seedable RNG.
#[derive(Clone, Debug)]
pub struct RandomMinefieldGenerator {
    rng: SmallRng,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Marks `count` distinct fields as mined, chosen uniformly among fields that are neither mined nor `excluded`.
    pub fn place_mines(
        &mut self,
        board: &mut Board,
        count: CellCount,
        excluded: &[Position],
    ) -> Result<()> {
        place_mines(board, count, excluded, &mut self.rng)
    }
}

impl Default for RandomMinefieldGenerator {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(&mut self, params: &DifficultyParams) -> Result<Board> {
        let mut board = Board::new(params.rows, params.columns)?;
        self.place_mines(&mut board, params.mines, &[])?;
        board.compute_near_mines();
        log::debug!(
            "generated {}x{} board with {} mines",
            params.rows,
            params.columns,
            params.mines
        );
        Ok(board)
    }

    fn random_position(&mut self, board: &Board) -> Position {
        Position::new(
            self.rng.random_range(0..board.rows()),
            self.rng.random_range(0..board.columns()),
        )
    }
}

/// Marks `count` distinct, previously free fields as mined. Fails without touching the board when there is not enough
/// room.
pub fn place_mines<R: Rng + ?Sized>(
    board: &mut Board,
    count: CellCount,
    excluded: &[Position],
    rng: &mut R,
) -> Result<()> {
    let free = board.free_positions(excluded);
    if usize::from(count) > free.len() {
        return Err(GameError::TooManyMines {
            requested: count,
            // free fields never exceed the board size
            available: free.len() as CellCount,
        });
    }

    for i in index::sample(rng, free.len(), count.into()) {
        board.set_mined(free[i]);
    }
    Ok(())
}
