#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rejection sampler that places the player and the target inside a maze.

use log::debug;
use rand::Rng;
use tic_tac_maze_core::{CellCoord, Grid, PlacementError};

/// Cells chosen for the player and the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    /// Open cell the player starts from.
    pub start: CellCoord,
    /// Open cell holding the target.
    pub target: CellCoord,
}

impl Placement {
    /// Manhattan distance separating start and target.
    #[must_use]
    pub fn distance(&self) -> u32 {
        self.start.manhattan_distance(self.target)
    }
}

/// Pure system that draws start and target cells uniformly over the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionSampler {
    max_attempts: u32,
}

impl PositionSampler {
    /// Draw budget used by [`PositionSampler::default`].
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 100_000;

    /// Creates a sampler that gives up after `max_attempts` draws.
    #[must_use]
    pub const fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// Number of draws allowed per call.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Picks an open start cell and an open target cell at least
    /// `min_distance` apart.
    ///
    /// Coordinates are drawn uniformly across the whole grid and rejected when
    /// they land on a wall. Unsatisfiable separations are detected before any
    /// draw, and the total number of draws is bounded by the sampler budget.
    pub fn sample<R>(
        &self,
        grid: &Grid,
        min_distance: u32,
        rng: &mut R,
    ) -> Result<Placement, PlacementError>
    where
        R: Rng + ?Sized,
    {
        let max_distance = max_open_distance(grid).ok_or(PlacementError::NoOpenCells)?;
        if min_distance > max_distance {
            return Err(PlacementError::Unsatisfiable {
                min_distance,
                max_distance,
            });
        }

        let mut attempts = 0;
        let start = loop {
            let candidate = self.draw(grid, rng, &mut attempts)?;
            if !grid.is_open(candidate) {
                continue;
            }
            // A start with no open cell far enough away would stall the target draw.
            if farthest_open_distance(grid, candidate) >= min_distance {
                break candidate;
            }
        };

        let target = loop {
            let candidate = self.draw(grid, rng, &mut attempts)?;
            if grid.is_open(candidate) && start.manhattan_distance(candidate) >= min_distance {
                break candidate;
            }
        };

        debug!("placed start {start:?} and target {target:?} after {attempts} draws");
        Ok(Placement { start, target })
    }

    fn draw<R>(
        &self,
        grid: &Grid,
        rng: &mut R,
        attempts: &mut u32,
    ) -> Result<CellCoord, PlacementError>
    where
        R: Rng + ?Sized,
    {
        if *attempts >= self.max_attempts {
            return Err(PlacementError::AttemptsExhausted {
                attempts: *attempts,
            });
        }
        *attempts += 1;

        let row = rng.gen_range(0..grid.height());
        let column = rng.gen_range(0..grid.width());
        Ok(CellCoord::new(column, row))
    }
}

impl Default for PositionSampler {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS)
    }
}

/// Places start and target with the default draw budget.
pub fn sample<R>(grid: &Grid, min_distance: u32, rng: &mut R) -> Result<Placement, PlacementError>
where
    R: Rng + ?Sized,
{
    PositionSampler::default().sample(grid, min_distance, rng)
}

/// Largest Manhattan distance between any two open cells.
///
/// Returns `None` when the grid has no open cell.
#[must_use]
pub fn max_open_distance(grid: &Grid) -> Option<u32> {
    let mut sums: Option<(i64, i64)> = None;
    let mut differences: Option<(i64, i64)> = None;

    for cell in grid.open_cells() {
        let column = i64::from(cell.column());
        let row = i64::from(cell.row());
        sums = Some(widen(sums, row + column));
        differences = Some(widen(differences, row - column));
    }

    let (sum_min, sum_max) = sums?;
    let (difference_min, difference_max) = differences?;
    let spread = (sum_max - sum_min).max(difference_max - difference_min);
    u32::try_from(spread).ok()
}

fn widen(range: Option<(i64, i64)>, value: i64) -> (i64, i64) {
    match range {
        Some((low, high)) => (low.min(value), high.max(value)),
        None => (value, value),
    }
}

fn farthest_open_distance(grid: &Grid, from: CellCoord) -> u32 {
    grid.open_cells()
        .map(|cell| from.manhattan_distance(cell))
        .max()
        .unwrap_or(0)
}
