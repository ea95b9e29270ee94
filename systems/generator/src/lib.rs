#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Randomized depth-first maze carving.
//!
//! The generator starts from the uncarved lattice produced by
//! [`Grid::lattice`], walks the chambers with an explicit backtracking stack and
//! opens the lattice edge between every pair of chambers it steps across. The
//! random source is supplied by the caller, so a seeded generator always
//! produces the same maze.

use log::debug;
use rand::{seq::SliceRandom, Rng};
use tic_tac_maze_core::{CellCoord, GenerationError, Grid, GridDimensions, RegionPolicy};

/// Offsets to the four neighbouring chambers, in the order they are examined.
const CHAMBER_STEPS: [(i64, i64); 4] = [(2, 0), (-2, 0), (0, -2), (0, 2)];

/// Pure system that carves perfect mazes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MazeGenerator {
    region_policy: RegionPolicy,
}

impl MazeGenerator {
    /// Creates a generator that applies the provided region policy.
    #[must_use]
    pub const fn new(region_policy: RegionPolicy) -> Self {
        Self { region_policy }
    }

    /// Policy applied when backtracking leaves chambers unreached.
    #[must_use]
    pub const fn region_policy(&self) -> RegionPolicy {
        self.region_policy
    }

    /// Carves a maze with the requested chamber layout.
    ///
    /// Fails before allocating anything when the layout is empty or too large.
    pub fn generate<R>(
        &self,
        dimensions: GridDimensions,
        rng: &mut R,
    ) -> Result<Grid, GenerationError>
    where
        R: Rng + ?Sized,
    {
        let grid = Grid::lattice(dimensions)?;
        let mut carver = Carver::new(grid);
        let chambers: Vec<CellCoord> = carver.grid.chambers().collect();
        if let Some(&first) = chambers.choose(rng) {
            carver.visit(first);
            carver.carve_from(first, rng, self.region_policy);
        }

        debug!(
            "carved {}x{} maze: {} passages, {} region(s)",
            dimensions.rows(),
            dimensions.columns(),
            carver.grid.opened_edges(),
            carver.regions
        );
        Ok(carver.grid)
    }
}

/// Carves a maze using the default [`RegionPolicy::Bridge`] policy.
pub fn generate<R>(dimensions: GridDimensions, rng: &mut R) -> Result<Grid, GenerationError>
where
    R: Rng + ?Sized,
{
    MazeGenerator::default().generate(dimensions, rng)
}

#[derive(Debug)]
struct Carver {
    grid: Grid,
    unvisited: Vec<bool>,
    remaining: usize,
    stack: Vec<CellCoord>,
    frontier: Vec<CellCoord>,
    regions: usize,
}

impl Carver {
    fn new(grid: Grid) -> Self {
        let chamber_count = usize::try_from(grid.dimensions().chamber_count()).unwrap_or(0);
        Self {
            grid,
            unvisited: vec![true; chamber_count],
            remaining: chamber_count,
            stack: Vec::new(),
            frontier: Vec::with_capacity(CHAMBER_STEPS.len()),
            regions: 0,
        }
    }

    fn carve_from<R>(&mut self, start: CellCoord, rng: &mut R, policy: RegionPolicy)
    where
        R: Rng + ?Sized,
    {
        self.regions = self.regions.max(1);
        let mut current = start;

        while self.remaining > 0 {
            self.collect_unvisited_neighbors(current);
            if let Some(next) = self.frontier.choose(rng).copied() {
                self.stack.push(current);
                let carved = self.grid.carve(current.midpoint(next));
                debug_assert!(carved, "edge between {current:?} and {next:?} must be carvable");
                self.visit(next);
                current = next;
            } else if let Some(previous) = self.stack.pop() {
                current = previous;
            } else {
                match self.restart(rng, policy) {
                    Some(chamber) => current = chamber,
                    None => break,
                }
            }
        }
    }

    /// Picks a fresh chamber once the stack is exhausted with chambers left.
    fn restart<R>(&mut self, rng: &mut R, policy: RegionPolicy) -> Option<CellCoord>
    where
        R: Rng + ?Sized,
    {
        if policy == RegionPolicy::Bridge {
            let bordering: Vec<CellCoord> = self
                .unvisited_chambers()
                .filter(|chamber| self.visited_neighbor(*chamber).is_some())
                .collect();
            if let Some(&chamber) = bordering.choose(rng) {
                if let Some(anchor) = self.visited_neighbor(chamber) {
                    let carved = self.grid.carve(chamber.midpoint(anchor));
                    debug_assert!(carved, "bridge edge must be carvable");
                }
                self.visit(chamber);
                return Some(chamber);
            }
        }

        let remaining: Vec<CellCoord> = self.unvisited_chambers().collect();
        let chamber = remaining.choose(rng).copied()?;
        self.visit(chamber);
        self.regions += 1;
        Some(chamber)
    }

    fn collect_unvisited_neighbors(&mut self, chamber: CellCoord) {
        self.frontier.clear();
        for (dc, dr) in CHAMBER_STEPS {
            if let Some(neighbor) = self.chamber_at(chamber, dc, dr) {
                if self.is_unvisited(neighbor) {
                    self.frontier.push(neighbor);
                }
            }
        }
    }

    fn visited_neighbor(&self, chamber: CellCoord) -> Option<CellCoord> {
        CHAMBER_STEPS
            .iter()
            .filter_map(|&(dc, dr)| self.chamber_at(chamber, dc, dr))
            .find(|neighbor| !self.is_unvisited(*neighbor))
    }

    fn unvisited_chambers(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.grid
            .chambers()
            .filter(move |chamber| self.is_unvisited(*chamber))
    }

    fn chamber_at(&self, chamber: CellCoord, dc: i64, dr: i64) -> Option<CellCoord> {
        let column = u32::try_from(i64::from(chamber.column()) + dc).ok()?;
        let row = u32::try_from(i64::from(chamber.row()) + dr).ok()?;
        let candidate = CellCoord::new(column, row);
        self.chamber_index(candidate).map(|_| candidate)
    }

    fn visit(&mut self, chamber: CellCoord) {
        if let Some(index) = self.chamber_index(chamber) {
            if self.unvisited[index] {
                self.unvisited[index] = false;
                self.remaining -= 1;
            }
        }
    }

    fn is_unvisited(&self, chamber: CellCoord) -> bool {
        self.chamber_index(chamber)
            .map_or(false, |index| self.unvisited[index])
    }

    fn chamber_index(&self, chamber: CellCoord) -> Option<usize> {
        if !chamber.is_chamber() {
            return None;
        }

        let dimensions = self.grid.dimensions();
        let column = chamber.column() / 2;
        let row = chamber.row() / 2;
        if column >= dimensions.columns() || row >= dimensions.rows() {
            return None;
        }

        let width = usize::try_from(dimensions.columns()).ok()?;
        Some(usize::try_from(row).ok()? * width + usize::try_from(column).ok()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn corridor_carver() -> Carver {
        Carver::new(Grid::lattice(GridDimensions::new(1, 3)).expect("valid dimensions"))
    }

    #[test]
    fn chamber_index_ignores_lattice_cells() {
        let carver = corridor_carver();
        assert_eq!(carver.chamber_index(CellCoord::new(1, 1)), Some(0));
        assert_eq!(carver.chamber_index(CellCoord::new(5, 1)), Some(2));
        assert_eq!(carver.chamber_index(CellCoord::new(2, 1)), None);
        assert_eq!(carver.chamber_index(CellCoord::new(7, 1)), None);
        assert_eq!(carver.chamber_index(CellCoord::new(1, 3)), None);
    }

    #[test]
    fn preserve_policy_starts_disconnected_region() {
        let mut carver = corridor_carver();
        let mut rng = StepRng::new(0, 0);
        carver.visit(CellCoord::new(3, 1));
        carver.visit(CellCoord::new(1, 1));

        carver.carve_from(CellCoord::new(1, 1), &mut rng, RegionPolicy::Preserve);

        assert_eq!(carver.remaining, 0);
        assert_eq!(carver.regions, 2);
        assert_eq!(carver.grid.opened_edges(), 0);
        assert_eq!(carver.grid.chamber_components(), 3);
    }

    #[test]
    fn bridge_policy_connects_new_region() {
        let mut carver = corridor_carver();
        let mut rng = StepRng::new(0, 0);
        carver.visit(CellCoord::new(3, 1));
        carver.visit(CellCoord::new(1, 1));

        carver.carve_from(CellCoord::new(1, 1), &mut rng, RegionPolicy::Bridge);

        assert_eq!(carver.remaining, 0);
        assert_eq!(carver.regions, 1);
        assert!(carver.grid.is_open(CellCoord::new(4, 1)));
        assert_eq!(carver.grid.opened_edges(), 1);
    }

    #[test]
    fn neighbors_are_examined_east_west_north_south() {
        let mut carver =
            Carver::new(Grid::lattice(GridDimensions::new(3, 3)).expect("valid dimensions"));
        carver.collect_unvisited_neighbors(CellCoord::new(3, 3));
        assert_eq!(
            carver.frontier,
            vec![
                CellCoord::new(5, 3),
                CellCoord::new(1, 3),
                CellCoord::new(3, 1),
                CellCoord::new(3, 5),
            ]
        );
    }
}
