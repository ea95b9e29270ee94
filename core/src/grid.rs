//! Dense wall/open occupancy grid shared by the generator, sampler and world.

use std::{collections::VecDeque, fmt};

use serde::{Deserialize, Serialize};

use crate::{CellCoord, GenerationError};

/// Upper bound on the number of cells a single grid may contain.
pub const MAX_GRID_CELLS: u64 = 1 << 24;

/// Binary state held by every grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Solid cell the player collides against.
    Wall,
    /// Traversable cell.
    Open,
}

/// Number of carvable chambers along each axis of a maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    rows: u32,
    columns: u32,
}

impl GridDimensions {
    /// Creates a new chamber layout description.
    #[must_use]
    pub const fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }

    /// Number of chamber rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of chamber columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Total number of chambers described by the layout.
    #[must_use]
    pub const fn chamber_count(&self) -> u64 {
        self.rows as u64 * self.columns as u64
    }

    /// Confirms the layout describes a non-empty grid that fits in memory.
    ///
    /// Returns the `(height, width)` of the full cell grid, lattice included.
    pub fn validate(&self) -> Result<(u32, u32), GenerationError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(GenerationError::EmptyDimension {
                rows: self.rows,
                columns: self.columns,
            });
        }

        let too_large = GenerationError::TooLarge {
            rows: self.rows,
            columns: self.columns,
        };
        let height = lattice_extent(self.rows).ok_or(too_large)?;
        let width = lattice_extent(self.columns).ok_or(too_large)?;
        if u64::from(height) * u64::from(width) > MAX_GRID_CELLS {
            return Err(too_large);
        }

        Ok((height, width))
    }
}

fn lattice_extent(chambers: u32) -> Option<u32> {
    chambers.checked_mul(2)?.checked_add(1)
}

/// Occupancy grid of `(2R+1) × (2C+1)` cells for `R × C` chambers.
///
/// Cells with both coordinates even are permanent lattice walls, cells with
/// both coordinates odd are chambers and always open. Only the lattice edges
/// between two chambers can change state, and only from wall to open through
/// [`Grid::carve`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    dimensions: GridDimensions,
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds the uncarved lattice for the provided chamber layout.
    pub fn lattice(dimensions: GridDimensions) -> Result<Self, GenerationError> {
        let (height, width) = dimensions.validate()?;
        let mut cells = Vec::with_capacity(height as usize * width as usize);
        for row in 0..height {
            for column in 0..width {
                let cell = if row % 2 == 1 && column % 2 == 1 {
                    Cell::Open
                } else {
                    Cell::Wall
                };
                cells.push(cell);
            }
        }

        Ok(Self {
            dimensions,
            width,
            height,
            cells,
        })
    }

    /// Chamber layout the grid was built from.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Number of cell columns, lattice included.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of cell rows, lattice included.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// State of the provided cell, or `None` when out of bounds.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<Cell> {
        self.index(cell).map(|index| self.cells[index])
    }

    /// Reports whether the provided cell exists and is open.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord) -> bool {
        self.cell(cell) == Some(Cell::Open)
    }

    /// Opens the lattice edge at `edge`.
    ///
    /// Returns `false` without touching the grid when `edge` is out of bounds,
    /// a chamber, a lattice corner, or part of the outer border.
    pub fn carve(&mut self, edge: CellCoord) -> bool {
        if !self.is_interior_edge(edge) {
            return false;
        }

        match self.index(edge) {
            Some(index) => {
                self.cells[index] = Cell::Open;
                true
            }
            None => false,
        }
    }

    /// Iterates over every chamber in row-major order.
    pub fn chambers(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let rows = self.dimensions.rows();
        let columns = self.dimensions.columns();
        (0..rows).flat_map(move |row| {
            (0..columns).map(move |column| CellCoord::new(column * 2 + 1, row * 2 + 1))
        })
    }

    /// Iterates over every cell and its state in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Cell)> + '_ {
        let width = self.width;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let index = index as u32;
            (CellCoord::new(index % width, index / width), *cell)
        })
    }

    /// Iterates over every wall cell in row-major order.
    pub fn walls(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.iter()
            .filter(|(_, cell)| *cell == Cell::Wall)
            .map(|(coord, _)| coord)
    }

    /// Iterates over every open cell in row-major order.
    pub fn open_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.iter()
            .filter(|(_, cell)| *cell == Cell::Open)
            .map(|(coord, _)| coord)
    }

    /// Number of lattice edges that were carved open.
    #[must_use]
    pub fn opened_edges(&self) -> usize {
        self.open_cells().filter(|cell| !cell.is_chamber()).count()
    }

    /// Number of connected groups of chambers.
    ///
    /// A freshly carved perfect maze reports exactly one component.
    #[must_use]
    pub fn chamber_components(&self) -> usize {
        let mut seen = vec![false; self.cells.len()];
        let mut queue = VecDeque::new();
        let mut components = 0;

        for chamber in self.chambers() {
            let Some(index) = self.index(chamber) else {
                continue;
            };
            if seen[index] {
                continue;
            }

            components += 1;
            seen[index] = true;
            queue.push_back(chamber);
            while let Some(cell) = queue.pop_front() {
                for neighbor in self.open_neighbors(cell) {
                    if let Some(neighbor_index) = self.index(neighbor) {
                        if !seen[neighbor_index] {
                            seen[neighbor_index] = true;
                            queue.push_back(neighbor);
                        }
                    }
                }
            }
        }

        components
    }

    /// Breadth-first path through open cells, endpoints included.
    ///
    /// Returns `None` when either endpoint is not open or no path exists.
    #[must_use]
    pub fn shortest_path(&self, from: CellCoord, to: CellCoord) -> Option<Vec<CellCoord>> {
        if !self.is_open(from) || !self.is_open(to) {
            return None;
        }

        let from_index = self.index(from)?;
        let mut previous: Vec<Option<usize>> = vec![None; self.cells.len()];
        let mut seen = vec![false; self.cells.len()];
        seen[from_index] = true;

        let mut queue = VecDeque::from([from]);
        while let Some(cell) = queue.pop_front() {
            if cell == to {
                break;
            }
            let cell_index = self.index(cell)?;
            for neighbor in self.open_neighbors(cell) {
                let Some(neighbor_index) = self.index(neighbor) else {
                    continue;
                };
                if seen[neighbor_index] {
                    continue;
                }
                seen[neighbor_index] = true;
                previous[neighbor_index] = Some(cell_index);
                queue.push_back(neighbor);
            }
        }

        let to_index = self.index(to)?;
        if !seen[to_index] {
            return None;
        }

        let mut path = vec![to];
        let mut cursor = to_index;
        while let Some(prior) = previous[cursor] {
            path.push(self.coord(prior));
            cursor = prior;
        }
        path.reverse();
        Some(path)
    }

    /// Open cells orthogonally adjacent to `cell`.
    pub fn open_neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        let column = i64::from(cell.column());
        let row = i64::from(cell.row());
        [(1, 0), (-1, 0), (0, -1), (0, 1)]
            .into_iter()
            .filter_map(move |(dc, dr)| {
                let column = u32::try_from(column + dc).ok()?;
                let row = u32::try_from(row + dr).ok()?;
                Some(CellCoord::new(column, row))
            })
            .filter(move |neighbor| self.is_open(*neighbor))
    }

    fn is_interior_edge(&self, cell: CellCoord) -> bool {
        let odd_column = cell.column() % 2 == 1;
        let odd_row = cell.row() % 2 == 1;
        if odd_column == odd_row {
            return false;
        }

        cell.column() > 0
            && cell.row() > 0
            && cell.column() + 1 < self.width
            && cell.row() + 1 < self.height
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    fn coord(&self, index: usize) -> CellCoord {
        let width = self.width as usize;
        CellCoord::new((index % width) as u32, (index / width) as u32)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width as usize) {
            for cell in row {
                let glyph = match cell {
                    Cell::Wall => '#',
                    Cell::Open => ' ',
                };
                write!(f, "{glyph}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
