#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tic Tac Maze engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative level session, and pure systems. Adapters submit [`Command`]
//! values describing player intents, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values that systems and
//! adapters react to. The maze [`Grid`] and the pixel-space [`Rect`] are the
//! only geometry the systems exchange.

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod grid;

pub use grid::{Cell, Grid, GridDimensions, MAX_GRID_CELLS};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Builds a fresh maze, places the player and target, and starts the clock.
    StartLevel {
        /// Parameters of the level to set up.
        plan: LevelPlan,
    },
    /// Registers that the player began holding a direction.
    PressDirection {
        /// Direction the player pressed.
        direction: Direction,
    },
    /// Registers that the player stopped holding a direction.
    ReleaseDirection {
        /// Direction the player released.
        direction: Direction,
    },
    /// Advances the active level by a single frame.
    Tick,
    /// Discards the active level without a result.
    AbandonLevel,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a new level is ready to be played.
    LevelStarted {
        /// Level that became active.
        level: LevelIndex,
        /// Cell the player starts from.
        start: CellCoord,
        /// Cell holding the target.
        target: CellCoord,
    },
    /// Reports that a level could not be set up; the previous state is kept.
    LevelRejected {
        /// Level whose setup failed.
        level: LevelIndex,
        /// Specific reason the setup failed.
        reason: LevelSetupError,
    },
    /// Confirms that the player box changed position during a frame.
    PlayerMoved {
        /// Upper-left corner before the frame.
        from: Point,
        /// Upper-left corner after collision resolution.
        to: Point,
    },
    /// Announces that the player touched the target.
    TargetReached {
        /// Level that was cleared.
        level: LevelIndex,
        /// Frames elapsed before the target was reached.
        frames: u64,
    },
    /// Announces that the level's time budget ran out.
    TimeExpired {
        /// Level that was lost.
        level: LevelIndex,
    },
    /// Confirms that the active level was discarded.
    LevelAbandoned {
        /// Level that was discarded.
        level: LevelIndex,
    },
}

/// Progress of the active level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LevelStatus {
    /// The clock is running and movement is accepted.
    Playing,
    /// The player reached the target.
    Cleared,
    /// The time budget ran out before the target was reached.
    Expired,
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit step along the x and y axes.
    #[must_use]
    pub const fn unit(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Direction leading from `from` to an orthogonally adjacent `to`.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Self> {
        let column_diff = from.column().abs_diff(to.column());
        let row_diff = from.row().abs_diff(to.row());
        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if to.column() > from.column() {
                Some(Self::East)
            } else {
                Some(Self::West)
            }
        } else if to.row() > from.row() {
            Some(Self::South)
        } else {
            Some(Self::North)
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether both coordinates are odd.
    #[must_use]
    pub const fn is_chamber(&self) -> bool {
        self.column % 2 == 1 && self.row % 2 == 1
    }

    /// Cell lying halfway between two coordinates.
    #[must_use]
    pub const fn midpoint(self, other: CellCoord) -> CellCoord {
        CellCoord::new(
            (self.column + other.column) / 2,
            (self.row + other.row) / 2,
        )
    }
}

/// Position in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate, increasing to the right.
    pub x: i32,
    /// Vertical coordinate, increasing downward.
    pub y: i32,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl Rect {
    /// Creates a rectangle from its upper-left corner and size.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a square anchored at `origin`.
    #[must_use]
    pub const fn square(origin: Point, size: i32) -> Self {
        Self::new(origin.x, origin.y, size, size)
    }

    /// Upper-left corner of the rectangle.
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Horizontal extent.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Vertical extent.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Smallest x covered by the rectangle.
    #[must_use]
    pub const fn left(&self) -> i32 {
        self.x
    }

    /// First x past the rectangle.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Smallest y covered by the rectangle.
    #[must_use]
    pub const fn top(&self) -> i32 {
        self.y
    }

    /// First y past the rectangle.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Reports whether the interiors of both rectangles intersect.
    ///
    /// Rectangles that merely share an edge do not overlap.
    #[must_use]
    pub const fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Copy of the rectangle moved by the provided offsets.
    #[must_use]
    pub const fn translated(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Copy of the rectangle whose left edge sits at `left`.
    #[must_use]
    pub const fn with_left(self, left: i32) -> Self {
        Self::new(left, self.y, self.width, self.height)
    }

    /// Copy of the rectangle whose right edge sits at `right`.
    #[must_use]
    pub const fn with_right(self, right: i32) -> Self {
        Self::new(right - self.width, self.y, self.width, self.height)
    }

    /// Copy of the rectangle whose top edge sits at `top`.
    #[must_use]
    pub const fn with_top(self, top: i32) -> Self {
        Self::new(self.x, top, self.width, self.height)
    }

    /// Copy of the rectangle whose bottom edge sits at `bottom`.
    #[must_use]
    pub const fn with_bottom(self, bottom: i32) -> Self {
        Self::new(self.x, bottom - self.height, self.width, self.height)
    }
}

/// Per-frame displacement in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Velocity {
    /// Horizontal displacement.
    pub dx: i32,
    /// Vertical displacement.
    pub dy: i32,
}

impl Velocity {
    /// Velocity of a stationary body.
    pub const ZERO: Velocity = Velocity::new(0, 0);

    /// Creates a new velocity.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Reports whether neither axis moves.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Maps grid cells onto world units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelLayout {
    /// Edge length of a single grid cell.
    pub cell_size: i32,
    /// World x of the grid's upper-left corner.
    pub origin_x: i32,
    /// World y of the grid's upper-left corner.
    pub origin_y: i32,
}

impl PixelLayout {
    /// Upper-left corner of `cell` in world units.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> Point {
        Point::new(
            cell.column() as i32 * self.cell_size + self.origin_x,
            cell.row() as i32 * self.cell_size + self.origin_y,
        )
    }

    /// Rectangle covering `cell` entirely.
    #[must_use]
    pub fn cell_rect(&self, cell: CellCoord) -> Rect {
        Rect::square(self.cell_origin(cell), self.cell_size)
    }

    /// Area covered by a grid of `dimensions` in world units.
    ///
    /// Returns `None` when the dimensions are invalid or when any cell edge
    /// would fall outside the `i32` range, so every `cell_origin` and
    /// `cell_rect` inside a grid with bounds is free of overflow.
    #[must_use]
    pub fn bounds(&self, dimensions: GridDimensions) -> Option<Rect> {
        let (height, width) = dimensions.validate().ok()?;
        let span = |cells: u32| i32::try_from(cells).ok()?.checked_mul(self.cell_size);
        let width = span(width)?;
        let height = span(height)?;
        let _ = self.origin_x.checked_add(width)?;
        let _ = self.origin_y.checked_add(height)?;
        Some(Rect::new(self.origin_x, self.origin_y, width, height))
    }
}

impl Default for PixelLayout {
    fn default() -> Self {
        Self {
            cell_size: 12,
            origin_x: 10,
            origin_y: 80,
        }
    }
}

/// How the generator treats a chamber left unreachable by backtracking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionPolicy {
    /// Connects the new region to the carved tree through a single opening.
    #[default]
    Bridge,
    /// Starts the new region without any connection, producing a forest.
    Preserve,
}

/// Session-wide tuning shared by every level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Conversion from grid cells to world units.
    pub layout: PixelLayout,
    /// Edge length of the player and target boxes.
    pub player_size: i32,
    /// Displacement added per held direction each frame.
    pub speed: i32,
    /// Frames that make up one second of level time.
    pub frame_rate: u32,
    /// Upper bound on random draws spent placing the player and target.
    pub max_placement_attempts: u32,
    /// Treatment of regions the carver cannot reach by backtracking.
    pub region_policy: RegionPolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            layout: PixelLayout::default(),
            player_size: 9,
            speed: 2,
            frame_rate: 60,
            max_placement_attempts: 100_000,
            region_policy: RegionPolicy::Bridge,
        }
    }
}

/// RGB color, opaque to every system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    red: u8,
    green: u8,
    blue: u8,
}

impl Rgb {
    /// Pure white.
    pub const WHITE: Rgb = Rgb::from_rgb(255, 255, 255);
    /// Pure red.
    pub const RED: Rgb = Rgb::from_rgb(255, 0, 0);

    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Colors a presentation layer applies to one level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Palette {
    /// Fill behind the maze.
    pub background: Rgb,
    /// Wall cells.
    pub wall: Rgb,
    /// Player box.
    pub player: Rgb,
    /// Target box.
    pub target: Rgb,
    /// Status text.
    pub font: Rgb,
}

/// Zero-based position of a level within the campaign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelIndex(u32);

impl LevelIndex {
    /// Creates a new level index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the zero-based index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// One-based number shown to players.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.0 + 1
    }

    /// Index of the level that follows.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Everything required to set up a single level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelPlan {
    /// Position of the level in the campaign.
    pub index: LevelIndex,
    /// Chamber layout of the maze.
    pub dimensions: GridDimensions,
    /// Time available to reach the target.
    pub time_budget: Duration,
    /// Minimum Manhattan distance between start and target cells.
    pub min_distance: u32,
    /// Colors handed to the presentation layer.
    pub palette: Palette,
}

/// Reasons maze generation may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum GenerationError {
    /// One of the chamber counts is zero.
    #[error("maze needs at least one chamber per axis, got {rows}x{columns}")]
    EmptyDimension {
        /// Requested chamber rows.
        rows: u32,
        /// Requested chamber columns.
        columns: u32,
    },
    /// The full cell grid would exceed [`MAX_GRID_CELLS`].
    #[error("maze of {rows}x{columns} chambers exceeds the supported grid size")]
    TooLarge {
        /// Requested chamber rows.
        rows: u32,
        /// Requested chamber columns.
        columns: u32,
    },
}

/// Reasons the player and target could not be placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum PlacementError {
    /// The grid contains no open cell at all.
    #[error("grid has no open cell to place the player on")]
    NoOpenCells,
    /// No pair of open cells is far enough apart.
    #[error("minimum distance {min_distance} exceeds the largest possible {max_distance}")]
    Unsatisfiable {
        /// Requested minimum separation.
        min_distance: u32,
        /// Largest Manhattan distance between two open cells.
        max_distance: u32,
    },
    /// Random sampling did not find a valid pair within its budget.
    #[error("no valid placement found after {attempts} attempts")]
    AttemptsExhausted {
        /// Draws spent before giving up.
        attempts: u32,
    },
}

/// Reasons a level setup may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum LevelSetupError {
    /// The maze could not be generated.
    #[error("maze generation failed: {0}")]
    Generation(#[from] GenerationError),
    /// The player and target could not be placed.
    #[error("placement failed: {0}")]
    Placement(#[from] PlacementError),
    /// The generated maze does not connect the start to the target.
    #[error("target {target:?} is unreachable from start {start:?}")]
    Unreachable {
        /// Cell the player would start from.
        start: CellCoord,
        /// Cell holding the target.
        target: CellCoord,
    },
    /// The maze would not fit in world units with the session's layout.
    #[error("a {rows}x{columns} maze overflows the pixel layout")]
    LayoutOverflow {
        /// Requested chamber rows.
        rows: u32,
        /// Requested chamber columns.
        columns: u32,
    },
}
