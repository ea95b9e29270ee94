#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level session state for Tic Tac Maze.
//!
//! The world owns the random stream, the active maze, the static wall and
//! target rectangles, and the player's [`Mover`]. Every mutation goes through
//! [`apply`]; adapters and systems observe the session through [`query`].

use std::time::Duration;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tic_tac_maze_core::{
    CellCoord, Command, Event, Grid, LevelPlan, LevelSetupError, LevelStatus, Rect, SessionSettings,
};
use tic_tac_maze_system_generator::MazeGenerator;
use tic_tac_maze_system_movement::Mover;
use tic_tac_maze_system_placement::{Placement, PositionSampler};

/// Seed used by [`World::default`].
pub const DEFAULT_SEED: u64 = 0x7ac7_ac3a_2e00_0001;

/// Represents the authoritative Tic Tac Maze session.
#[derive(Debug)]
pub struct World {
    settings: SessionSettings,
    rng: ChaCha8Rng,
    generator: MazeGenerator,
    sampler: PositionSampler,
    level: Option<Level>,
}

impl World {
    /// Creates an idle session whose levels draw from a stream seeded by `seed`.
    #[must_use]
    pub fn new(settings: SessionSettings, seed: u64) -> Self {
        Self {
            settings,
            rng: ChaCha8Rng::seed_from_u64(seed),
            generator: MazeGenerator::new(settings.region_policy),
            sampler: PositionSampler::new(settings.max_placement_attempts),
            level: None,
        }
    }

    /// Builds a level off to the side so a failure leaves the session untouched.
    fn build_level(&mut self, plan: LevelPlan) -> Result<Level, LevelSetupError> {
        let dimensions = plan.dimensions;
        let _ = dimensions.validate()?;
        if self.settings.layout.bounds(dimensions).is_none() {
            return Err(LevelSetupError::LayoutOverflow {
                rows: dimensions.rows(),
                columns: dimensions.columns(),
            });
        }

        let grid = self.generator.generate(dimensions, &mut self.rng)?;
        let placement = self
            .sampler
            .sample(&grid, plan.min_distance, &mut self.rng)?;
        self.assemble_level(plan, grid, placement)
    }

    /// Turns a carved grid and its placement into a playable level.
    fn assemble_level(
        &self,
        plan: LevelPlan,
        grid: Grid,
        placement: Placement,
    ) -> Result<Level, LevelSetupError> {
        // Only a forest-carving policy can separate the two cells.
        if grid
            .shortest_path(placement.start, placement.target)
            .is_none()
        {
            return Err(LevelSetupError::Unreachable {
                start: placement.start,
                target: placement.target,
            });
        }

        let layout = self.settings.layout;
        let size = self.settings.player_size;
        let walls = grid.walls().map(|cell| layout.cell_rect(cell)).collect();
        let target = Rect::square(layout.cell_origin(placement.target), size);
        let body = Rect::square(layout.cell_origin(placement.start), size);
        let budget_frames = budget_frames(plan.time_budget, self.frame_rate());

        Ok(Level {
            plan,
            grid,
            walls,
            start: placement.start,
            target_cell: placement.target,
            target,
            mover: Mover::new(body, self.settings.speed),
            frames: 0,
            budget_frames,
            status: LevelStatus::Playing,
        })
    }

    fn playing_level_mut(&mut self) -> Option<&mut Level> {
        self.level
            .as_mut()
            .filter(|level| level.status == LevelStatus::Playing)
    }

    fn frame_rate(&self) -> u64 {
        u64::from(self.settings.frame_rate.max(1))
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        let Some(level) = self.playing_level_mut() else {
            return;
        };

        let step = level.mover.step(&level.walls, &level.target);
        if step.moved() {
            out_events.push(Event::PlayerMoved {
                from: step.from,
                to: step.to,
            });
        }

        // A touch on the frame the clock would run out still counts as a win.
        if level.mover.has_won() {
            level.status = LevelStatus::Cleared;
            level.mover.release_all();
            info!(
                "level {} cleared after {} frames",
                level.plan.index.number(),
                level.frames
            );
            out_events.push(Event::TargetReached {
                level: level.plan.index,
                frames: level.frames,
            });
            return;
        }

        // The clock is read before the frame is counted, so the last budgeted
        // frame still gets its movement step.
        if level.frames >= level.budget_frames {
            level.status = LevelStatus::Expired;
            level.mover.release_all();
            info!("level {} ran out of time", level.plan.index.number());
            out_events.push(Event::TimeExpired {
                level: level.plan.index,
            });
            return;
        }
        level.frames = level.frames.saturating_add(1);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(SessionSettings::default(), DEFAULT_SEED)
    }
}

#[derive(Debug)]
struct Level {
    plan: LevelPlan,
    grid: Grid,
    walls: Vec<Rect>,
    start: CellCoord,
    target_cell: CellCoord,
    target: Rect,
    mover: Mover,
    frames: u64,
    budget_frames: u64,
    status: LevelStatus,
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartLevel { plan } => {
            let index = plan.index;
            match world.build_level(plan) {
                Ok(level) => {
                    info!(
                        "level {} started: {}x{} chambers, start {:?}, target {:?}",
                        index.number(),
                        level.plan.dimensions.rows(),
                        level.plan.dimensions.columns(),
                        level.start,
                        level.target_cell
                    );
                    out_events.push(Event::LevelStarted {
                        level: index,
                        start: level.start,
                        target: level.target_cell,
                    });
                    world.level = Some(level);
                }
                Err(reason) => {
                    warn!("level {} rejected: {reason}", index.number());
                    out_events.push(Event::LevelRejected {
                        level: index,
                        reason,
                    });
                }
            }
        }
        Command::PressDirection { direction } => {
            if let Some(level) = world.playing_level_mut() {
                if !level.mover.press(direction) {
                    debug!("ignored repeated press of {direction:?}");
                }
            }
        }
        Command::ReleaseDirection { direction } => {
            if let Some(level) = world.playing_level_mut() {
                if !level.mover.release(direction) {
                    debug!("ignored release of unheld {direction:?}");
                }
            }
        }
        Command::Tick => world.tick(out_events),
        Command::AbandonLevel => {
            if let Some(level) = world.level.take() {
                info!("level {} abandoned", level.plan.index.number());
                out_events.push(Event::LevelAbandoned {
                    level: level.plan.index,
                });
            }
        }
    }
}

fn budget_frames(budget: Duration, frame_rate: u64) -> u64 {
    let frames = budget.as_millis() * u128::from(frame_rate) / 1_000;
    u64::try_from(frames).unwrap_or(u64::MAX)
}

fn frames_to_duration(frames: u64, frame_rate: u64) -> Duration {
    let whole = Duration::from_secs(frames / frame_rate);
    let nanos = (frames % frame_rate) * 1_000_000_000 / frame_rate;
    whole + Duration::from_nanos(nanos)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{frames_to_duration, World};
    use tic_tac_maze_core::{
        CellCoord, Grid, LevelIndex, LevelPlan, LevelStatus, Palette, Rect, SessionSettings,
    };

    /// Session-wide tuning the world was created with.
    #[must_use]
    pub fn settings(world: &World) -> &SessionSettings {
        &world.settings
    }

    /// Index of the active level, if any.
    #[must_use]
    pub fn level(world: &World) -> Option<LevelIndex> {
        world.level.as_ref().map(|level| level.plan.index)
    }

    /// Plan the active level was built from.
    #[must_use]
    pub fn plan(world: &World) -> Option<&LevelPlan> {
        world.level.as_ref().map(|level| &level.plan)
    }

    /// Progress of the active level.
    #[must_use]
    pub fn status(world: &World) -> Option<LevelStatus> {
        world.level.as_ref().map(|level| level.status)
    }

    /// Maze of the active level.
    #[must_use]
    pub fn grid(world: &World) -> Option<&Grid> {
        world.level.as_ref().map(|level| &level.grid)
    }

    /// Wall rectangles of the active level in world units.
    #[must_use]
    pub fn walls(world: &World) -> &[Rect] {
        world
            .level
            .as_ref()
            .map(|level| level.walls.as_slice())
            .unwrap_or(&[])
    }

    /// Cell the player started the active level from.
    #[must_use]
    pub fn start_cell(world: &World) -> Option<CellCoord> {
        world.level.as_ref().map(|level| level.start)
    }

    /// Cell holding the target of the active level.
    #[must_use]
    pub fn target_cell(world: &World) -> Option<CellCoord> {
        world.level.as_ref().map(|level| level.target_cell)
    }

    /// Target box in world units.
    #[must_use]
    pub fn target(world: &World) -> Option<Rect> {
        world.level.as_ref().map(|level| level.target)
    }

    /// Current player box in world units.
    #[must_use]
    pub fn player(world: &World) -> Option<Rect> {
        world.level.as_ref().map(|level| level.mover.body())
    }

    /// Reports whether the player touched the target of the active level.
    #[must_use]
    pub fn has_won(world: &World) -> bool {
        world
            .level
            .as_ref()
            .is_some_and(|level| level.mover.has_won())
    }

    /// Frames counted against the active level's budget.
    #[must_use]
    pub fn elapsed_frames(world: &World) -> u64 {
        world.level.as_ref().map_or(0, |level| level.frames)
    }

    /// Time left on the active level's clock, saturating at zero.
    #[must_use]
    pub fn remaining_time(world: &World) -> Option<Duration> {
        world.level.as_ref().map(|level| {
            let elapsed = frames_to_duration(level.frames, world.frame_rate());
            level.plan.time_budget.saturating_sub(elapsed)
        })
    }

    /// Colors the active level is drawn with.
    #[must_use]
    pub fn palette(world: &World) -> Option<Palette> {
        world.level.as_ref().map(|level| level.plan.palette)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tic_tac_maze_core::{Direction, GridDimensions, LevelIndex, Palette, Rgb};

    fn plan(rows: u32, columns: u32, seconds: u64, min_distance: u32) -> LevelPlan {
        LevelPlan {
            index: LevelIndex::new(0),
            dimensions: GridDimensions::new(rows, columns),
            time_budget: Duration::from_secs(seconds),
            min_distance,
            palette: Palette {
                background: Rgb::from_rgb(50, 18, 131),
                wall: Rgb::from_rgb(183, 179, 137),
                player: Rgb::WHITE,
                target: Rgb::RED,
                font: Rgb::WHITE,
            },
        }
    }

    fn start(world: &mut World, plan: LevelPlan) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::StartLevel { plan }, &mut events);
        events
    }

    #[test]
    fn budget_frames_truncate_partial_frames() {
        assert_eq!(budget_frames(Duration::from_secs(90), 60), 5_400);
        assert_eq!(budget_frames(Duration::from_millis(25), 60), 1);
        assert_eq!(budget_frames(Duration::ZERO, 60), 0);
    }

    #[test]
    fn frames_convert_back_to_time() {
        assert_eq!(frames_to_duration(90, 60), Duration::from_millis(1_500));
        assert_eq!(frames_to_duration(0, 60), Duration::ZERO);
    }

    #[test]
    fn started_level_places_player_on_start_cell() {
        let mut world = World::default();
        let events = start(&mut world, plan(6, 8, 30, 6));

        let Some(Event::LevelStarted { start, target, .. }) = events.first().cloned() else {
            panic!("expected level start, got {events:?}");
        };
        let layout = query::settings(&world).layout;
        let player = query::player(&world).expect("active level");
        assert_eq!(player.origin(), layout.cell_origin(start));
        assert_eq!(player.width(), 9);
        assert_eq!(
            query::target(&world).map(|rect| rect.origin()),
            Some(layout.cell_origin(target))
        );
        assert_eq!(query::status(&world), Some(LevelStatus::Playing));
        let wall_cells = query::grid(&world).map_or(0, |grid| grid.walls().count());
        assert_eq!(query::walls(&world).len(), wall_cells);
    }

    #[test]
    fn input_before_any_level_is_ignored() {
        let mut world = World::default();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PressDirection {
                direction: Direction::East,
            },
            &mut events,
        );
        apply(&mut world, Command::Tick, &mut events);
        apply(&mut world, Command::AbandonLevel, &mut events);

        assert!(events.is_empty());
        assert_eq!(query::level(&world), None);
    }

    #[test]
    fn clock_expires_on_the_update_after_the_budget() {
        let mut world = World::default();
        let _ = start(&mut world, plan(4, 4, 1, 1));
        let mut events = Vec::new();

        for _ in 0..60 {
            apply(&mut world, Command::Tick, &mut events);
        }
        assert!(events.is_empty());
        assert_eq!(query::elapsed_frames(&world), 60);
        assert_eq!(query::remaining_time(&world), Some(Duration::ZERO));

        apply(&mut world, Command::Tick, &mut events);
        assert_eq!(
            events,
            vec![Event::TimeExpired {
                level: LevelIndex::new(0)
            }]
        );
        assert_eq!(query::status(&world), Some(LevelStatus::Expired));
        assert_eq!(query::remaining_time(&world), Some(Duration::ZERO));

        events.clear();
        apply(&mut world, Command::Tick, &mut events);
        assert!(events.is_empty(), "expired level kept ticking");
    }

    #[test]
    fn disconnected_cells_are_rejected() {
        let world = World::default();
        // An uncarved lattice leaves every chamber isolated.
        let grid = Grid::lattice(GridDimensions::new(1, 3)).expect("valid dimensions");
        let placement = Placement {
            start: CellCoord::new(1, 1),
            target: CellCoord::new(5, 1),
        };

        let result = world.assemble_level(plan(1, 3, 5, 4), grid, placement);

        assert_eq!(
            result.map(|level| level.start).err(),
            Some(LevelSetupError::Unreachable {
                start: CellCoord::new(1, 1),
                target: CellCoord::new(5, 1),
            })
        );
    }

    #[test]
    fn oversized_layout_is_rejected_before_carving() {
        let mut settings = SessionSettings::default();
        settings.layout.cell_size = 100_000_000;
        let mut world = World::new(settings, 1);

        let events = start(&mut world, plan(16, 27, 90, 20));

        assert_eq!(
            events,
            vec![Event::LevelRejected {
                level: LevelIndex::new(0),
                reason: LevelSetupError::LayoutOverflow {
                    rows: 16,
                    columns: 27,
                },
            }]
        );
        assert_eq!(query::level(&world), None);
    }

    #[test]
    fn zero_separation_on_single_cell_wins_immediately() {
        let mut world = World::default();
        let _ = start(&mut world, plan(1, 1, 5, 0));
        let mut events = Vec::new();

        apply(&mut world, Command::Tick, &mut events);

        assert_eq!(
            events,
            vec![Event::TargetReached {
                level: LevelIndex::new(0),
                frames: 0,
            }]
        );
        assert!(query::has_won(&world));
        assert_eq!(query::status(&world), Some(LevelStatus::Cleared));
    }

    #[test]
    fn abandon_discards_active_level() {
        let mut world = World::default();
        let _ = start(&mut world, plan(3, 3, 5, 0));
        let mut events = Vec::new();

        apply(&mut world, Command::AbandonLevel, &mut events);

        assert_eq!(
            events,
            vec![Event::LevelAbandoned {
                level: LevelIndex::new(0)
            }]
        );
        assert!(query::grid(&world).is_none());
        assert!(query::walls(&world).is_empty());
    }
}
