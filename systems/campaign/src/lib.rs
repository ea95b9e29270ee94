#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level schedule that advances the session through a fixed run of mazes.
//!
//! Every level shares the same chamber layout and separation; only the time
//! budget shrinks and the background color changes. The [`Campaign`] system
//! reacts to world events by requesting the next level or recording how the
//! run ended.

use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};
use tic_tac_maze_core::{
    Command, Event, GenerationError, GridDimensions, LevelIndex, LevelPlan, LevelSetupError,
    Palette, Rgb, SessionSettings,
};

/// Background colors cycled through by consecutive levels.
pub const DEFAULT_BACKGROUNDS: [Rgb; 10] = [
    Rgb::from_rgb(50, 18, 131),
    Rgb::from_rgb(26, 15, 62),
    Rgb::from_rgb(87, 28, 94),
    Rgb::from_rgb(61, 51, 12),
    Rgb::from_rgb(96, 6, 159),
    Rgb::from_rgb(63, 10, 11),
    Rgb::from_rgb(13, 66, 14),
    Rgb::from_rgb(19, 76, 71),
    Rgb::from_rgb(71, 41, 59),
    Rgb::from_rgb(45, 29, 3),
];

/// Color of every wall cell.
pub const DEFAULT_WALL: Rgb = Rgb::from_rgb(183, 179, 137);

/// Tunable parameters of a campaign, typically deserialized from a file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    /// Seed of the session's random stream.
    pub seed: u64,
    /// Number of levels in the run.
    pub levels: u32,
    /// Chamber rows of every maze.
    pub rows: u32,
    /// Chamber columns of every maze.
    pub columns: u32,
    /// Seconds available on the first level.
    pub initial_time_secs: u64,
    /// Seconds removed from the budget for each subsequent level.
    pub time_step_secs: u64,
    /// Minimum Manhattan distance between start and target cells.
    pub min_distance: u32,
    /// Background colors, cycled when there are fewer colors than levels.
    pub backgrounds: Vec<Rgb>,
    /// Wall color.
    pub wall: Rgb,
    /// Player color.
    pub player: Rgb,
    /// Target color.
    pub target: Rgb,
    /// Color of timer and banner text.
    pub font: Rgb,
    /// Session-wide tuning handed to the world.
    pub settings: SessionSettings,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            levels: 10,
            rows: 16,
            columns: 27,
            initial_time_secs: 90,
            time_step_secs: 6,
            min_distance: 20,
            backgrounds: DEFAULT_BACKGROUNDS.to_vec(),
            wall: DEFAULT_WALL,
            player: Rgb::WHITE,
            target: Rgb::RED,
            font: Rgb::WHITE,
            settings: SessionSettings::default(),
        }
    }
}

impl CampaignConfig {
    /// Chamber layout shared by every level.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        GridDimensions::new(self.rows, self.columns)
    }

    /// Checks that every level of the run can be planned and played.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels == 0 {
            return Err(ConfigError::NoLevels);
        }
        let _ = self.dimensions().validate()?;
        if self.backgrounds.is_empty() {
            return Err(ConfigError::NoBackgrounds);
        }

        let settings = &self.settings;
        if settings.frame_rate == 0 {
            return Err(ConfigError::ZeroFrameRate);
        }
        if settings.speed <= 0 {
            return Err(ConfigError::NonPositiveSpeed {
                speed: settings.speed,
            });
        }
        if settings.player_size <= 0 || settings.player_size > settings.layout.cell_size {
            return Err(ConfigError::PlayerDoesNotFit {
                player_size: settings.player_size,
                cell_size: settings.layout.cell_size,
            });
        }

        if settings.layout.bounds(self.dimensions()).is_none() {
            return Err(ConfigError::LayoutOverflow {
                cell_size: settings.layout.cell_size,
            });
        }

        let last = LevelIndex::new(self.levels - 1);
        if self.time_budget(last).is_zero() {
            return Err(ConfigError::ExhaustedTimeBudget {
                level: last.number(),
            });
        }
        Ok(())
    }

    /// Time available on `level`, saturating at zero.
    #[must_use]
    pub fn time_budget(&self, level: LevelIndex) -> Duration {
        let reduction = self
            .time_step_secs
            .saturating_mul(u64::from(level.get()));
        Duration::from_secs(self.initial_time_secs.saturating_sub(reduction))
    }

    /// Colors used while `level` is active.
    #[must_use]
    pub fn palette(&self, level: LevelIndex) -> Palette {
        let background = match self.backgrounds.len() {
            0 => Rgb::from_rgb(0, 0, 0),
            len => self.backgrounds[level.get() as usize % len],
        };
        Palette {
            background,
            wall: self.wall,
            player: self.player,
            target: self.target,
            font: self.font,
        }
    }

    /// Plan for `level`, or `None` past the end of the run.
    #[must_use]
    pub fn plan(&self, level: LevelIndex) -> Option<LevelPlan> {
        if level.get() >= self.levels {
            return None;
        }
        Some(LevelPlan {
            index: level,
            dimensions: self.dimensions(),
            time_budget: self.time_budget(level),
            min_distance: self.min_distance,
            palette: self.palette(level),
        })
    }
}

/// Reasons a campaign configuration is refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The run contains no level.
    #[error("a campaign needs at least one level")]
    NoLevels,
    /// The chamber layout cannot be generated.
    #[error("invalid maze dimensions: {0}")]
    Dimensions(#[from] GenerationError),
    /// No background color was supplied.
    #[error("at least one background color is required")]
    NoBackgrounds,
    /// Frames would never advance the clock.
    #[error("frame rate must be positive")]
    ZeroFrameRate,
    /// The player could never move.
    #[error("speed must be positive, got {speed}")]
    NonPositiveSpeed {
        /// Configured speed.
        speed: i32,
    },
    /// The player box would not fit inside a corridor.
    #[error("player size {player_size} must be between 1 and the cell size {cell_size}")]
    PlayerDoesNotFit {
        /// Configured player edge length.
        player_size: i32,
        /// Configured cell edge length.
        cell_size: i32,
    },
    /// Cell coordinates of the maze would not fit in world units.
    #[error("cell size {cell_size} places the maze outside the representable pixel range")]
    LayoutOverflow {
        /// Configured cell edge length.
        cell_size: i32,
    },
    /// A level would start with no time on the clock.
    #[error("level {level} has no time left in its budget")]
    ExhaustedTimeBudget {
        /// One-based number of the first level without time.
        level: u32,
    },
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Every level was cleared.
    Completed,
    /// The clock ran out on a level.
    TimedOut {
        /// Level that was lost.
        level: LevelIndex,
    },
    /// A level could not be set up.
    Rejected {
        /// Level that failed.
        level: LevelIndex,
        /// Reason reported by the world.
        reason: LevelSetupError,
    },
    /// The active level was discarded.
    Abandoned {
        /// Level that was discarded.
        level: LevelIndex,
    },
}

/// Pure system that schedules levels and tracks the run's outcome.
#[derive(Debug)]
pub struct Campaign {
    config: CampaignConfig,
    current: Option<LevelIndex>,
    cleared: u32,
    outcome: Option<Outcome>,
}

impl Campaign {
    /// Creates a campaign after validating its configuration.
    pub fn new(config: CampaignConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            current: None,
            cleared: 0,
            outcome: None,
        })
    }

    /// Configuration the campaign was created with.
    #[must_use]
    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }

    /// Level most recently started by the world.
    #[must_use]
    pub const fn current(&self) -> Option<LevelIndex> {
        self.current
    }

    /// Number of levels cleared so far.
    #[must_use]
    pub const fn cleared(&self) -> u32 {
        self.cleared
    }

    /// How the run ended, once it has.
    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Emits the command that starts the first level.
    pub fn begin(&self, out: &mut Vec<Command>) {
        if let Some(plan) = self.config.plan(LevelIndex::new(0)) {
            out.push(Command::StartLevel { plan });
        }
    }

    /// Consumes world events and emits the command for the next level.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            if self.outcome.is_some() {
                return;
            }
            match event {
                Event::LevelStarted { level, .. } => self.current = Some(*level),
                Event::TargetReached { level, .. } => {
                    self.cleared = self.cleared.saturating_add(1);
                    match self.config.plan(level.next()) {
                        Some(plan) => out.push(Command::StartLevel { plan }),
                        None => {
                            info!("campaign completed after {} levels", self.cleared);
                            self.outcome = Some(Outcome::Completed);
                        }
                    }
                }
                Event::TimeExpired { level } => {
                    info!("campaign over on level {}", level.number());
                    self.outcome = Some(Outcome::TimedOut { level: *level });
                }
                Event::LevelRejected { level, reason } => {
                    self.outcome = Some(Outcome::Rejected {
                        level: *level,
                        reason: *reason,
                    });
                }
                Event::LevelAbandoned { level } => {
                    self.outcome = Some(Outcome::Abandoned { level: *level });
                }
                Event::PlayerMoved { .. } => {}
            }
        }
    }
}
