#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Tic Tac Maze campaign headlessly.

mod autopilot;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use tic_tac_maze_core::Event;
use tic_tac_maze_system_campaign::{Campaign, CampaignConfig, Outcome};
use tic_tac_maze_world::{apply, query, World};

use crate::autopilot::Autopilot;

/// Plays a run of timed mazes with an autopilot that walks the shortest route.
#[derive(Debug, Parser)]
#[command(name = "tic-tac-maze", version, about)]
struct Args {
    /// TOML campaign file; flags below override its values.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seed of the session's random stream.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of levels in the run.
    #[arg(long)]
    levels: Option<u32>,

    /// Chamber rows of every maze.
    #[arg(long)]
    rows: Option<u32>,

    /// Chamber columns of every maze.
    #[arg(long)]
    columns: Option<u32>,

    /// Minimum Manhattan distance between start and target.
    #[arg(long)]
    min_distance: Option<u32>,

    /// Prints each maze as it is generated.
    #[arg(long)]
    show_maze: bool,

    /// Log filter, taking precedence over `RUST_LOG`.
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

/// Entry point for the Tic Tac Maze command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    let config = load_config(&args)?;
    play(config, args.show_maze)
}

fn init_logging(filter: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(filter) = filter {
        let _ = builder.parse_filters(filter);
    }
    builder.init();
}

fn load_config(args: &Args) -> Result<CampaignConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read campaign file {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("failed to parse campaign file {}", path.display()))?
        }
        None => CampaignConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(levels) = args.levels {
        config.levels = levels;
    }
    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if let Some(columns) = args.columns {
        config.columns = columns;
    }
    if let Some(min_distance) = args.min_distance {
        config.min_distance = min_distance;
    }
    Ok(config)
}

fn play(config: CampaignConfig, show_maze: bool) -> Result<()> {
    let mut campaign = Campaign::new(config).context("invalid campaign configuration")?;
    let settings = campaign.config().settings;
    let mut world = World::new(settings, campaign.config().seed);
    let mut autopilot = Autopilot::new(&settings)?;
    info!(
        "playing {} levels with seed {}",
        campaign.config().levels,
        campaign.config().seed
    );

    let mut pending = Vec::new();
    campaign.begin(&mut pending);
    let mut events = Vec::new();

    loop {
        events.clear();
        for command in pending.drain(..) {
            apply(&mut world, command, &mut events);
        }
        report(&world, &events, show_maze);

        campaign.handle(&events, &mut pending);
        if let Some(outcome) = campaign.outcome() {
            return finish(&campaign, outcome);
        }
        autopilot.handle(&events, query::grid(&world), &mut pending);
        if pending.is_empty() {
            bail!("session stalled without an active level");
        }
    }
}

fn report(world: &World, events: &[Event], show_maze: bool) {
    for event in events {
        match event {
            Event::LevelStarted {
                level,
                start,
                target,
            } => {
                let budget = query::remaining_time(world).unwrap_or(Duration::ZERO);
                println!(
                    "level {}: start ({}, {}), target ({}, {}), {} on the clock",
                    level.number(),
                    start.column(),
                    start.row(),
                    target.column(),
                    target.row(),
                    clock(budget)
                );
                if show_maze {
                    if let Some(grid) = query::grid(world) {
                        print!("{grid}");
                    }
                }
            }
            Event::TargetReached { level, frames } => {
                let left = query::remaining_time(world).unwrap_or(Duration::ZERO);
                println!(
                    "level {} cleared after {frames} frames with {} left",
                    level.number(),
                    clock(left)
                );
            }
            Event::TimeExpired { level } => {
                println!("level {}: time is up", level.number());
            }
            Event::LevelRejected { .. }
            | Event::LevelAbandoned { .. }
            | Event::PlayerMoved { .. } => {}
        }
    }
}

fn finish(campaign: &Campaign, outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Completed => {
            println!("all {} levels cleared", campaign.cleared());
            Ok(())
        }
        Outcome::TimedOut { level } => {
            println!(
                "game over on level {} after clearing {}",
                level.number(),
                campaign.cleared()
            );
            Ok(())
        }
        Outcome::Rejected { level, reason } => {
            Err(reason).with_context(|| format!("level {} could not be set up", level.number()))
        }
        Outcome::Abandoned { level } => bail!("level {} was abandoned", level.number()),
    }
}

/// Formats a duration as `mm:ss`, dropping partial seconds.
fn clock(duration: Duration) -> String {
    let seconds = duration.as_secs();
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
