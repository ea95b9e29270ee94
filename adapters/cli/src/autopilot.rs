//! Scripted player that walks the shortest route to each level's target.

use std::collections::VecDeque;

use anyhow::{ensure, Result};
use log::debug;
use tic_tac_maze_core::{CellCoord, Command, Direction, Event, Grid, SessionSettings};

/// Emits one frame of input per call, always ending the frame with a tick.
#[derive(Debug)]
pub(crate) struct Autopilot {
    frames_per_cell: usize,
    script: VecDeque<Command>,
    active: bool,
}

impl Autopilot {
    /// Creates an autopilot for players that cross a cell in whole frames.
    pub(crate) fn new(settings: &SessionSettings) -> Result<Self> {
        let cell_size = settings.layout.cell_size;
        let speed = settings.speed;
        ensure!(
            speed > 0 && cell_size % speed == 0,
            "autopilot needs the cell size ({cell_size}) to be a multiple of the speed ({speed})"
        );
        Ok(Self {
            frames_per_cell: usize::try_from(cell_size / speed)?,
            script: VecDeque::new(),
            active: false,
        })
    }

    /// Reacts to world events and queues the next frame of input.
    pub(crate) fn handle(
        &mut self,
        events: &[Event],
        grid: Option<&Grid>,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::LevelStarted { start, target, .. } => {
                    self.script.clear();
                    self.active = true;
                    let route = grid.and_then(|grid| grid.shortest_path(*start, *target));
                    match route {
                        Some(route) => self.plan(&route),
                        None => debug!("no route from {start:?} to {target:?}"),
                    }
                }
                Event::TargetReached { .. }
                | Event::TimeExpired { .. }
                | Event::LevelAbandoned { .. } => {
                    self.script.clear();
                    self.active = false;
                }
                Event::LevelRejected { .. } | Event::PlayerMoved { .. } => {}
            }
        }

        if !self.active {
            return;
        }
        while let Some(command) = self.script.pop_front() {
            let end_of_frame = command == Command::Tick;
            out.push(command);
            if end_of_frame {
                return;
            }
        }
        // Out of route: keep the clock running.
        out.push(Command::Tick);
    }

    fn plan(&mut self, route: &[CellCoord]) {
        for pair in route.windows(2) {
            let Some(direction) = Direction::between(pair[0], pair[1]) else {
                continue;
            };
            self.script.push_back(Command::PressDirection { direction });
            self.script
                .extend(std::iter::repeat(Command::Tick).take(self.frames_per_cell));
            self.script.push_back(Command::ReleaseDirection { direction });
        }
        debug!(
            "planned {} steps of {} frames each",
            route.len().saturating_sub(1),
            self.frames_per_cell
        );
    }
}
