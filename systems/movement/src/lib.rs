#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Velocity accumulation and per-axis collision resolution for the player box.
//!
//! Walls and the target are static rectangles owned by the level session and
//! borrowed for the duration of a single step. The player is the only dynamic
//! body: a [`Mover`] accumulates held direction intents into a velocity and
//! resolves one displacement per frame, first along x and then along y.

use tic_tac_maze_core::{Direction, Point, Rect, Velocity};

/// Outcome of resolving a single displacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Body position after collisions were resolved.
    pub body: Rect,
    /// Indicates whether the body overlapped the target during either axis pass.
    pub touched_target: bool,
}

/// Moves `body` by `velocity`, pushing it out of every wall it enters.
///
/// The horizontal displacement is applied and resolved before the vertical
/// one. After each displacement the target is tested first, then every wall
/// overlapping the displaced body clamps it back along that axis only: a body
/// moving right or down is clamped to the wall's left or top edge, a body moving
/// left or up to its right or bottom edge. An axis without displacement is left
/// untouched.
#[must_use]
pub fn resolve(body: Rect, velocity: Velocity, walls: &[Rect], target: &Rect) -> Resolution {
    let mut touched_target = false;
    let body = resolve_axis(
        body,
        Axis::Horizontal,
        velocity.dx,
        walls,
        target,
        &mut touched_target,
    );
    let body = resolve_axis(
        body,
        Axis::Vertical,
        velocity.dy,
        walls,
        target,
        &mut touched_target,
    );
    Resolution {
        body,
        touched_target,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

fn resolve_axis(
    body: Rect,
    axis: Axis,
    delta: i32,
    walls: &[Rect],
    target: &Rect,
    touched_target: &mut bool,
) -> Rect {
    let moved = match axis {
        Axis::Horizontal => body.translated(delta, 0),
        Axis::Vertical => body.translated(0, delta),
    };

    if moved.overlaps(target) {
        *touched_target = true;
    }

    if delta == 0 {
        return moved;
    }

    let mut resolved = moved;
    for wall in walls.iter().filter(|wall| moved.overlaps(wall)) {
        resolved = match (axis, delta > 0) {
            (Axis::Horizontal, true) => resolved.with_right(wall.left()),
            (Axis::Horizontal, false) => resolved.with_left(wall.right()),
            (Axis::Vertical, true) => resolved.with_bottom(wall.top()),
            (Axis::Vertical, false) => resolved.with_top(wall.bottom()),
        };
    }
    resolved
}

/// Position change produced by [`Mover::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// Upper-left corner before the step.
    pub from: Point,
    /// Upper-left corner after the step.
    pub to: Point,
    /// Indicates whether this step set the win flag for the first time.
    pub reached_target: bool,
}

impl Step {
    /// Reports whether the body changed position.
    #[must_use]
    pub fn moved(&self) -> bool {
        self.from != self.to
    }
}

/// The player box together with its accumulated velocity and win flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mover {
    body: Rect,
    speed: i32,
    held: [bool; 4],
    velocity: Velocity,
    won: bool,
}

impl Mover {
    /// Creates a stationary mover occupying `body`.
    #[must_use]
    pub const fn new(body: Rect, speed: i32) -> Self {
        Self {
            body,
            speed,
            held: [false; 4],
            velocity: Velocity::ZERO,
            won: false,
        }
    }

    /// Current box of the mover.
    #[must_use]
    pub const fn body(&self) -> Rect {
        self.body
    }

    /// Displacement applied on the next step.
    #[must_use]
    pub const fn velocity(&self) -> Velocity {
        self.velocity
    }

    /// Reports whether the mover has touched the target. Never cleared.
    #[must_use]
    pub const fn has_won(&self) -> bool {
        self.won
    }

    /// Reports whether the direction is currently held.
    #[must_use]
    pub fn is_held(&self, direction: Direction) -> bool {
        self.held[slot(direction)]
    }

    /// Adds the direction's speed increment to the velocity.
    ///
    /// Returns `false` and leaves the velocity unchanged when the direction is
    /// already held.
    pub fn press(&mut self, direction: Direction) -> bool {
        let slot = slot(direction);
        if self.held[slot] {
            return false;
        }
        self.held[slot] = true;
        self.accelerate(direction, self.speed);
        true
    }

    /// Removes the direction's speed increment from the velocity.
    ///
    /// Returns `false` and leaves the velocity unchanged when the direction is
    /// not held.
    pub fn release(&mut self, direction: Direction) -> bool {
        let slot = slot(direction);
        if !self.held[slot] {
            return false;
        }
        self.held[slot] = false;
        self.accelerate(direction, -self.speed);
        true
    }

    /// Releases every held direction, bringing the mover to rest.
    pub fn release_all(&mut self) {
        self.held = [false; 4];
        self.velocity = Velocity::ZERO;
    }

    /// Applies the accumulated velocity against the borrowed walls and target.
    pub fn step(&mut self, walls: &[Rect], target: &Rect) -> Step {
        let from = self.body.origin();
        let resolution = resolve(self.body, self.velocity, walls, target);
        self.body = resolution.body;

        let reached_target = resolution.touched_target && !self.won;
        self.won |= resolution.touched_target;

        Step {
            from,
            to: self.body.origin(),
            reached_target,
        }
    }

    fn accelerate(&mut self, direction: Direction, amount: i32) {
        let (x, y) = direction.unit();
        self.velocity.dx += x * amount;
        self.velocity.dy += y * amount;
    }
}

fn slot(direction: Direction) -> usize {
    match direction {
        Direction::North => 0,
        Direction::East => 1,
        Direction::South => 2,
        Direction::West => 3,
    }
}
