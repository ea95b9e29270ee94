use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tic_tac_maze_core::{Direction, Point, Rect, Velocity};
use tic_tac_maze_system_movement::{resolve, Mover};

const FAR_TARGET: Rect = Rect::new(10_000, 10_000, 9, 9);

fn random_walls(rng: &mut ChaCha8Rng, count: usize) -> Vec<Rect> {
    (0..count)
        .map(|_| {
            Rect::new(
                rng.gen_range(-40..40),
                rng.gen_range(-40..40),
                rng.gen_range(1..20),
                rng.gen_range(1..20),
            )
        })
        .collect()
}

#[test]
fn stationary_body_never_moves() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x51a7);

    for _ in 0..200 {
        let body = Rect::new(rng.gen_range(-20..20), rng.gen_range(-20..20), 9, 9);
        let walls = random_walls(&mut rng, 12);

        let resolution = resolve(body, Velocity::ZERO, &walls, &FAR_TARGET);

        assert_eq!(resolution.body, body, "stationary body moved against {walls:?}");
    }
}

#[test]
fn horizontal_collision_leaves_y_untouched() {
    let body = Rect::new(10, 10, 9, 9);
    let walls = [Rect::new(19, 4, 12, 12), Rect::new(19, 16, 12, 12)];

    let resolution = resolve(body, Velocity::new(2, 0), &walls, &FAR_TARGET);

    assert_eq!(resolution.body.origin(), Point::new(10, 10));
}

#[test]
fn vertical_collision_leaves_x_untouched() {
    let body = Rect::new(40, 40, 9, 9);
    let wall = Rect::new(36, 20, 20, 12);

    let resolution = resolve(body, Velocity::new(0, -10), &[wall], &FAR_TARGET);

    assert_eq!(resolution.body.origin(), Point::new(40, 32));
}

#[test]
fn diagonal_motion_slides_along_wall() {
    let body = Rect::new(10, 10, 9, 9);
    let wall = Rect::new(19, 0, 12, 60);

    let resolution = resolve(body, Velocity::new(2, 2), &[wall], &FAR_TARGET);

    assert_eq!(resolution.body.origin(), Point::new(10, 12));
}

#[test]
fn target_does_not_block_movement() {
    let body = Rect::new(10, 10, 9, 9);
    let target = Rect::new(20, 10, 9, 9);

    let resolution = resolve(body, Velocity::new(2, 0), &[], &target);

    assert!(resolution.touched_target);
    assert_eq!(resolution.body.origin(), Point::new(12, 10));
}

#[test]
fn target_touched_on_vertical_pass_counts() {
    let body = Rect::new(10, 10, 9, 9);
    let target = Rect::new(10, 21, 9, 9);

    let resolution = resolve(body, Velocity::new(0, 3), &[], &target);

    assert!(resolution.touched_target);
}

#[test]
fn win_flag_is_sticky() {
    let target = Rect::new(10, 10, 9, 9);
    let mut mover = Mover::new(Rect::new(0, 10, 9, 9), 2);
    assert!(mover.press(Direction::East));

    let step = mover.step(&[], &target);
    assert!(step.reached_target);
    assert!(mover.has_won());

    assert!(mover.release(Direction::East));
    assert!(mover.press(Direction::West));
    for _ in 0..20 {
        let step = mover.step(&[], &target);
        assert!(!step.reached_target, "win must only be reported once");
        assert!(mover.has_won(), "win flag cleared after leaving the target");
    }
    assert!(!mover.body().overlaps(&target));
}

#[test]
fn mover_walks_a_corridor_until_blocked() {
    // Walls above and below a horizontal corridor, closed on the right.
    let mut walls = Vec::new();
    for column in 0..6 {
        walls.push(Rect::new(column * 12, 0, 12, 12));
        walls.push(Rect::new(column * 12, 24, 12, 12));
    }
    walls.push(Rect::new(60, 12, 12, 12));

    let mut mover = Mover::new(Rect::new(12, 12, 9, 9), 2);
    assert!(mover.press(Direction::East));

    let mut frames = 0;
    loop {
        let step = mover.step(&walls, &FAR_TARGET);
        frames += 1;
        if !step.moved() {
            break;
        }
        assert!(frames < 100, "mover never stopped");
    }

    assert_eq!(mover.body().right(), 60);
    assert_eq!(mover.body().top(), 12);
}

#[test]
fn paired_events_return_velocity_to_zero() {
    let mut mover = Mover::new(Rect::new(0, 0, 9, 9), 3);

    for direction in Direction::ALL {
        assert!(mover.press(direction));
    }
    assert_eq!(mover.velocity(), Velocity::ZERO);

    assert!(mover.release(Direction::North));
    assert_eq!(mover.velocity(), Velocity::new(0, 3));

    for direction in [Direction::East, Direction::South, Direction::West] {
        assert!(mover.release(direction));
    }
    assert!(mover.velocity().is_zero());
}
