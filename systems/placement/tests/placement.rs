use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tic_tac_maze_core::{CellCoord, Grid, GridDimensions, PlacementError};
use tic_tac_maze_system_generator::generate;
use tic_tac_maze_system_placement::{max_open_distance, sample, PositionSampler};

fn maze(rows: u32, columns: u32, seed: u64) -> Grid {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate(GridDimensions::new(rows, columns), &mut rng).expect("valid dimensions")
}

#[test]
fn sampled_cells_are_open_and_separated() {
    for seed in 0..50 {
        let grid = maze(16, 27, seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0x5a5a);

        let placement = sample(&grid, 20, &mut rng).expect("placement succeeds");

        assert!(grid.is_open(placement.start), "start on a wall for seed {seed}");
        assert!(grid.is_open(placement.target), "target on a wall for seed {seed}");
        assert!(
            placement.distance() >= 20,
            "separation {} below minimum for seed {seed}",
            placement.distance()
        );
    }
}

#[test]
fn zero_separation_is_always_satisfiable() {
    let grid = maze(1, 1, 0);
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let placement = sample(&grid, 0, &mut rng).expect("placement succeeds");

    assert_eq!(placement.start, CellCoord::new(1, 1));
    assert_eq!(placement.target, CellCoord::new(1, 1));
}

#[test]
fn unsatisfiable_separation_fails_without_sampling() {
    let grid = maze(3, 3, 5);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let max_distance = max_open_distance(&grid).expect("grid has open cells");

    assert_eq!(max_distance, 8);
    assert_eq!(
        sample(&grid, max_distance + 1, &mut rng),
        Err(PlacementError::Unsatisfiable {
            min_distance: 9,
            max_distance: 8,
        })
    );
}

#[test]
fn extreme_but_satisfiable_separation_picks_opposite_corners() {
    let grid = maze(3, 3, 8);
    let mut rng = ChaCha8Rng::seed_from_u64(8);

    let placement = sample(&grid, 8, &mut rng).expect("corners are reachable");

    let corners = [CellCoord::new(1, 1), CellCoord::new(5, 5)];
    let anti_corners = [CellCoord::new(5, 1), CellCoord::new(1, 5)];
    let pair = [placement.start, placement.target];
    assert!(
        corners.iter().all(|corner| pair.contains(corner))
            || anti_corners.iter().all(|corner| pair.contains(corner)),
        "unexpected placement {placement:?}"
    );
}

#[test]
fn zero_budget_never_draws() {
    let grid = maze(2, 2, 1);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    // A sampler with no budget can never draw.
    let sampler = PositionSampler::new(0);

    assert_eq!(
        sampler.sample(&grid, 0, &mut rng),
        Err(PlacementError::AttemptsExhausted { attempts: 0 })
    );
}

#[test]
fn exhausted_budget_reports_attempts() {
    let grid = maze(16, 27, 3);
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let sampler = PositionSampler::new(1);
    assert_eq!(sampler.max_attempts(), 1);
    assert_eq!(
        PositionSampler::default().max_attempts(),
        PositionSampler::DEFAULT_MAX_ATTEMPTS
    );

    let result = sampler.sample(&grid, 20, &mut rng);

    // One draw can at best place the start, never both cells.
    assert_eq!(result, Err(PlacementError::AttemptsExhausted { attempts: 1 }));
}

#[test]
fn sampling_is_reproducible_for_same_seed() {
    let grid = maze(10, 10, 42);

    let first = sample(&grid, 12, &mut ChaCha8Rng::seed_from_u64(9)).expect("placement");
    let second = sample(&grid, 12, &mut ChaCha8Rng::seed_from_u64(9)).expect("placement");

    assert_eq!(first, second);
}
