//! Criterion benchmarks for grid A* at various distances.
//!
//! Fixture: a 64x64 grid with roads every 4 cells and a house in the
//! far block of each tier.
//!
//! Run with: cargo bench -p simulation --bench pathfinding_bench

use bevy::math::Vec2;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use simulation::grid::{GridLayout, WorldGrid};
use simulation::pathfinding_sys::find_path;
use simulation::tiles::{TilePosition, Tool};

const SIZE: usize = 64;
const SPACING: usize = 4;

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

fn build_grid_fixture() -> WorldGrid {
    let mut grid = WorldGrid::new(SIZE, SIZE, GridLayout::new(Vec2::ZERO, 32.0, 32.0, 4.0, 13.0));
    for row in (0..SIZE).step_by(SPACING) {
        for col in 0..SIZE {
            grid.build(TilePosition::new(row, col), Tool::Road)
                .expect("fixture road in bounds");
        }
    }
    for col in (0..SIZE).step_by(SPACING) {
        for row in 0..SIZE {
            grid.build(TilePosition::new(row, col), Tool::Road)
                .expect("fixture road in bounds");
        }
    }
    for goal in GOALS {
        grid.build(goal, Tool::House).expect("fixture house in bounds");
    }
    grid
}

const START: TilePosition = TilePosition::new(0, 0);

/// Houses sit one row below a horizontal road, beside a vertical one.
const GOALS: [TilePosition; 3] = [
    TilePosition::new(5, 5),
    TilePosition::new(21, 21),
    TilePosition::new(61, 61),
];

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_astar_distances(c: &mut Criterion) {
    let mut group = c.benchmark_group("astar_distance");
    group.sample_size(100);

    let grid = build_grid_fixture();

    for (label, goal) in ["short_10", "medium_40", "cross_map"].into_iter().zip(GOALS) {
        let path = find_path(&grid, START, goal).expect("endpoints in bounds");
        assert!(!path.is_empty(), "{label}: no path to {goal}");

        group.bench_function(label, |b| {
            b.iter(|| black_box(find_path(&grid, START, goal)));
        });
    }

    group.finish();
}

fn bench_astar_unreachable(c: &mut Criterion) {
    let mut grid = build_grid_fixture();
    // Wall off the last house.
    let goal = GOALS[2];
    for pos in [
        TilePosition::new(60, 61),
        TilePosition::new(62, 61),
        TilePosition::new(61, 60),
        TilePosition::new(61, 62),
    ] {
        grid.build(pos, Tool::Workplace).expect("in bounds");
    }

    c.bench_function("astar_unreachable_full_scan", |b| {
        b.iter(|| black_box(find_path(&grid, START, goal)));
    });
}

fn bench_grid_build(c: &mut Criterion) {
    c.bench_function("road_grid_build", |b| {
        b.iter(|| black_box(build_grid_fixture()));
    });
}

criterion_group!(
    benches,
    bench_astar_distances,
    bench_astar_unreachable,
    bench_grid_build
);
criterion_main!(benches);
