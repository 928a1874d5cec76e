//! Criterion benchmark: one fixed tick with many agents commuting.
//!
//! Run with: cargo bench -p simulation --bench tick_bench --features bench

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use simulation::agent::AgentKind;
use simulation::config::SimConfig;
use simulation::test_harness::TestCity;
use simulation::tiles::{TilePosition, Tool};

const SIZE: usize = 64;

/// Road grid every 4 cells with a house or workplace in every block.
fn create_benchmark_city(agent_count: usize) -> TestCity {
    let config = SimConfig {
        rows: SIZE,
        cols: SIZE,
        ..SimConfig::default()
    };
    let mut city = TestCity::with_config(config);
    for row in (0..SIZE).step_by(4) {
        city = city.with_road_row(row, 0..=SIZE - 1);
    }
    for col in (0..SIZE).step_by(4) {
        city = city.with_road_col(col, 0..=SIZE - 1);
    }
    for block_row in 0..SIZE / 4 {
        for block_col in 0..SIZE / 4 {
            let tool = if (block_row + block_col) % 2 == 0 {
                Tool::House
            } else {
                Tool::Workplace
            };
            city = city.with_tile(block_row * 4 + 1, block_col * 4 + 1, tool);
        }
    }

    for i in 0..agent_count {
        let row = (i % (SIZE / 4)) * 4;
        let col = i / (SIZE / 4) % SIZE;
        let center = city.grid().tile_center(TilePosition::new(row, col));
        let kind = if i % 3 == 0 {
            AgentKind::Vehicle
        } else {
            AgentKind::Person
        };
        city.spawn(kind, center, false);
    }

    // Let every agent plan once so the measured ticks are steady-state.
    city.tick(1);
    city
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixed_tick");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    for agents in [100usize, 1_000, 5_000] {
        let mut city = create_benchmark_city(agents);
        group.bench_with_input(BenchmarkId::from_parameter(agents), &agents, |b, _| {
            b.iter(|| city.tick(1));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
