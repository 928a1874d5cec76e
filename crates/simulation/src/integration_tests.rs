//! Integration tests using the `TestCity` harness.
//!
//! These spin up a headless Bevy App with `SimulationPlugin` and drive it
//! tick by tick through the request events and the spawn responder.


use crate::config::SimConfig;
use crate::test_harness::TestCity;
use crate::tiles::TileKind;

// ===========================================================================
// Harness bootstrap tests
// ===========================================================================

#[test]
fn test_empty_city_is_all_soil() {
    let city = TestCity::new();
    let grid = city.grid();
    assert_eq!(grid.rows(), crate::config::GRID_ROWS);
    assert_eq!(grid.cols(), crate::config::GRID_COLS);
    assert!(grid.tiles().all(|t| t.kind() == &TileKind::Soil));
    assert!(grid.destinations().is_empty());
}

#[test]
fn test_empty_city_has_no_agents() {
    let mut city = TestCity::new();
    assert_eq!(city.agent_count(), 0);
}

#[test]
fn test_each_tick_runs_one_fixed_step() {
    let mut city = TestCity::new();
    assert_eq!(city.tick_count(), 0);
    city.tick(1);
    assert_eq!(city.tick_count(), 1);
    city.tick(9);
    assert_eq!(city.tick_count(), 10);
}

#[test]
fn test_config_sizes_the_grid() {
    let config = SimConfig {
        rows: 8,
        cols: 20,
        cell_width: 16.0,
        cell_height: 16.0,
        curb_offset: 2.0,
        lane_offset: 6.0,
        ..SimConfig::default()
    };
    let city = TestCity::with_config(config);
    assert_eq!(city.grid().rows(), 8);
    assert_eq!(city.grid().cols(), 20);
    assert_eq!(
        city.grid().tile_center(crate::tiles::TilePosition::new(1, 2)),
        bevy::math::Vec2::new(40.0, 24.0)
    );
}
