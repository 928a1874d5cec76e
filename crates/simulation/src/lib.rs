use bevy::prelude::*;

pub mod agent;
pub mod agent_spawner;
pub mod config;
pub mod construction;
pub mod events;
pub mod grid;
pub mod movement;
pub mod pathfinding_sys;
pub mod person;
pub mod roads;
pub mod sim_rng;
pub mod simulation_sets;
pub mod tiles;
pub mod vehicle;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use simulation_sets::SimulationSet;

use config::SimConfig;
use events::{
    AgentMoved, AgentSpawned, AgentVisibilityChanged, BuildRequest, RoadBuilt, SetIndoors,
    SpawnRequest, TileAssetReleased, TileBuilt,
};
use grid::WorldGrid;
use sim_rng::SimRng;

// ---------------------------------------------------------------------------
// Core resources
// ---------------------------------------------------------------------------

/// Number of completed `FixedUpdate` ticks.
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

pub fn advance_tick(mut tick: ResMut<TickCounter>) {
    tick.0 = tick.0.wrapping_add(1);
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Grid, agents and their per-tick systems.
///
/// Reads `SimConfig` if one was inserted beforehand; otherwise the defaults
/// apply. A pre-inserted `WorldGrid` is kept as-is.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = match app.world().get_resource::<SimConfig>() {
            Some(config) => match config.validate() {
                Ok(()) => config.clone(),
                Err(err) => {
                    error!("{err}; falling back to default config");
                    SimConfig::default()
                }
            },
            None => SimConfig::default(),
        };

        if !app.world().contains_resource::<WorldGrid>() {
            app.insert_resource(WorldGrid::from_config(&config));
        }
        info!(
            "SimulationPlugin: {}x{} grid, {} Hz, seed {}",
            config.rows, config.cols, config.tick_hz, config.seed
        );

        app.insert_resource(Time::<Fixed>::from_hz(config.tick_hz))
            .insert_resource(SimRng::from_seed_u64(config.seed))
            .insert_resource(config)
            .init_resource::<TickCounter>()
            .add_event::<BuildRequest>()
            .add_event::<TileBuilt>()
            .add_event::<TileAssetReleased>()
            .add_event::<RoadBuilt>()
            .add_event::<SpawnRequest>()
            .add_event::<AgentSpawned>()
            .add_event::<SetIndoors>()
            .add_event::<AgentVisibilityChanged>()
            .add_event::<AgentMoved>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::PreSim,
                    SimulationSet::Simulation,
                    SimulationSet::PostSim,
                )
                    .chain(),
            )
            .add_systems(
                FixedUpdate,
                (
                    construction::apply_build_requests,
                    agent_spawner::dispatch_spawn_requests,
                    agent_spawner::apply_indoor_requests,
                )
                    .chain()
                    .in_set(SimulationSet::PreSim),
            )
            .add_systems(FixedUpdate, advance_tick.in_set(SimulationSet::PostSim));

        app.add_plugins(movement::MovementPlugin);

        if let Err(err) = agent_spawner::register_default_spawner(app.world_mut()) {
            debug!("keeping pre-registered spawn responder: {err}");
        }
    }
}
