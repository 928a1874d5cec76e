//! # TestCity — headless harness for grid and agent scenarios
//!
//! Wraps `bevy::app::App` + `SimulationPlugin` with a manual clock so every
//! `tick()` runs exactly one `FixedUpdate` step.

use std::ops::RangeInclusive;
use std::time::Duration;

use bevy::app::App;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::agent::{AgentKind, Indoors};
use crate::config::SimConfig;
use crate::events::{self, BuildRequest, SetIndoors, SpawnRequest};
use crate::grid::WorldGrid;
use crate::person::Person;
use crate::tiles::{Tile, TilePosition, Tool};
use crate::vehicle::Vehicle;
use crate::{SimulationPlugin, TickCounter};

pub struct TestCity {
    app: App,
}

impl Default for TestCity {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCity {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// An all-soil grid with default config.
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    pub fn with_config(config: SimConfig) -> Self {
        let tick = Duration::from_secs_f64(1.0 / config.tick_hz);
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(tick));
        app.insert_resource(config);
        app.add_plugins(SimulationPlugin);

        // The first update only primes the clock; no fixed step runs.
        app.update();

        Self { app }
    }

    // -----------------------------------------------------------------------
    // World setup (builder pattern — consumes and returns Self)
    // -----------------------------------------------------------------------

    /// Build directly on the grid, bypassing the request queue.
    pub fn with_tile(mut self, row: usize, col: usize, tool: Tool) -> Self {
        self.build_now(row, col, tool);
        self
    }

    pub fn with_road_row(mut self, row: usize, cols: RangeInclusive<usize>) -> Self {
        for col in cols {
            self.build_now(row, col, Tool::Road);
        }
        self
    }

    pub fn with_road_col(mut self, col: usize, rows: RangeInclusive<usize>) -> Self {
        for row in rows {
            self.build_now(row, col, Tool::Road);
        }
        self
    }

    fn build_now(&mut self, row: usize, col: usize, tool: Tool) {
        let mut grid = self.app.world_mut().resource_mut::<WorldGrid>();
        if let Err(err) = grid.build(TilePosition::new(row, col), tool) {
            panic!("TestCity setup: {err}");
        }
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Queue a build request; it applies on the next tick.
    pub fn request_build(&mut self, row: usize, col: usize, tool: Tool) {
        self.app.world_mut().send_event(BuildRequest {
            position: TilePosition::new(row, col),
            tool,
        });
    }

    /// Queue a spawn request; it applies on the next tick.
    pub fn request_spawn(&mut self, kind: AgentKind, position: Vec2, indoors: bool) {
        self.app.world_mut().send_event(SpawnRequest {
            position,
            kind,
            indoors,
        });
    }

    /// Spawn immediately through the spawn responder.
    pub fn spawn(&mut self, kind: AgentKind, position: Vec2, indoors: bool) -> Entity {
        let request = SpawnRequest {
            position,
            kind,
            indoors,
        };
        match events::request::<SpawnRequest, Entity>(self.app.world_mut(), request) {
            Ok(entity) => entity,
            Err(err) => panic!("TestCity spawn: {err}"),
        }
    }

    pub fn spawn_person_at(&mut self, row: usize, col: usize) -> Entity {
        let center = self.grid().tile_center(TilePosition::new(row, col));
        self.spawn(AgentKind::Person, center, false)
    }

    pub fn spawn_vehicle_at(&mut self, row: usize, col: usize) -> Entity {
        let center = self.grid().tile_center(TilePosition::new(row, col));
        self.spawn(AgentKind::Vehicle, center, false)
    }

    pub fn set_indoors(&mut self, entity: Entity, indoors: bool) {
        self.app
            .world_mut()
            .send_event(SetIndoors { entity, indoors });
    }

    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Run `n` fixed ticks.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.update();
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn grid(&self) -> &WorldGrid {
        self.resource::<WorldGrid>()
    }

    pub fn tile(&self, row: usize, col: usize) -> &Tile {
        match self.grid().tile(TilePosition::new(row, col)) {
            Some(tile) => tile,
            None => panic!("no tile at ({row}, {col})"),
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.resource::<TickCounter>().0
    }

    pub fn person(&self, entity: Entity) -> &Person {
        match self.app.world().get::<Person>(entity) {
            Some(person) => person,
            None => panic!("{entity} is not a person"),
        }
    }

    pub fn vehicle(&self, entity: Entity) -> &Vehicle {
        match self.app.world().get::<Vehicle>(entity) {
            Some(vehicle) => vehicle,
            None => panic!("{entity} is not a vehicle"),
        }
    }

    pub fn is_indoors(&self, entity: Entity) -> bool {
        self.app.world().get::<Indoors>(entity).is_some()
    }

    pub fn agent_count(&mut self) -> usize {
        let world = self.app.world_mut();
        world.query::<&Person>().iter(world).count() + world.query::<&Vehicle>().iter(world).count()
    }

    /// Events of type `E` sent during the most recent tick.
    pub fn events<E: Event + Clone>(&self) -> Vec<E> {
        self.resource::<Events<E>>()
            .iter_current_update_events()
            .cloned()
            .collect()
    }

    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    pub fn assert_destinations_match_buildings(&self) {
        let buildings: Vec<TilePosition> = self
            .grid()
            .tiles()
            .filter(|t| t.is_building())
            .map(Tile::position)
            .collect();
        let destinations: Vec<TilePosition> = self.grid().destinations().iter().copied().collect();
        assert_eq!(
            destinations, buildings,
            "destination set out of sync with building tiles"
        );
    }

    pub fn assert_agent_near(&self, position: Vec2, target: Vec2, tolerance: f32) {
        let dist = position.distance(target);
        assert!(
            dist <= tolerance,
            "expected agent within {tolerance}px of {target}, got {position} ({dist}px away)"
        );
    }
}
