use bevy::prelude::*;
use rand::Rng;

use crate::agent::Motion;
use crate::config::AgentParams;
use crate::grid::WorldGrid;
use crate::tiles::TileKind;

/// A pedestrian. Walks curb corners between road tiles and stops at a
/// building's entrance.
#[derive(Component, Debug, Clone)]
pub struct Person {
    pub motion: Motion,
    pub speed: f32,
}

impl Person {
    pub fn new(position: Vec2, params: &AgentParams) -> Self {
        Self {
            motion: Motion::new(position, params.arrival_threshold),
            speed: params.person_speed,
        }
    }

    /// One tick of the state machine.
    pub fn update(&mut self, grid: &WorldGrid, rng: &mut impl Rng, elapsed: f32) {
        let Some(current) = self.motion.current_tile(grid) else {
            debug!("person at {} is off the grid, skipping", self.motion.position);
            return;
        };

        if self.motion.is_idle() {
            if self.motion.plan(grid, rng, current) {
                self.next_waypoint(grid);
            }
            return;
        }

        if self.motion.target.is_none() || self.motion.step_towards(self.speed * elapsed) {
            self.next_waypoint(grid);
        }
    }

    fn next_waypoint(&mut self, grid: &WorldGrid) {
        let Some(next) = self.motion.path.pop_front() else {
            self.motion.arrive();
            return;
        };
        match grid.tile(next).map(|tile| tile.kind()) {
            Some(TileKind::Building(building)) if self.motion.destination == Some(next) => {
                self.motion.set_target(next, building.entrance());
            }
            Some(TileKind::Road(road)) => {
                let corner = road.curb().closest_to(self.motion.position);
                self.motion.set_target(next, corner);
            }
            Some(TileKind::Building(_)) | Some(TileKind::Soil) | None => {
                debug!("person route blocked at {next}, abandoning trip");
                self.motion.abandon();
            }
        }
    }
}
