use bevy::prelude::*;

use crate::agent::Indoors;
use crate::events::AgentMoved;
use crate::grid::WorldGrid;
use crate::person::Person;
use crate::sim_rng::SimRng;
use crate::simulation_sets::SimulationSet;
use crate::vehicle::Vehicle;

/// Agents draw one step above the road layer of the row they stand on.
pub fn agent_depth(grid: &WorldGrid, position: Vec2) -> u32 {
    grid.tile_at_pixel(position)
        .map(|tile| (tile.row as u32 + 1) * 10 + 1)
        .unwrap_or(0)
}

pub fn drive_people(
    time: Res<Time>,
    grid: Res<WorldGrid>,
    mut rng: ResMut<SimRng>,
    mut people: Query<(Entity, &mut Person), Without<Indoors>>,
    mut moved: EventWriter<AgentMoved>,
) {
    let elapsed = time.delta_secs();
    for (entity, mut person) in &mut people {
        let before = (person.motion.position, person.motion.direction);
        person.update(&grid, &mut rng.0, elapsed);

        let motion = &person.motion;
        if (motion.position, motion.direction) != before {
            moved.send(AgentMoved {
                entity,
                position: motion.position,
                rotation: None,
                direction: motion.direction,
                depth: agent_depth(&grid, motion.position),
            });
        }
    }
}

pub fn drive_vehicles(
    time: Res<Time>,
    grid: Res<WorldGrid>,
    mut rng: ResMut<SimRng>,
    mut vehicles: Query<(Entity, &mut Vehicle), Without<Indoors>>,
    mut moved: EventWriter<AgentMoved>,
) {
    let elapsed = time.delta_secs();
    for (entity, mut vehicle) in &mut vehicles {
        let before = (
            vehicle.motion.position,
            vehicle.motion.direction,
            vehicle.rotation,
        );
        vehicle.update(&grid, &mut rng.0, elapsed);

        let after = (
            vehicle.motion.position,
            vehicle.motion.direction,
            vehicle.rotation,
        );
        if after != before {
            moved.send(AgentMoved {
                entity,
                position: after.0,
                rotation: Some(after.2),
                direction: after.1,
                depth: agent_depth(&grid, after.0),
            });
        }
    }
}

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (drive_people, drive_vehicles)
                .chain()
                .in_set(SimulationSet::Simulation),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridLayout;

    #[test]
    fn test_agent_depth_is_row_derived() {
        let grid = WorldGrid::new(8, 8, GridLayout::new(Vec2::ZERO, 32.0, 32.0, 4.0, 13.0));
        assert_eq!(agent_depth(&grid, Vec2::new(5.0, 5.0)), 11);
        assert_eq!(agent_depth(&grid, Vec2::new(100.0, 170.0)), 61);
        assert_eq!(agent_depth(&grid, Vec2::new(-1.0, 5.0)), 0);
    }
}
