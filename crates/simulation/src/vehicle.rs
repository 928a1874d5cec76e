use bevy::prelude::*;
use rand::Rng;

use crate::agent::{Direction, Motion};
use crate::config::AgentParams;
use crate::grid::WorldGrid;
use crate::roads::Road;
use crate::tiles::{TileKind, TilePosition};

/// A car. Same route following as a pedestrian, but it keeps to the
/// right-hand lane, ramps its speed and eases its sprite rotation.
#[derive(Component, Debug, Clone)]
pub struct Vehicle {
    pub motion: Motion,
    /// Current speed in pixels per second.
    pub speed: f32,
    /// Sprite rotation in degrees, clockwise from East.
    pub rotation: f32,
    /// Tile-level heading of the current leg.
    pub heading: Option<Direction>,
    pub top_speed: f32,
    pub curve_top_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub rotation_speed: f32,
}

impl Vehicle {
    pub fn new(position: Vec2, params: &AgentParams) -> Self {
        Self {
            motion: Motion::new(position, params.arrival_threshold),
            speed: 0.0,
            rotation: 0.0,
            heading: None,
            top_speed: params.vehicle_top_speed,
            curve_top_speed: params.vehicle_curve_top_speed,
            acceleration: params.vehicle_acceleration,
            deceleration: params.vehicle_deceleration,
            rotation_speed: params.vehicle_rotation_speed,
        }
    }

    pub fn update(&mut self, grid: &WorldGrid, rng: &mut impl Rng, elapsed: f32) {
        let Some(current) = self.motion.current_tile(grid) else {
            debug!("vehicle at {} is off the grid, skipping", self.motion.position);
            return;
        };

        if self.motion.is_idle() {
            self.speed = 0.0;
            if self.motion.plan(grid, rng, current) {
                self.heading = None;
                self.next_waypoint(grid, current);
            }
            return;
        }

        self.ramp_speed(elapsed);
        if self.motion.target.is_none() || self.motion.step_towards(self.speed * elapsed) {
            let from = self.motion.target_tile.unwrap_or(current);
            self.next_waypoint(grid, from);
        }
        self.rotation = self.curve(self.rotation, elapsed);
    }

    /// True when the leg after the current one changes heading.
    pub fn turn_near(&self) -> bool {
        match (self.heading, self.motion.target_tile, self.motion.path.front()) {
            (Some(heading), Some(target), Some(&next)) => {
                Direction::between(target, next) != Some(heading)
            }
            _ => false,
        }
    }

    fn ramp_speed(&mut self, elapsed: f32) {
        let limit = if self.turn_near() {
            self.curve_top_speed
        } else {
            self.top_speed
        };
        if self.speed < limit {
            self.speed = (self.speed + self.acceleration * elapsed).min(limit);
        } else if self.speed > limit {
            self.speed = (self.speed - self.deceleration * elapsed).max(limit);
        }
        self.speed = self.speed.max(0.0);
    }

    /// Eased rotation toward the current direction. Deltas beyond half a
    /// turn snap straight to the target.
    pub fn curve(&self, current: f32, elapsed: f32) -> f32 {
        let Some(direction) = self.motion.direction else {
            return current;
        };
        let target = direction.rotation_degrees();
        let raw = target - current;
        if raw.abs() > 180.0 {
            return target;
        }
        let max_step = self.rotation_speed * elapsed;
        current + raw.clamp(-max_step, max_step)
    }

    fn next_waypoint(&mut self, grid: &WorldGrid, from: TilePosition) {
        let Some(next) = self.motion.path.pop_front() else {
            self.motion.arrive();
            self.speed = 0.0;
            return;
        };
        match grid.tile(next).map(|tile| tile.kind()) {
            Some(TileKind::Building(building)) if self.motion.destination == Some(next) => {
                self.heading = Direction::between(from, next);
                self.motion.set_target(next, building.entrance());
            }
            Some(TileKind::Road(road)) => {
                self.heading = Direction::between(from, next);
                let entry = lane_entry_point(road, from, next, self.motion.position);
                self.motion.set_target(next, entry);
            }
            Some(TileKind::Building(_)) | Some(TileKind::Soil) | None => {
                debug!("vehicle route blocked at {next}, abandoning trip");
                self.motion.abandon();
                self.speed = 0.0;
            }
        }
    }
}

/// Lane corner for entering `road` (at `to`) from `from`. Non-adjacent
/// tiles fall back to the lane corner nearest `position`.
pub fn lane_entry_point(road: &Road, from: TilePosition, to: TilePosition, position: Vec2) -> Vec2 {
    match Direction::between(from, to) {
        Some(direction) => road.lane_entry(direction),
        None => road.lane().closest_to(position),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridLayout;
    use crate::tiles::Tool;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn layout() -> GridLayout {
        GridLayout::new(Vec2::ZERO, 32.0, 32.0, 4.0, 13.0)
    }

    fn vehicle() -> Vehicle {
        Vehicle::new(Vec2::ZERO, &AgentParams::default())
    }

    #[test]
    fn test_lane_entry_table() {
        let to = TilePosition::new(5, 5);
        let road = Road::new(layout().tile_center(to), &layout());
        let lane = *road.lane();
        let cases = [
            (TilePosition::new(5, 4), lane.bottom_left),  // heading East
            (TilePosition::new(6, 5), lane.bottom_right), // heading North
            (TilePosition::new(4, 5), lane.top_left),     // heading South
            (TilePosition::new(5, 6), lane.top_right),    // heading West
        ];
        for (from, expected) in cases {
            assert_eq!(lane_entry_point(&road, from, to, Vec2::ZERO), expected);
        }
    }

    #[test]
    fn test_lane_entry_fallback_is_nearest_corner() {
        let to = TilePosition::new(5, 5);
        let road = Road::new(layout().tile_center(to), &layout());
        let from = TilePosition::new(2, 2);
        let entry = lane_entry_point(&road, from, to, Vec2::new(500.0, 0.0));
        assert_eq!(entry, road.lane().top_right);
    }

    #[test]
    fn test_curve_without_direction_is_noop() {
        let v = vehicle();
        assert_eq!(v.curve(123.0, 0.1), 123.0);
    }

    #[test]
    fn test_curve_is_rate_limited() {
        let mut v = vehicle();
        v.motion.direction = Some(Direction::East);
        // 360 deg/s * 0.1 s
        assert_eq!(v.curve(90.0, 0.1), 54.0);
        v.motion.direction = Some(Direction::South);
        assert_eq!(v.curve(80.0, 0.1), 90.0);
    }

    #[test]
    fn test_curve_snaps_past_half_turn() {
        let mut v = vehicle();
        v.motion.direction = Some(Direction::North);
        assert_eq!(v.curve(0.0, 0.1), 270.0);
        v.motion.direction = Some(Direction::East);
        assert_eq!(v.curve(270.0, 0.1), 0.0);
    }

    #[test]
    fn test_accelerates_to_top_speed_on_straight() {
        let mut v = vehicle();
        v.motion.destination = Some(TilePosition::new(0, 9));
        v.motion.set_target(TilePosition::new(0, 1), Vec2::new(10_000.0, 0.0));
        for _ in 0..30 {
            v.ramp_speed(0.1);
        }
        assert_eq!(v.speed, v.top_speed);
    }

    #[test]
    fn test_slows_for_upcoming_turn() {
        let mut v = vehicle();
        v.speed = v.top_speed;
        v.heading = Some(Direction::East);
        v.motion.set_target(TilePosition::new(5, 5), Vec2::ZERO);
        v.motion.path.push_back(TilePosition::new(4, 5));
        assert!(v.turn_near());

        v.ramp_speed(0.1);
        assert_eq!(v.speed, v.top_speed - v.deceleration * 0.1);
        for _ in 0..20 {
            v.ramp_speed(0.1);
        }
        assert_eq!(v.speed, v.curve_top_speed);
    }

    #[test]
    fn test_no_turn_when_continuing_straight() {
        let mut v = vehicle();
        v.heading = Some(Direction::East);
        v.motion.set_target(TilePosition::new(5, 5), Vec2::ZERO);
        v.motion.path.push_back(TilePosition::new(5, 6));
        assert!(!v.turn_near());
    }

    #[test]
    fn test_drives_to_house_and_stops() {
        let mut grid = WorldGrid::new(10, 10, layout());
        for col in 4..=6 {
            grid.build(TilePosition::new(5, col), Tool::Road).unwrap();
        }
        grid.build(TilePosition::new(5, 7), Tool::House).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut v = Vehicle::new(grid.tile_center(TilePosition::new(5, 4)), &AgentParams::default());

        v.update(&grid, &mut rng, 0.1);
        let lane = *grid
            .tile(TilePosition::new(5, 5))
            .and_then(|t| t.as_road())
            .unwrap()
            .lane();
        assert_eq!(v.motion.target, Some(lane.bottom_left));

        for _ in 0..200 {
            v.update(&grid, &mut rng, 0.1);
            assert!(v.speed >= 0.0);
        }
        let entrance = grid
            .tile(TilePosition::new(5, 7))
            .and_then(|t| t.as_building())
            .unwrap()
            .entrance();
        assert!(v.motion.position.distance(entrance) < 1.0);
        assert!(v.motion.is_idle());
        assert_eq!(v.speed, 0.0);
    }

    #[test]
    fn test_off_grid_vehicle_stays_parked() {
        let grid = WorldGrid::new(4, 4, layout());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut v = Vehicle::new(Vec2::new(-40.0, 10.0), &AgentParams::default());
        for _ in 0..5 {
            v.update(&grid, &mut rng, 0.1);
        }
        assert!(v.motion.is_idle());
        assert_eq!(v.motion.position, Vec2::new(-40.0, 10.0));
        assert_eq!(v.speed, 0.0);
    }

    #[test]
    fn test_building_on_route_abandons_trip() {
        let mut grid = WorldGrid::new(10, 10, layout());
        for col in 4..=6 {
            grid.build(TilePosition::new(5, col), Tool::Road).unwrap();
        }
        let house = TilePosition::new(5, 7);
        grid.build(house, Tool::House).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut v = Vehicle::new(grid.tile_center(TilePosition::new(5, 4)), &AgentParams::default());
        v.update(&grid, &mut rng, 0.1);
        assert_eq!(v.motion.destination, Some(house));

        grid.build(TilePosition::new(5, 6), Tool::Workplace).unwrap();
        let mut dropped = false;
        for _ in 0..400 {
            v.update(&grid, &mut rng, 0.1);
            if v.motion.destination == Some(house) {
                assert_ne!(v.motion.target_tile, Some(TilePosition::new(5, 6)));
            } else {
                dropped = true;
            }
        }
        assert!(dropped, "trip through the workplace was never dropped");
    }
}
