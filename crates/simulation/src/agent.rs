//! Kinematics shared by people and vehicles.
//!
//! Agents move on one axis at a time toward a pixel waypoint (`target`),
//! consuming a queued tile path as each waypoint is reached. What waypoint a
//! tile yields differs per agent type and lives in `person` / `vehicle`.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::WorldGrid;
use crate::pathfinding_sys::find_path;
use crate::tiles::TilePosition;

// ---------------------------------------------------------------------------
// Axis / Direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// Compass heading in screen space: North is toward smaller y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Heading of a step from `from` to an orthogonally adjacent `to`.
    pub fn between(from: TilePosition, to: TilePosition) -> Option<Direction> {
        if from.col == to.col {
            if to.row + 1 == from.row {
                return Some(Direction::North);
            }
            if from.row + 1 == to.row {
                return Some(Direction::South);
            }
        } else if from.row == to.row {
            if from.col + 1 == to.col {
                return Some(Direction::East);
            }
            if to.col + 1 == from.col {
                return Some(Direction::West);
            }
        }
        None
    }

    fn along(axis: Axis, delta: f32) -> Direction {
        match (axis, delta >= 0.0) {
            (Axis::X, true) => Direction::East,
            (Axis::X, false) => Direction::West,
            (Axis::Y, true) => Direction::South,
            (Axis::Y, false) => Direction::North,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::East | Direction::West => Axis::X,
            Direction::North | Direction::South => Axis::Y,
        }
    }

    /// Sprite rotation in degrees, clockwise from East.
    pub fn rotation_degrees(self) -> f32 {
        match self {
            Direction::East => 0.0,
            Direction::South => 90.0,
            Direction::West => 180.0,
            Direction::North => 270.0,
        }
    }
}

// ---------------------------------------------------------------------------
// AgentKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Person,
    Vehicle,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::Person => f.write_str("person"),
            AgentKind::Vehicle => f.write_str("vehicle"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown agent kind '{0}'")]
pub struct AgentKindError(pub String);

impl FromStr for AgentKind {
    type Err = AgentKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "person" => Ok(AgentKind::Person),
            "vehicle" => Ok(AgentKind::Vehicle),
            _ => Err(AgentKindError(s.to_string())),
        }
    }
}

/// Agent is inside a building: skipped by movement and hidden.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Indoors;

// ---------------------------------------------------------------------------
// Motion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Motion {
    pub position: Vec2,
    pub axis: Axis,
    /// `None` until the agent has moved on the current axis.
    pub direction: Option<Direction>,
    pub target: Option<Vec2>,
    /// Tile the current `target` belongs to.
    pub target_tile: Option<TilePosition>,
    pub path: VecDeque<TilePosition>,
    pub destination: Option<TilePosition>,
    pub arrival_threshold: f32,
}

impl Motion {
    pub fn new(position: Vec2, arrival_threshold: f32) -> Self {
        Self {
            position,
            axis: Axis::X,
            direction: None,
            target: None,
            target_tile: None,
            path: VecDeque::new(),
            destination: None,
            arrival_threshold,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.destination.is_none()
    }

    pub fn current_tile(&self, grid: &WorldGrid) -> Option<TilePosition> {
        grid.tile_at_pixel(self.position)
    }

    /// Pick a random destination and queue a route to it. Returns `false`
    /// (agent stays idle) when there is nowhere to go or no route exists.
    pub fn plan(&mut self, grid: &WorldGrid, rng: &mut impl Rng, from: TilePosition) -> bool {
        let destinations = grid.destinations();
        if destinations.is_empty() {
            return false;
        }
        let pick = rng.gen_range(0..destinations.len());
        let Some(&goal) = destinations.iter().nth(pick) else {
            return false;
        };

        let path = match find_path(grid, from, goal) {
            Ok(path) => path,
            Err(err) => {
                error!("planning from {from} to {goal}: {err}");
                return false;
            }
        };
        if path.is_empty() {
            return false;
        }

        debug!("planned {from} -> {goal} in {} steps", path.len());
        self.destination = Some(goal);
        self.path = path.into();
        self.target = None;
        self.target_tile = None;
        true
    }

    /// Take one movement action toward `target`. Returns `true` once the
    /// target is reached (position snaps onto it).
    pub fn step_towards(&mut self, step: f32) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        let remaining = |axis: Axis, position: Vec2| match axis {
            Axis::X => target.x - position.x,
            Axis::Y => target.y - position.y,
        };

        let delta = remaining(self.axis, self.position);
        if delta.abs() < self.arrival_threshold {
            let other = self.axis.other();
            if remaining(other, self.position).abs() >= self.arrival_threshold {
                self.axis = other;
                self.direction = None;
                return false;
            }
            self.position = target;
            return true;
        }

        let moved = delta.signum() * step.max(0.0).min(delta.abs());
        match self.axis {
            Axis::X => self.position.x += moved,
            Axis::Y => self.position.y += moved,
        }
        self.direction = Some(Direction::along(self.axis, delta));
        false
    }

    pub fn set_target(&mut self, tile: TilePosition, point: Vec2) {
        self.target = Some(point);
        self.target_tile = Some(tile);
    }

    /// Path exhausted and last waypoint reached.
    pub fn arrive(&mut self) {
        self.target = None;
        self.target_tile = None;
        self.destination = None;
    }

    /// Drop the current trip; the agent replans on a later tick.
    pub fn abandon(&mut self) {
        self.path.clear();
        self.arrive();
        self.direction = None;
    }
}
