//! Grid geometry and agent tunables.
//!
//! The constants are the defaults; [`SimConfig`] mirrors them as a resource so
//! a runner can override any of them from JSON before `SimulationPlugin` is
//! added.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const GRID_ROWS: usize = 32;
pub const GRID_COLS: usize = 32;
pub const CELL_WIDTH: f32 = 32.0;
pub const CELL_HEIGHT: f32 = 32.0;

/// Inset of the pedestrian curb quad from the cell edge, in pixels.
pub const CURB_OFFSET: f32 = 4.0;
/// Inset of the vehicle lane quad from the cell edge, in pixels.
pub const LANE_OFFSET: f32 = 13.0;

/// An axis counts as satisfied once the agent is closer than this to its target.
pub const ARRIVAL_THRESHOLD: f32 = 1.0;

pub const PERSON_SPEED: f32 = 40.0; // pixels per second
pub const VEHICLE_TOP_SPEED: f32 = 90.0;
pub const VEHICLE_CURVE_TOP_SPEED: f32 = 30.0;
pub const VEHICLE_ACCELERATION: f32 = 60.0; // pixels per second^2
pub const VEHICLE_DECELERATION: f32 = 120.0;
pub const VEHICLE_ROTATION_SPEED: f32 = 360.0; // degrees per second

/// Fixed simulation rate. One `FixedUpdate` run is one tick.
pub const TICK_HZ: f64 = 10.0;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Speeds handed to every agent at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentParams {
    pub person_speed: f32,
    pub vehicle_top_speed: f32,
    pub vehicle_curve_top_speed: f32,
    pub vehicle_acceleration: f32,
    pub vehicle_deceleration: f32,
    pub vehicle_rotation_speed: f32,
    pub arrival_threshold: f32,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            person_speed: PERSON_SPEED,
            vehicle_top_speed: VEHICLE_TOP_SPEED,
            vehicle_curve_top_speed: VEHICLE_CURVE_TOP_SPEED,
            vehicle_acceleration: VEHICLE_ACCELERATION,
            vehicle_deceleration: VEHICLE_DECELERATION,
            vehicle_rotation_speed: VEHICLE_ROTATION_SPEED,
            arrival_threshold: ARRIVAL_THRESHOLD,
        }
    }
}

/// Session configuration. Grid dimensions and cell size are fixed once the
/// grid has been created.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub rows: usize,
    pub cols: usize,
    pub cell_width: f32,
    pub cell_height: f32,
    /// Pixel position of the grid's top-left corner.
    pub origin: (f32, f32),
    pub curb_offset: f32,
    pub lane_offset: f32,
    pub tick_hz: f64,
    pub seed: u64,
    pub agents: AgentParams,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rows: GRID_ROWS,
            cols: GRID_COLS,
            cell_width: CELL_WIDTH,
            cell_height: CELL_HEIGHT,
            origin: (0.0, 0.0),
            curb_offset: CURB_OFFSET,
            lane_offset: LANE_OFFSET,
            tick_hz: TICK_HZ,
            seed: DEFAULT_SEED,
            agents: AgentParams::default(),
        }
    }
}

impl SimConfig {
    /// Parse a JSON document; missing fields fall back to the defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must have at least one cell, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.cell_width <= 0.0 || self.cell_height <= 0.0 {
            return Err(ConfigError::Invalid(
                "cell dimensions must be positive".to_string(),
            ));
        }
        let half_cell = self.cell_width.min(self.cell_height) / 2.0;
        if self.curb_offset < 0.0 || self.lane_offset < 0.0 {
            return Err(ConfigError::Invalid("offsets must not be negative".into()));
        }
        if self.curb_offset > half_cell || self.lane_offset > half_cell {
            return Err(ConfigError::Invalid(format!(
                "curb/lane offsets must fit inside half a cell ({half_cell}px)"
            )));
        }
        if self.tick_hz <= 0.0 {
            return Err(ConfigError::Invalid("tick_hz must be positive".into()));
        }
        let agents = &self.agents;
        if agents.person_speed <= 0.0 || agents.vehicle_top_speed <= 0.0 {
            return Err(ConfigError::Invalid("agent speeds must be positive".into()));
        }
        if agents.vehicle_curve_top_speed <= 0.0
            || agents.vehicle_curve_top_speed > agents.vehicle_top_speed
        {
            return Err(ConfigError::Invalid(
                "vehicle curve speed must be in (0, top speed]".into(),
            ));
        }
        if agents.arrival_threshold <= 0.0 {
            return Err(ConfigError::Invalid(
                "arrival threshold must be positive".into(),
            ));
        }
        Ok(())
    }
}
