use std::fmt;
use std::str::FromStr;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{GridLayout, Neighbors};
use crate::roads::Road;

// ---------------------------------------------------------------------------
// Tile coordinates
// ---------------------------------------------------------------------------

/// Canonical grid coordinate. Displays (and parses) as `"row-col"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TilePosition {
    pub row: usize,
    pub col: usize,
}

impl TilePosition {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn manhattan(&self, other: &TilePosition) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for TilePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed tile key '{0}', expected \"row-col\"")]
pub struct PositionParseError(pub String);

impl FromStr for TilePosition {
    type Err = PositionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PositionParseError(s.to_string());
        let (row, col) = s.split_once('-').ok_or_else(err)?;
        let row = row.trim().parse().map_err(|_| err())?;
        let col = col.trim().parse().map_err(|_| err())?;
        Ok(Self { row, col })
    }
}

// ---------------------------------------------------------------------------
// Tile variants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    House,
    Workplace,
}

impl BuildingKind {
    pub fn asset_name(self) -> &'static str {
        match self {
            BuildingKind::House => "house",
            BuildingKind::Workplace => "workplace",
        }
    }
}

/// A building tile: a valid destination with a fixed entrance point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Building {
    pub kind: BuildingKind,
    entrance: Vec2,
}

impl Building {
    pub fn new(kind: BuildingKind, position: TilePosition, layout: &GridLayout) -> Self {
        let center = layout.tile_center(position);
        // Doorstep: bottom middle of the cell, pulled in to the curb line.
        let entrance = center + Vec2::new(0.0, layout.cell_height / 2.0 - layout.curb_offset);
        Self { kind, entrance }
    }

    pub fn entrance(&self) -> Vec2 {
        self.entrance
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TileKind {
    Soil,
    Road(Road),
    Building(Building),
}

/// One grid cell's current occupant.
///
/// The position never changes. Building or bulldozing replaces the whole tile
/// in its grid slot rather than mutating it.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    position: TilePosition,
    kind: TileKind,
    /// Display handle owned by the renderer.
    asset: Option<Entity>,
}

impl Tile {
    pub fn new(position: TilePosition, kind: TileKind) -> Self {
        Self {
            position,
            kind,
            asset: None,
        }
    }

    pub fn soil(position: TilePosition) -> Self {
        Self::new(position, TileKind::Soil)
    }

    pub fn position(&self) -> TilePosition {
        self.position
    }

    pub fn kind(&self) -> &TileKind {
        &self.kind
    }

    pub fn is_road(&self) -> bool {
        matches!(self.kind, TileKind::Road(_))
    }

    pub fn is_building(&self) -> bool {
        matches!(self.kind, TileKind::Building(_))
    }

    pub fn as_road(&self) -> Option<&Road> {
        match &self.kind {
            TileKind::Road(road) => Some(road),
            TileKind::Soil | TileKind::Building(_) => None,
        }
    }

    pub fn as_building(&self) -> Option<&Building> {
        match &self.kind {
            TileKind::Building(building) => Some(building),
            TileKind::Soil | TileKind::Road(_) => None,
        }
    }

    pub fn asset(&self) -> Option<Entity> {
        self.asset
    }

    pub(crate) fn set_asset(&mut self, asset: Option<Entity>) {
        self.asset = asset;
    }

    /// Visual identity. Two tiles with the same key render identically, so
    /// replacing one with the other is a no-op.
    pub fn asset_name(&self) -> String {
        match &self.kind {
            TileKind::Soil => "soil".to_string(),
            TileKind::Road(road) => road.asset_name(),
            TileKind::Building(building) => building.kind.asset_name().to_string(),
        }
    }

    /// Row-derived z-order. Roads sit one step above the ground layer.
    pub fn depth(&self) -> u32 {
        let base = (self.position.row as u32 + 1) * 10;
        match self.kind {
            TileKind::Road(_) => base + 1,
            TileKind::Soil | TileKind::Building(_) => base,
        }
    }

    pub fn update_self_based_on_neighbors(&mut self, neighbors: &Neighbors<'_>) {
        match &mut self.kind {
            TileKind::Road(road) => road.update_self_based_on_neighbors(neighbors),
            TileKind::Soil | TileKind::Building(_) => {}
        }
    }

    /// Same variant and geometry, detached from any render asset.
    pub fn fresh_copy(&self) -> Tile {
        Tile::new(self.position, self.kind.clone())
    }
}

// ---------------------------------------------------------------------------
// Build tools
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("unknown build tool '{0}'")]
    Unknown(String),
}

/// What a build request places on the target tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[serde(alias = "soil")]
    Bulldoze,
    Road,
    House,
    Workplace,
}

impl Tool {
    pub fn construct(self, position: TilePosition, layout: &GridLayout) -> Tile {
        let kind = match self {
            Tool::Bulldoze => TileKind::Soil,
            Tool::Road => TileKind::Road(Road::new(layout.tile_center(position), layout)),
            Tool::House => {
                TileKind::Building(Building::new(BuildingKind::House, position, layout))
            }
            Tool::Workplace => {
                TileKind::Building(Building::new(BuildingKind::Workplace, position, layout))
            }
        };
        Tile::new(position, kind)
    }
}

impl FromStr for Tool {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bulldoze" | "soil" => Ok(Tool::Bulldoze),
            "road" => Ok(Tool::Road),
            "house" => Ok(Tool::House),
            "workplace" => Ok(Tool::Workplace),
            _ => Err(ToolError::Unknown(s.to_string())),
        }
    }
}
