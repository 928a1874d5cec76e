use std::collections::BTreeSet;

use bevy::prelude::*;
use thiserror::Error;

use crate::config::SimConfig;
use crate::tiles::{Tile, TilePosition, Tool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("tile ({row}, {col}) is outside the grid")]
    OutOfBounds { row: i64, col: i64 },
}

// ---------------------------------------------------------------------------
// Layout: tile <-> pixel mapping
// ---------------------------------------------------------------------------

/// Pixel geometry of the grid. Fixed when the grid is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Pixel position of the top-left corner of tile (0, 0).
    pub origin: Vec2,
    pub cell_width: f32,
    pub cell_height: f32,
    pub curb_offset: f32,
    pub lane_offset: f32,
}

impl GridLayout {
    pub fn new(
        origin: Vec2,
        cell_width: f32,
        cell_height: f32,
        curb_offset: f32,
        lane_offset: f32,
    ) -> Self {
        Self {
            origin,
            cell_width,
            cell_height,
            curb_offset,
            lane_offset,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(
            Vec2::new(config.origin.0, config.origin.1),
            config.cell_width,
            config.cell_height,
            config.curb_offset,
            config.lane_offset,
        )
    }

    pub fn tile_center(&self, position: TilePosition) -> Vec2 {
        self.origin
            + Vec2::new(
                position.col as f32 * self.cell_width + self.cell_width * 0.5,
                position.row as f32 * self.cell_height + self.cell_height * 0.5,
            )
    }

    /// Tile containing `pixel`, or `None` if it lies outside a `rows` x `cols`
    /// grid.
    pub fn tile_at_pixel(&self, pixel: Vec2, rows: usize, cols: usize) -> Option<TilePosition> {
        let rel = pixel - self.origin;
        let col = (rel.x / self.cell_width).floor();
        let row = (rel.y / self.cell_height).floor();
        if row < 0.0 || col < 0.0 || !row.is_finite() || !col.is_finite() {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        (row < rows && col < cols).then_some(TilePosition::new(row, col))
    }
}

// ---------------------------------------------------------------------------
// Neighbors
// ---------------------------------------------------------------------------

/// The four orthogonal neighbors of a tile. `None` past the grid edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct Neighbors<'a> {
    pub top: Option<&'a Tile>,
    pub bottom: Option<&'a Tile>,
    pub left: Option<&'a Tile>,
    pub right: Option<&'a Tile>,
}

impl<'a> Neighbors<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a Tile> {
        [self.top, self.bottom, self.left, self.right]
            .into_iter()
            .flatten()
    }
}

// ---------------------------------------------------------------------------
// Mutation reports
// ---------------------------------------------------------------------------

/// One grid slot whose tile was actually swapped out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileChange {
    pub position: TilePosition,
    /// Render asset of the tile that was replaced; the renderer must drop it.
    pub released_asset: Option<Entity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Target first, then any neighbors that reconfigured.
    pub changes: Vec<TileChange>,
}

impl BuildReport {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn target_changed(&self, position: TilePosition) -> bool {
        self.changes.first().is_some_and(|c| c.position == position)
    }
}

// ---------------------------------------------------------------------------
// WorldGrid
// ---------------------------------------------------------------------------

/// The city: a row-major matrix of tiles plus the set of building positions
/// agents can travel to.
#[derive(Resource, Debug, Clone)]
pub struct WorldGrid {
    rows: usize,
    cols: usize,
    layout: GridLayout,
    tiles: Vec<Tile>,
    destinations: BTreeSet<TilePosition>,
}

impl WorldGrid {
    pub fn new(rows: usize, cols: usize, layout: GridLayout) -> Self {
        let tiles = (0..rows * cols)
            .map(|i| Tile::soil(TilePosition::new(i / cols, i % cols)))
            .collect();
        Self {
            rows,
            cols,
            layout,
            tiles,
            destinations: BTreeSet::new(),
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.rows, config.cols, GridLayout::from_config(config))
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    #[inline]
    fn index(&self, position: TilePosition) -> usize {
        position.row * self.cols + position.col
    }

    #[inline]
    pub fn in_bounds(&self, position: TilePosition) -> bool {
        position.row < self.rows && position.col < self.cols
    }

    /// Bounds check on raw signed coordinates.
    pub fn is_valid_position(&self, row: i64, col: i64) -> bool {
        self.checked_position(row, col).is_some()
    }

    fn checked_position(&self, row: i64, col: i64) -> Option<TilePosition> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        let position = TilePosition::new(row, col);
        self.in_bounds(position).then_some(position)
    }

    /// Tile at raw coordinates. Out-of-range lookups are logged and reported,
    /// never fatal.
    pub fn get_tile(&self, row: i64, col: i64) -> Result<&Tile, GridError> {
        match self.checked_position(row, col) {
            Some(position) => Ok(&self.tiles[self.index(position)]),
            None => {
                warn!("get_tile: ({row}, {col}) outside {}x{} grid", self.rows, self.cols);
                Err(GridError::OutOfBounds { row, col })
            }
        }
    }

    pub fn tile(&self, position: TilePosition) -> Option<&Tile> {
        self.in_bounds(position)
            .then(|| &self.tiles[self.index(position)])
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn neighbors(&self, position: TilePosition) -> Neighbors<'_> {
        let TilePosition { row, col } = position;
        let at = |r: Option<usize>, c: Option<usize>| match (r, c) {
            (Some(r), Some(c)) => self.tile(TilePosition::new(r, c)),
            _ => None,
        };
        Neighbors {
            top: at(row.checked_sub(1), Some(col)),
            bottom: at(row.checked_add(1), Some(col)),
            left: at(Some(row), col.checked_sub(1)),
            right: at(Some(row), col.checked_add(1)),
        }
    }

    /// Positions of every building tile, in row-major order.
    pub fn destinations(&self) -> &BTreeSet<TilePosition> {
        &self.destinations
    }

    pub fn is_destination(&self, position: TilePosition) -> bool {
        self.destinations.contains(&position)
    }

    pub fn road_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_road()).count()
    }

    pub fn tile_center(&self, position: TilePosition) -> Vec2 {
        self.layout.tile_center(position)
    }

    pub fn tile_at_pixel(&self, pixel: Vec2) -> Option<TilePosition> {
        self.layout.tile_at_pixel(pixel, self.rows, self.cols)
    }

    /// Record the renderer's display handle for the tile at `position`.
    pub fn attach_asset(&mut self, position: TilePosition, asset: Entity) -> Result<(), GridError> {
        if !self.in_bounds(position) {
            return Err(out_of_bounds(position));
        }
        let idx = self.index(position);
        self.tiles[idx].set_asset(Some(asset));
        Ok(())
    }

    /// Swap `new_tile` into its slot unless it would render identically to
    /// the current occupant. Roads re-derive their connector first, so a
    /// neighbor change that alters the connector counts as a change.
    pub fn replace_tile(&mut self, mut new_tile: Tile) -> Option<TileChange> {
        let position = new_tile.position();
        let idx = self.tile(position).map(|_| self.index(position))?;

        new_tile.update_self_based_on_neighbors(&self.neighbors(position));

        let old = &self.tiles[idx];
        if old.asset_name() == new_tile.asset_name() {
            return None;
        }

        let released_asset = old.asset();
        if new_tile.is_building() {
            self.destinations.insert(position);
        } else {
            self.destinations.remove(&position);
        }
        self.tiles[idx] = new_tile;

        Some(TileChange {
            position,
            released_asset,
        })
    }

    /// Place what `tool` builds at `position`, then let the four neighbors
    /// reconfigure against it.
    pub fn build(&mut self, position: TilePosition, tool: Tool) -> Result<BuildReport, GridError> {
        if !self.in_bounds(position) {
            warn!("build {tool:?}: {position} outside {}x{} grid", self.rows, self.cols);
            return Err(out_of_bounds(position));
        }

        let mut report = BuildReport::default();
        let tile = tool.construct(position, &self.layout);
        report.changes.extend(self.replace_tile(tile));

        let refreshed: Vec<Tile> = self
            .neighbors(position)
            .iter()
            .map(Tile::fresh_copy)
            .collect();
        for neighbor in refreshed {
            report.changes.extend(self.replace_tile(neighbor));
        }

        debug!(
            "build {tool:?} at {position}: {} slot(s) changed",
            report.changes.len()
        );
        Ok(report)
    }

    pub fn bulldoze(&mut self, position: TilePosition) -> Result<BuildReport, GridError> {
        self.build(position, Tool::Bulldoze)
    }
}

impl Default for WorldGrid {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

fn out_of_bounds(position: TilePosition) -> GridError {
    GridError::OutOfBounds {
        row: i64::try_from(position.row).unwrap_or(i64::MAX),
        col: i64::try_from(position.col).unwrap_or(i64::MAX),
    }
}
