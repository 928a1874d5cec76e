use std::fmt;

use bevy::prelude::*;

use crate::agent::Direction;
use crate::grid::{GridLayout, Neighbors};

// ---------------------------------------------------------------------------
// Neighbor code
// ---------------------------------------------------------------------------

/// Which of the four neighbors are roads, packed as `top bottom left right`
/// from the high bit down (`0b1000` = road above).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NeighborCode(u8);

impl NeighborCode {
    pub const TOP: u8 = 0b1000;
    pub const BOTTOM: u8 = 0b0100;
    pub const LEFT: u8 = 0b0010;
    pub const RIGHT: u8 = 0b0001;

    /// Straight piece used for isolated roads and lone top/bottom stubs.
    pub const HORIZONTAL_PAIR: NeighborCode = NeighborCode(0b1100);
    /// Straight piece used for lone left/right stubs.
    pub const VERTICAL_PAIR: NeighborCode = NeighborCode(0b0011);

    pub fn from_bits(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    pub fn from_flags(top: bool, bottom: bool, left: bool, right: bool) -> Self {
        let mut bits = 0;
        if top {
            bits |= Self::TOP;
        }
        if bottom {
            bits |= Self::BOTTOM;
        }
        if left {
            bits |= Self::LEFT;
        }
        if right {
            bits |= Self::RIGHT;
        }
        Self(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Maps a raw neighbor code to the connector variant that gets rendered.
    pub fn canonical(self) -> Self {
        match self.0 {
            0b0000 | 0b1000 | 0b0100 => Self::HORIZONTAL_PAIR,
            0b0010 | 0b0001 | 0b0011 => Self::VERTICAL_PAIR,
            _ => self,
        }
    }
}

impl fmt::Display for NeighborCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04b}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Quad geometry
// ---------------------------------------------------------------------------

/// Four pixel-space corners. Screen coordinates: "top" has the smaller y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub top_left: Vec2,
    pub top_right: Vec2,
    pub bottom_left: Vec2,
    pub bottom_right: Vec2,
}

impl Quad {
    /// The cell rectangle around `center`, shrunk by `offset` on every side.
    pub fn inset(center: Vec2, cell_width: f32, cell_height: f32, offset: f32) -> Self {
        let hx = cell_width / 2.0 - offset;
        let hy = cell_height / 2.0 - offset;
        Self {
            top_left: center + Vec2::new(-hx, -hy),
            top_right: center + Vec2::new(hx, -hy),
            bottom_left: center + Vec2::new(-hx, hy),
            bottom_right: center + Vec2::new(hx, hy),
        }
    }

    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }

    /// Euclidean-nearest corner. Ties go to the earlier corner in
    /// [`Quad::corners`] order.
    pub fn closest_to(&self, point: Vec2) -> Vec2 {
        let mut best = self.top_left;
        let mut best_dist = best.distance_squared(point);
        for corner in &self.corners()[1..] {
            let dist = corner.distance_squared(point);
            if dist < best_dist {
                best = *corner;
                best_dist = dist;
            }
        }
        best
    }
}

// ---------------------------------------------------------------------------
// Road tile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Road {
    connector: NeighborCode,
    curb: Quad,
    lane: Quad,
}

impl Road {
    pub fn new(center: Vec2, layout: &GridLayout) -> Self {
        Self {
            // Isolated until the grid re-derives it against real neighbors.
            connector: NeighborCode::HORIZONTAL_PAIR,
            curb: Quad::inset(
                center,
                layout.cell_width,
                layout.cell_height,
                layout.curb_offset,
            ),
            lane: Quad::inset(
                center,
                layout.cell_width,
                layout.cell_height,
                layout.lane_offset,
            ),
        }
    }

    pub fn connector(&self) -> NeighborCode {
        self.connector
    }

    /// Pedestrian waypoints.
    pub fn curb(&self) -> &Quad {
        &self.curb
    }

    /// Vehicle waypoints.
    pub fn lane(&self) -> &Quad {
        &self.lane
    }

    pub fn asset_name(&self) -> String {
        format!("road-{}", self.connector)
    }

    /// Re-derives the connector variant. Curb and lane stay where they are.
    pub fn update_self_based_on_neighbors(&mut self, neighbors: &Neighbors<'_>) {
        let is_road = |tile: Option<&crate::tiles::Tile>| tile.is_some_and(|t| t.is_road());
        let code = NeighborCode::from_flags(
            is_road(neighbors.top),
            is_road(neighbors.bottom),
            is_road(neighbors.left),
            is_road(neighbors.right),
        );
        self.connector = code.canonical();
    }

    /// Lane corner a vehicle aims for when it enters this tile heading
    /// `direction` (right-hand traffic).
    pub fn lane_entry(&self, direction: Direction) -> Vec2 {
        match direction {
            Direction::North => self.lane.bottom_right,
            Direction::South => self.lane.top_left,
            Direction::East => self.lane.bottom_left,
            Direction::West => self.lane.top_right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> GridLayout {
        GridLayout::new(Vec2::ZERO, 32.0, 32.0, 4.0, 13.0)
    }

    #[test]
    fn test_canonicalization_table() {
        for bits in [0b0000, 0b1000, 0b0100] {
            assert_eq!(
                NeighborCode::from_bits(bits).canonical(),
                NeighborCode::from_bits(0b1100).canonical(),
                "code {bits:04b} should render as the 1100 piece"
            );
        }
        for bits in [0b0010, 0b0001, 0b0011] {
            assert_eq!(
                NeighborCode::from_bits(bits).canonical(),
                NeighborCode::from_bits(0b0011).canonical(),
                "code {bits:04b} should render as the 0011 piece"
            );
        }

        let canonicalized = [0b0000, 0b1000, 0b0100, 0b0010, 0b0001, 0b0011];
        let identity: Vec<u8> = (0u8..16)
            .filter(|bits| !canonicalized.contains(bits))
            .collect();
        assert_eq!(identity.len(), 10);
        for bits in identity {
            assert_eq!(NeighborCode::from_bits(bits).canonical().bits(), bits);
        }
    }

    #[test]
    fn test_canonical_is_idempotent() {
        for bits in 0u8..16 {
            let once = NeighborCode::from_bits(bits).canonical();
            assert_eq!(once.canonical(), once);
        }
    }

    #[test]
    fn test_code_display() {
        assert_eq!(NeighborCode::from_flags(true, false, true, false).to_string(), "1010");
        assert_eq!(NeighborCode::VERTICAL_PAIR.to_string(), "0011");
    }

    #[test]
    fn test_curb_and_lane_use_distinct_offsets() {
        let road = Road::new(Vec2::new(176.0, 176.0), &layout());
        assert_eq!(road.curb().top_left, Vec2::new(164.0, 164.0));
        assert_eq!(road.curb().bottom_right, Vec2::new(188.0, 188.0));
        assert_eq!(road.lane().top_left, Vec2::new(173.0, 173.0));
        assert_eq!(road.lane().bottom_right, Vec2::new(179.0, 179.0));
    }

    #[test]
    fn test_lane_entry_mapping() {
        let road = Road::new(Vec2::new(176.0, 176.0), &layout());
        let lane = *road.lane();
        assert_eq!(road.lane_entry(Direction::East), lane.bottom_left);
        assert_eq!(road.lane_entry(Direction::North), lane.bottom_right);
        assert_eq!(road.lane_entry(Direction::South), lane.top_left);
        assert_eq!(road.lane_entry(Direction::West), lane.top_right);
    }

    #[test]
    fn test_closest_corner() {
        let quad = Quad::inset(Vec2::new(16.0, 16.0), 32.0, 32.0, 4.0);
        assert_eq!(quad.closest_to(Vec2::new(30.0, 2.0)), quad.top_right);
        assert_eq!(quad.closest_to(Vec2::new(-40.0, 50.0)), quad.bottom_left);
        assert_eq!(quad.closest_to(Vec2::new(29.0, 29.0)), quad.bottom_right);
    }
}
