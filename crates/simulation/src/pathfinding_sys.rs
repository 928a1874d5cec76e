use pathfinding::prelude::astar;
use thiserror::Error;

use crate::grid::WorldGrid;
use crate::tiles::TilePosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path endpoint {0} is outside the grid")]
    OutOfBounds(TilePosition),
}

/// Shortest road route from `start` to `goal` over the live grid.
///
/// Only road tiles are expanded, except that the goal itself is always
/// enterable. The returned path excludes `start` and ends at `goal`; it is
/// empty when `start == goal` or no route exists.
pub fn find_path(
    grid: &WorldGrid,
    start: TilePosition,
    goal: TilePosition,
) -> Result<Vec<TilePosition>, PathError> {
    for endpoint in [start, goal] {
        if !grid.in_bounds(endpoint) {
            return Err(PathError::OutOfBounds(endpoint));
        }
    }
    if start == goal {
        return Ok(Vec::new());
    }

    let result = astar(
        &start,
        |node| successors(grid, *node, goal),
        |node| heuristic(node, &goal),
        |node| *node == goal,
    );

    Ok(result
        .map(|(path, _cost)| path.into_iter().skip(1).collect())
        .unwrap_or_default())
}

fn successors(grid: &WorldGrid, node: TilePosition, goal: TilePosition) -> Vec<(TilePosition, u32)> {
    grid.neighbors(node)
        .iter()
        .filter(|tile| tile.is_road() || tile.position() == goal)
        .map(|tile| (tile.position(), 1u32))
        .collect()
}

fn heuristic(a: &TilePosition, b: &TilePosition) -> u32 {
    a.manhattan(b) as u32
}
