use bevy::prelude::*;

use crate::events::{BuildRequest, RoadBuilt, TileAssetReleased, TileBuilt};
use crate::grid::WorldGrid;

/// Apply queued build requests to the grid and announce every slot that
/// actually changed.
pub fn apply_build_requests(
    mut requests: EventReader<BuildRequest>,
    mut grid: ResMut<WorldGrid>,
    mut built: EventWriter<TileBuilt>,
    mut released: EventWriter<TileAssetReleased>,
    mut roads: EventWriter<RoadBuilt>,
) {
    for request in requests.read() {
        let report = match grid.build(request.position, request.tool) {
            Ok(report) => report,
            Err(err) => {
                warn!("build request {:?} rejected: {err}", request.tool);
                continue;
            }
        };

        for change in &report.changes {
            if let Some(asset) = change.released_asset {
                released.send(TileAssetReleased {
                    position: change.position,
                    asset,
                });
            }
            let Some(tile) = grid.tile(change.position) else {
                continue;
            };
            built.send(TileBuilt { tile: tile.clone() });
        }

        if report.target_changed(request.position) {
            if let Some(road) = grid.tile(request.position).and_then(|t| t.as_road()) {
                roads.send(RoadBuilt {
                    position: request.position,
                    curb: *road.curb(),
                    lane: *road.lane(),
                });
            }
        }
    }
}
