//! Scenario files: an initial set of build and spawn requests.
//!
//! ```json
//! {
//!   "builds": [{ "row": 5, "col": 4, "tool": "road" }],
//!   "spawns": [{ "row": 5, "col": 4, "kind": "person", "indoors": false }]
//! }
//! ```
//!
//! Requests are queued as events and land on the first fixed tick.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use simulation::agent::AgentKind;
use simulation::events::{BuildRequest, SpawnRequest};
use simulation::grid::WorldGrid;
use simulation::tiles::{TilePosition, Tool};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBuild {
    pub row: usize,
    pub col: usize,
    pub tool: Tool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpawn {
    pub row: usize,
    pub col: usize,
    pub kind: AgentKind,
    #[serde(default)]
    pub indoors: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub builds: Vec<ScenarioBuild>,
    pub spawns: Vec<ScenarioSpawn>,
}

impl Scenario {
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// A small loop of streets with two houses, two workplaces and a
    /// handful of commuters.
    pub fn demo() -> Self {
        let mut builds = Vec::new();
        let mut road = |row: usize, col: usize| {
            builds.push(ScenarioBuild {
                row,
                col,
                tool: Tool::Road,
            })
        };
        for col in 2..=12 {
            road(5, col);
        }
        for row in 6..=14 {
            road(row, 12);
        }
        for col in 4..=11 {
            road(14, col);
        }

        for (row, col, tool) in [
            (4, 3, Tool::House),
            (6, 7, Tool::House),
            (13, 6, Tool::Workplace),
            (15, 10, Tool::Workplace),
        ] {
            builds.push(ScenarioBuild { row, col, tool });
        }

        let spawns = vec![
            ScenarioSpawn {
                row: 5,
                col: 2,
                kind: AgentKind::Person,
                indoors: false,
            },
            ScenarioSpawn {
                row: 14,
                col: 4,
                kind: AgentKind::Person,
                indoors: false,
            },
            ScenarioSpawn {
                row: 5,
                col: 8,
                kind: AgentKind::Person,
                indoors: true,
            },
            ScenarioSpawn {
                row: 5,
                col: 12,
                kind: AgentKind::Vehicle,
                indoors: false,
            },
        ];

        Self { builds, spawns }
    }

    /// Queue every build and spawn on `world`. Spawns outside the grid are
    /// skipped with a warning.
    pub fn queue(&self, world: &mut World) {
        for build in &self.builds {
            world.send_event(BuildRequest {
                position: TilePosition::new(build.row, build.col),
                tool: build.tool,
            });
        }

        let centers: Vec<(Vec2, &ScenarioSpawn)> = {
            let grid = world.resource::<WorldGrid>();
            self.spawns
                .iter()
                .filter_map(|spawn| {
                    let position = TilePosition::new(spawn.row, spawn.col);
                    if grid.in_bounds(position) {
                        Some((grid.tile_center(position), spawn))
                    } else {
                        warn!("scenario spawn at {position} is outside the grid, skipping");
                        None
                    }
                })
                .collect()
        };
        for (position, spawn) in centers {
            world.send_event(SpawnRequest {
                position,
                kind: spawn.kind,
                indoors: spawn.indoors,
            });
        }
    }
}
