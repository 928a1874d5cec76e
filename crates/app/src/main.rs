//! `gridtown`: headless runner for the grid city simulation.
//!
//! ```text
//! gridtown [--config <path>] [--scenario <path>] [--ticks <n>]
//! ```
//!
//! Without `--scenario` a built-in demo layout is used. Log verbosity follows
//! `RUST_LOG`.

mod scenario;

use std::path::{Path, PathBuf};
use std::time::Duration;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use thiserror::Error;

use simulation::agent::Indoors;
use simulation::config::{ConfigError, SimConfig};
use simulation::grid::WorldGrid;
use simulation::person::Person;
use simulation::vehicle::Vehicle;
use simulation::TickCounter;

use scenario::Scenario;

const DEFAULT_TICKS: u64 = 600;

#[derive(Debug, Error)]
enum RunnerError {
    #[error("{0}\nusage: gridtown [--config <path>] [--scenario <path>] [--ticks <n>]")]
    Usage(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to parse scenario: {0}")]
    Scenario(#[from] serde_json::Error),
}

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    scenario: Option<PathBuf>,
    ticks: Option<u64>,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, RunnerError> {
        let mut parsed = Args::default();
        let mut args = args.into_iter();
        while let Some(flag) = args.next() {
            let mut value = || {
                args.next()
                    .ok_or_else(|| RunnerError::Usage(format!("{flag} needs a value")))
            };
            match flag.as_str() {
                "--config" => parsed.config = Some(PathBuf::from(value()?)),
                "--scenario" => parsed.scenario = Some(PathBuf::from(value()?)),
                "--ticks" => {
                    let raw = value()?;
                    let ticks = raw
                        .parse()
                        .map_err(|_| RunnerError::Usage(format!("invalid tick count '{raw}'")))?;
                    parsed.ticks = Some(ticks);
                }
                other => return Err(RunnerError::Usage(format!("unknown argument '{other}'"))),
            }
        }
        Ok(parsed)
    }
}

fn read(path: &Path) -> Result<String, RunnerError> {
    std::fs::read_to_string(path).map_err(|source| RunnerError::Read {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// App setup
// ---------------------------------------------------------------------------

/// Headless app with a manual clock: each `update()` after the first runs
/// exactly one fixed tick.
fn build_app(config: SimConfig, logging: bool) -> App {
    let tick = Duration::from_secs_f64(1.0 / config.tick_hz);
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    if logging {
        app.add_plugins(LogPlugin::default());
    }
    app.insert_resource(TimeUpdateStrategy::ManualDuration(tick));
    app.insert_resource(config);
    app.add_plugins(simulation::SimulationPlugin);
    app.finish();
    app.cleanup();

    // Prime the clock.
    app.update();
    app
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq)]
struct Summary {
    ticks: u64,
    roads: usize,
    destinations: usize,
    people: usize,
    vehicles: usize,
    indoors: usize,
    idle: usize,
}

fn summarize(world: &mut World) -> Summary {
    let mut summary = Summary {
        ticks: world.resource::<TickCounter>().0,
        ..Default::default()
    };
    {
        let grid = world.resource::<WorldGrid>();
        summary.roads = grid.road_count();
        summary.destinations = grid.destinations().len();
    }

    let mut people = world.query::<(&Person, Has<Indoors>)>();
    for (person, indoors) in people.iter(world) {
        summary.people += 1;
        summary.indoors += usize::from(indoors);
        summary.idle += usize::from(person.motion.is_idle());
    }
    let mut vehicles = world.query::<(&Vehicle, Has<Indoors>)>();
    for (vehicle, indoors) in vehicles.iter(world) {
        summary.vehicles += 1;
        summary.indoors += usize::from(indoors);
        summary.idle += usize::from(vehicle.motion.is_idle());
    }
    summary
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<(), RunnerError> {
    let args = Args::parse(std::env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => SimConfig::from_json_str(&read(path)?)?,
        None => SimConfig::default(),
    };
    let scenario = match &args.scenario {
        Some(path) => Scenario::from_json_str(&read(path)?)?,
        None => Scenario::demo(),
    };
    let ticks = args.ticks.unwrap_or(DEFAULT_TICKS);

    let mut app = build_app(config, true);

    info!(
        "gridtown: {} builds, {} spawns, running {ticks} ticks",
        scenario.builds.len(),
        scenario.spawns.len()
    );
    scenario.queue(app.world_mut());

    for _ in 0..ticks {
        app.update();
    }

    let summary = summarize(app.world_mut());
    info!(
        "after {} ticks: {} roads, {} destinations, {} people, {} vehicles ({} indoors, {} idle)",
        summary.ticks,
        summary.roads,
        summary.destinations,
        summary.people,
        summary.vehicles,
        summary.indoors,
        summary.idle
    );
    Ok(())
}
