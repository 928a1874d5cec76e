//! Ordering of systems inside each `FixedUpdate` tick.
//!
//! ```text
//! PreSim  →  Simulation  →  PostSim
//! ```
//!
//! * **PreSim** – Build requests, spawn requests and indoor toggles. The grid
//!   is only ever mutated here.
//! * **Simulation** – Agent state machines. The grid is read-only.
//! * **PostSim** – Tick bookkeeping.

use bevy::prelude::*;

/// Configured as a chain by `SimulationPlugin`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    PreSim,
    Simulation,
    PostSim,
}
