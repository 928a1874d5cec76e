//! Deterministic simulation RNG resource.
//!
//! Destination picks are the only randomness in the simulation. They draw
//! from `ResMut<SimRng>` so that the same seed and the same sequence of build
//! and spawn requests replays identically.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::DEFAULT_SEED;

#[derive(Resource)]
pub struct SimRng(pub ChaCha8Rng);

impl Default for SimRng {
    fn default() -> Self {
        Self::from_seed_u64(DEFAULT_SEED)
    }
}

impl SimRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}
