//! Seedable random sources.
//!
//! Every stochastic component in this crate draws from a [`StdRng`] built
//! here, so a fixed seed reproduces a run exactly.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Creates a deterministic generator from `seed`.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Creates a generator from an optional seed, drawing a fresh seed on `None`.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => create_rng(seed),
        None => create_rng(rand::random()),
    }
}
