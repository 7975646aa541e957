//! Particle Swarm Optimization (PSO).
//!
//! A swarm of particles moves through the bounded search space. Each
//! particle's velocity blends its previous momentum, attraction to its own
//! best position and attraction to the swarm's best position:
//!
//! ```text
//! v ← w·v + c1·r1·(p_best − x) + c2·r2·(g_best − x)
//! x ← clamp(x + v)
//! ```
//!
//! `r1` and `r2` are fresh uniform draws per particle per step. Positions
//! are clamped to bounds; velocities are not.
//!
//! By default the global best is refreshed as soon as any particle improves
//! on it, so later particles in the same iteration already follow the new
//! best. [`SwarmUpdate::Synchronous`] moves the whole swarm first and
//! evaluates it as one batch.
//!
//! # References
//!
//! - Kennedy & Eberhart (1995), "Particle Swarm Optimization"
//! - Shi & Eberhart (1998), "A Modified Particle Swarm Optimizer" (inertia weight)

mod config;
mod runner;
mod types;

pub use config::{PsoConfig, SwarmUpdate};
pub use runner::{PsoResult, PsoRunner};
pub use types::Particle;
