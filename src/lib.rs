//! Metaheuristic budget optimizers and reinforcement-learning pricing agents.
//!
//! Provides from-first-principles implementations of:
//!
//! - **Genetic Algorithm (GA)**: Population-based evolutionary search over
//!   bounded real vectors with tournament or rank selection.
//! - **Simulated Annealing (SA)**: Single-trajectory search with geometric
//!   or Lundy-Mees cooling.
//! - **Particle Swarm Optimization (PSO)**: Swarm search with inertia,
//!   cognitive and social attraction.
//! - **Linear Programming (LP)**: Maximization adapter over a pluggable
//!   backend, with a built-in dense two-phase simplex.
//! - **Pricing agents**: Tabular Q-learning over discretized market state,
//!   a softmax multi-armed bandit, and the business reward that drives both.
//!
//! All three metaheuristics maximize an [`OptimizationProblem`]'s objective
//! within its [`Bounds`]. Constraint violations score `-inf`; results carry
//! a separate `feasible` flag so callers can tell "best of bad options"
//! from a real answer.
//!
//! # Architecture
//!
//! The crate contains no I/O. Callers supply the objective, bounds and
//! constraint; they receive a vector, its fitness and diagnostics.
//! [`strategy::Strategy`] selects an optimizer by variant and
//! [`allocation::BudgetAllocator`] turns its vector into named budget lines.
//!
//! [`OptimizationProblem`]: problem::OptimizationProblem
//! [`Bounds`]: problem::Bounds

pub mod allocation;
pub mod error;
pub mod ga;
pub mod lp;
pub mod pricing;
pub mod problem;
pub mod pso;
pub mod random;
pub mod sa;
pub mod strategy;

pub use error::{OptimError, Result};
