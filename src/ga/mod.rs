//! Genetic Algorithm optimizer.
//!
//! Population-based stochastic search over real-valued vectors for
//! non-linear and non-convex allocation problems. The runner consumes an
//! [`OptimizationProblem`](crate::problem::OptimizationProblem) and
//! maximizes its objective.
//!
//! # Algorithm
//!
//! 1. Draw every gene uniformly from its bound interval.
//! 2. Each generation: evaluate, update the best-ever individual (kept
//!    outside the population), build a mating pool by tournament selection,
//!    apply uniform crossover pairwise, then per-gene Gaussian mutation.
//! 3. Stop after a fixed number of generations.
//!
//! # Key Types
//!
//! - [`GaConfig`]: Algorithm parameters (population size, rates, selection)
//! - [`GaRunner`]: Executes the evolutionary loop
//! - [`GaResult`]: Best vector, feasibility and fitness history
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*

mod config;
pub mod operators;
mod runner;
mod selection;
mod types;

pub use config::GaConfig;
pub use runner::{GaResult, GaRunner};
pub use selection::Selection;
pub use types::Individual;
