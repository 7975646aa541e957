//! Simulated Annealing (SA).
//!
//! A single-solution trajectory metaheuristic inspired by the physical
//! annealing process. Accepts worsening moves with a probability that
//! decreases over time (temperature), allowing the search to escape
//! local optima.
//!
//! Neighbors perturb exactly one randomly chosen coordinate by Gaussian
//! noise whose standard deviation is a fraction of that coordinate's bound
//! range, then clamp. Cheaper per iteration than the GA, but sensitive to
//! the cooling schedule: cool too fast and the trajectory freezes early.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Cerny (1985), "Thermodynamical Approach to the Travelling Salesman Problem"
//! - Lundy & Mees (1986), "Convergence of an Annealing Algorithm"

mod config;
mod runner;
mod types;

pub use config::{CoolingSchedule, SaConfig};
pub use runner::{SaResult, SaRunner};
pub use types::AnnealingState;
