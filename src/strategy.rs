//! Optimizer selection by variant.
//!
//! [`Strategy`] names the algorithm and carries its configuration, so the
//! caller picks an optimizer with a typed value and gets one report shape
//! back regardless of which one ran.

use crate::error::Result;
use crate::ga::{GaConfig, GaRunner};
use crate::problem::OptimizationProblem;
use crate::pso::{PsoConfig, PsoRunner};
use crate::sa::{SaConfig, SaRunner};
use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Algorithm family that produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    Genetic,
    Annealing,
    Swarm,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Algorithm::Genetic => "genetic_algorithm",
            Algorithm::Annealing => "simulated_annealing",
            Algorithm::Swarm => "particle_swarm",
        })
    }
}

/// A configured optimizer.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy {
    Genetic(GaConfig),
    /// Annealing needs a starting vector.
    Annealing { config: SaConfig, initial: Vec<f64> },
    Swarm(PsoConfig),
}

/// Uniform result of any [`Strategy`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizationReport {
    pub algorithm: Algorithm,
    /// The run produced a feasible best vector.
    pub success: bool,
    pub feasible: bool,
    pub best_vector: Vec<f64>,
    pub best_fitness: f64,
    pub fitness_history: Vec<f64>,
    /// Generations (GA) or iterations (SA, PSO) completed.
    pub iterations: usize,
    pub cancelled: bool,
}

impl Strategy {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Strategy::Genetic(_) => Algorithm::Genetic,
            Strategy::Annealing { .. } => Algorithm::Annealing,
            Strategy::Swarm(_) => Algorithm::Swarm,
        }
    }

    /// Runs the configured optimizer on `problem`.
    pub fn run(&self, problem: &OptimizationProblem) -> Result<OptimizationReport> {
        self.run_with_cancel(problem, None)
    }

    /// Runs with an optional cancellation token.
    pub fn run_with_cancel(
        &self,
        problem: &OptimizationProblem,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<OptimizationReport> {
        let algorithm = self.algorithm();
        let report = match self {
            Strategy::Genetic(config) => {
                let r = GaRunner::run_with_cancel(problem, config, cancel)?;
                OptimizationReport {
                    algorithm,
                    success: r.success(),
                    feasible: r.feasible,
                    best_vector: r.best,
                    best_fitness: r.best_fitness,
                    fitness_history: r.fitness_history,
                    iterations: r.generations,
                    cancelled: r.cancelled,
                }
            }
            Strategy::Annealing { config, initial } => {
                let r = SaRunner::run_with_cancel(problem, initial, config, cancel)?;
                OptimizationReport {
                    algorithm,
                    success: r.success(),
                    feasible: r.feasible,
                    best_vector: r.best,
                    best_fitness: r.best_fitness,
                    fitness_history: r.fitness_history,
                    iterations: r.iterations,
                    cancelled: r.cancelled,
                }
            }
            Strategy::Swarm(config) => {
                let r = PsoRunner::run_with_cancel(problem, config, cancel)?;
                OptimizationReport {
                    algorithm,
                    success: r.success(),
                    feasible: r.feasible,
                    best_vector: r.best,
                    best_fitness: r.best_fitness,
                    fitness_history: r.fitness_history,
                    iterations: r.iterations,
                    cancelled: r.cancelled,
                }
            }
        };
        Ok(report)
    }
}
