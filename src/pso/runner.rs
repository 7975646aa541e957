//! PSO iteration loop.

use super::config::{PsoConfig, SwarmUpdate};
use super::types::Particle;
use crate::error::{OptimError, Result};
use crate::problem::{for_each_item, OptimizationProblem};
use crate::random::rng_from_seed;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

/// Result of a PSO run.
#[derive(Debug, Clone)]
pub struct PsoResult {
    /// Global best position.
    pub best: Vec<f64>,

    /// Fitness of the global best (`-inf` if it is infeasible).
    pub best_fitness: f64,

    /// Whether `best` satisfies the constraint predicate.
    pub feasible: bool,

    /// Number of completed swarm iterations.
    pub iterations: usize,

    /// Whether the run stopped on its wall-clock limit.
    pub timed_out: bool,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Global best fitness after initialization, then after each iteration.
    pub fitness_history: Vec<f64>,
}

impl PsoResult {
    /// `true` when the returned vector is feasible.
    pub fn success(&self) -> bool {
        self.feasible
    }
}

/// Executes Particle Swarm Optimization.
///
/// With [`SwarmUpdate::Asynchronous`] (the default) each particle moves, is
/// evaluated, and updates the global best before the next one moves. With
/// [`SwarmUpdate::Synchronous`] every particle moves, then the swarm is
/// evaluated and the global best is refreshed once.
pub struct PsoRunner;

impl PsoRunner {
    /// Runs PSO optimization.
    pub fn run(problem: &OptimizationProblem, config: &PsoConfig) -> Result<PsoResult> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs PSO with an optional cancellation token.
    pub fn run_with_cancel(
        problem: &OptimizationProblem,
        config: &PsoConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<PsoResult> {
        config.validate().map_err(OptimError::InvalidConfig)?;

        let bounds = problem.bounds();
        let mut rng = rng_from_seed(config.seed);
        let started = Instant::now();

        debug!(
            swarm_size = config.swarm_size,
            iterations = config.max_iterations,
            dimension = bounds.dimension(),
            "starting particle swarm"
        );

        let mut swarm: Vec<Particle> = (0..config.swarm_size)
            .map(|_| Particle::spawn(bounds, config.initial_velocity_scale, &mut rng))
            .collect();
        evaluate_swarm(problem, &mut swarm, config.parallel);

        let mut global = GlobalBest::from_swarm(&swarm);
        let mut fitness_history = Vec::with_capacity(config.max_iterations + 1);
        fitness_history.push(global.fitness);

        let mut iterations = 0usize;
        let mut timed_out = false;
        let mut cancelled = false;

        for t in 0..config.max_iterations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }
            if let Some(limit) = config.time_limit_ms {
                if started.elapsed().as_millis() >= u128::from(limit) {
                    timed_out = true;
                    break;
                }
            }

            let inertia = config.inertia_at(t);
            match config.update {
                SwarmUpdate::Asynchronous => {
                    for particle in swarm.iter_mut() {
                        particle.advance(bounds, &global.position, config, inertia, &mut rng);
                        let eval = problem.evaluate(&particle.position);
                        if particle.observe(eval) {
                            global.offer(particle);
                        }
                    }
                }
                SwarmUpdate::Synchronous => {
                    for particle in swarm.iter_mut() {
                        particle.advance(bounds, &global.position, config, inertia, &mut rng);
                    }
                    evaluate_swarm(problem, &mut swarm, config.parallel);
                    global.absorb(&swarm);
                }
            }
            fitness_history.push(global.fitness);
            iterations += 1;

            trace!(
                iteration = iterations,
                inertia,
                best_fitness = global.fitness,
                "swarm step"
            );
        }

        debug!(
            iterations,
            best_fitness = global.fitness,
            feasible = global.feasible,
            cancelled,
            "particle swarm finished"
        );

        Ok(PsoResult {
            best: global.position,
            best_fitness: global.fitness,
            feasible: global.feasible,
            iterations,
            timed_out,
            cancelled,
            fitness_history,
        })
    }
}

/// Swarm-wide best, kept as an owned copy.
struct GlobalBest {
    position: Vec<f64>,
    fitness: f64,
    feasible: bool,
}

impl GlobalBest {
    fn from_swarm(swarm: &[Particle]) -> Self {
        let first = &swarm[0];
        let mut global = Self {
            position: first.best_position.clone(),
            fitness: first.best_fitness,
            feasible: first.best_feasible,
        };
        global.absorb(swarm);
        global
    }

    fn absorb(&mut self, swarm: &[Particle]) {
        for p in swarm {
            self.offer(p);
        }
    }

    fn offer(&mut self, p: &Particle) {
        if p.best_fitness > self.fitness || (p.best_feasible && !self.feasible) {
            self.position.clone_from(&p.best_position);
            self.fitness = p.best_fitness;
            self.feasible = p.best_feasible;
        }
    }
}

fn evaluate_swarm(problem: &OptimizationProblem, swarm: &mut [Particle], parallel: bool) {
    for_each_item(swarm, parallel, |p| {
        let eval = problem.evaluate(&p.position);
        p.observe(eval);
    });
}
