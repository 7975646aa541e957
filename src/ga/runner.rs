//! GA evolutionary loop execution.
//!
//! [`GaRunner`] orchestrates the complete evolutionary process:
//! initialization → evaluation → selection → crossover → mutation → repeat.

use super::config::GaConfig;
use super::operators::{gaussian_mutation, uniform_crossover};
use super::types::Individual;
use crate::error::{OptimError, Result};
use crate::problem::{for_each_item, OptimizationProblem};
use crate::random::rng_from_seed;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

/// Result of a GA optimization run.
///
/// Contains the best solution found, along with statistics about the
/// evolutionary process.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// The best vector found during the entire run.
    pub best: Vec<f64>,

    /// Fitness of `best` (`-inf` if no feasible vector was ever found).
    pub best_fitness: f64,

    /// Whether `best` satisfies the constraint predicate.
    pub feasible: bool,

    /// Total number of generations executed.
    pub generations: usize,

    /// Whether the run was terminated due to stagnation.
    pub stagnated: bool,

    /// Whether the run stopped on its wall-clock limit.
    pub timed_out: bool,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Best-ever fitness after each generation. Non-decreasing.
    pub fitness_history: Vec<f64>,
}

impl GaResult {
    /// `true` when the returned vector is feasible.
    pub fn success(&self) -> bool {
        self.feasible
    }
}

/// Executes the GA evolutionary loop.
///
/// # Usage
///
/// ```
/// use u_bizopt::ga::{GaConfig, GaRunner};
/// use u_bizopt::problem::{Bounds, OptimizationProblem};
///
/// let bounds = Bounds::uniform(2, 0.0, 10.0).unwrap();
/// let problem = OptimizationProblem::new(
///     |x: &[f64]| -x.iter().map(|v| (v - 3.0).powi(2)).sum::<f64>(),
///     bounds,
/// );
/// let config = GaConfig::default().with_seed(42).with_max_generations(20);
/// let result = GaRunner::run(&problem, &config).unwrap();
/// assert_eq!(result.fitness_history.len(), 20);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA optimization.
    pub fn run(problem: &OptimizationProblem, config: &GaConfig) -> Result<GaResult> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs the GA with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the GA will
    /// stop at the start of the next generation and return the best
    /// solution found so far.
    pub fn run_with_cancel(
        problem: &OptimizationProblem,
        config: &GaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<GaResult> {
        config.validate().map_err(OptimError::InvalidConfig)?;

        let bounds = problem.bounds();
        let mut rng = rng_from_seed(config.seed);
        let started = Instant::now();

        debug!(
            population = config.population_size,
            generations = config.max_generations,
            dimension = bounds.dimension(),
            "starting genetic algorithm"
        );

        // 1. Initialize population
        let mut population: Vec<Individual> = (0..config.population_size)
            .map(|_| Individual::new(bounds.sample_uniform(&mut rng)))
            .collect();

        let mut best = population[0].clone();
        let mut fitness_history = Vec::with_capacity(config.max_generations);
        let mut stagnation_counter = 0usize;
        let mut stagnated = false;
        let mut timed_out = false;
        let mut cancelled = false;

        // 2. Evolutionary loop
        for gen in 0..config.max_generations {
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

            // Evaluate
            for_each_item(&mut population, config.parallel, |ind| {
                let eval = problem.evaluate(&ind.genes);
                ind.set_evaluation(eval);
            });

            // Track best-ever outside the population
            let gen_best = find_best(&population);
            if gen == 0 || gen_best.is_better_than(&best) {
                best = gen_best.clone();
                stagnation_counter = 0;
            } else {
                stagnation_counter += 1;
            }
            fitness_history.push(best.fitness);

            trace!(
                generation = gen + 1,
                best_fitness = best.fitness,
                generation_best = gen_best.fitness,
                "generation evaluated"
            );

            if config.stagnation_limit > 0 && stagnation_counter >= config.stagnation_limit {
                stagnated = true;
                break;
            }
            if gen + 1 == config.max_generations {
                break;
            }

            population = next_generation(problem, &population, config, &mut rng);
        }

        let generations = fitness_history.len();
        debug!(
            generations,
            best_fitness = best.fitness,
            feasible = best.feasible,
            cancelled,
            "genetic algorithm finished"
        );

        Ok(GaResult {
            best: best.genes,
            best_fitness: best.fitness,
            feasible: best.feasible,
            generations,
            stagnated,
            timed_out,
            cancelled,
            fitness_history,
        })
    }
}

/// Breed a full replacement population: selection → crossover → mutation.
fn next_generation<R: Rng>(
    problem: &OptimizationProblem,
    population: &[Individual],
    config: &GaConfig,
    rng: &mut R,
) -> Vec<Individual> {
    let bounds = problem.bounds();
    let size = config.population_size;

    // Mating pool: `size` selections with replacement
    let pool: Vec<usize> = (0..size)
        .map(|_| config.selection.select(population, rng))
        .collect();

    let mut offspring: Vec<Individual> = Vec::with_capacity(size);

    // Elites go first and skip variation
    if config.elite_count > 0 {
        let mut ranked: Vec<&Individual> = population.iter().collect();
        ranked.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
        offspring.extend(ranked.into_iter().take(config.elite_count).cloned());
    }

    let mut pairs = pool.chunks(2);
    while offspring.len() < size {
        let Some(pair) = pairs.next() else {
            break;
        };
        let p1 = &population[pair[0]].genes;
        let children = match pair.get(1) {
            Some(&j) => {
                let p2 = &population[j].genes;
                if rng.random_range(0.0..1.0) < config.crossover_rate {
                    let (c1, c2) = uniform_crossover(p1, p2, rng);
                    vec![c1, c2]
                } else {
                    vec![p1.clone(), p2.clone()]
                }
            }
            None => vec![p1.clone()],
        };

        for mut genes in children {
            if offspring.len() >= size {
                break;
            }
            gaussian_mutation(
                &mut genes,
                bounds,
                config.mutation_rate,
                config.mutation_scale,
                rng,
            );
            offspring.push(Individual::new(genes));
        }
    }

    offspring
}

/// Find the individual with the best (highest) fitness.
fn find_best(population: &[Individual]) -> &Individual {
    let mut best = &population[0];
    for ind in &population[1..] {
        if ind.is_better_than(best) {
            best = ind;
        }
    }
    best
}

// ============================================================================
// Tests
// ============================================================================
