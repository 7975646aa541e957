//! SA execution loop.

use super::config::SaConfig;
use super::types::AnnealingState;
use crate::error::{OptimError, Result};
use crate::problem::OptimizationProblem;
use crate::random::rng_from_seed;
use rand::Rng;
use rand_distr::StandardNormal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Result of a Simulated Annealing run.
#[derive(Debug, Clone)]
pub struct SaResult {
    /// The best vector found.
    pub best: Vec<f64>,

    /// Fitness of the best vector (`-inf` if it is infeasible).
    pub best_fitness: f64,

    /// Whether `best` satisfies the constraint predicate.
    pub feasible: bool,

    /// Total number of iterations (neighbor evaluations).
    pub iterations: usize,

    /// Final temperature when the algorithm stopped.
    pub final_temperature: f64,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Number of improving moves.
    pub improving_moves: usize,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Best-ever fitness: the starting value, then one entry per iteration.
    pub fitness_history: Vec<f64>,
}

impl SaResult {
    /// `true` when the returned vector is feasible.
    pub fn success(&self) -> bool {
        self.feasible
    }
}

/// Executes the Simulated Annealing algorithm.
///
/// ```
/// use u_bizopt::problem::{Bounds, OptimizationProblem};
/// use u_bizopt::sa::{SaConfig, SaRunner};
///
/// let problem = OptimizationProblem::new(
///     |x: &[f64]| -(x[0] - 2.0).powi(2),
///     Bounds::uniform(1, 0.0, 4.0).unwrap(),
/// );
/// let result = SaRunner::run(&problem, &[0.0], &SaConfig::default().with_seed(1)).unwrap();
/// assert!(result.iterations > 0);
/// ```
pub struct SaRunner;

impl SaRunner {
    /// Runs SA optimization from `initial`.
    ///
    /// `initial` must have one finite value per variable; it is clamped into bounds.
    pub fn run(
        problem: &OptimizationProblem,
        initial: &[f64],
        config: &SaConfig,
    ) -> Result<SaResult> {
        Self::run_with_cancel(problem, initial, config, None)
    }

    /// Runs SA with an optional cancellation token.
    pub fn run_with_cancel(
        problem: &OptimizationProblem,
        initial: &[f64],
        config: &SaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SaResult> {
        config.validate().map_err(OptimError::InvalidConfig)?;
        let bounds = problem.bounds();
        bounds.check_point(initial)?;

        let mut rng = rng_from_seed(config.seed);

        let mut start = initial.to_vec();
        bounds.clamp(&mut start);
        if start != initial {
            debug!("initial solution clamped into bounds");
        }

        let initial_eval = problem.evaluate(&start);
        let mut state = AnnealingState::new(start, initial_eval, config.initial_temperature);

        debug!(
            initial_temperature = config.initial_temperature,
            min_temperature = config.min_temperature,
            initial_fitness = state.current_fitness,
            "starting simulated annealing"
        );

        let mut total_iterations = 0usize;
        let mut accepted_moves = 0usize;
        let mut improving_moves = 0usize;
        let mut cancelled = false;
        let mut fitness_history = vec![state.best_fitness];

        'outer: while state.temperature > config.min_temperature {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            for _ in 0..config.iterations_per_temperature {
                if config.max_iterations > 0 && total_iterations >= config.max_iterations {
                    break 'outer;
                }

                let neighbor =
                    neighbor(&state.current_solution, problem, config.step_scale, &mut rng);
                let eval = problem.evaluate(&neighbor);
                let delta = eval.fitness - state.current_fitness;

                // Metropolis acceptance criterion (maximization). A NaN delta
                // means both sides are -inf: keep walking through the
                // infeasible region rather than freezing.
                let accept = if delta > 0.0 {
                    improving_moves += 1;
                    true
                } else if delta.is_nan() {
                    true
                } else {
                    let probability = (delta / state.temperature).exp();
                    rng.random_range(0.0..1.0) < probability
                };

                if accept {
                    state.accept(neighbor, eval);
                    accepted_moves += 1;
                }

                total_iterations += 1;
                fitness_history.push(state.best_fitness);
            }

            let next_temperature = config.cooling.cool(state.temperature);
            if !(next_temperature < state.temperature) {
                warn!(
                    temperature = state.temperature,
                    "cooling schedule no longer lowers the temperature, stopping"
                );
                break;
            }
            state.temperature = next_temperature;
            trace!(
                iteration = total_iterations,
                temperature = state.temperature,
                current_fitness = state.current_fitness,
                best_fitness = state.best_fitness,
                "temperature step"
            );
        }

        debug!(
            iterations = total_iterations,
            accepted_moves,
            best_fitness = state.best_fitness,
            final_temperature = state.temperature,
            "simulated annealing finished"
        );

        Ok(SaResult {
            best: state.best_solution,
            best_fitness: state.best_fitness,
            feasible: state.best_feasible,
            iterations: total_iterations,
            final_temperature: state.temperature,
            accepted_moves,
            improving_moves,
            cancelled,
            fitness_history,
        })
    }
}

/// Perturb exactly one randomly chosen dimension with Gaussian noise.
fn neighbor<R: Rng>(
    current: &[f64],
    problem: &OptimizationProblem,
    step_scale: f64,
    rng: &mut R,
) -> Vec<f64> {
    let bounds = problem.bounds();
    let mut next = current.to_vec();
    let i = rng.random_range(0..next.len());
    let z: f64 = rng.sample(StandardNormal);
    next[i] = bounds.clamp_value(i, next[i] + z * step_scale * bounds.range(i));
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Bounds;
    use crate::sa::CoolingSchedule;

    fn sphere_problem(dim: usize, target: f64) -> OptimizationProblem {
        OptimizationProblem::new(
            move |x: &[f64]| -x.iter().map(|v| (v - target).powi(2)).sum::<f64>(),
            Bounds::uniform(dim, 0.0, 10.0).unwrap(),
        )
    }

    #[test]
    fn test_sa_converges_from_corner() {
        let problem = sphere_problem(3, 5.0);
        let config = SaConfig::default().with_cooling_rate(0.995).with_seed(42);

        let result = SaRunner::run(&problem, &[0.0, 0.0, 0.0], &config).unwrap();

        assert!(result.success());
        for &g in &result.best {
            assert!((g - 5.0).abs() < 1.0, "gene {g} too far from 5.0");
        }
    }

    #[test]
    fn test_iteration_count_matches_schedule() {
        // 1000 * 0.95^k > 1  <=>  k <= 134, so 135 iterations.
        let problem = sphere_problem(2, 5.0);
        let config = SaConfig::default().with_seed(1);

        let result = SaRunner::run(&problem, &[0.0, 0.0], &config).unwrap();

        assert_eq!(result.iterations, 135);
        assert!(result.final_temperature <= 1.0);
        assert_eq!(result.fitness_history.len(), 136);
    }

    #[test]
    fn test_lundy_mees_schedule() {
        let t0 = 100.0;
        let t_min = 0.01;
        let max_iter = 5000;
        let beta = (t0 - t_min) / (max_iter as f64 * t0 * t_min);

        let problem = sphere_problem(2, 3.0);
        let config = SaConfig::default()
            .with_initial_temperature(t0)
            .with_min_temperature(t_min)
            .with_cooling(CoolingSchedule::LundyMees { beta })
            .with_seed(42);

        let result = SaRunner::run(&problem, &[9.0, 9.0], &config).unwrap();

        assert!(
            result.best_fitness > -0.1,
            "expected near-zero loss, got {}",
            result.best_fitness
        );
    }

    #[test]
    fn test_fitness_history_non_decreasing() {
        let problem = sphere_problem(4, 5.0);
        let config = SaConfig::default()
            .with_cooling_rate(0.99)
            .with_iterations_per_temperature(5)
            .with_seed(42);

        let result = SaRunner::run(&problem, &[1.0, 9.0, 1.0, 9.0], &config).unwrap();

        for window in result.fitness_history.windows(2) {
            assert!(
                window[1] >= window[0],
                "best fitness history should be non-decreasing: {} < {}",
                window[1],
                window[0]
            );
        }
    }

    #[test]
    fn test_max_iterations_limit() {
        let problem = sphere_problem(2, 5.0);
        let config = SaConfig::default()
            .with_initial_temperature(1e10)
            .with_min_temperature(1e-15)
            .with_iterations_per_temperature(10)
            .with_max_iterations(100)
            .with_seed(42);

        let result = SaRunner::run(&problem, &[0.0, 0.0], &config).unwrap();
        assert_eq!(result.iterations, 100);
    }

    #[test]
    fn test_cancellation() {
        let problem = sphere_problem(2, 5.0);
        let config = SaConfig::default().with_seed(42);

        let cancel = Arc::new(AtomicBool::new(true));
        let result =
            SaRunner::run_with_cancel(&problem, &[1.0, 1.0], &config, Some(cancel)).unwrap();

        assert!(result.cancelled);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.best, vec![1.0, 1.0]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let problem = sphere_problem(3, 5.0);
        let err = SaRunner::run(&problem, &[0.0, 0.0], &SaConfig::default()).unwrap_err();
        assert_eq!(
            err,
            OptimError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_out_of_bounds_start_is_clamped() {
        let problem = sphere_problem(2, 5.0);
        let config = SaConfig::default().with_max_iterations(1).with_seed(3);
        let result = SaRunner::run(&problem, &[-50.0, 50.0], &config).unwrap();
        assert!(problem.bounds().contains(&result.best));
    }

    #[test]
    fn test_high_temperature_accepts_uphill() {
        let problem = sphere_problem(2, 5.0);
        let config = SaConfig::default()
            .with_initial_temperature(1e8)
            .with_min_temperature(1e7)
            .with_cooling_rate(0.99)
            .with_iterations_per_temperature(100)
            .with_seed(42);

        let result = SaRunner::run(&problem, &[5.0, 5.0], &config).unwrap();

        let acceptance_ratio = result.accepted_moves as f64 / result.iterations as f64;
        assert!(
            acceptance_ratio > 0.95,
            "expected high acceptance at high temp, got {acceptance_ratio}"
        );
    }

    #[test]
    fn test_infeasible_start_walks_out() {
        // Start inside the infeasible band x < 4; feasible optimum at x = 5.
        let problem = sphere_problem(1, 5.0).with_constraint(|x: &[f64]| x[0] >= 4.0);
        let config = SaConfig::default()
            .with_cooling_rate(0.995)
            .with_seed(17);

        let result = SaRunner::run(&problem, &[1.0], &config).unwrap();

        assert!(result.feasible, "SA never left the infeasible region");
        assert!(result.best[0] >= 4.0);
    }

    #[test]
    fn test_stalled_cooling_terminates() {
        // 1 + 1e-20 * 1000 rounds to 1, so the temperature never drops.
        let problem = sphere_problem(2, 5.0);
        let config = SaConfig::default()
            .with_cooling(CoolingSchedule::LundyMees { beta: 1e-20 })
            .with_seed(42);
        assert!(config.validate().is_ok());

        let result = SaRunner::run(&problem, &[0.0, 0.0], &config).unwrap();

        assert_eq!(result.iterations, 1);
        assert_eq!(result.final_temperature, 1000.0);
        assert_eq!(result.fitness_history.len(), 2);
    }

    #[test]
    fn test_non_finite_start_rejected() {
        let problem = sphere_problem(2, 5.0);
        let config = SaConfig::default().with_seed(42);

        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = SaRunner::run(&problem, &[bad, 1.0], &config).unwrap_err();
            assert_eq!(err, OptimError::NonFiniteValue { index: 0 });
        }
    }
}
