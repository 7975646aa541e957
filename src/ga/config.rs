//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.

use super::selection::Selection;

/// Configuration for the Genetic Algorithm.
///
/// Controls population size, selection strategy, operator rates,
/// termination conditions, and parallelism.
///
/// # Defaults
///
/// ```
/// use u_bizopt::ga::{GaConfig, Selection};
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 50);
/// assert_eq!(config.max_generations, 100);
/// assert_eq!(config.selection, Selection::Tournament(3));
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_bizopt::ga::{GaConfig, Selection};
///
/// let config = GaConfig::default()
///     .with_population_size(200)
///     .with_selection(Selection::Tournament(5))
///     .with_mutation_rate(0.2)
///     .with_seed(7);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of individuals in the population. Fixed across generations.
    pub population_size: usize,

    /// Number of generations to run.
    pub max_generations: usize,

    /// Selection strategy for building the mating pool.
    pub selection: Selection,

    /// Probability that a parent pair undergoes uniform crossover (0.0 to 1.0).
    ///
    /// When crossover is not applied, both parents pass through unchanged.
    pub crossover_rate: f64,

    /// Per-gene probability of Gaussian mutation (0.0 to 1.0).
    pub mutation_rate: f64,

    /// Mutation standard deviation as a fraction of each gene's bound range.
    pub mutation_scale: f64,

    /// Number of best individuals copied unchanged into the next generation.
    ///
    /// The best-ever solution is always tracked outside the population, so
    /// this only changes search dynamics. Defaults to 0.
    pub elite_count: usize,

    /// Generations without improvement of the best fitness before stopping.
    ///
    /// Set to 0 to disable (the default).
    pub stagnation_limit: usize,

    /// Whether to evaluate individuals in parallel using rayon.
    ///
    /// Ignored when the crate is built without the `parallel` feature.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Optional wall-clock time limit in milliseconds.
    ///
    /// Checked at the start of each generation, so a run may exceed the
    /// limit by one generation's worth of work.
    pub time_limit_ms: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: 100,
            selection: Selection::default(),
            crossover_rate: 0.8,
            mutation_rate: 0.1,
            mutation_scale: 0.1,
            elite_count: 0,
            stagnation_limit: 0,
            parallel: true,
            seed: None,
            time_limit_ms: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection = sel;
        self
    }

    /// Convenience builder for setting tournament size.
    ///
    /// Equivalent to `.with_selection(Selection::Tournament(k))`.
    pub fn with_tournament_size(self, k: usize) -> Self {
        self.with_selection(Selection::Tournament(k))
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the per-gene mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation scale (fraction of the bound range).
    pub fn with_mutation_scale(mut self, scale: f64) -> Self {
        self.mutation_scale = scale.max(0.0);
        self
    }

    /// Sets the number of elites carried into each new generation.
    pub fn with_elite_count(mut self, n: usize) -> Self {
        self.elite_count = n;
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size < 2 {
            return Err("population_size must be at least 2".into());
        }
        if self.max_generations == 0 {
            return Err("max_generations must be at least 1".into());
        }
        if self.elite_count >= self.population_size {
            return Err("elite_count must be smaller than population_size".into());
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(format!(
                "crossover_rate must be in [0, 1], got {}",
                self.crossover_rate
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(format!(
                "mutation_rate must be in [0, 1], got {}",
                self.mutation_rate
            ));
        }
        if !self.mutation_scale.is_finite() || self.mutation_scale < 0.0 {
            return Err("mutation_scale must be finite and non-negative".into());
        }
        if let Selection::Tournament(0) = self.selection {
            return Err("tournament size must be at least 1".into());
        }
        if self.time_limit_ms == Some(0) {
            return Err("time_limit_ms must be positive or None".into());
        }
        Ok(())
    }
}
