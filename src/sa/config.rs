//! SA configuration and cooling schedules.

/// Cooling schedule for temperature reduction.
///
/// # References
///
/// - Geometric: standard textbook approach
/// - LundyMees: Lundy & Mees (1986), with convergence proof
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoolingSchedule {
    /// Geometric (exponential) cooling: `T_{k+1} = alpha * T_k`.
    ///
    /// Most widely used. Typical `alpha`: 0.95 to 0.99.
    Geometric {
        /// Cooling rate in (0, 1). Higher = slower cooling.
        alpha: f64,
    },

    /// Lundy-Mees cooling: `T_{k+1} = T_k / (1 + beta * T_k)`.
    ///
    /// Cools fast at high T, slow at low T.
    ///
    /// Reference: Lundy & Mees (1986)
    LundyMees {
        /// Cooling parameter. Typically `(T_0 - T_min) / (max_iter * T_0 * T_min)`.
        beta: f64,
    },
}

impl Default for CoolingSchedule {
    fn default() -> Self {
        CoolingSchedule::Geometric { alpha: 0.95 }
    }
}

impl CoolingSchedule {
    /// Computes the temperature after one cooling step.
    pub fn cool(&self, temperature: f64) -> f64 {
        match *self {
            CoolingSchedule::Geometric { alpha } => temperature * alpha,
            CoolingSchedule::LundyMees { beta } => temperature / (1.0 + beta * temperature),
        }
    }
}

/// Configuration for the Simulated Annealing algorithm.
///
/// # Examples
///
/// ```
/// use u_bizopt::sa::{SaConfig, CoolingSchedule};
///
/// let config = SaConfig::default()
///     .with_initial_temperature(100.0)
///     .with_min_temperature(0.001)
///     .with_cooling_rate(0.98);
/// assert_eq!(config.cooling, CoolingSchedule::Geometric { alpha: 0.98 });
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaConfig {
    /// Initial temperature. Higher values allow more exploration.
    pub initial_temperature: f64,

    /// The run stops once the temperature drops to or below this value.
    pub min_temperature: f64,

    /// Cooling schedule.
    pub cooling: CoolingSchedule,

    /// Number of neighbor evaluations at each temperature level.
    ///
    /// The default of 1 cools after every iteration.
    pub iterations_per_temperature: usize,

    /// Maximum total iterations (hard budget). 0 = no limit.
    pub max_iterations: usize,

    /// Neighbor step standard deviation as a fraction of the bound range.
    pub step_scale: f64,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1000.0,
            min_temperature: 1.0,
            cooling: CoolingSchedule::default(),
            iterations_per_temperature: 1,
            max_iterations: 0,
            step_scale: 0.1,
            seed: None,
        }
    }
}

impl SaConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    pub fn with_cooling(mut self, cooling: CoolingSchedule) -> Self {
        self.cooling = cooling;
        self
    }

    /// Shorthand for geometric cooling with the given multiplicative rate.
    pub fn with_cooling_rate(self, alpha: f64) -> Self {
        self.with_cooling(CoolingSchedule::Geometric { alpha })
    }

    pub fn with_iterations_per_temperature(mut self, n: usize) -> Self {
        self.iterations_per_temperature = n;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_step_scale(mut self, scale: f64) -> Self {
        self.step_scale = scale;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.initial_temperature > 0.0) || !self.initial_temperature.is_finite() {
            return Err("initial_temperature must be positive and finite".into());
        }
        if !(self.min_temperature > 0.0) {
            return Err("min_temperature must be positive".into());
        }
        if self.min_temperature >= self.initial_temperature {
            return Err("min_temperature must be less than initial_temperature".into());
        }
        if self.iterations_per_temperature == 0 {
            return Err("iterations_per_temperature must be at least 1".into());
        }
        if !self.step_scale.is_finite() || self.step_scale < 0.0 {
            return Err("step_scale must be finite and non-negative".into());
        }
        match self.cooling {
            CoolingSchedule::Geometric { alpha } => {
                if !(alpha > 0.0 && alpha < 1.0) {
                    return Err(format!("geometric alpha must be in (0, 1), got {alpha}"));
                }
            }
            CoolingSchedule::LundyMees { beta } => {
                if !(beta > 0.0) || !beta.is_finite() {
                    return Err(format!("lundy-mees beta must be positive and finite, got {beta}"));
                }
            }
        }
        Ok(())
    }
}
