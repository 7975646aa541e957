//! PSO configuration.

/// When the swarm's global best is refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SwarmUpdate {
    /// Each particle moves, is evaluated, and may raise the global best
    /// before the next particle moves.
    #[default]
    Asynchronous,

    /// Every particle moves against the previous iteration's global best;
    /// the swarm is then evaluated as a batch (on rayon when `parallel`).
    Synchronous,
}

/// Configuration for Particle Swarm Optimization.
///
/// Coefficient defaults follow the constriction-equivalent setting commonly
/// used in practice (`w ≈ 0.7`, `c1 = c2 ≈ 1.5`).
///
/// # Examples
///
/// ```
/// use u_bizopt::pso::PsoConfig;
///
/// let config = PsoConfig::default()
///     .with_swarm_size(40)
///     .with_inertia(0.9)
///     .with_final_inertia(0.4)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PsoConfig {
    /// Number of particles.
    pub swarm_size: usize,

    /// Fixed number of iterations. There is no early stopping.
    pub max_iterations: usize,

    /// Inertia weight `w` applied to the previous velocity.
    pub inertia_weight: f64,

    /// If set, the inertia weight decays linearly from `inertia_weight`
    /// to this value over the run.
    pub final_inertia: Option<f64>,

    /// Cognitive coefficient `c1` (pull toward the personal best).
    pub cognitive_coeff: f64,

    /// Social coefficient `c2` (pull toward the global best).
    pub social_coeff: f64,

    /// Initial velocities are drawn from `±scale * range` per dimension.
    pub initial_velocity_scale: f64,

    /// Global-best refresh order.
    pub update: SwarmUpdate,

    /// Evaluate batches on the rayon pool (requires the `parallel` feature).
    /// Applies to the initial swarm and to [`SwarmUpdate::Synchronous`].
    pub parallel: bool,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,

    /// Wall-clock budget in milliseconds.
    pub time_limit_ms: Option<u64>,
}

impl Default for PsoConfig {
    fn default() -> Self {
        Self {
            swarm_size: 30,
            max_iterations: 100,
            inertia_weight: 0.7,
            final_inertia: None,
            cognitive_coeff: 1.5,
            social_coeff: 1.5,
            initial_velocity_scale: 0.1,
            update: SwarmUpdate::Asynchronous,
            parallel: true,
            seed: None,
            time_limit_ms: None,
        }
    }
}

impl PsoConfig {
    pub fn with_swarm_size(mut self, n: usize) -> Self {
        self.swarm_size = n;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_inertia(mut self, w: f64) -> Self {
        self.inertia_weight = w;
        self
    }

    pub fn with_final_inertia(mut self, w: f64) -> Self {
        self.final_inertia = Some(w);
        self
    }

    pub fn with_cognitive_coeff(mut self, c1: f64) -> Self {
        self.cognitive_coeff = c1;
        self
    }

    pub fn with_social_coeff(mut self, c2: f64) -> Self {
        self.social_coeff = c2;
        self
    }

    pub fn with_initial_velocity_scale(mut self, scale: f64) -> Self {
        self.initial_velocity_scale = scale;
        self
    }

    pub fn with_update(mut self, update: SwarmUpdate) -> Self {
        self.update = update;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Inertia weight for iteration `t` (0-based).
    pub fn inertia_at(&self, t: usize) -> f64 {
        match self.final_inertia {
            Some(end) if self.max_iterations > 1 => {
                let progress = t as f64 / (self.max_iterations - 1) as f64;
                self.inertia_weight + (end - self.inertia_weight) * progress.min(1.0)
            }
            _ => self.inertia_weight,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.swarm_size == 0 {
            return Err("swarm_size must be at least 1".into());
        }
        if self.max_iterations == 0 {
            return Err("max_iterations must be at least 1".into());
        }
        for (name, value) in [
            ("inertia_weight", self.inertia_weight),
            ("cognitive_coeff", self.cognitive_coeff),
            ("social_coeff", self.social_coeff),
            ("initial_velocity_scale", self.initial_velocity_scale),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be finite and non-negative, got {value}"));
            }
        }
        if let Some(end) = self.final_inertia {
            if !end.is_finite() || end < 0.0 {
                return Err(format!(
                    "final_inertia must be finite and non-negative, got {end}"
                ));
            }
        }
        if self.time_limit_ms == Some(0) {
            return Err("time_limit_ms must be positive when set".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PsoConfig::default();
        assert_eq!(config.swarm_size, 30);
        assert_eq!(config.max_iterations, 100);
        assert!((config.inertia_weight - 0.7).abs() < 1e-15);
        assert!((config.cognitive_coeff - 1.5).abs() < 1e-15);
        assert!((config.social_coeff - 1.5).abs() < 1e-15);
        assert_eq!(config.update, SwarmUpdate::Asynchronous);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_swarm() {
        assert!(PsoConfig::default().with_swarm_size(0).validate().is_err());
        assert!(PsoConfig::default().with_max_iterations(0).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_coeff() {
        assert!(PsoConfig::default().with_social_coeff(-1.0).validate().is_err());
        assert!(PsoConfig::default().with_inertia(f64::NAN).validate().is_err());
        assert!(PsoConfig::default().with_final_inertia(-0.1).validate().is_err());
    }

    #[test]
    fn test_inertia_constant_without_decay() {
        let config = PsoConfig::default();
        assert!((config.inertia_at(0) - 0.7).abs() < 1e-15);
        assert!((config.inertia_at(99) - 0.7).abs() < 1e-15);
    }

    #[test]
    fn test_inertia_linear_decay() {
        let config = PsoConfig::default()
            .with_max_iterations(11)
            .with_inertia(0.9)
            .with_final_inertia(0.4);
        assert!((config.inertia_at(0) - 0.9).abs() < 1e-12);
        assert!((config.inertia_at(5) - 0.65).abs() < 1e-12);
        assert!((config.inertia_at(10) - 0.4).abs() < 1e-12);
    }
}
