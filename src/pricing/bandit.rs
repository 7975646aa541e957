//! Softmax multi-armed bandit over price points.
//!
//! Each arm keeps an exponential recency-weighted value estimate
//! `value += learning_rate * (reward - value)`. Arms are drawn with
//! probability proportional to `exp(value / temperature)`; annealing the
//! temperature moves the policy toward pure `argmax value`.
//!
//! # References
//!
//! - Sutton & Barto (2018), *Reinforcement Learning: An Introduction*, §2.3-2.4

use crate::error::{OptimError, Result};
use crate::random::rng_from_seed;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::trace;

/// Softmax bandit hyperparameters.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BanditConfig {
    pub learning_rate: f64,
    pub temperature: f64,
    pub temperature_decay: f64,
    pub min_temperature: f64,
    pub seed: Option<u64>,
}

impl Default for BanditConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            temperature: 1.0,
            temperature_decay: 0.99,
            min_temperature: 0.01,
            seed: None,
        }
    }
}

impl BanditConfig {
    pub fn with_learning_rate(mut self, alpha: f64) -> Self {
        self.learning_rate = alpha;
        self
    }

    pub fn with_temperature(mut self, t: f64) -> Self {
        self.temperature = t;
        self
    }

    pub fn with_temperature_decay(mut self, decay: f64) -> Self {
        self.temperature_decay = decay;
        self
    }

    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(format!("learning_rate must be in (0, 1], got {}", self.learning_rate));
        }
        if !(self.min_temperature > 0.0) || self.temperature < self.min_temperature {
            return Err("temperatures must satisfy 0 < min_temperature <= temperature".into());
        }
        if !self.temperature.is_finite() {
            return Err("temperature must be finite".into());
        }
        if !(self.temperature_decay > 0.0 && self.temperature_decay <= 1.0) {
            return Err(format!(
                "temperature_decay must be in (0, 1], got {}",
                self.temperature_decay
            ));
        }
        Ok(())
    }
}

/// Statistics for one arm.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmStats {
    pub price: f64,
    pub count: u64,
    pub cumulative_reward: f64,
    /// Running value estimate.
    pub value: f64,
}

impl ArmStats {
    pub fn mean_reward(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.cumulative_reward / self.count as f64
        }
    }
}

/// State-free price exploration with softmax action selection.
///
/// The arm set is fixed at construction and never resized.
#[derive(Debug, Clone)]
pub struct SoftmaxBandit {
    config: BanditConfig,
    arms: Vec<ArmStats>,
    temperature: f64,
    rng: StdRng,
}

impl SoftmaxBandit {
    pub fn new(price_points: Vec<f64>, config: BanditConfig) -> Result<Self> {
        if price_points.is_empty() {
            return Err(OptimError::EmptyActionSpace);
        }
        if price_points.iter().any(|p| !p.is_finite()) {
            return Err(OptimError::InvalidConfig("price points must be finite".into()));
        }
        config.validate().map_err(OptimError::InvalidConfig)?;

        let arms = price_points
            .into_iter()
            .map(|price| ArmStats {
                price,
                count: 0,
                cumulative_reward: 0.0,
                value: 0.0,
            })
            .collect();
        Ok(Self {
            temperature: config.temperature,
            rng: rng_from_seed(config.seed),
            config,
            arms,
        })
    }

    pub fn arms(&self) -> &[ArmStats] {
        &self.arms
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Softmax selection probabilities at the current temperature.
    pub fn probabilities(&self) -> Vec<f64> {
        let scaled: Vec<f64> = self.arms.iter().map(|a| a.value / self.temperature).collect();
        let max = scaled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> = scaled.iter().map(|s| (s - max).exp()).collect();
        let total: f64 = weights.iter().sum();

        if !total.is_finite() || total <= 0.0 {
            // Degenerate scaling: put all mass on the greedy arm.
            let best = self.best_arm();
            return (0..self.arms.len())
                .map(|i| if i == best { 1.0 } else { 0.0 })
                .collect();
        }
        weights.into_iter().map(|w| w / total).collect()
    }

    /// Draws an arm from the softmax distribution.
    pub fn select_arm(&mut self) -> usize {
        let probs = self.probabilities();
        let mut u: f64 = self.rng.random_range(0.0..1.0);
        for (i, p) in probs.iter().enumerate() {
            if u < *p {
                return i;
            }
            u -= p;
        }
        // Rounding left a sliver of mass unassigned.
        probs
            .iter()
            .rposition(|&p| p > 0.0)
            .unwrap_or(self.arms.len() - 1)
    }

    /// Records `reward` for `arm`.
    pub fn update(&mut self, arm: usize, reward: f64) -> Result<()> {
        let size = self.arms.len();
        let stats = self
            .arms
            .get_mut(arm)
            .ok_or(OptimError::UnknownAction { index: arm, size })?;
        if !reward.is_finite() {
            return Err(OptimError::NonFiniteReward(reward));
        }
        stats.count += 1;
        stats.cumulative_reward += reward;
        stats.value += self.config.learning_rate * (reward - stats.value);
        trace!(arm, reward, value = stats.value, "bandit arm updated");
        Ok(())
    }

    /// Anneals the temperature toward its floor.
    pub fn decay_temperature(&mut self) {
        self.temperature =
            (self.temperature * self.config.temperature_decay).max(self.config.min_temperature);
    }

    /// Arm with the highest value estimate (lowest index on ties).
    pub fn best_arm(&self) -> usize {
        let mut best = 0;
        for (i, arm) in self.arms.iter().enumerate().skip(1) {
            if arm.value > self.arms[best].value {
                best = i;
            }
        }
        best
    }

    /// Price of [`best_arm`](Self::best_arm).
    pub fn greedy_price(&self) -> f64 {
        self.arms[self.best_arm()].price
    }
}
