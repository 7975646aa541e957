//! Tabular Q-learning over discretized pricing states.

use super::state::StateKey;
use crate::error::{OptimError, Result};
use crate::random::rng_from_seed;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

/// Q-learning hyperparameters.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QLearningConfig {
    /// Step size `alpha`.
    pub learning_rate: f64,
    /// Discount `gamma` on the next state's value.
    pub discount_factor: f64,
    /// Initial exploration rate.
    pub epsilon: f64,
    /// Multiplicative decay applied once per episode.
    pub epsilon_decay: f64,
    /// Exploration floor.
    pub epsilon_min: f64,
    pub seed: Option<u64>,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.95,
            epsilon: 1.0,
            epsilon_decay: 0.995,
            epsilon_min: 0.01,
            seed: None,
        }
    }
}

impl QLearningConfig {
    pub fn with_learning_rate(mut self, alpha: f64) -> Self {
        self.learning_rate = alpha;
        self
    }

    pub fn with_discount_factor(mut self, gamma: f64) -> Self {
        self.discount_factor = gamma;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_epsilon_decay(mut self, decay: f64) -> Self {
        self.epsilon_decay = decay;
        self
    }

    pub fn with_epsilon_min(mut self, min: f64) -> Self {
        self.epsilon_min = min;
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
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(format!("discount_factor must be in [0, 1], got {}", self.discount_factor));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(format!("epsilon must be in [0, 1], got {}", self.epsilon));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(format!("epsilon_decay must be in (0, 1], got {}", self.epsilon_decay));
        }
        if !(self.epsilon_min > 0.0 && self.epsilon_min <= self.epsilon) {
            return Err("epsilon_min must be positive and at most epsilon".into());
        }
        Ok(())
    }
}

/// A chosen price point and its position in the action space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceAction {
    pub index: usize,
    pub price: f64,
}

/// Tabular Q-learning agent with a fixed set of price points.
///
/// The table grows as states are updated and is never pruned. Every row
/// holds exactly one value per price point.
///
/// # Examples
///
/// ```
/// use u_bizopt::pricing::{QLearningAgent, QLearningConfig, StateKey};
///
/// let mut agent = QLearningAgent::new(
///     vec![9.0, 10.0, 11.0],
///     QLearningConfig::default().with_seed(1),
/// ).unwrap();
/// let s = StateKey::new(vec![0]);
///
/// let action = agent.get_action(&s, true);
/// agent.update_q_value(&s, action.index, 5.0, &s, true).unwrap();
/// assert_eq!(agent.state_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    config: QLearningConfig,
    price_points: Vec<f64>,
    q_table: HashMap<StateKey, Vec<f64>>,
    epsilon: f64,
    episodes: usize,
    rng: StdRng,
}

impl QLearningAgent {
    /// Creates an agent over `price_points`.
    pub fn new(price_points: Vec<f64>, config: QLearningConfig) -> Result<Self> {
        if price_points.is_empty() {
            return Err(OptimError::EmptyActionSpace);
        }
        if price_points.iter().any(|p| !p.is_finite()) {
            return Err(OptimError::InvalidConfig("price points must be finite".into()));
        }
        config.validate().map_err(OptimError::InvalidConfig)?;

        Ok(Self {
            epsilon: config.epsilon,
            rng: rng_from_seed(config.seed),
            config,
            price_points,
            q_table: HashMap::new(),
            episodes: 0,
        })
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    pub fn price_points(&self) -> &[f64] {
        &self.price_points
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Completed episodes (calls to [`end_episode`](Self::end_episode)).
    pub fn episodes(&self) -> usize {
        self.episodes
    }

    /// Number of distinct states in the table.
    pub fn state_count(&self) -> usize {
        self.q_table.len()
    }

    /// Learned values for `state`, one per price point.
    pub fn q_values(&self, state: &StateKey) -> Option<&[f64]> {
        self.q_table.get(state).map(Vec::as_slice)
    }

    /// The action at `index`.
    pub fn action(&self, index: usize) -> Result<PriceAction> {
        self.price_points
            .get(index)
            .map(|&price| PriceAction { index, price })
            .ok_or(OptimError::UnknownAction {
                index,
                size: self.price_points.len(),
            })
    }

    /// Epsilon-greedy selection.
    ///
    /// Explores only when `training`. Exploitation breaks ties randomly and
    /// falls back to a random action for unseen states.
    pub fn get_action(&mut self, state: &StateKey, training: bool) -> PriceAction {
        let n = self.price_points.len();
        let explore = training && self.rng.random_range(0.0..1.0) < self.epsilon;

        let index = match (explore, self.q_table.get(state)) {
            (false, Some(values)) => {
                let best = max_value(values);
                let ties: Vec<usize> = (0..n).filter(|&i| values[i] == best).collect();
                if ties.is_empty() {
                    // Row holds only NaN.
                    self.rng.random_range(0..n)
                } else {
                    ties[self.rng.random_range(0..ties.len())]
                }
            }
            _ => self.rng.random_range(0..n),
        };

        PriceAction {
            index,
            price: self.price_points[index],
        }
    }

    /// One-step Q-learning update. Returns the temporal-difference error.
    ///
    /// The bootstrap term is zero when `done` or when `next_state` has never
    /// been updated. A NaN or infinite `reward` is rejected and leaves the
    /// table untouched.
    pub fn update_q_value(
        &mut self,
        state: &StateKey,
        action: usize,
        reward: f64,
        next_state: &StateKey,
        done: bool,
    ) -> Result<f64> {
        let n = self.price_points.len();
        if action >= n {
            return Err(OptimError::UnknownAction {
                index: action,
                size: n,
            });
        }
        if !reward.is_finite() {
            return Err(OptimError::NonFiniteReward(reward));
        }

        let next_max = if done {
            0.0
        } else {
            self.q_table.get(next_state).map_or(0.0, |v| max_value(v))
        };
        let target = reward + self.config.discount_factor * next_max;

        let row = self
            .q_table
            .entry(state.clone())
            .or_insert_with(|| vec![0.0; n]);
        let td_error = target - row[action];
        row[action] += self.config.learning_rate * td_error;

        trace!(%state, action, reward, td_error, "q-value updated");
        Ok(td_error)
    }

    /// Multiplies epsilon by the decay factor, floored at `epsilon_min`.
    pub fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
    }

    /// Marks the end of an episode and decays epsilon.
    pub fn end_episode(&mut self) {
        self.episodes += 1;
        self.decay_epsilon();
        debug!(
            episode = self.episodes,
            epsilon = self.epsilon,
            states = self.q_table.len(),
            "q-learning episode finished"
        );
    }

    /// Greedy policy snapshot for every visited state.
    ///
    /// Ties resolve to the lowest index so the snapshot is deterministic.
    pub fn get_policy(&self) -> BTreeMap<StateKey, PriceAction> {
        self.q_table
            .iter()
            .map(|(state, values)| {
                let best = max_value(values);
                let index = values.iter().position(|&v| v == best).unwrap_or(0);
                (
                    state.clone(),
                    PriceAction {
                        index,
                        price: self.price_points[index],
                    },
                )
            })
            .collect()
    }
}

fn max_value(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(prices: Vec<f64>) -> QLearningAgent {
        QLearningAgent::new(prices, QLearningConfig::default().with_seed(42)).unwrap()
    }

    fn key(b: i64) -> StateKey {
        StateKey::new(vec![b])
    }

    #[test]
    fn test_rejects_empty_action_space() {
        let err = QLearningAgent::new(vec![], QLearningConfig::default()).unwrap_err();
        assert_eq!(err, OptimError::EmptyActionSpace);
    }

    #[test]
    fn test_rejects_bad_config() {
        let config = QLearningConfig::default().with_learning_rate(0.0);
        assert!(QLearningAgent::new(vec![1.0], config).is_err());
        let config = QLearningConfig::default().with_epsilon_min(0.0);
        assert!(QLearningAgent::new(vec![1.0], config).is_err());
    }

    #[test]
    fn test_update_formula() {
        let mut agent = agent(vec![1.0, 2.0]);
        let s = key(0);
        let s2 = key(1);

        // Seed next state with Q(s2, 1) = 0.1 * 10 = 1.0
        agent.update_q_value(&s2, 1, 10.0, &s2, true).unwrap();
        assert!((agent.q_values(&s2).unwrap()[1] - 1.0).abs() < 1e-12);

        // Q(s,0) = 0 + 0.1 * (2 + 0.95 * 1.0 - 0) = 0.295
        let td = agent.update_q_value(&s, 0, 2.0, &s2, false).unwrap();
        assert!((td - 2.95).abs() < 1e-12);
        assert!((agent.q_values(&s).unwrap()[0] - 0.295).abs() < 1e-12);
    }

    #[test]
    fn test_done_ignores_next_state() {
        let mut agent = agent(vec![1.0, 2.0]);
        let s = key(0);
        let s2 = key(1);
        agent.update_q_value(&s2, 0, 100.0, &s2, true).unwrap();

        agent.update_q_value(&s, 0, 1.0, &s2, true).unwrap();
        assert!((agent.q_values(&s).unwrap()[0] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_unseen_next_state_bootstraps_zero() {
        let mut agent = agent(vec![1.0]);
        agent.update_q_value(&key(0), 0, 1.0, &key(99), false).unwrap();
        assert!((agent.q_values(&key(0)).unwrap()[0] - 0.1).abs() < 1e-12);
        assert_eq!(agent.state_count(), 1);
    }

    #[test]
    fn test_non_finite_reward_rejected() {
        let mut agent = agent(vec![1.0]);
        let s = key(0);

        for reward in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = agent.update_q_value(&s, 0, reward, &s, true).unwrap_err();
            assert!(matches!(err, OptimError::NonFiniteReward(_)));
        }
        assert_eq!(agent.state_count(), 0);

        // Greedy selection still works afterwards.
        assert_eq!(agent.get_action(&s, false).index, 0);
    }

    #[test]
    fn test_nan_row_falls_back_to_random_action() {
        let mut agent = agent(vec![1.0, 2.0, 3.0]);
        agent.q_table.insert(key(0), vec![f64::NAN; 3]);

        for _ in 0..20 {
            let action = agent.get_action(&key(0), false);
            assert!(action.index < 3);
        }
    }

    #[test]
    fn test_unknown_action_rejected() {
        let mut agent = agent(vec![1.0, 2.0]);
        let err = agent.update_q_value(&key(0), 2, 1.0, &key(0), true).unwrap_err();
        assert_eq!(err, OptimError::UnknownAction { index: 2, size: 2 });
        assert_eq!(agent.state_count(), 0);
    }

    #[test]
    fn test_epsilon_decay_floor() {
        let mut agent = agent(vec![1.0]);
        for _ in 0..10_000 {
            agent.end_episode();
        }
        assert!((agent.epsilon() - 0.01).abs() < 1e-12);
        assert_eq!(agent.episodes(), 10_000);
    }

    #[test]
    fn test_greedy_when_not_training() {
        let mut agent = agent(vec![5.0, 6.0, 7.0]);
        let s = key(0);
        agent.update_q_value(&s, 1, 10.0, &s, true).unwrap();
        // epsilon is still 1.0, but training = false disables exploration.
        for _ in 0..50 {
            assert_eq!(agent.get_action(&s, false).index, 1);
        }
    }

    #[test]
    fn test_full_exploration_covers_actions() {
        let mut agent = agent(vec![5.0, 6.0, 7.0]);
        let s = key(0);
        agent.update_q_value(&s, 1, 10.0, &s, true).unwrap();
        let mut seen = [false; 3];
        for _ in 0..200 {
            seen[agent.get_action(&s, true).index] = true;
        }
        assert!(seen.iter().all(|&b| b));
    }

    #[test]
    fn test_unseen_state_random_fallback() {
        let mut agent = agent(vec![5.0, 6.0, 7.0]);
        let mut seen = [false; 3];
        for _ in 0..200 {
            seen[agent.get_action(&key(3), false).index] = true;
        }
        assert!(seen.iter().all(|&b| b));
        assert_eq!(agent.state_count(), 0);
    }

    #[test]
    fn test_convergence_single_state() {
        let rewards = [1.0, 2.0, 5.0, 3.0];
        let mut agent = QLearningAgent::new(
            vec![8.0, 9.0, 10.0, 11.0],
            QLearningConfig::default().with_epsilon_decay(0.99).with_seed(7),
        )
        .unwrap();
        let s = key(0);

        for _ in 0..1000 {
            let a = agent.get_action(&s, true);
            agent.update_q_value(&s, a.index, rewards[a.index], &s, true).unwrap();
            agent.end_episode();
        }

        let policy = agent.get_policy();
        assert_eq!(policy.len(), 1);
        assert_eq!(policy[&s].index, 2);
        assert!((policy[&s].price - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_policy_ties_pick_lowest_index() {
        let mut agent = agent(vec![1.0, 2.0, 3.0]);
        let s = key(0);
        agent.update_q_value(&s, 2, 0.0, &s, true).unwrap();
        assert_eq!(agent.get_policy()[&s].index, 0);
    }

    #[test]
    fn test_action_lookup() {
        let agent = agent(vec![1.5, 2.5]);
        assert_eq!(agent.action(1).unwrap(), PriceAction { index: 1, price: 2.5 });
        assert!(agent.action(2).is_err());
    }
}
