//! Decision-cycle driver: observe, act, score, learn.

use super::bandit::SoftmaxBandit;
use super::qlearning::QLearningAgent;
use super::reward::{PricingOutcome, RewardFunction};
use super::state::PricingState;
use crate::error::{OptimError, Result};
use tracing::debug;

/// Result of one environment step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentStep {
    pub outcome: PricingOutcome,
    pub next_state: PricingState,
    pub done: bool,
}

/// A market the agents can price against, typically a simulator.
pub trait PricingEnvironment {
    /// Starts an episode and returns the first observed state.
    fn reset(&mut self) -> PricingState;

    /// Charges `price` and reports what happened.
    fn step(&mut self, price: f64) -> EnvironmentStep;
}

/// Summary of one training episode.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpisodeReport {
    pub total_reward: f64,
    pub steps: usize,
    /// Exploration rate after the episode's decay.
    pub epsilon: f64,
}

/// Runs agents against a [`PricingEnvironment`], scoring every outcome with
/// a [`RewardFunction`].
#[derive(Debug, Clone)]
pub struct PricingTrainer {
    reward: RewardFunction,
    max_steps: usize,
}

impl PricingTrainer {
    /// `max_steps` caps an episode that never reports `done`.
    pub fn new(reward: RewardFunction, max_steps: usize) -> Result<Self> {
        if max_steps == 0 {
            return Err(OptimError::InvalidConfig("max_steps must be at least 1".into()));
        }
        Ok(Self { reward, max_steps })
    }

    pub fn reward_function(&self) -> &RewardFunction {
        &self.reward
    }

    /// Plays one episode with exploration on, updating the agent each step.
    pub fn run_episode<E: PricingEnvironment>(
        &self,
        agent: &mut QLearningAgent,
        env: &mut E,
    ) -> Result<EpisodeReport> {
        let mut state = env.reset();
        let mut key = state.key()?;
        let mut total_reward = 0.0;
        let mut steps = 0;

        while steps < self.max_steps {
            let action = agent.get_action(&key, true);
            let step = env.step(action.price);
            let reward = self.reward.reward(&PricingOutcome {
                price: Some(action.price),
                ..step.outcome
            });
            let next_key = step.next_state.key()?;
            // Hitting the step cap truncates; it does not end the task.
            agent.update_q_value(&key, action.index, reward, &next_key, step.done)?;

            total_reward += reward;
            steps += 1;
            state = step.next_state;
            key = next_key;
            if step.done {
                break;
            }
        }
        agent.end_episode();

        debug!(steps, total_reward, ?state, "pricing episode finished");
        Ok(EpisodeReport {
            total_reward,
            steps,
            epsilon: agent.epsilon(),
        })
    }

    /// Runs `episodes` consecutive episodes.
    pub fn train<E: PricingEnvironment>(
        &self,
        agent: &mut QLearningAgent,
        env: &mut E,
        episodes: usize,
    ) -> Result<Vec<EpisodeReport>> {
        (0..episodes).map(|_| self.run_episode(agent, env)).collect()
    }

    /// Runs `pulls` stateless decisions with the bandit, annealing its
    /// temperature after each. Returns the total reward.
    pub fn run_bandit<E: PricingEnvironment>(
        &self,
        bandit: &mut SoftmaxBandit,
        env: &mut E,
        pulls: usize,
    ) -> Result<f64> {
        env.reset();
        let mut total = 0.0;
        for _ in 0..pulls {
            let arm = bandit.select_arm();
            let price = bandit.arms()[arm].price;
            let step = env.step(price);
            let reward = self.reward.reward(&PricingOutcome {
                price: Some(price),
                ..step.outcome
            });
            bandit.update(arm, reward)?;
            bandit.decay_temperature();
            total += reward;
            if step.done {
                env.reset();
            }
        }
        debug!(
            pulls,
            total,
            temperature = bandit.temperature(),
            greedy_price = bandit.greedy_price(),
            "bandit run finished"
        );
        Ok(total)
    }
}

/// Price suggestion handed to downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceRecommendation {
    pub price: f64,
    pub action_index: usize,
    /// Learned value of the action, if the agent has one.
    pub expected_value: Option<f64>,
}

impl PriceRecommendation {
    /// Greedy recommendation from a Q-learning agent for `state`.
    ///
    /// Unseen states fall back to a random price point and carry no
    /// expected value.
    pub fn from_agent(agent: &mut QLearningAgent, state: &PricingState) -> Result<Self> {
        let key = state.key()?;
        let action = agent.get_action(&key, false);
        Ok(Self {
            price: action.price,
            action_index: action.index,
            expected_value: agent.q_values(&key).map(|q| q[action.index]),
        })
    }

    /// Greedy recommendation from a bandit.
    pub fn from_bandit(bandit: &SoftmaxBandit) -> Self {
        let arm = bandit.best_arm();
        let stats = &bandit.arms()[arm];
        Self {
            price: stats.price,
            action_index: arm,
            expected_value: (stats.count > 0).then_some(stats.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{BanditConfig, QLearningConfig};

    /// Linear demand: volume falls with price; market is static.
    struct LinearMarket {
        competitor_price: f64,
        horizon: usize,
        t: usize,
    }

    impl LinearMarket {
        fn new(horizon: usize) -> Self {
            Self {
                competitor_price: 10.0,
                horizon,
                t: 0,
            }
        }

        fn state(&self) -> PricingState {
            PricingState {
                client_value: 0.5,
                market_trend: 0.1,
                competition_level: 0.5,
                seasonality: 0.5,
                demand_index: 0.5,
            }
        }
    }

    impl PricingEnvironment for LinearMarket {
        fn reset(&mut self) -> PricingState {
            self.t = 0;
            self.state()
        }

        fn step(&mut self, price: f64) -> EnvironmentStep {
            self.t += 1;
            let volume = (100.0 - 6.0 * price).max(0.0);
            EnvironmentStep {
                outcome: PricingOutcome {
                    revenue: price * volume,
                    cost: 4.0 * volume,
                    retention_rate: 0.8,
                    market_share: 0.2,
                    competitor_price: self.competitor_price,
                    price: None,
                },
                next_state: self.state(),
                done: self.t >= self.horizon,
            }
        }
    }

    #[test]
    fn test_episode_report() {
        let trainer = PricingTrainer::new(RewardFunction::default(), 50).unwrap();
        let config = QLearningConfig::default().with_seed(1);
        let mut agent = QLearningAgent::new(vec![8.0, 10.0, 12.0], config).unwrap();
        let mut env = LinearMarket::new(5);

        let report = trainer.run_episode(&mut agent, &mut env).unwrap();

        assert_eq!(report.steps, 5);
        assert_eq!(agent.episodes(), 1);
        assert!((report.epsilon - 0.995).abs() < 1e-12);
        assert_eq!(agent.state_count(), 1);
    }

    #[test]
    fn test_step_cap_truncates() {
        let trainer = PricingTrainer::new(RewardFunction::default(), 3).unwrap();
        let mut agent = QLearningAgent::new(vec![10.0], QLearningConfig::default()).unwrap();
        let mut env = LinearMarket::new(100);
        let report = trainer.run_episode(&mut agent, &mut env).unwrap();
        assert_eq!(report.steps, 3);
    }

    #[test]
    fn test_training_learns_profitable_price() {
        // Profit (p - 4)(100 - 6p) peaks near p = 10.3; 10 also wins the parity bonus.
        let trainer = PricingTrainer::new(RewardFunction::default(), 10).unwrap();
        let mut agent = QLearningAgent::new(
            vec![5.0, 10.0, 15.0],
            QLearningConfig::default().with_epsilon_decay(0.98).with_seed(3),
        )
        .unwrap();
        let mut env = LinearMarket::new(1);

        let reports = trainer.train(&mut agent, &mut env, 400).unwrap();
        assert_eq!(reports.len(), 400);

        let rec = PriceRecommendation::from_agent(&mut agent, &env.state()).unwrap();
        assert!((rec.price - 10.0).abs() < 1e-12);
        assert!(rec.expected_value.is_some());
    }

    #[test]
    fn test_bandit_run_finds_best_price() {
        let trainer = PricingTrainer::new(RewardFunction::default(), 10).unwrap();
        let mut bandit = SoftmaxBandit::new(
            vec![5.0, 10.0, 15.0],
            BanditConfig::default().with_temperature(50.0).with_seed(5),
        )
        .unwrap();
        let mut env = LinearMarket::new(1);

        trainer.run_bandit(&mut bandit, &mut env, 600).unwrap();

        let rec = PriceRecommendation::from_bandit(&bandit);
        assert!((rec.price - 10.0).abs() < 1e-12);
        assert_eq!(rec.action_index, 1);
    }

    #[test]
    fn test_rejects_zero_step_cap() {
        assert!(PricingTrainer::new(RewardFunction::default(), 0).is_err());
    }
}
