//! Reinforcement-learning pricing agents.
//!
//! Each decision cycle runs observe → act → score → learn:
//!
//! 1. Continuous market features are bucketed into a [`StateKey`] by a
//!    [`StateSchema`].
//! 2. [`QLearningAgent`] picks a price point epsilon-greedily, or
//!    [`SoftmaxBandit`] samples one without looking at state.
//! 3. [`RewardFunction`] turns the observed [`PricingOutcome`] into a scalar.
//! 4. The agent updates its table (or arm estimate) before the next cycle.
//!
//! [`PricingTrainer`] drives this loop against any [`PricingEnvironment`].
//!
//! # References
//!
//! - Watkins & Dayan (1992), "Q-learning"
//! - Sutton & Barto (2018), *Reinforcement Learning: An Introduction*

mod bandit;
mod qlearning;
mod reward;
mod state;
mod trainer;

pub use bandit::{ArmStats, BanditConfig, SoftmaxBandit};
pub use qlearning::{PriceAction, QLearningAgent, QLearningConfig};
pub use reward::{PricingOutcome, RewardConfig, RewardFunction};
pub use state::{PricingState, StateFeature, StateKey, StateSchema};
pub use trainer::{
    EnvironmentStep, EpisodeReport, PriceRecommendation, PricingEnvironment, PricingTrainer,
};
