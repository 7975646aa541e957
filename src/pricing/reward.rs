//! Business reward for pricing decisions.

use crate::error::{OptimError, Result};

/// Weights and thresholds of [`RewardFunction`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RewardConfig {
    pub profit_weight: f64,
    pub retention_weight: f64,
    pub market_share_weight: f64,
    /// Multiplier turning a retention rate in `[0, 1]` into points.
    pub retention_scale: f64,
    /// Multiplier turning a market share in `[0, 1]` into points.
    pub market_share_scale: f64,
    /// Relative distance from the competitor price that earns the bonus.
    pub parity_band: f64,
    pub parity_bonus: f64,
    /// Relative premium above which the overpricing penalty applies.
    pub overpricing_threshold: f64,
    pub overpricing_penalty: f64,
    /// Relative discount beyond which the underpricing penalty applies.
    pub underpricing_threshold: f64,
    pub underpricing_penalty: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            profit_weight: 0.5,
            retention_weight: 0.3,
            market_share_weight: 0.2,
            retention_scale: 100.0,
            market_share_scale: 100.0,
            parity_band: 0.10,
            parity_bonus: 10.0,
            overpricing_threshold: 0.20,
            overpricing_penalty: 20.0,
            underpricing_threshold: 0.30,
            underpricing_penalty: 5.0,
        }
    }
}

impl RewardConfig {
    pub fn with_weights(mut self, profit: f64, retention: f64, market_share: f64) -> Self {
        self.profit_weight = profit;
        self.retention_weight = retention;
        self.market_share_weight = market_share;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.profit_weight > 0.0) {
            return Err("profit_weight must be positive".into());
        }
        let all = [
            self.retention_weight,
            self.market_share_weight,
            self.retention_scale,
            self.market_share_scale,
            self.parity_band,
            self.parity_bonus,
            self.overpricing_threshold,
            self.overpricing_penalty,
            self.underpricing_threshold,
            self.underpricing_penalty,
        ];
        if all.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err("weights, scales and thresholds must be finite and non-negative".into());
        }
        if self.parity_band > self.overpricing_threshold {
            return Err("parity_band must not exceed overpricing_threshold".into());
        }
        Ok(())
    }
}

/// Observed result of charging one price.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingOutcome {
    pub revenue: f64,
    pub cost: f64,
    pub retention_rate: f64,
    pub market_share: f64,
    pub competitor_price: f64,
    /// The price we charged. Without it the positioning term is zero.
    pub price: Option<f64>,
}

/// Scalar reward for RL agents.
///
/// `0.5·profit + 0.3·100·retention + 0.2·100·share + positioning` with the
/// default config. Positioning compares our price with the competitor's:
///
/// | price / competitor  | term |
/// |---------------------|------|
/// | within ±10 %        | +10  |
/// | above +20 %         | −20  |
/// | below −30 %         | −5   |
/// | otherwise           | 0    |
///
/// The function is pure. Non-finite inputs contribute nothing and each term
/// saturates at `±f64::MAX`, so the result is always finite.
///
/// # Examples
///
/// ```
/// use u_bizopt::pricing::{PricingOutcome, RewardFunction};
///
/// let reward = RewardFunction::default();
/// let r = reward.reward(&PricingOutcome {
///     revenue: 200.0,
///     cost: 100.0,
///     retention_rate: 0.9,
///     market_share: 0.25,
///     competitor_price: 50.0,
///     price: Some(52.0),
/// });
/// // 50 + 27 + 5 + 10
/// assert!((r - 92.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RewardFunction {
    config: RewardConfig,
}

impl RewardFunction {
    /// Validates `config` before accepting it.
    pub fn new(config: RewardConfig) -> Result<Self> {
        config.validate().map_err(OptimError::InvalidConfig)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    pub fn reward(&self, outcome: &PricingOutcome) -> f64 {
        let c = &self.config;
        let profit = saturate(finite_or_zero(outcome.revenue) - finite_or_zero(outcome.cost));
        let retention = saturate(finite_or_zero(outcome.retention_rate) * c.retention_scale);
        let share = saturate(finite_or_zero(outcome.market_share) * c.market_share_scale);

        saturate(
            saturate(c.profit_weight * profit)
                + saturate(c.retention_weight * retention)
                + saturate(c.market_share_weight * share)
                + self.positioning(outcome.price, outcome.competitor_price),
        )
    }

    /// Reward from the five core signals, without positioning.
    pub fn compute(
        &self,
        revenue: f64,
        cost: f64,
        retention_rate: f64,
        market_share: f64,
        competitor_price: f64,
    ) -> f64 {
        self.reward(&PricingOutcome {
            revenue,
            cost,
            retention_rate,
            market_share,
            competitor_price,
            price: None,
        })
    }

    /// Competitive positioning bonus or penalty.
    pub fn positioning(&self, price: Option<f64>, competitor_price: f64) -> f64 {
        let Some(price) = price else {
            return 0.0;
        };
        if !price.is_finite() || !competitor_price.is_finite() || competitor_price <= 0.0 {
            return 0.0;
        }
        let c = &self.config;
        let deviation = price / competitor_price - 1.0;
        if deviation.abs() <= c.parity_band {
            c.parity_bonus
        } else if deviation > c.overpricing_threshold {
            -c.overpricing_penalty
        } else if deviation < -c.underpricing_threshold {
            -c.underpricing_penalty
        } else {
            0.0
        }
    }
}

/// Clamps overflow to `±f64::MAX`. Inputs are never NaN here.
fn saturate(v: f64) -> f64 {
    v.clamp(f64::MIN, f64::MAX)
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}
