//! State discretization for tabular agents.

use crate::error::{OptimError, Result};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// One continuous feature and the width of its bins.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateFeature {
    pub name: String,
    pub bin_width: f64,
}

/// Discretized state: one bin index per declared feature, in schema order.
///
/// Ordered so that policies can be listed deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateKey(Vec<i64>);

impl StateKey {
    pub fn new(bins: Vec<i64>) -> Self {
        Self(bins)
    }

    pub fn bins(&self) -> &[i64] {
        &self.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, bin) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("_")?;
            }
            write!(f, "{bin}")?;
        }
        Ok(())
    }
}

/// Ordered list of named features with fixed-width bins.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use u_bizopt::pricing::StateSchema;
///
/// let schema = StateSchema::new(vec![("demand", 0.25), ("trend", 0.5)]).unwrap();
/// let features = HashMap::from([("demand".to_string(), 0.6), ("trend".to_string(), -0.2)]);
/// let key = schema.encode(&features).unwrap();
/// assert_eq!(key.bins(), &[2, -1]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateSchema {
    features: Vec<StateFeature>,
}

impl StateSchema {
    /// Builds a schema. Names must be unique and widths positive.
    pub fn new<S: Into<String>>(features: Vec<(S, f64)>) -> Result<Self> {
        if features.is_empty() {
            return Err(OptimError::StateSchema("schema declares no features".into()));
        }
        let mut seen = HashSet::new();
        let mut declared = Vec::with_capacity(features.len());
        for (name, bin_width) in features {
            let name = name.into();
            if !(bin_width > 0.0) || !bin_width.is_finite() {
                return Err(OptimError::StateSchema(format!(
                    "feature '{name}' has invalid bin width {bin_width}"
                )));
            }
            if !seen.insert(name.clone()) {
                return Err(OptimError::StateSchema(format!(
                    "feature '{name}' declared twice"
                )));
            }
            declared.push(StateFeature { name, bin_width });
        }
        Ok(Self { features: declared })
    }

    /// Schema of [`PricingState`].
    pub fn pricing() -> Self {
        let features = PricingState::FEATURES
            .iter()
            .zip(PricingState::BIN_WIDTHS)
            .map(|(name, bin_width)| StateFeature {
                name: (*name).to_string(),
                bin_width,
            })
            .collect();
        Self { features }
    }

    pub fn features(&self) -> &[StateFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Encodes a feature dictionary. Every declared feature must be present
    /// and no undeclared feature may appear.
    pub fn encode(&self, values: &HashMap<String, f64>) -> Result<StateKey> {
        if let Some(extra) = values
            .keys()
            .find(|k| !self.features.iter().any(|f| &f.name == *k))
        {
            return Err(OptimError::StateSchema(format!("undeclared feature '{extra}'")));
        }
        let mut bins = Vec::with_capacity(self.features.len());
        for feature in &self.features {
            let value = values.get(&feature.name).ok_or_else(|| {
                OptimError::StateSchema(format!("missing feature '{}'", feature.name))
            })?;
            bins.push(bin(feature, *value)?);
        }
        Ok(StateKey(bins))
    }

    /// Encodes values given in schema order.
    pub fn encode_values(&self, values: &[f64]) -> Result<StateKey> {
        if values.len() != self.features.len() {
            return Err(OptimError::DimensionMismatch {
                expected: self.features.len(),
                actual: values.len(),
            });
        }
        self.features
            .iter()
            .zip(values)
            .map(|(feature, &value)| bin(feature, value))
            .collect::<Result<Vec<_>>>()
            .map(StateKey)
    }
}

fn bin(feature: &StateFeature, value: f64) -> Result<i64> {
    if !value.is_finite() {
        return Err(OptimError::StateSchema(format!(
            "feature '{}' is not finite: {value}",
            feature.name
        )));
    }
    Ok((value / feature.bin_width).floor() as i64)
}

/// Market and client context observed before a pricing decision.
///
/// Features are expected on roughly unit scale; each is bucketed into
/// bins of 0.2 (seasonality: 0.25).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingState {
    pub client_value: f64,
    pub market_trend: f64,
    pub competition_level: f64,
    pub seasonality: f64,
    pub demand_index: f64,
}

impl PricingState {
    pub const FEATURES: [&'static str; 5] = [
        "client_value",
        "market_trend",
        "competition_level",
        "seasonality",
        "demand_index",
    ];

    const BIN_WIDTHS: [f64; 5] = [0.2, 0.2, 0.2, 0.25, 0.2];

    pub fn values(&self) -> [f64; 5] {
        [
            self.client_value,
            self.market_trend,
            self.competition_level,
            self.seasonality,
            self.demand_index,
        ]
    }

    /// Feature dictionary keyed by [`PricingState::FEATURES`].
    pub fn to_features(&self) -> HashMap<String, f64> {
        Self::FEATURES
            .iter()
            .zip(self.values())
            .map(|(name, value)| ((*name).to_string(), value))
            .collect()
    }

    /// Builds a state from a feature dictionary.
    pub fn from_features(values: &HashMap<String, f64>) -> Result<Self> {
        let get = |name: &str| {
            values
                .get(name)
                .copied()
                .ok_or_else(|| OptimError::StateSchema(format!("missing feature '{name}'")))
        };
        Ok(Self {
            client_value: get("client_value")?,
            market_trend: get("market_trend")?,
            competition_level: get("competition_level")?,
            seasonality: get("seasonality")?,
            demand_index: get("demand_index")?,
        })
    }

    /// Discretizes the state with [`StateSchema::pricing`].
    pub fn key(&self) -> Result<StateKey> {
        StateSchema::pricing().encode_values(&self.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_rejects_bad_declarations() {
        assert!(StateSchema::new(Vec::<(String, f64)>::new()).is_err());
        assert!(StateSchema::new(vec![("a", 0.0)]).is_err());
        assert!(StateSchema::new(vec![("a", 1.0), ("a", 2.0)]).is_err());
    }

    #[test]
    fn test_encode_bins_floor() {
        let schema = StateSchema::new(vec![("x", 0.5)]).unwrap();
        assert_eq!(schema.encode_values(&[0.0]).unwrap().bins(), &[0]);
        assert_eq!(schema.encode_values(&[0.49]).unwrap().bins(), &[0]);
        assert_eq!(schema.encode_values(&[0.5]).unwrap().bins(), &[1]);
        assert_eq!(schema.encode_values(&[-0.1]).unwrap().bins(), &[-1]);
    }

    #[test]
    fn test_encode_missing_feature() {
        let schema = StateSchema::new(vec![("a", 1.0), ("b", 1.0)]).unwrap();
        let values = HashMap::from([("a".to_string(), 1.0)]);
        let err = schema.encode(&values).unwrap_err();
        assert!(matches!(err, OptimError::StateSchema(msg) if msg.contains("'b'")));
    }

    #[test]
    fn test_encode_undeclared_feature() {
        let schema = StateSchema::new(vec![("a", 1.0)]).unwrap();
        let values = HashMap::from([("a".to_string(), 1.0), ("z".to_string(), 0.0)]);
        assert!(schema.encode(&values).is_err());
    }

    #[test]
    fn test_encode_values_length_mismatch() {
        let schema = StateSchema::new(vec![("a", 1.0), ("b", 1.0)]).unwrap();
        assert_eq!(
            schema.encode_values(&[1.0]).unwrap_err(),
            OptimError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_encode_rejects_nan() {
        let schema = StateSchema::new(vec![("a", 1.0)]).unwrap();
        assert!(schema.encode_values(&[f64::NAN]).is_err());
    }

    #[test]
    fn test_nearby_states_share_key() {
        let a = PricingState {
            client_value: 0.81,
            market_trend: 0.1,
            competition_level: 0.5,
            seasonality: 0.3,
            demand_index: 0.7,
        };
        let b = PricingState {
            client_value: 0.85,
            ..a
        };
        assert_eq!(a.key().unwrap(), b.key().unwrap());

        let c = PricingState {
            client_value: 0.35,
            ..a
        };
        assert_ne!(a.key().unwrap(), c.key().unwrap());
    }

    #[test]
    fn test_pricing_state_feature_round_trip() {
        let state = PricingState {
            client_value: 0.9,
            market_trend: -0.2,
            competition_level: 0.4,
            seasonality: 0.6,
            demand_index: 1.1,
        };
        let features = state.to_features();
        assert_eq!(PricingState::from_features(&features).unwrap(), state);
        assert_eq!(
            StateSchema::pricing().encode(&features).unwrap(),
            state.key().unwrap()
        );
    }

    #[test]
    fn test_state_key_display() {
        assert_eq!(StateKey::new(vec![1, -2, 3]).to_string(), "1_-2_3");
    }
}
