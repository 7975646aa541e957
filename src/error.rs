//! Error type shared by the search runners and pricing agents.

use thiserror::Error;

/// Errors returned by optimizer and agent entry points.
///
/// Every public runner validates its inputs before searching and reports
/// problems through this type rather than panicking. The LP adapter is the
/// one exception: it folds failures into [`LpOutcome`](crate::lp::LpOutcome).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimError {
    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The variable bounds are empty, non-finite or inverted.
    #[error("invalid bounds: {0}")]
    InvalidBounds(String),

    /// A vector does not match the problem dimensionality.
    #[error("dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch {
        /// Number of bounds declared by the problem.
        expected: usize,
        /// Length of the offending vector.
        actual: usize,
    },

    /// A vector or input carries NaN or an infinity.
    #[error("non-finite value at index {index}")]
    NonFiniteValue {
        /// Position of the first offending value.
        index: usize,
    },

    /// An agent was constructed without any price points.
    #[error("action space must contain at least one price point")]
    EmptyActionSpace,

    /// An action index outside the agent's fixed action space.
    #[error("action index {index} is outside an action space of size {size}")]
    UnknownAction {
        /// The rejected index.
        index: usize,
        /// Size of the action space.
        size: usize,
    },

    /// A learning update received a NaN or infinite reward.
    #[error("reward must be finite, got {0}")]
    NonFiniteReward(f64),

    /// State features do not match the declared schema.
    #[error("state schema mismatch: {0}")]
    StateSchema(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OptimError>;
