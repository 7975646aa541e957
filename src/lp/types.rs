//! LP request, outcome and backend problem types.

use std::fmt;

/// A linear row `lower <= coefficients · x <= upper`.
///
/// Either side may be absent. A row with neither side constrains nothing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearRow {
    pub coefficients: Vec<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl LinearRow {
    /// `coefficients · x <= upper`
    pub fn at_most(coefficients: Vec<f64>, upper: f64) -> Self {
        Self {
            coefficients,
            lower: None,
            upper: Some(upper),
        }
    }

    /// `coefficients · x >= lower`
    pub fn at_least(coefficients: Vec<f64>, lower: f64) -> Self {
        Self {
            coefficients,
            lower: Some(lower),
            upper: None,
        }
    }

    /// `lower <= coefficients · x <= upper`
    pub fn between(coefficients: Vec<f64>, lower: f64, upper: f64) -> Self {
        Self {
            coefficients,
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// `coefficients · x == value`
    pub fn equal_to(coefficients: Vec<f64>, value: f64) -> Self {
        Self::between(coefficients, value, value)
    }
}

/// Bounds on one decision variable. `None` means unbounded on that side.
pub type VariableBound = (Option<f64>, Option<f64>);

/// A maximization request: `max objective · x` subject to `rows` and
/// per-variable bounds.
///
/// When `variable_bounds` is empty every variable defaults to `x >= 0`.
///
/// # Examples
///
/// ```
/// use u_bizopt::lp::{LinearRow, LpRequest};
///
/// let request = LpRequest::maximize(vec![1.0, 1.0])
///     .with_row(LinearRow::at_most(vec![1.0, 2.0], 4.0))
///     .with_row(LinearRow::at_most(vec![3.0, 1.0], 6.0));
/// assert_eq!(request.dimension(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LpRequest {
    pub objective: Vec<f64>,
    pub rows: Vec<LinearRow>,
    pub variable_bounds: Vec<VariableBound>,
}

impl LpRequest {
    pub fn maximize(objective: Vec<f64>) -> Self {
        Self {
            objective,
            ..Self::default()
        }
    }

    pub fn with_row(mut self, row: LinearRow) -> Self {
        self.rows.push(row);
        self
    }

    pub fn with_variable_bounds(mut self, bounds: Vec<VariableBound>) -> Self {
        self.variable_bounds = bounds;
        self
    }

    /// Shorthand for finite box bounds on every variable.
    pub fn with_box_bounds(self, bounds: &[(f64, f64)]) -> Self {
        self.with_variable_bounds(bounds.iter().map(|&(lo, hi)| (Some(lo), Some(hi))).collect())
    }

    pub fn dimension(&self) -> usize {
        self.objective.len()
    }

    /// Effective bounds, applying the `x >= 0` default.
    pub fn resolved_bounds(&self) -> Vec<VariableBound> {
        if self.variable_bounds.is_empty() {
            vec![(Some(0.0), None); self.objective.len()]
        } else {
            self.variable_bounds.clone()
        }
    }
}

/// Solver status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LpStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// No solver backend is available.
    Unavailable,
    /// The request was malformed.
    Invalid,
    IterationLimit,
}

impl fmt::Display for LpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LpStatus::Optimal => "optimal",
            LpStatus::Infeasible => "infeasible",
            LpStatus::Unbounded => "unbounded",
            LpStatus::Unavailable => "solver unavailable",
            LpStatus::Invalid => "invalid problem",
            LpStatus::IterationLimit => "iteration limit reached",
        };
        f.write_str(s)
    }
}

/// Structured result of an LP solve. Failures are reported here, never raised.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LpOutcome {
    pub success: bool,
    pub status: LpStatus,
    pub optimal_vector: Option<Vec<f64>>,
    /// Objective value in the maximization sense.
    pub optimal_value: Option<f64>,
    pub message: String,
}

impl LpOutcome {
    pub(crate) fn optimal(vector: Vec<f64>, value: f64) -> Self {
        Self {
            success: true,
            status: LpStatus::Optimal,
            optimal_vector: Some(vector),
            optimal_value: Some(value),
            message: "optimal solution found".into(),
        }
    }

    pub(crate) fn failure(status: LpStatus, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            optimal_vector: None,
            optimal_value: None,
            message: message.into(),
        }
    }
}

/// Minimization problem in backend form:
/// `min cost · x  s.t.  a x <= b,  lower <= x <= upper`.
///
/// Infinite bounds are allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardLp {
    pub cost: Vec<f64>,
    pub a: Vec<Vec<f64>>,
    pub b: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Raw backend answer, in the minimization sense.
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    pub status: LpStatus,
    pub values: Option<Vec<f64>>,
    pub objective: Option<f64>,
    pub iterations: usize,
}

impl LpSolution {
    pub fn failed(status: LpStatus, iterations: usize) -> Self {
        Self {
            status,
            values: None,
            objective: None,
            iterations,
        }
    }
}

/// A linear-programming solver.
///
/// Implementations solve [`StandardLp`] in the minimization sense.
pub trait LpBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Solves `problem`.
    fn solve(&self, problem: &StandardLp) -> LpSolution;
}
