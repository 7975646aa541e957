//! Maximization front end over an [`LpBackend`].

use super::simplex::DenseSimplex;
use super::types::{LpBackend, LpOutcome, LpRequest, LpStatus, StandardLp};
use std::fmt;
use tracing::{debug, warn};

/// Linear-programming adapter.
///
/// Converts a maximization [`LpRequest`] into the backend's minimization
/// form, expands two-sided rows into one-sided `<=` rows and negates the
/// objective back. Every failure comes back as an [`LpOutcome`] with
/// `success == false`.
///
/// # Examples
///
/// ```
/// use u_bizopt::lp::{LinearProgramming, LinearRow, LpRequest};
///
/// let request = LpRequest::maximize(vec![1.0, 1.0])
///     .with_row(LinearRow::at_most(vec![1.0, 2.0], 4.0))
///     .with_row(LinearRow::at_most(vec![3.0, 1.0], 6.0));
///
/// let outcome = LinearProgramming::new().solve(&request);
/// assert!(outcome.success);
/// assert!((outcome.optimal_value.unwrap() - 2.8).abs() < 1e-9);
/// ```
pub struct LinearProgramming {
    backend: Option<Box<dyn LpBackend>>,
}

impl Default for LinearProgramming {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LinearProgramming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinearProgramming")
            .field("backend", &self.backend.as_ref().map(|b| b.name()))
            .finish()
    }
}

impl LinearProgramming {
    /// Adapter over the built-in [`DenseSimplex`].
    pub fn new() -> Self {
        Self::with_backend(DenseSimplex::default())
    }

    pub fn with_backend<B: LpBackend + 'static>(backend: B) -> Self {
        Self {
            backend: Some(Box::new(backend)),
        }
    }

    /// An adapter with no solver behind it. Every solve reports
    /// [`LpStatus::Unavailable`].
    pub fn unavailable() -> Self {
        Self { backend: None }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Solves `max objective · x` subject to the request's rows and bounds.
    pub fn solve(&self, request: &LpRequest) -> LpOutcome {
        let Some(backend) = self.backend.as_ref() else {
            warn!("linear programming requested but no solver backend is available");
            return LpOutcome::failure(LpStatus::Unavailable, "no LP solver backend is available");
        };

        let standard = match to_standard_form(request) {
            Ok(lp) => lp,
            Err(message) => {
                warn!(%message, "rejected LP request");
                return LpOutcome::failure(LpStatus::Invalid, message);
            }
        };

        debug!(
            backend = backend.name(),
            variables = standard.cost.len(),
            rows = standard.a.len(),
            "solving linear program"
        );
        let solution = backend.solve(&standard);

        match (solution.status, solution.values, solution.objective) {
            (LpStatus::Optimal, Some(values), Some(objective)) => {
                debug!(iterations = solution.iterations, "linear program solved");
                LpOutcome::optimal(values, -objective)
            }
            (status, _, _) => {
                warn!(%status, iterations = solution.iterations, "linear program not solved");
                LpOutcome::failure(status, format!("{} failed: {status}", backend.name()))
            }
        }
    }
}

fn check_finite(name: &str, values: &[f64]) -> Result<(), String> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(format!("{name}[{i}] is not finite")),
        None => Ok(()),
    }
}

fn to_standard_form(request: &LpRequest) -> Result<StandardLp, String> {
    let n = request.dimension();
    if n == 0 {
        return Err("objective has no coefficients".into());
    }
    check_finite("objective", &request.objective)?;

    let bounds = request.resolved_bounds();
    if bounds.len() != n {
        return Err(format!(
            "expected {n} variable bounds, got {}",
            bounds.len()
        ));
    }
    let mut lower = Vec::with_capacity(n);
    let mut upper = Vec::with_capacity(n);
    for (j, &(lo, hi)) in bounds.iter().enumerate() {
        let lo = lo.unwrap_or(f64::NEG_INFINITY);
        let hi = hi.unwrap_or(f64::INFINITY);
        if lo.is_nan() || hi.is_nan() || lo > hi {
            return Err(format!("variable {j} has invalid bounds ({lo}, {hi})"));
        }
        lower.push(lo);
        upper.push(hi);
    }

    let mut a = Vec::new();
    let mut b = Vec::new();
    for (i, row) in request.rows.iter().enumerate() {
        if row.coefficients.len() != n {
            return Err(format!(
                "row {i} has {} coefficients, expected {n}",
                row.coefficients.len()
            ));
        }
        check_finite(&format!("row {i}"), &row.coefficients)?;
        if let (Some(lo), Some(hi)) = (row.lower, row.upper) {
            if lo > hi {
                return Err(format!("row {i} has lower bound {lo} above upper bound {hi}"));
            }
        }
        if let Some(hi) = row.upper {
            if !hi.is_finite() {
                return Err(format!("row {i} upper bound is not finite"));
            }
            a.push(row.coefficients.clone());
            b.push(hi);
        }
        if let Some(lo) = row.lower {
            if !lo.is_finite() {
                return Err(format!("row {i} lower bound is not finite"));
            }
            a.push(row.coefficients.iter().map(|c| -c).collect());
            b.push(-lo);
        }
    }

    Ok(StandardLp {
        cost: request.objective.iter().map(|c| -c).collect(),
        a,
        b,
        lower,
        upper,
    })
}
