//! The optimization contract shared by GA, SA and PSO.
//!
//! A caller supplies an objective over a fixed-length real vector, one
//! `(min, max)` bound per variable, and optionally a feasibility predicate.
//! All search algorithms in this crate **maximize** the objective.
//!
//! Infeasible points are scored `-inf`, which makes them lose every
//! comparison against a feasible point without removing them from the
//! search. Feasibility is also reported separately through
//! [`Evaluation::feasible`], so callers can tell "best of bad options"
//! apart from a genuine optimum.

use crate::error::{OptimError, Result};
use rand::Rng;
use std::fmt;

/// Objective function: higher is better.
pub type Objective = Box<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Feasibility predicate: `true` when the vector satisfies all constraints.
pub type Constraint = Box<dyn Fn(&[f64]) -> bool + Send + Sync>;

/// Ordered per-variable `(min, max)` bounds.
///
/// # Examples
///
/// ```
/// use u_bizopt::problem::Bounds;
///
/// let bounds = Bounds::uniform(3, 0.0, 10.0).unwrap();
/// assert_eq!(bounds.dimension(), 3);
///
/// let mut x = vec![-1.0, 5.0, 12.0];
/// bounds.clamp(&mut x);
/// assert_eq!(x, vec![0.0, 5.0, 10.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pairs: Vec<(f64, f64)>,
}

impl Bounds {
    /// Creates bounds from `(min, max)` pairs.
    ///
    /// Fails when the list is empty, any bound is non-finite, or `min > max`.
    pub fn new(pairs: Vec<(f64, f64)>) -> Result<Self> {
        if pairs.is_empty() {
            return Err(OptimError::InvalidBounds(
                "at least one variable is required".into(),
            ));
        }
        for (i, &(lo, hi)) in pairs.iter().enumerate() {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(OptimError::InvalidBounds(format!(
                    "variable {i} has non-finite bounds [{lo}, {hi}]"
                )));
            }
            if lo > hi {
                return Err(OptimError::InvalidBounds(format!(
                    "variable {i} has min {lo} greater than max {hi}"
                )));
            }
        }
        Ok(Self { pairs })
    }

    /// Creates `dim` identical bounds `[min, max]`.
    pub fn uniform(dim: usize, min: f64, max: f64) -> Result<Self> {
        Self::new(vec![(min, max); dim])
    }

    /// Number of variables.
    pub fn dimension(&self) -> usize {
        self.pairs.len()
    }

    /// The raw `(min, max)` pairs.
    pub fn pairs(&self) -> &[(f64, f64)] {
        &self.pairs
    }

    /// Width `max - min` of variable `i`.
    pub fn range(&self, i: usize) -> f64 {
        let (lo, hi) = self.pairs[i];
        hi - lo
    }

    /// Clamps a single value into the bounds of variable `i`.
    pub fn clamp_value(&self, i: usize, value: f64) -> f64 {
        let (lo, hi) = self.pairs[i];
        value.clamp(lo, hi)
    }

    /// Clamps every coordinate of `x` in place.
    pub fn clamp(&self, x: &mut [f64]) {
        for (v, &(lo, hi)) in x.iter_mut().zip(&self.pairs) {
            *v = v.clamp(lo, hi);
        }
    }

    /// Whether `x` has the right length and lies inside every bound.
    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.pairs.len()
            && x
                .iter()
                .zip(&self.pairs)
                .all(|(&v, &(lo, hi))| v >= lo && v <= hi)
    }

    /// Draws each coordinate uniformly from its bound interval.
    pub fn sample_uniform<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        self.pairs
            .iter()
            .map(|&(lo, hi)| rng.random_range(lo..=hi))
            .collect()
    }

    /// Fails with [`OptimError::DimensionMismatch`] when `x` has the wrong length.
    pub fn check_dimension(&self, x: &[f64]) -> Result<()> {
        if x.len() != self.pairs.len() {
            return Err(OptimError::DimensionMismatch {
                expected: self.pairs.len(),
                actual: x.len(),
            });
        }
        Ok(())
    }

    /// Like [`check_dimension`](Self::check_dimension), and also rejects
    /// NaN or infinite coordinates.
    pub fn check_point(&self, x: &[f64]) -> Result<()> {
        self.check_dimension(x)?;
        match x.iter().position(|v| !v.is_finite()) {
            Some(index) => Err(OptimError::NonFiniteValue { index }),
            None => Ok(()),
        }
    }
}

/// Result of scoring one candidate vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Objective value, or `-inf` if the candidate is infeasible.
    pub fitness: f64,
    /// Whether the candidate satisfied the constraint predicate.
    pub feasible: bool,
}

impl Evaluation {
    /// The score given to candidates that violate the constraint.
    pub fn rejected() -> Self {
        Self {
            fitness: f64::NEG_INFINITY,
            feasible: false,
        }
    }
}

/// Objective, bounds and optional constraint for one optimization run.
///
/// # Examples
///
/// ```
/// use u_bizopt::problem::{Bounds, OptimizationProblem};
///
/// let bounds = Bounds::uniform(2, 0.0, 10.0).unwrap();
/// let problem = OptimizationProblem::new(|x: &[f64]| x[0] + x[1], bounds)
///     .with_constraint(|x: &[f64]| x[0] + x[1] <= 12.0);
///
/// assert!(problem.evaluate(&[5.0, 5.0]).feasible);
/// assert_eq!(problem.evaluate(&[8.0, 8.0]).fitness, f64::NEG_INFINITY);
/// ```
pub struct OptimizationProblem {
    objective: Objective,
    bounds: Bounds,
    constraint: Option<Constraint>,
}

impl OptimizationProblem {
    /// Creates an unconstrained problem.
    pub fn new<F>(objective: F, bounds: Bounds) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Self {
            objective: Box::new(objective),
            bounds,
            constraint: None,
        }
    }

    /// Attaches a feasibility predicate.
    pub fn with_constraint<C>(mut self, constraint: C) -> Self
    where
        C: Fn(&[f64]) -> bool + Send + Sync + 'static,
    {
        self.constraint = Some(Box::new(constraint));
        self
    }

    /// The variable bounds.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Number of decision variables.
    pub fn dimension(&self) -> usize {
        self.bounds.dimension()
    }

    /// Whether a constraint predicate is attached.
    pub fn is_constrained(&self) -> bool {
        self.constraint.is_some()
    }

    /// Whether `x` satisfies the constraint (always true when unconstrained).
    pub fn is_feasible(&self, x: &[f64]) -> bool {
        self.constraint.as_ref().is_none_or(|c| c(x))
    }

    /// Scores `x`. Infeasible points and NaN objective values map to `-inf`.
    pub fn evaluate(&self, x: &[f64]) -> Evaluation {
        if !self.is_feasible(x) {
            return Evaluation::rejected();
        }
        let value = (self.objective)(x);
        Evaluation {
            fitness: if value.is_nan() {
                f64::NEG_INFINITY
            } else {
                value
            },
            feasible: true,
        }
    }
}

impl fmt::Debug for OptimizationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimizationProblem")
            .field("bounds", &self.bounds)
            .field("constrained", &self.constraint.is_some())
            .finish()
    }
}

/// Applies `f` to every item, on the rayon pool when `parallel` is set.
#[cfg(feature = "parallel")]
pub(crate) fn for_each_item<T, F>(items: &mut [T], parallel: bool, f: F)
where
    T: Send,
    F: Fn(&mut T) + Send + Sync,
{
    use rayon::prelude::*;

    if parallel {
        items.par_iter_mut().for_each(f);
    } else {
        items.iter_mut().for_each(f);
    }
}

/// Applies `f` to every item sequentially.
#[cfg(not(feature = "parallel"))]
pub(crate) fn for_each_item<T, F>(items: &mut [T], _parallel: bool, f: F)
where
    T: Send,
    F: Fn(&mut T) + Send + Sync,
{
    items.iter_mut().for_each(f);
}
