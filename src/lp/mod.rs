//! Linear-programming adapter.
//!
//! [`LinearProgramming`] accepts maximization requests with two-sided rows
//! and optional variable bounds, rewrites them into the minimization form
//! `min c·x  s.t.  A x <= b,  l <= x <= u` and hands them to an
//! [`LpBackend`]. The crate ships [`DenseSimplex`]; other solvers plug in
//! through the trait.
//!
//! Solver failures (infeasible, unbounded, missing backend, malformed
//! request) come back as an [`LpOutcome`] with `success == false` and a
//! diagnostic message.

mod adapter;
mod simplex;
mod types;

pub use adapter::LinearProgramming;
pub use simplex::DenseSimplex;
pub use types::{
    LinearRow, LpBackend, LpOutcome, LpRequest, LpSolution, LpStatus, StandardLp, VariableBound,
};
