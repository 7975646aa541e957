//! Dense two-phase tableau simplex.
//!
//! Variables with general bounds are mapped onto non-negative columns:
//!
//! - finite lower bound: `x = l + y`, plus a cap row `y <= u - l` if `u` is finite
//! - only an upper bound: `x = u - y`
//! - free: `x = y⁺ - y⁻`
//!
//! Rows with a negative right-hand side get an artificial column and phase 1
//! drives the artificial sum to zero. Entering columns follow Bland's rule,
//! which rules out cycling on degenerate vertices.
//!
//! # References
//!
//! - Dantzig (1963), *Linear Programming and Extensions*
//! - Bland (1977), "New finite pivoting rules for the simplex method"

use super::types::{LpBackend, LpSolution, LpStatus, StandardLp};
use tracing::trace;

const PIVOT_EPS: f64 = 1e-9;

/// Built-in dense simplex backend. Suited to small and medium problems.
#[derive(Debug, Clone)]
pub struct DenseSimplex {
    /// Pivot budget across both phases.
    pub max_iterations: usize,
    /// Phase 1 residual above which the problem is declared infeasible.
    pub feasibility_tolerance: f64,
}

impl Default for DenseSimplex {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            feasibility_tolerance: 1e-7,
        }
    }
}

impl DenseSimplex {
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum Substitution {
    Shifted { lower: f64, col: usize },
    Mirrored { upper: f64, col: usize },
    Split { pos: usize, neg: usize },
}

impl Substitution {
    fn offset(&self) -> f64 {
        match *self {
            Substitution::Shifted { lower, .. } => lower,
            Substitution::Mirrored { upper, .. } => upper,
            Substitution::Split { .. } => 0.0,
        }
    }

    /// Scatter coefficient `a` of the original variable into `row`.
    fn scatter(&self, a: f64, row: &mut [f64]) {
        match *self {
            Substitution::Shifted { col, .. } => row[col] += a,
            Substitution::Mirrored { col, .. } => row[col] -= a,
            Substitution::Split { pos, neg } => {
                row[pos] += a;
                row[neg] -= a;
            }
        }
    }

    fn recover(&self, y: &[f64]) -> f64 {
        match *self {
            Substitution::Shifted { lower, col } => lower + y[col],
            Substitution::Mirrored { upper, col } => upper - y[col],
            Substitution::Split { pos, neg } => y[pos] - y[neg],
        }
    }
}

struct Tableau {
    /// Constraint rows; the last entry of each row is the right-hand side.
    rows: Vec<Vec<f64>>,
    basis: Vec<usize>,
    cols: usize,
    iterations: usize,
}

impl Tableau {
    fn rhs(&self, i: usize) -> f64 {
        self.rows[i][self.cols]
    }

    fn reduced_cost(&self, cost: &[f64], j: usize) -> f64 {
        let mut d = cost[j];
        for (i, row) in self.rows.iter().enumerate() {
            d -= cost[self.basis[i]] * row[j];
        }
        d
    }

    fn pivot(&mut self, r: usize, c: usize) {
        let p = self.rows[r][c];
        for v in self.rows[r].iter_mut() {
            *v /= p;
        }
        let pivot_row = self.rows[r].clone();
        for (i, row) in self.rows.iter_mut().enumerate() {
            if i == r {
                continue;
            }
            let factor = row[c];
            if factor != 0.0 {
                for (v, pv) in row.iter_mut().zip(&pivot_row) {
                    *v -= factor * pv;
                }
            }
        }
        self.basis[r] = c;
    }

    /// Minimum-ratio row for entering column `c`, ties to the lowest basic index.
    fn leaving_row(&self, c: usize) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for i in 0..self.rows.len() {
            let a = self.rows[i][c];
            if a <= PIVOT_EPS {
                continue;
            }
            let ratio = self.rhs(i) / a;
            best = match best {
                None => Some((i, ratio)),
                Some((r, best_ratio)) => {
                    let tied = (ratio - best_ratio).abs() <= PIVOT_EPS;
                    if ratio < best_ratio - PIVOT_EPS || (tied && self.basis[i] < self.basis[r]) {
                        Some((i, ratio))
                    } else {
                        Some((r, best_ratio))
                    }
                }
            };
        }
        best.map(|(i, _)| i)
    }

    /// Minimizes `cost · z` over columns accepted by `allowed`.
    fn optimize<F>(
        &mut self,
        cost: &[f64],
        allowed: F,
        max_iterations: usize,
    ) -> Result<(), LpStatus>
    where
        F: Fn(usize) -> bool,
    {
        loop {
            let entering = (0..self.cols)
                .filter(|&j| allowed(j) && !self.basis.contains(&j))
                .find(|&j| self.reduced_cost(cost, j) < -PIVOT_EPS);
            let Some(c) = entering else {
                return Ok(());
            };
            let r = self.leaving_row(c).ok_or(LpStatus::Unbounded)?;
            if self.iterations >= max_iterations {
                return Err(LpStatus::IterationLimit);
            }
            self.iterations += 1;
            self.pivot(r, c);
        }
    }

    fn value_of(&self, cost: &[f64]) -> f64 {
        (0..self.rows.len())
            .map(|i| cost[self.basis[i]] * self.rhs(i))
            .sum()
    }
}

impl LpBackend for DenseSimplex {
    fn name(&self) -> &'static str {
        "dense-simplex"
    }

    fn solve(&self, lp: &StandardLp) -> LpSolution {
        let n = lp.cost.len();
        if lp.lower.len() != n || lp.upper.len() != n || lp.a.len() != lp.b.len() {
            return LpSolution::failed(LpStatus::Invalid, 0);
        }
        if lp.a.iter().any(|row| row.len() != n) {
            return LpSolution::failed(LpStatus::Invalid, 0);
        }

        // 1. Map every variable onto non-negative columns.
        let mut subs = Vec::with_capacity(n);
        let mut ny = 0usize;
        for j in 0..n {
            let (lo, hi) = (lp.lower[j], lp.upper[j]);
            let empty = lo > hi || lo == f64::INFINITY || hi == f64::NEG_INFINITY;
            if lo.is_nan() || hi.is_nan() || empty {
                return LpSolution::failed(LpStatus::Invalid, 0);
            }
            let sub = if lo.is_finite() {
                Substitution::Shifted { lower: lo, col: ny }
            } else if hi.is_finite() {
                Substitution::Mirrored { upper: hi, col: ny }
            } else {
                ny += 1;
                Substitution::Split { pos: ny - 1, neg: ny }
            };
            ny += 1;
            subs.push(sub);
        }

        // 2. Rewrite rows and add upper caps for shifted variables.
        let mut rows: Vec<Vec<f64>> = Vec::with_capacity(lp.a.len() + n);
        let mut rhs: Vec<f64> = Vec::with_capacity(lp.a.len() + n);
        for (a, &b) in lp.a.iter().zip(&lp.b) {
            let mut row = vec![0.0; ny];
            let mut bound = b;
            for (j, sub) in subs.iter().enumerate() {
                sub.scatter(a[j], &mut row);
                bound -= a[j] * sub.offset();
            }
            rows.push(row);
            rhs.push(bound);
        }
        for (j, sub) in subs.iter().enumerate() {
            if let Substitution::Shifted { lower, col } = *sub {
                if lp.upper[j].is_finite() {
                    let mut row = vec![0.0; ny];
                    row[col] = 1.0;
                    rows.push(row);
                    rhs.push(lp.upper[j] - lower);
                }
            }
        }

        let mut cost = vec![0.0; ny];
        for (j, sub) in subs.iter().enumerate() {
            sub.scatter(lp.cost[j], &mut cost);
        }

        // 3. Slack per row; artificial for rows with negative rhs.
        let m = rows.len();
        let artificial_rows: Vec<usize> = (0..m).filter(|&i| rhs[i] < 0.0).collect();
        let first_artificial = ny + m;
        let cols = first_artificial + artificial_rows.len();

        let mut tableau_rows = Vec::with_capacity(m);
        let mut basis = Vec::with_capacity(m);
        let mut next_artificial = first_artificial;
        for i in 0..m {
            let mut row = vec![0.0; cols + 1];
            row[..ny].copy_from_slice(&rows[i]);
            row[ny + i] = 1.0;
            row[cols] = rhs[i];
            if rhs[i] < 0.0 {
                for v in row.iter_mut() {
                    *v = -*v;
                }
                row[next_artificial] = 1.0;
                basis.push(next_artificial);
                next_artificial += 1;
            } else {
                basis.push(ny + i);
            }
            tableau_rows.push(row);
        }

        let mut tableau = Tableau {
            rows: tableau_rows,
            basis,
            cols,
            iterations: 0,
        };
        let is_artificial = |j: usize| j >= first_artificial;

        // 4. Phase 1.
        if !artificial_rows.is_empty() {
            let phase1: Vec<f64> = (0..cols)
                .map(|j| if is_artificial(j) { 1.0 } else { 0.0 })
                .collect();
            if let Err(status) = tableau.optimize(&phase1, |_| true, self.max_iterations) {
                return LpSolution::failed(status, tableau.iterations);
            }
            let residual = tableau.value_of(&phase1);
            trace!(residual, iterations = tableau.iterations, "phase 1 finished");
            if residual > self.feasibility_tolerance {
                return LpSolution::failed(LpStatus::Infeasible, tableau.iterations);
            }
            // Drive zero-valued artificials out of the basis where possible.
            for i in 0..m {
                if is_artificial(tableau.basis[i]) {
                    let pivot_col =
                        (0..first_artificial).find(|&j| tableau.rows[i][j].abs() > PIVOT_EPS);
                    if let Some(j) = pivot_col {
                        tableau.pivot(i, j);
                    }
                }
            }
        }

        // 5. Phase 2.
        let mut phase2 = vec![0.0; cols];
        phase2[..ny].copy_from_slice(&cost);
        if let Err(status) = tableau.optimize(&phase2, |j| !is_artificial(j), self.max_iterations) {
            return LpSolution::failed(status, tableau.iterations);
        }

        let mut y = vec![0.0; cols];
        for (i, &b) in tableau.basis.iter().enumerate() {
            y[b] = tableau.rhs(i);
        }
        let values: Vec<f64> = subs
            .iter()
            .enumerate()
            .map(|(j, sub)| sub.recover(&y).clamp(lp.lower[j], lp.upper[j]))
            .collect();
        let objective = lp.cost.iter().zip(&values).map(|(c, x)| c * x).sum();

        LpSolution {
            status: LpStatus::Optimal,
            values: Some(values),
            objective: Some(objective),
            iterations: tableau.iterations,
        }
    }
}
