//! Budget allocation formatting.

use crate::error::{OptimError, Result};
use crate::problem::Bounds;
use crate::strategy::OptimizationReport;

/// Amount assigned to one named line item.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Allocation {
    pub name: String,
    pub amount: f64,
}

/// Allocation rows plus totals, ready for display.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BudgetPlan {
    pub allocations: Vec<Allocation>,
    pub total: f64,
    /// Objective value reported by the optimizer.
    pub expected_value: f64,
    /// Whether the optimizer's vector satisfied the constraint.
    pub feasible: bool,
}

impl BudgetPlan {
    /// Share of the total going to `name`, in `[0, 1]`.
    pub fn share(&self, name: &str) -> Option<f64> {
        let row = self.allocations.iter().find(|a| a.name == name)?;
        if self.total > 0.0 {
            Some(row.amount / self.total)
        } else {
            Some(0.0)
        }
    }
}

/// Maps optimizer vectors onto named budget lines.
///
/// # Examples
///
/// ```
/// use u_bizopt::allocation::BudgetAllocator;
///
/// let allocator = BudgetAllocator::new(vec!["search", "social"]);
/// let (bounds, _) = allocator.uniform_bounds(0.0, 1000.0).unwrap();
/// assert_eq!(bounds.dimension(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct BudgetAllocator {
    items: Vec<String>,
}

impl BudgetAllocator {
    pub fn new<S: Into<String>>(items: Vec<S>) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Same `[min, max]` range for every line, with the item names.
    pub fn uniform_bounds(&self, min: f64, max: f64) -> Result<(Bounds, &[String])> {
        Ok((Bounds::uniform(self.items.len(), min, max)?, &self.items))
    }

    /// Pairs each coordinate of the report's best vector with its line item.
    pub fn allocate(&self, report: &OptimizationReport) -> Result<BudgetPlan> {
        if report.best_vector.len() != self.items.len() {
            return Err(OptimError::DimensionMismatch {
                expected: self.items.len(),
                actual: report.best_vector.len(),
            });
        }
        let allocations: Vec<Allocation> = self
            .items
            .iter()
            .zip(&report.best_vector)
            .map(|(name, &amount)| Allocation {
                name: name.clone(),
                amount,
            })
            .collect();
        let total = allocations.iter().map(|a| a.amount).sum();
        Ok(BudgetPlan {
            allocations,
            total,
            expected_value: report.best_fitness,
            feasible: report.feasible,
        })
    }
}
