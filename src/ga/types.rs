//! Individual representation for the GA.

use crate::problem::Evaluation;

/// A candidate solution in the GA population.
///
/// Genes are always kept inside the problem bounds. Fitness is `-inf`
/// until the individual has been evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    /// Real-valued genes, one per decision variable.
    pub genes: Vec<f64>,

    /// Objective value (higher is better), `-inf` when infeasible.
    pub fitness: f64,

    /// Whether the genes satisfy the constraint predicate.
    pub feasible: bool,
}

impl Individual {
    /// Creates an unevaluated individual.
    pub fn new(genes: Vec<f64>) -> Self {
        Self {
            genes,
            fitness: f64::NEG_INFINITY,
            feasible: false,
        }
    }

    /// Stores the result of an evaluation.
    pub fn set_evaluation(&mut self, eval: Evaluation) {
        self.fitness = eval.fitness;
        self.feasible = eval.feasible;
    }

    /// Whether this individual should replace `other` as best-so-far.
    ///
    /// A feasible candidate always beats an infeasible one; otherwise the
    /// higher fitness wins.
    pub fn is_better_than(&self, other: &Individual) -> bool {
        self.fitness > other.fitness || (self.feasible && !other.feasible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_unevaluated() {
        let ind = Individual::new(vec![1.0, 2.0]);
        assert_eq!(ind.fitness, f64::NEG_INFINITY);
        assert!(!ind.feasible);
    }

    #[test]
    fn test_better_than() {
        let mut a = Individual::new(vec![0.0]);
        let mut b = Individual::new(vec![0.0]);
        a.set_evaluation(Evaluation {
            fitness: 3.0,
            feasible: true,
        });
        b.set_evaluation(Evaluation {
            fitness: 1.0,
            feasible: true,
        });
        assert!(a.is_better_than(&b));
        assert!(!b.is_better_than(&a));
        assert!(!a.is_better_than(&a.clone()));
    }

    #[test]
    fn test_feasible_beats_rejected() {
        let rejected = Individual::new(vec![0.0]);
        let mut feasible = Individual::new(vec![0.0]);
        feasible.set_evaluation(Evaluation {
            fitness: f64::NEG_INFINITY,
            feasible: true,
        });
        assert!(feasible.is_better_than(&rejected));
    }
}
