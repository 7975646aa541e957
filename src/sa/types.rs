//! Annealing trajectory state.

use crate::problem::Evaluation;

/// Working state of one annealing run.
///
/// The temperature only ever decreases. The best-ever solution is tracked
/// independently of which neighbors are accepted.
#[derive(Debug, Clone)]
pub struct AnnealingState {
    pub current_solution: Vec<f64>,
    pub current_fitness: f64,
    pub temperature: f64,
    pub best_solution: Vec<f64>,
    pub best_fitness: f64,
    pub best_feasible: bool,
}

impl AnnealingState {
    /// Starts a trajectory at `solution`.
    pub fn new(solution: Vec<f64>, eval: Evaluation, temperature: f64) -> Self {
        Self {
            best_solution: solution.clone(),
            best_fitness: eval.fitness,
            best_feasible: eval.feasible,
            current_solution: solution,
            current_fitness: eval.fitness,
            temperature,
        }
    }

    /// Moves the trajectory to `solution`, promoting it to best if it improves.
    pub fn accept(&mut self, solution: Vec<f64>, eval: Evaluation) {
        if eval.fitness > self.best_fitness || (eval.feasible && !self.best_feasible) {
            self.best_solution.clone_from(&solution);
            self.best_fitness = eval.fitness;
            self.best_feasible = eval.feasible;
        }
        self.current_solution = solution;
        self.current_fitness = eval.fitness;
    }
}
