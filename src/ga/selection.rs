//! Selection strategies for the GA.
//!
//! Selection determines which individuals enter the mating pool.
//! Different strategies provide different selection pressure.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Baker (1985), "Adaptive Selection Methods for Genetic Algorithms"

use super::types::Individual;
use rand::Rng;

/// Selection strategy for choosing parents.
///
/// All strategies assume **maximization** (higher fitness = better).
/// Infeasible individuals carry `-inf` fitness and lose every comparison
/// against a feasible one, but can still be picked when a tournament
/// contains only infeasible competitors.
///
/// # Examples
///
/// ```
/// use u_bizopt::ga::Selection;
///
/// // Tournament with size 3 (the default)
/// let sel = Selection::default();
/// assert_eq!(sel, Selection::Tournament(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Tournament selection: pick `k` individuals at random (with
    /// replacement), select the best.
    ///
    /// - k=2: light pressure (good for diversity)
    /// - k=3-5: moderate pressure (typical default)
    /// - k>5: strong pressure (risk of premature convergence)
    Tournament(usize),

    /// Linear rank-based selection.
    ///
    /// Selection probability is proportional to rank, not raw fitness,
    /// so `-inf` fitness values do not distort the distribution.
    Rank,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(3)
    }
}

impl Selection {
    /// Select a parent index from the population.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn select<R: Rng>(&self, population: &[Individual], rng: &mut R) -> usize {
        assert!(
            !population.is_empty(),
            "cannot select from empty population"
        );

        match self {
            Selection::Tournament(k) => tournament(population, *k, rng),
            Selection::Rank => rank(population, rng),
        }
    }
}

/// Tournament selection: pick k random individuals, return best.
fn tournament<R: Rng>(population: &[Individual], k: usize, rng: &mut R) -> usize {
    let k = k.max(1);
    let n = population.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if population[idx].fitness > population[best_idx].fitness {
            best_idx = idx;
        }
    }
    best_idx
}

/// Rank-based selection using linear ranking.
///
/// Individuals are sorted by fitness (best first); rank 0 gets weight `n`,
/// the worst gets weight 1.
fn rank<R: Rng>(population: &[Individual], rng: &mut R) -> usize {
    let n = population.len();
    if n == 1 {
        return 0;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| population[b].fitness.total_cmp(&population[a].fitness));

    let total = (n * (n + 1)) as f64 / 2.0;
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;

    for (rank, &idx) in order.iter().enumerate() {
        cumulative += (n - rank) as f64;
        if cumulative > threshold {
            return idx;
        }
    }

    order[n - 1] // floating-point fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn make_population(fitnesses: &[f64]) -> Vec<Individual> {
        fitnesses
            .iter()
            .map(|&f| Individual {
                genes: vec![f],
                fitness: f,
                feasible: f.is_finite(),
            })
            .collect()
    }

    #[test]
    fn test_tournament_favors_best() {
        let pop = make_population(&[10.0, 5.0, 100.0, 8.0]);
        let mut rng = create_rng(42);

        let mut counts = [0u32; 4];
        let n = 10000;
        for _ in 0..n {
            let idx = Selection::Tournament(4).select(&pop, &mut rng);
            counts[idx] += 1;
        }
        // Index 2 (fitness=100.0) should dominate
        let best_count = counts[2];
        assert!(
            best_count > 6000,
            "expected best to be selected >60% of the time, got {best_count}/{n}"
        );
    }

    #[test]
    fn test_tournament_size_1_is_random() {
        let pop = make_population(&[10.0, 5.0, 1.0, 8.0]);
        let mut rng = create_rng(42);

        let mut counts = [0u32; 4];
        for _ in 0..10000 {
            let idx = Selection::Tournament(1).select(&pop, &mut rng);
            counts[idx] += 1;
        }
        for &c in &counts {
            assert!(c > 1500, "expected uniform, got counts: {counts:?}");
        }
    }

    #[test]
    fn test_tournament_never_prefers_infeasible() {
        // The infeasible individual only wins when both draws pick it (~25%).
        let pop = make_population(&[f64::NEG_INFINITY, -1000.0]);
        let mut rng = create_rng(3);
        let mut infeasible_wins = 0;
        for _ in 0..10000 {
            if Selection::Tournament(2).select(&pop, &mut rng) == 0 {
                infeasible_wins += 1;
            }
        }
        assert!(
            (1500..3500).contains(&infeasible_wins),
            "expected ~2500 infeasible wins, got {infeasible_wins}"
        );
    }

    #[test]
    fn test_all_infeasible_still_selects() {
        let pop = make_population(&[f64::NEG_INFINITY; 5]);
        let mut rng = create_rng(9);
        for _ in 0..100 {
            let idx = Selection::Tournament(3).select(&pop, &mut rng);
            assert!(idx < 5);
            let idx = Selection::Rank.select(&pop, &mut rng);
            assert!(idx < 5);
        }
    }

    #[test]
    fn test_rank_favors_best() {
        let pop = make_population(&[1.0, 50.0, 100.0, 20.0]);
        let mut rng = create_rng(42);

        let mut counts = [0u32; 4];
        for _ in 0..10000 {
            let idx = Selection::Rank.select(&pop, &mut rng);
            counts[idx] += 1;
        }
        let best_count = counts[2];
        let worst_count = counts[0];
        assert!(
            best_count > worst_count,
            "best should be selected more: best={best_count}, worst={worst_count}"
        );
    }

    #[test]
    fn test_single_individual() {
        let pop = make_population(&[5.0]);
        let mut rng = create_rng(42);

        assert_eq!(Selection::Tournament(3).select(&pop, &mut rng), 0);
        assert_eq!(Selection::Rank.select(&pop, &mut rng), 0);
    }

    #[test]
    #[should_panic(expected = "cannot select from empty population")]
    fn test_empty_population_panics() {
        let pop: Vec<Individual> = vec![];
        let mut rng = create_rng(42);
        Selection::Tournament(3).select(&pop, &mut rng);
    }
}
