//! Real-valued genetic operators.
//!
//! # Crossover
//!
//! - [`uniform_crossover`]: each gene swapped between the two children
//!   independently with probability 0.5 (Syswerda, 1989)
//!
//! # Mutation
//!
//! - [`gaussian_mutation`]: per-gene Gaussian perturbation scaled to the
//!   gene's bound range, followed by clamping
//!
//! # References
//!
//! - Syswerda (1989), "Uniform Crossover in Genetic Algorithms"
//! - Bäck (1996), *Evolutionary Algorithms in Theory and Practice*

use crate::problem::Bounds;
use rand::Rng;
use rand_distr::StandardNormal;

/// Uniform crossover for real-valued chromosomes.
///
/// Returns two children. At every locus the children either inherit the
/// parents' genes in order or swapped, with equal probability.
///
/// # Panics
/// Panics if parents have different lengths.
pub fn uniform_crossover<R: Rng>(
    parent1: &[f64],
    parent2: &[f64],
    rng: &mut R,
) -> (Vec<f64>, Vec<f64>) {
    assert_eq!(
        parent1.len(),
        parent2.len(),
        "parents must have equal length"
    );

    let mut child1 = parent1.to_vec();
    let mut child2 = parent2.to_vec();
    for i in 0..child1.len() {
        if rng.random_bool(0.5) {
            std::mem::swap(&mut child1[i], &mut child2[i]);
        }
    }
    (child1, child2)
}

/// Gaussian mutation.
///
/// Each gene is perturbed with probability `rate` by `N(0, (scale * range)^2)`
/// where `range` is the gene's bound width, then clamped into bounds.
///
/// Returns the number of genes that were perturbed.
pub fn gaussian_mutation<R: Rng>(
    genes: &mut [f64],
    bounds: &Bounds,
    rate: f64,
    scale: f64,
    rng: &mut R,
) -> usize {
    let mut mutated = 0;
    for (i, gene) in genes.iter_mut().enumerate() {
        if rng.random_range(0.0..1.0) < rate {
            let z: f64 = rng.sample(StandardNormal);
            *gene = bounds.clamp_value(i, *gene + z * scale * bounds.range(i));
            mutated += 1;
        }
    }
    mutated
}
