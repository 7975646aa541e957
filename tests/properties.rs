//! Property tests: every optimizer stays in bounds and never loses its best.

use proptest::prelude::*;
use u_bizopt::ga::{GaConfig, GaRunner};
use u_bizopt::lp::{LinearProgramming, LpRequest};
use u_bizopt::pricing::{PricingOutcome, RewardFunction};
use u_bizopt::problem::{Bounds, OptimizationProblem};
use u_bizopt::pso::{PsoConfig, PsoRunner};
use u_bizopt::sa::{SaConfig, SaRunner};

fn bounds_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((-50.0f64..50.0, 0.0f64..20.0), 1..5)
        .prop_map(|v| v.into_iter().map(|(lo, width)| (lo, lo + width)).collect())
}

/// Rastrigin-like multimodal objective, shifted off-center.
fn rugged(bounds: Vec<(f64, f64)>) -> OptimizationProblem {
    OptimizationProblem::new(
        |x: &[f64]| {
            -x.iter()
                .map(|v| {
                    let d = v - 1.3;
                    d * d - 3.0 * (2.0 * std::f64::consts::PI * d).cos()
                })
                .sum::<f64>()
        },
        Bounds::new(bounds).unwrap(),
    )
}

fn non_decreasing(history: &[f64]) -> bool {
    history.windows(2).all(|w| w[1] >= w[0])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn ga_respects_bounds_and_tracks_best(
        bounds in bounds_strategy(),
        seed in any::<u64>(),
        generations in 1usize..15,
    ) {
        let problem = rugged(bounds);
        let config = GaConfig::default()
            .with_population_size(12)
            .with_max_generations(generations)
            .with_mutation_rate(0.5)
            .with_mutation_scale(1.0)
            .with_seed(seed);

        let result = GaRunner::run(&problem, &config).unwrap();

        prop_assert!(problem.bounds().contains(&result.best));
        prop_assert_eq!(result.fitness_history.len(), generations);
        prop_assert!(non_decreasing(&result.fitness_history));
    }

    #[test]
    fn sa_respects_bounds_and_tracks_best(
        bounds in bounds_strategy(),
        seed in any::<u64>(),
        step_scale in 0.0f64..3.0,
    ) {
        let problem = rugged(bounds.clone());
        // Start anywhere, including outside the box.
        let initial: Vec<f64> = bounds.iter().map(|(lo, hi)| lo - 5.0 + (hi - lo) * 1.5).collect();
        let config = SaConfig::default()
            .with_initial_temperature(50.0)
            .with_cooling_rate(0.9)
            .with_step_scale(step_scale)
            .with_seed(seed);

        let result = SaRunner::run(&problem, &initial, &config).unwrap();

        prop_assert!(problem.bounds().contains(&result.best));
        prop_assert!(non_decreasing(&result.fitness_history));
    }

    #[test]
    fn pso_respects_bounds_and_tracks_best(
        bounds in bounds_strategy(),
        seed in any::<u64>(),
        iterations in 1usize..20,
        inertia in 0.0f64..1.5,
    ) {
        let problem = rugged(bounds);
        let config = PsoConfig::default()
            .with_swarm_size(8)
            .with_max_iterations(iterations)
            .with_inertia(inertia)
            .with_seed(seed);

        let result = PsoRunner::run(&problem, &config).unwrap();

        prop_assert!(problem.bounds().contains(&result.best));
        prop_assert_eq!(result.fitness_history.len(), iterations + 1);
        prop_assert!(non_decreasing(&result.fitness_history));
    }

    #[test]
    fn lp_box_solution_sits_on_the_right_corner(
        columns in prop::collection::vec((-5.0f64..5.0, -10.0f64..10.0, 0.0f64..10.0), 1..6),
    ) {
        let objective: Vec<f64> = columns.iter().map(|(c, _, _)| *c).collect();
        let bounds: Vec<(f64, f64)> = columns.iter().map(|(_, lo, w)| (*lo, lo + w)).collect();

        let outcome = LinearProgramming::new()
            .solve(&LpRequest::maximize(objective.clone()).with_box_bounds(&bounds));

        prop_assert!(outcome.success);
        let x = outcome.optimal_vector.unwrap();
        for i in 0..objective.len() {
            let (lo, hi) = bounds[i];
            if objective[i] > 1e-9 {
                prop_assert!((x[i] - hi).abs() < 1e-7);
            } else if objective[i] < -1e-9 {
                prop_assert!((x[i] - lo).abs() < 1e-7);
            }
        }
    }

    #[test]
    fn reward_strictly_increasing_in_revenue(
        revenue in -1e4f64..1e4,
        delta in 1e-3f64..1e3,
        cost in 0.0f64..1e4,
        retention in 0.0f64..1.0,
        share in 0.0f64..1.0,
        competitor in 0.0f64..200.0,
        price in 0.0f64..200.0,
    ) {
        let reward = RewardFunction::default();
        let outcome = PricingOutcome {
            revenue,
            cost,
            retention_rate: retention,
            market_share: share,
            competitor_price: competitor,
            price: Some(price),
        };
        let higher = PricingOutcome { revenue: revenue + delta, ..outcome };
        prop_assert!(reward.reward(&higher) > reward.reward(&outcome));
    }
}
