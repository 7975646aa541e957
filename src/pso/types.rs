//! Particle representation.

use super::config::PsoConfig;
use crate::problem::{Bounds, Evaluation};
use rand::Rng;

/// A single particle in the swarm.
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec<f64>,
    pub velocity: Vec<f64>,
    /// Evaluation of the current position.
    pub current: Evaluation,
    pub best_position: Vec<f64>,
    pub best_fitness: f64,
    pub best_feasible: bool,
}

impl Particle {
    /// Spawns a particle uniformly within `bounds` with velocity drawn from
    /// `±velocity_scale * range` per dimension. The particle is unevaluated.
    pub fn spawn<R: Rng>(bounds: &Bounds, velocity_scale: f64, rng: &mut R) -> Self {
        let position = bounds.sample_uniform(rng);
        let velocity = (0..bounds.dimension())
            .map(|i| {
                let v_max = velocity_scale * bounds.range(i);
                if v_max > 0.0 {
                    rng.random_range(-v_max..=v_max)
                } else {
                    0.0
                }
            })
            .collect();
        Self {
            best_position: position.clone(),
            position,
            velocity,
            current: Evaluation::rejected(),
            best_fitness: f64::NEG_INFINITY,
            best_feasible: false,
        }
    }

    /// Applies one velocity and position update toward `global_best`.
    ///
    /// Draws `r1` and `r2` once for the whole particle. The position is
    /// clamped to `bounds`; the velocity is left as computed, so a particle
    /// pinned at a bound keeps its momentum.
    pub fn advance<R: Rng>(
        &mut self,
        bounds: &Bounds,
        global_best: &[f64],
        config: &PsoConfig,
        inertia: f64,
        rng: &mut R,
    ) {
        let r1: f64 = rng.random_range(0.0..1.0);
        let r2: f64 = rng.random_range(0.0..1.0);
        for i in 0..self.position.len() {
            let x = self.position[i];
            self.velocity[i] = inertia * self.velocity[i]
                + config.cognitive_coeff * r1 * (self.best_position[i] - x)
                + config.social_coeff * r2 * (global_best[i] - x);
            self.position[i] = bounds.clamp_value(i, x + self.velocity[i]);
        }
    }

    /// Records `eval` for the current position and updates the personal best.
    ///
    /// Returns `true` if the personal best changed.
    pub fn observe(&mut self, eval: Evaluation) -> bool {
        self.current = eval;
        if eval.fitness > self.best_fitness || (eval.feasible && !self.best_feasible) {
            self.best_position.clone_from(&self.position);
            self.best_fitness = eval.fitness;
            self.best_feasible = eval.feasible;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[test]
    fn test_spawn_within_bounds() {
        let mut rng = create_rng(42);
        let bounds = Bounds::new(vec![(0.0, 10.0), (-1.0, 1.0)]).unwrap();
        for _ in 0..100 {
            let p = Particle::spawn(&bounds, 0.1, &mut rng);
            assert!(bounds.contains(&p.position));
            assert!(p.velocity[0].abs() <= 1.0);
            assert!(p.velocity[1].abs() <= 0.2);
        }
    }

    #[test]
    fn test_spawn_degenerate_range() {
        let mut rng = create_rng(1);
        let bounds = Bounds::new(vec![(3.0, 3.0)]).unwrap();
        let p = Particle::spawn(&bounds, 0.1, &mut rng);
        assert_eq!(p.position, vec![3.0]);
        assert_eq!(p.velocity, vec![0.0]);
    }

    #[test]
    fn test_observe_tracks_personal_best() {
        let mut rng = create_rng(1);
        let bounds = Bounds::uniform(1, 0.0, 10.0).unwrap();
        let mut p = Particle::spawn(&bounds, 0.1, &mut rng);

        p.position = vec![2.0];
        assert!(p.observe(Evaluation { fitness: -9.0, feasible: true }));

        p.position = vec![8.0];
        assert!(!p.observe(Evaluation { fitness: -20.0, feasible: true }));
        assert_eq!(p.best_position, vec![2.0]);

        p.position = vec![4.0];
        assert!(p.observe(Evaluation { fitness: -1.0, feasible: true }));
        assert_eq!(p.best_position, vec![4.0]);
    }

    #[test]
    fn test_observe_infeasible_first_then_feasible() {
        let mut rng = create_rng(1);
        let bounds = Bounds::uniform(1, 0.0, 10.0).unwrap();
        let mut p = Particle::spawn(&bounds, 0.1, &mut rng);

        assert!(!p.observe(Evaluation::rejected()));
        assert!(!p.best_feasible);
        assert!(p.observe(Evaluation { fitness: -50.0, feasible: true }));
        assert!(p.best_feasible);
    }

    #[test]
    fn test_velocity_survives_bound_hit() {
        let mut rng = create_rng(5);
        let bounds = Bounds::uniform(1, 0.0, 10.0).unwrap();
        let config = PsoConfig::default();
        let mut p = Particle::spawn(&bounds, 0.1, &mut rng);
        p.position = vec![9.5];
        p.best_position = vec![9.5];
        p.velocity = vec![50.0];
        let global = [9.5];

        // Both attractions are zero, so the velocity is pure momentum.
        p.advance(&bounds, &global, &config, 1.0, &mut rng);
        assert_eq!(p.position, vec![10.0]);
        assert_eq!(p.velocity, vec![50.0]);

        // Still pushing outward: stays pinned, momentum barely reduced.
        p.advance(&bounds, &global, &config, 1.0, &mut rng);
        assert_eq!(p.position, vec![10.0]);
        assert!(p.velocity[0] >= 48.5, "velocity {}", p.velocity[0]);
        assert!(bounds.contains(&p.position));

        // Without inertia the attractions pull it straight back inside.
        p.advance(&bounds, &global, &config, 0.0, &mut rng);
        assert!(p.velocity[0] <= 0.0);
        assert!(p.position[0] >= 8.5 && p.position[0] <= 10.0);
    }
}
