//! Property-based tests using proptest.
//!
//! Covers: energy sampler invariants, twin separation, Poincaré
//! interpolation bounds and ordering.

use ndarray::Array1;
use order_chaos_dynamics::sampling::EnergySampler;
use order_chaos_dynamics::sections::orbit_crossings;
use order_chaos_dynamics::systems::energy;
use order_chaos_dynamics::{HenonHeiles, PoincareSection, Potential};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Energy Sampler ───────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every sampled position is accessible and every particle sits exactly at E.
    #[test]
    fn sampled_particles_have_target_energy(
        energy in 0.005f64..0.1666,
        n in 1usize..40,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let sampler = EnergySampler::default();
        let state = sampler.sample(&HenonHeiles, n, energy, &mut rng).unwrap();

        prop_assert_eq!(state.n_particles(), n);
        let totals = energy::total(&HenonHeiles, &state);
        for j in 0..n {
            let (x, y) = (state.x()[j], state.y()[j]);
            prop_assert!(HenonHeiles.value(x, y) <= energy);
            prop_assert!(sampler.bounds().contains(x, y));
            prop_assert!((totals[j] - energy).abs() < 1e-12,
                "particle {} has E = {} instead of {}", j, totals[j], energy);
        }
    }

    /// Twins share velocities and sit exactly `d` apart in position.
    #[test]
    fn twins_are_separated_by_d(
        energy in 0.01f64..0.1666,
        separation in 1e-9f64..1e-3,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let twins = EnergySampler::default()
            .sample_twins(&HenonHeiles, 10, energy, separation, &mut rng)
            .unwrap();

        prop_assert_eq!(twins.reference.u(), twins.perturbed.u());
        prop_assert_eq!(twins.reference.v(), twins.perturbed.v());
        for d2 in twins.reference.squared_distance(&twins.perturbed).iter() {
            prop_assert!((d2.sqrt() - separation).abs() <= 1e-9 * separation + 1e-15);
        }
    }
}

// ── Poincaré Interpolation ───────────────────────────────────────────

proptest! {
    /// Interpolated points lie between their bracketing samples.
    #[test]
    fn crossings_lie_within_brackets(
        samples in prop::collection::vec((-1.0f64..1.0, -5.0f64..5.0, -5.0f64..5.0), 2..60),
    ) {
        let x = Array1::from_iter(samples.iter().map(|s| s.0));
        let y = Array1::from_iter(samples.iter().map(|s| s.1));
        let v = Array1::from_iter(samples.iter().map(|s| s.2));

        let mut section = PoincareSection::new();
        orbit_crossings(x.view(), y.view(), v.view(), &mut section);

        let brackets: Vec<usize> = (0..x.len() - 1).filter(|&i| x[i] * x[i + 1] < 0.0).collect();
        prop_assert_eq!(section.len(), brackets.len());

        for (&i, (y0, v0)) in brackets.iter().zip(section.points()) {
            let eps = 1e-12;
            prop_assert!(y0 >= y[i].min(y[i + 1]) - eps && y0 <= y[i].max(y[i + 1]) + eps);
            prop_assert!(v0 >= v[i].min(v[i + 1]) - eps && v0 <= v[i].max(v[i + 1]) + eps);
        }
    }

    /// Orbits that never change sign produce no points.
    #[test]
    fn one_sided_orbits_have_empty_sections(
        xs in prop::collection::vec(1e-6f64..2.0, 0..40),
        flip in any::<bool>(),
    ) {
        let sign = if flip { -1.0 } else { 1.0 };
        let x = Array1::from_iter(xs.iter().map(|v| sign * v));
        let y = Array1::zeros(x.len());

        let mut section = PoincareSection::new();
        orbit_crossings(x.view(), y.view(), y.view(), &mut section);
        prop_assert!(section.is_empty());
    }
}
