//! Initial-Condition Sampler: particles at a fixed total energy
//!
//! Positions are drawn uniformly in a box and kept when V(x, y) ≤ E
//! (rejection sampling). Each accepted particle then gets the speed
//! √(2(E − V)) along a uniformly random direction, so its total energy is
//! exactly E.
//!
//! The rejection loop is bounded: after `n · max_attempts_per_particle`
//! draws without filling the population, sampling fails with
//! [`DynamicsError::SamplingExhausted`] instead of spinning forever.

use std::f64::consts::TAU;

use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DynamicsError, DynamicsResult};
use crate::integration::PhaseState;
use crate::systems::Potential;

/// Draw budget per requested particle
pub const DEFAULT_MAX_ATTEMPTS_PER_PARTICLE: usize = 10_000;

/// Initial offset between a particle and its twin
pub const DEFAULT_SEPARATION: f64 = 1e-7;

/// Rectangular region of the (x, y) plane positions are drawn from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingBox {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for SamplingBox {
    fn default() -> Self {
        Self {
            x_min: -1.0,
            x_max: 1.0,
            y_min: -0.5,
            y_max: 1.0,
        }
    }
}

impl SamplingBox {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> DynamicsResult<Self> {
        let bounds = Self {
            x_min,
            x_max,
            y_min,
            y_max,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Both ranges finite and non-degenerate
    pub fn validate(&self) -> DynamicsResult<()> {
        let ordered = |lo: f64, hi: f64| lo.is_finite() && hi.is_finite() && lo < hi;
        if !ordered(self.x_min, self.x_max) || !ordered(self.y_min, self.y_max) {
            return Err(DynamicsError::InvalidParameter(format!(
                "sampling box [{}, {}] × [{}, {}] is empty or unbounded",
                self.x_min, self.x_max, self.y_min, self.y_max
            )));
        }
        Ok(())
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
    }
}

/// A population and its perturbed copy
///
/// Both batches have the same size and identical velocities; each
/// perturbed position sits `separation` away from its reference.
#[derive(Debug, Clone)]
pub struct TwinPopulation {
    pub reference: PhaseState,
    pub perturbed: PhaseState,
}

impl TwinPopulation {
    /// Pair two populations of equal size
    pub fn new(reference: PhaseState, perturbed: PhaseState) -> DynamicsResult<Self> {
        if reference.n_particles() != perturbed.n_particles() {
            return Err(DynamicsError::InvalidParameter(format!(
                "twin populations differ in size: {} vs {}",
                reference.n_particles(),
                perturbed.n_particles()
            )));
        }
        Ok(Self {
            reference,
            perturbed,
        })
    }

    /// Offset every position by `separation` at an independent random angle
    pub fn perturb<R: Rng + ?Sized>(
        reference: PhaseState,
        separation: f64,
        rng: &mut R,
    ) -> DynamicsResult<Self> {
        if !(separation.is_finite() && separation >= 0.0) {
            return Err(DynamicsError::InvalidParameter(format!(
                "twin separation must be finite and non-negative, got {}",
                separation
            )));
        }

        let angle = full_turn()?;
        let mut perturbed = reference.clone();
        for mut row in perturbed.as_array_mut().rows_mut() {
            let alpha = angle.sample(rng);
            row[0] += separation * alpha.cos();
            row[1] += separation * alpha.sin();
        }

        Ok(Self {
            reference,
            perturbed,
        })
    }

    pub fn n_particles(&self) -> usize {
        self.reference.n_particles()
    }

    /// Twin pair `j` as its own population of one
    pub fn pair(&self, j: usize) -> TwinPopulation {
        TwinPopulation {
            reference: self.reference.particle(j),
            perturbed: self.perturbed.particle(j),
        }
    }
}

/// Rejection sampler for fixed-energy populations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergySampler {
    bounds: SamplingBox,
    max_attempts_per_particle: usize,
}

impl Default for EnergySampler {
    fn default() -> Self {
        Self {
            bounds: SamplingBox::default(),
            max_attempts_per_particle: DEFAULT_MAX_ATTEMPTS_PER_PARTICLE,
        }
    }
}

impl EnergySampler {
    /// Create a sampler
    ///
    /// # Arguments
    /// * `bounds` - Box the positions are drawn from
    /// * `max_attempts_per_particle` - Draw budget per requested particle (≥ 1)
    pub fn new(bounds: SamplingBox, max_attempts_per_particle: usize) -> DynamicsResult<Self> {
        bounds.validate()?;
        if max_attempts_per_particle == 0 {
            return Err(DynamicsError::InvalidParameter(
                "max_attempts_per_particle must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            bounds,
            max_attempts_per_particle,
        })
    }

    pub fn bounds(&self) -> &SamplingBox {
        &self.bounds
    }

    /// Draw `n` particles with total energy exactly `energy`
    pub fn sample<P, R>(
        &self,
        potential: &P,
        n: usize,
        energy: f64,
        rng: &mut R,
    ) -> DynamicsResult<PhaseState>
    where
        P: Potential + ?Sized,
        R: Rng + ?Sized,
    {
        if n == 0 {
            return Err(DynamicsError::InvalidParameter(
                "cannot sample an empty population".to_string(),
            ));
        }
        if !energy.is_finite() {
            return Err(DynamicsError::InvalidParameter(format!(
                "energy must be finite, got {}",
                energy
            )));
        }

        let ux = Uniform::new(self.bounds.x_min, self.bounds.x_max).map_err(uniform_error)?;
        let uy = Uniform::new(self.bounds.y_min, self.bounds.y_max).map_err(uniform_error)?;
        let budget = n.saturating_mul(self.max_attempts_per_particle);

        let mut xs = Vec::with_capacity(n);
        let mut ys = Vec::with_capacity(n);
        let mut pots = Vec::with_capacity(n);
        let mut attempts = 0;

        while xs.len() < n {
            if attempts >= budget {
                return Err(DynamicsError::SamplingExhausted {
                    energy,
                    requested: n,
                    accepted: xs.len(),
                    attempts,
                });
            }
            attempts += 1;

            let x = ux.sample(rng);
            let y = uy.sample(rng);
            let pot = potential.value(x, y);
            if pot <= energy {
                xs.push(x);
                ys.push(y);
                pots.push(pot);
            }
        }

        debug!(
            energy,
            n,
            attempts,
            acceptance = n as f64 / attempts as f64,
            "sampled positions"
        );

        let angle = full_turn()?;
        let mut us = Vec::with_capacity(n);
        let mut vs = Vec::with_capacity(n);
        for pot in pots {
            let speed = (2.0 * (energy - pot)).max(0.0).sqrt();
            let theta = angle.sample(rng);
            us.push(speed * theta.cos());
            vs.push(speed * theta.sin());
        }

        PhaseState::from_components(&xs, &ys, &us, &vs)
    }

    /// Draw `n` particles at `energy` plus their twins `separation` away
    pub fn sample_twins<P, R>(
        &self,
        potential: &P,
        n: usize,
        energy: f64,
        separation: f64,
        rng: &mut R,
    ) -> DynamicsResult<TwinPopulation>
    where
        P: Potential + ?Sized,
        R: Rng + ?Sized,
    {
        let reference = self.sample(potential, n, energy, rng)?;
        TwinPopulation::perturb(reference, separation, rng)
    }
}

/// One particle at `(x, y)` moving along `angle` with total energy `energy`
///
/// Fails when the position lies above the requested energy.
pub fn particle_at_energy<P: Potential + ?Sized>(
    potential: &P,
    x: f64,
    y: f64,
    energy: f64,
    angle: f64,
) -> DynamicsResult<PhaseState> {
    let pot = potential.value(x, y);
    if !(pot <= energy) {
        return Err(DynamicsError::InvalidParameter(format!(
            "position ({}, {}) has V = {} above E = {}",
            x, y, pot, energy
        )));
    }
    let speed = (2.0 * (energy - pot)).sqrt();
    Ok(PhaseState::single(x, y, speed * angle.cos(), speed * angle.sin()))
}

fn full_turn() -> DynamicsResult<Uniform<f64>> {
    Uniform::new(0.0, TAU).map_err(uniform_error)
}

fn uniform_error(err: rand::distr::uniform::Error) -> DynamicsError {
    DynamicsError::InvalidParameter(format!("uniform range: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::{energy, HenonHeiles};
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sample_respects_energy() {
        let mut rng = StdRng::seed_from_u64(7);
        let hh = HenonHeiles;
        let e = 1.0 / 12.0;
        let w = EnergySampler::default().sample(&hh, 200, e, &mut rng).unwrap();

        assert_eq!(w.n_particles(), 200);
        let pot = hh.evaluate(&w);
        let total = energy::total(&hh, &w);
        for j in 0..200 {
            assert!(pot[j] <= e, "particle {} above the energy surface", j);
            assert_abs_diff_eq!(total[j], e, epsilon = 1e-12);
            assert!(SamplingBox::default().contains(w.x()[j], w.y()[j]));
        }
    }

    #[test]
    fn test_sample_is_reproducible() {
        let sampler = EnergySampler::default();
        let a = sampler
            .sample(&HenonHeiles, 10, 0.1, &mut StdRng::seed_from_u64(3))
            .unwrap();
        let b = sampler
            .sample(&HenonHeiles, 10, 0.1, &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_exhaustion_is_bounded() {
        // V ≥ 0 near the origin, so a negative energy has no accessible points in a small box
        let bounds = SamplingBox::new(-0.1, 0.1, -0.1, 0.1).unwrap();
        let sampler = EnergySampler::new(bounds, 50).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        match sampler.sample(&HenonHeiles, 4, -0.5, &mut rng) {
            Err(DynamicsError::SamplingExhausted {
                requested,
                accepted,
                attempts,
                ..
            }) => {
                assert_eq!(requested, 4);
                assert_eq!(accepted, 0);
                assert_eq!(attempts, 200);
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let sampler = EnergySampler::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(sampler.sample(&HenonHeiles, 0, 0.1, &mut rng).is_err());
        assert!(sampler.sample(&HenonHeiles, 5, f64::NAN, &mut rng).is_err());
        assert!(SamplingBox::new(1.0, -1.0, 0.0, 1.0).is_err());
        assert!(EnergySampler::new(SamplingBox::default(), 0).is_err());
    }

    #[test]
    fn test_twins_offset_positions_only() {
        let mut rng = StdRng::seed_from_u64(11);
        let sep = 1e-3;
        let twins = EnergySampler::default()
            .sample_twins(&HenonHeiles, 50, 0.1, sep, &mut rng)
            .unwrap();

        assert_eq!(twins.n_particles(), 50);
        let (a, b) = (&twins.reference, &twins.perturbed);
        for j in 0..50 {
            let d = (b.x()[j] - a.x()[j]).hypot(b.y()[j] - a.y()[j]);
            assert_abs_diff_eq!(d, sep, epsilon = 1e-12);
            assert_eq!(a.u()[j], b.u()[j]);
            assert_eq!(a.v()[j], b.v()[j]);
        }
    }

    #[test]
    fn test_zero_separation_twins_are_identical() {
        let mut rng = StdRng::seed_from_u64(5);
        let twins = EnergySampler::default()
            .sample_twins(&HenonHeiles, 8, 0.05, 0.0, &mut rng)
            .unwrap();
        assert_eq!(twins.reference, twins.perturbed);
        assert!(TwinPopulation::perturb(twins.reference.clone(), -1.0, &mut rng).is_err());
    }

    #[test]
    fn test_particle_at_energy() {
        let w = particle_at_energy(&HenonHeiles, 0.0, 0.5, 0.125, 0.0).unwrap();
        assert_abs_diff_eq!(energy::total(&HenonHeiles, &w)[0], 0.125, epsilon = 1e-15);
        assert_eq!(w.v()[0], 0.0);
        assert!(w.u()[0] > 0.0);
        assert!(particle_at_energy(&HenonHeiles, 0.9, 0.9, 0.125, 0.0).is_err());
    }
}
