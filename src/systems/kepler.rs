//! Kepler System: Analytically Solvable Reference
//!
//! Point mass at the origin with G·M = 1:
//!
//!   V(r) = −1/r,   du/dt = −x/r³,   dv/dt = −y/r³
//!
//! Circular orbits of this potential have a closed form, which makes the
//! system the yardstick for integrator accuracy (see
//! [`crate::integration::convergence`]).

use ndarray::{Array1, Array3};

use super::traits::{derivative_by_rows, HamiltonianSystem, Potential, VectorField};
use crate::error::{DynamicsError, DynamicsResult};
use crate::integration::{PhaseState, Trajectory, COMPONENTS};

/// Kepler point-mass potential
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kepler;

impl Kepler {
    pub fn new() -> Self {
        Self
    }

    /// Analytic circular motion through `initial`, sampled like an integrator run
    ///
    /// Each particle keeps its radius R₀ and rotates at ω = |v|/R₀, in the
    /// sense given by the sign of its angular momentum. Samples sit at
    /// `t0 + k·h` for `k = 1..=n_steps`.
    pub fn circular_orbit(
        &self,
        t0: f64,
        initial: &PhaseState,
        h: f64,
        n_steps: usize,
    ) -> DynamicsResult<Trajectory> {
        let n_particles = initial.n_particles();
        let mut orbits = Vec::with_capacity(n_particles);

        for j in 0..n_particles {
            let (x, y, u, v) = (initial.x()[j], initial.y()[j], initial.u()[j], initial.v()[j]);
            let radius = x.hypot(y);
            if radius == 0.0 || !radius.is_finite() {
                return Err(DynamicsError::InvalidParameter(format!(
                    "particle {} has no defined orbit radius (r = {})",
                    j, radius
                )));
            }
            let sense = if x * v - y * u < 0.0 { -1.0 } else { 1.0 };
            let omega = sense * u.hypot(v) / radius;
            orbits.push((radius, y.atan2(x), omega));
        }

        let times = Array1::from_iter((1..=n_steps).map(|k| t0 + k as f64 * h));
        let mut states = Array3::zeros((n_steps, n_particles, COMPONENTS));

        for (k, &t) in times.iter().enumerate() {
            let elapsed = t - t0;
            for (j, &(radius, phase, omega)) in orbits.iter().enumerate() {
                let angle = omega * elapsed + phase;
                let (sin, cos) = angle.sin_cos();
                states[[k, j, 0]] = radius * cos;
                states[[k, j, 1]] = radius * sin;
                states[[k, j, 2]] = -radius * omega * sin;
                states[[k, j, 3]] = radius * omega * cos;
            }
        }

        Trajectory::new(times, states)
    }
}

impl Potential for Kepler {
    fn value(&self, x: f64, y: f64) -> f64 {
        -1.0 / x.hypot(y)
    }
}

impl VectorField for Kepler {
    fn derivative(&self, _t: f64, state: &PhaseState) -> PhaseState {
        derivative_by_rows(state, |[x, y, u, v]| {
            let r = x.hypot(y);
            let r3 = r * r * r;
            [u, v, -x / r3, -y / r3]
        })
    }
}

impl HamiltonianSystem for Kepler {
    fn name(&self) -> &'static str {
        "Kepler"
    }

    fn escape_energy(&self) -> Option<f64> {
        Some(0.0)
    }
}
