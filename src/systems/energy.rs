//! Energies: kinetic, total, and drift along a trajectory
//!
//! Energies are per particle; a batch of N particles yields N values.

use ndarray::{Array1, Array2, Axis, Zip};

use super::traits::Potential;
use crate::integration::{PhaseState, Trajectory};

/// Kinetic energy ½(u² + v²) per particle
pub fn kinetic(state: &PhaseState) -> Array1<f64> {
    Zip::from(state.u())
        .and(state.v())
        .map_collect(|&u, &v| 0.5 * (u * u + v * v))
}

/// Total energy V(x, y) + ½(u² + v²) per particle
pub fn total<P: Potential + ?Sized>(potential: &P, state: &PhaseState) -> Array1<f64> {
    potential.evaluate(state) + kinetic(state)
}

/// Relative energy drift |E(t) − E₀| / |E₀| at every trajectory sample
///
/// Shape `(n_steps, n_particles)`. Particles starting at exactly zero
/// energy report the absolute drift instead.
pub fn energy_drift<P: Potential + ?Sized>(
    potential: &P,
    initial: &PhaseState,
    trajectory: &Trajectory,
) -> Array2<f64> {
    let e0 = total(potential, initial);
    let mut drift = Array2::zeros((trajectory.len(), trajectory.n_particles()));

    for (k, row) in drift.axis_iter_mut(Axis(0)).enumerate() {
        let e = total(potential, &trajectory.state_at(k));
        Zip::from(row)
            .and(&e)
            .and(&e0)
            .for_each(|d, &e, &e0| {
                let scale = if e0 == 0.0 { 1.0 } else { e0.abs() };
                *d = (e - e0).abs() / scale;
            });
    }

    drift
}
