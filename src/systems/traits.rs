//! Hamiltonian System Traits: Standardized API for the Integration Pipeline
//!
//! Every potential studied here is a pure function of position, and its
//! dynamics is the first-order system obtained from the force law. The
//! traits below split those two views so that the sampler only needs a
//! [`Potential`] and the integrator only needs a [`VectorField`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  HamiltonianSystem Trait                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Potential                                                   │
//! │  + value(x, y)          - V at one position                  │
//! │  + evaluate(state)      - V per particle of a batch          │
//! │  + evaluate_grid(X, Y)  - V over a mesh grid                 │
//! │  VectorField                                                 │
//! │  + derivative(t, w)     - dw/dt, same batch shape as w       │
//! │  + name()               - Human-readable system name         │
//! │  + escape_energy()      - Energy above which orbits escape   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use ndarray::{Array1, Array2, Zip};

use crate::integration::PhaseState;

/// Time derivative of a batched phase-space state
///
/// Implementations must be pure: the same `(t, state)` always yields the
/// same derivative, and the returned batch has as many particles as the
/// input.
pub trait VectorField: Sync {
    fn derivative(&self, t: f64, state: &PhaseState) -> PhaseState;
}

/// Scalar potential over the plane
pub trait Potential: Sync {
    /// Potential at a single position
    fn value(&self, x: f64, y: f64) -> f64;

    /// Potential of every particle in a batch
    fn evaluate(&self, state: &PhaseState) -> Array1<f64> {
        Zip::from(state.x())
            .and(state.y())
            .map_collect(|&x, &y| self.value(x, y))
    }

    /// Potential over a mesh grid of matching shape
    fn evaluate_grid(&self, x: &Array2<f64>, y: &Array2<f64>) -> Array2<f64> {
        Zip::from(x).and(y).map_collect(|&x, &y| self.value(x, y))
    }
}

/// A potential together with the dynamics it generates
pub trait HamiltonianSystem: Potential + VectorField {
    /// Name used in logs and reports
    fn name(&self) -> &'static str;

    /// Energy above which bounded motion is no longer guaranteed (if known)
    fn escape_energy(&self) -> Option<f64> {
        None
    }
}

/// Adapter turning a closure into a [`VectorField`]
///
/// ```
/// use order_chaos_dynamics::{FieldFn, PhaseState, VectorField};
///
/// let frozen = FieldFn(|_t: f64, w: &PhaseState| w.zeros_like());
/// let w = PhaseState::single(1.0, 0.0, 0.0, 1.0);
/// assert!(frozen.derivative(0.0, &w).as_array().iter().all(|&d| d == 0.0));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FieldFn<F>(pub F);

impl<F> VectorField for FieldFn<F>
where
    F: Fn(f64, &PhaseState) -> PhaseState + Sync,
{
    fn derivative(&self, t: f64, state: &PhaseState) -> PhaseState {
        (self.0)(t, state)
    }
}

/// Fill a derivative row by row from a per-particle law
///
/// `law` receives `[x, y, u, v]` and returns `[dx, dy, du, dv]`.
pub(crate) fn derivative_by_rows<L>(state: &PhaseState, law: L) -> PhaseState
where
    L: Fn([f64; 4]) -> [f64; 4],
{
    let mut out = state.zeros_like();
    Zip::from(out.as_array_mut().rows_mut())
        .and(state.as_array().rows())
        .for_each(|mut d, w| {
            let rate = law([w[0], w[1], w[2], w[3]]);
            for (slot, value) in d.iter_mut().zip(rate) {
                *slot = value;
            }
        });
    out
}
