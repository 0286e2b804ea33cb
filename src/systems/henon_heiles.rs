//! Hénon-Heiles System: Non-integrable Galactic Potential
//!
//! The Hénon-Heiles potential is:
//!
//!   V(x, y) = ½(x² + y² + 2x²y − ⅔y³)
//!
//! with equations of motion
//!
//!   dx/dt = u,   du/dt = −(2xy + x)
//!   dy/dt = v,   dv/dt = −(x² − y² + y)
//!
//! ## Order-to-Chaos Transition
//!
//! Bounded motion exists for E < 1/6 (the saddle height). As E rises:
//! - E ≲ 1/12: almost every orbit is regular (invariant tori)
//! - E → 1/6: the chaotic sea fills most of the accessible region
//!
//! ## References
//!
//! - Hénon, M. & Heiles, C. (1964). The applicability of the third integral
//!   of motion: some numerical experiments. AJ 69, 73.

use super::traits::{derivative_by_rows, HamiltonianSystem, Potential, VectorField};
use crate::integration::PhaseState;

/// Height of the three saddles bounding the central triangle
pub const ESCAPE_ENERGY: f64 = 1.0 / 6.0;

/// The Hénon-Heiles potential and its dynamics
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HenonHeiles;

impl HenonHeiles {
    pub fn new() -> Self {
        Self
    }

    /// Force `(−∂V/∂x, −∂V/∂y)` at one position
    pub fn force(&self, x: f64, y: f64) -> (f64, f64) {
        (-(2.0 * x * y + x), -(x * x - y * y + y))
    }
}

impl Potential for HenonHeiles {
    fn value(&self, x: f64, y: f64) -> f64 {
        (x * x + y * y + 2.0 * x * x * y - 2.0 * y.powi(3) / 3.0) / 2.0
    }
}

impl VectorField for HenonHeiles {
    fn derivative(&self, _t: f64, state: &PhaseState) -> PhaseState {
        derivative_by_rows(state, |[x, y, u, v]| {
            let (du, dv) = self.force(x, y);
            [u, v, du, dv]
        })
    }
}

impl HamiltonianSystem for HenonHeiles {
    fn name(&self) -> &'static str {
        "Hénon-Heiles"
    }

    fn escape_energy(&self) -> Option<f64> {
        Some(ESCAPE_ENERGY)
    }
}
