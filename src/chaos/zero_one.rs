//! Gottwald–Melbourne 0-1 Test for Chaos
//!
//! A scalar observable x(t) drives a planar translation
//!
//!   θ(t) = c·t + ∫₀ᵗ x(s) ds
//!   p(t) = ∫₀ᵗ x(s) cos θ(s) ds
//!
//! Regular dynamics keep p bounded; chaotic dynamics make p diffuse. The
//! growth rate K of the mean-square displacement
//!
//!   M(n) = ⟨(p(j + n) − p(j))²⟩_j,  n = 1..⌊L/10⌋
//!
//! is the least-squares slope of ln(M(n) + 1) against ln n: K ≈ 0 for
//! regular and K ≈ 1 for chaotic signals.

use ndarray::{Array1, ArrayView1};

use crate::error::{DynamicsError, DynamicsResult};
use crate::integration::convergence::least_squares_slope;

/// Default frequency c of the driving rotation
pub const DEFAULT_FREQUENCY: f64 = 1.7;

/// Cumulative trapezoidal integral of `y` over `t`, starting from 0
///
/// The result has the same length as the input.
pub fn cumulative_trapezoid(y: ArrayView1<'_, f64>, t: ArrayView1<'_, f64>) -> Array1<f64> {
    let n = y.len().min(t.len());
    let mut out = Array1::zeros(n);
    for i in 1..n {
        out[i] = out[i - 1] + 0.5 * (y[i] + y[i - 1]) * (t[i] - t[i - 1]);
    }
    out
}

/// Translation variables of the 0-1 test
#[derive(Debug, Clone)]
pub struct Translation {
    pub theta: Array1<f64>,
    pub p: Array1<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZeroOneTest {
    frequency: f64,
}

impl Default for ZeroOneTest {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_FREQUENCY,
        }
    }
}

impl ZeroOneTest {
    pub fn new(frequency: f64) -> DynamicsResult<Self> {
        if !frequency.is_finite() {
            return Err(DynamicsError::InvalidParameter(format!(
                "0-1 test frequency must be finite, got {}",
                frequency
            )));
        }
        Ok(Self { frequency })
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// θ and p along the signal
    pub fn translation(
        &self,
        x: ArrayView1<'_, f64>,
        t: ArrayView1<'_, f64>,
    ) -> DynamicsResult<Translation> {
        if x.len() != t.len() {
            return Err(DynamicsError::InvalidParameter(format!(
                "signal has {} samples but {} time stamps",
                x.len(),
                t.len()
            )));
        }

        let theta = &t.mapv(|s| self.frequency * s) + &cumulative_trapezoid(x, t);
        let drive = &x * &theta.mapv(f64::cos);
        let p = cumulative_trapezoid(drive.view(), t);
        Ok(Translation { theta, p })
    }

    /// Growth rate K of the signal `x` sampled at times `t`
    pub fn growth_rate(&self, x: ArrayView1<'_, f64>, t: ArrayView1<'_, f64>) -> DynamicsResult<f64> {
        let translation = self.translation(x, t)?;
        let msd = mean_square_displacement(translation.p.view());
        if msd.len() < 2 {
            return Err(DynamicsError::InvalidParameter(format!(
                "0-1 test needs at least 20 samples, got {}",
                x.len()
            )));
        }

        let points: Vec<(f64, f64)> = msd
            .iter()
            .enumerate()
            .map(|(k, m)| (((k + 1) as f64).ln(), (m + 1.0).ln()))
            .collect();
        Ok(least_squares_slope(&points))
    }
}

/// M(n) for n = 1..⌊L/10⌋, entry `n − 1` holding M(n)
pub fn mean_square_displacement(p: ArrayView1<'_, f64>) -> Array1<f64> {
    let len = p.len();
    let n_max = len / 10;

    Array1::from_shape_fn(n_max, |k| {
        let n = k + 1;
        let span = len - n;
        let total: f64 = (0..span).map(|j| (p[j + n] - p[j]).powi(2)).sum();
        total / span as f64
    })
}
