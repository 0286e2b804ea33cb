//! Chaos Module: Order/Chaos Indicators
//!
//! ## Twin Divergence
//!
//! Every sampled particle is paired with a twin displaced by d ≈ 1e-7. The
//! summed squared separation μ over the end of the run tells the two
//! regimes apart:
//!
//!   μ < μ_c  →  regular (quasi-periodic, twins stay together)
//!   μ ≥ μ_c  →  chaotic (twins separate exponentially)
//!
//! ## Regular Area
//!
//! The share of regular particles at fixed energy approximates the measure
//! of the regular region of phase space. For Hénon–Heiles it stays near 1
//! below E ≈ 1/9 and collapses toward the escape energy 1/6.
//!
//! ## 0-1 Test
//!
//! Single-orbit indicator from the growth rate of a translation driven by
//! one coordinate (Gottwald & Melbourne, 2004).

mod divergence;
mod area;
mod zero_one;

pub use divergence::{
    ClassifierSettings,
    DivergenceClassifier,
    Execution,
    OrbitClass,
    SeparationMeasures,
    SeparationWindow,
    DEFAULT_CRITICAL_MU,
    DEFAULT_TRAILING_WINDOW,
    UNSTABLE_MU,
};
pub use area::{regular_fraction, EnergyRun, RegularAreaScan};
pub use zero_one::{
    cumulative_trapezoid,
    mean_square_displacement,
    Translation,
    ZeroOneTest,
    DEFAULT_FREQUENCY,
};
