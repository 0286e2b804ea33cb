//! Explicit One-Step Schemes
//!
//! Each scheme advances a batched state by one fixed step h:
//!
//! ```text
//! Euler     w ← w + h·k₁
//! RK2       k₂ = f(t + h/2, w + h/2·k₁)
//!           w ← w + h·k₂
//! RK4       k₂ = f(t + h/2, w + h/2·k₁)
//!           k₃ = f(t + h/2, w + h/2·k₂)
//!           k₄ = f(t + h,   w + h·k₃)
//!           w ← w + h·(k₁/6 + k₂/3 + k₃/3 + k₄/6)
//! ```
//!
//! with k₁ = f(t, w). The batch dimension rides along through the
//! arithmetic; none of the schemes look at how many particles they carry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DynamicsError;
use crate::integration::PhaseState;
use crate::systems::VectorField;

/// One capability: advance a state by one step of a vector field
pub trait Stepper: Send + Sync {
    /// Short name for logs and reports
    fn name(&self) -> &'static str;

    /// Global order of accuracy
    fn order(&self) -> u32;

    fn step(&self, field: &dyn VectorField, t: f64, state: &PhaseState, h: f64) -> PhaseState;
}

/// Forward Euler
#[derive(Debug, Clone, Copy, Default)]
pub struct Euler;

/// Midpoint Runge-Kutta (RK2)
#[derive(Debug, Clone, Copy, Default)]
pub struct MidpointRk2;

/// Classical Runge-Kutta (RK4)
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicalRk4;

impl Stepper for Euler {
    fn name(&self) -> &'static str {
        "euler"
    }

    fn order(&self) -> u32 {
        1
    }

    fn step(&self, field: &dyn VectorField, t: f64, state: &PhaseState, h: f64) -> PhaseState {
        let k1 = field.derivative(t, state);
        state.displaced(&k1, h)
    }
}

impl Stepper for MidpointRk2 {
    fn name(&self) -> &'static str {
        "rk2"
    }

    fn order(&self) -> u32 {
        2
    }

    fn step(&self, field: &dyn VectorField, t: f64, state: &PhaseState, h: f64) -> PhaseState {
        let k1 = field.derivative(t, state);
        let k2 = field.derivative(t + h / 2.0, &state.displaced(&k1, h / 2.0));
        state.displaced(&k2, h)
    }
}

impl Stepper for ClassicalRk4 {
    fn name(&self) -> &'static str {
        "rk4"
    }

    fn order(&self) -> u32 {
        4
    }

    fn step(&self, field: &dyn VectorField, t: f64, state: &PhaseState, h: f64) -> PhaseState {
        let k1 = field.derivative(t, state);
        let k2 = field.derivative(t + h / 2.0, &state.displaced(&k1, h / 2.0));
        let k3 = field.derivative(t + h / 2.0, &state.displaced(&k2, h / 2.0));
        let k4 = field.derivative(t + h, &state.displaced(&k3, h));

        let mut next = state.displaced(&k1, h / 6.0);
        next.accumulate(&k2, h / 3.0);
        next.accumulate(&k3, h / 3.0);
        next.accumulate(&k4, h / 6.0);
        next
    }
}

/// Caller-selectable scheme, e.g. from configuration or the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Euler,
    Rk2,
    #[default]
    Rk4,
}

impl Scheme {
    pub const ALL: [Scheme; 3] = [Scheme::Euler, Scheme::Rk2, Scheme::Rk4];

    fn stepper(&self) -> &'static dyn Stepper {
        match self {
            Scheme::Euler => &Euler,
            Scheme::Rk2 => &MidpointRk2,
            Scheme::Rk4 => &ClassicalRk4,
        }
    }
}

impl Stepper for Scheme {
    fn name(&self) -> &'static str {
        self.stepper().name()
    }

    fn order(&self) -> u32 {
        self.stepper().order()
    }

    fn step(&self, field: &dyn VectorField, t: f64, state: &PhaseState, h: f64) -> PhaseState {
        self.stepper().step(field, t, state, h)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Scheme {
    type Err = DynamicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euler" => Ok(Scheme::Euler),
            "rk2" | "midpoint" => Ok(Scheme::Rk2),
            "rk4" => Ok(Scheme::Rk4),
            other => Err(DynamicsError::InvalidParameter(format!(
                "unknown integration scheme '{}' (expected euler, rk2 or rk4)",
                other
            ))),
        }
    }
}
