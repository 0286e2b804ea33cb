//! Integration Module: Fixed-Step Explicit ODE Integration
//!
//! Advances batched phase-space states through a [`VectorField`]:
//!
//! - **Schemes**: Euler, midpoint RK2 and classical RK4 as interchangeable
//!   [`Stepper`] strategies
//! - **Integrator**: exactly `n` steps of size `h`, either stored as a
//!   [`Trajectory`] or streamed to an observer
//! - **Convergence**: empirical order of each scheme against the Kepler
//!   circular orbit
//!
//! ## Data Layout
//!
//! A [`PhaseState`] is `(n_particles, 4)` with columns `x, y, u, v`; a
//! [`Trajectory`] is `(n_steps, n_particles, 4)`. One particle is a batch
//! of one, so every scheme handles one particle and a thousand the same way.
//!
//! [`VectorField`]: crate::systems::VectorField

mod state;
mod schemes;
mod integrator;
pub mod convergence;

pub use state::{Instability, PhaseState, Trajectory, COMPONENTS, U, V, X, Y};
pub use schemes::{ClassicalRk4, Euler, MidpointRk2, Scheme, Stepper};
pub use integrator::{FixedStepIntegrator, Propagation};
pub use convergence::{empirical_order, kepler_convergence, ConvergenceSample};
