//! Fixed-Step Integrator
//!
//! Drives a [`Stepper`] for exactly `n` steps of size `h`. The output
//! trajectory holds the `n` states after each step (the initial state is
//! not repeated) and the time stamps `t0 + k·h`, `k = 1..=n`.
//!
//! There is no step-size control and no error estimate. A run that leaves
//! the finite numbers keeps going (NaN propagates), but the first step at
//! which that happens is recorded as an [`Instability`] and logged.

use ndarray::{Array1, Array3, Axis};
use tracing::{debug, warn};

use super::schemes::{Scheme, Stepper};
use super::state::{Instability, PhaseState, Trajectory, COMPONENTS};
use crate::error::{DynamicsError, DynamicsResult};
use crate::systems::VectorField;

/// End point of a streamed integration
#[derive(Debug, Clone)]
pub struct Propagation {
    /// State after the last step
    pub final_state: PhaseState,
    /// Time stamp of the last step
    pub final_time: f64,
    /// First non-finite step, if any
    pub instability: Option<Instability>,
}

/// Explicit integrator with a fixed step size
#[derive(Debug, Clone, Copy)]
pub struct FixedStepIntegrator<S = Scheme> {
    scheme: S,
    step_size: f64,
}

impl<S: Stepper> FixedStepIntegrator<S> {
    /// Create an integrator
    ///
    /// # Arguments
    /// * `scheme` - One-step scheme (e.g. [`Scheme::Rk4`])
    /// * `step_size` - Fixed step h (finite, > 0)
    pub fn new(scheme: S, step_size: f64) -> DynamicsResult<Self> {
        if !(step_size.is_finite() && step_size > 0.0) {
            return Err(DynamicsError::InvalidParameter(format!(
                "step size must be finite and positive, got {}",
                step_size
            )));
        }
        Ok(Self { scheme, step_size })
    }

    pub fn scheme(&self) -> &S {
        &self.scheme
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Advance one step from `(t, state)`
    pub fn step(&self, field: &dyn VectorField, t: f64, state: &PhaseState) -> PhaseState {
        self.scheme.step(field, t, state, self.step_size)
    }

    /// Integrate `n_steps` steps, handing every new state to `observe`
    ///
    /// `observe(k, t, state)` is called with `k = 0..n_steps` and
    /// `t = t0 + (k + 1)·h`. Nothing is stored, so this is the path to use
    /// when only a reduction of the trajectory is needed.
    pub fn propagate<O>(
        &self,
        field: &dyn VectorField,
        t0: f64,
        initial: &PhaseState,
        n_steps: usize,
        mut observe: O,
    ) -> Propagation
    where
        O: FnMut(usize, f64, &PhaseState),
    {
        let h = self.step_size;
        let mut state = initial.clone();
        let mut t_prev = t0;
        let mut instability = None;

        for k in 0..n_steps {
            state = self.scheme.step(field, t_prev, &state, h);
            let t = t0 + (k + 1) as f64 * h;

            if instability.is_none() && !state.is_finite() {
                let event = Instability {
                    step: k,
                    time: t,
                    particles: state.non_finite_particles(),
                };
                warn!(
                    scheme = self.scheme.name(),
                    step = event.step,
                    time = event.time,
                    particles = event.particles,
                    "integration left the finite numbers"
                );
                instability = Some(event);
            }

            observe(k, t, &state);
            t_prev = t;
        }

        Propagation {
            final_state: state,
            final_time: t_prev,
            instability,
        }
    }

    /// Integrate `n_steps` steps and keep every state
    pub fn integrate(
        &self,
        field: &dyn VectorField,
        t0: f64,
        initial: &PhaseState,
        n_steps: usize,
    ) -> Trajectory {
        debug!(
            scheme = self.scheme.name(),
            h = self.step_size,
            n_steps,
            n_particles = initial.n_particles(),
            "integrating"
        );

        let mut times = Array1::zeros(n_steps);
        let mut states = Array3::zeros((n_steps, initial.n_particles(), COMPONENTS));

        let end = self.propagate(field, t0, initial, n_steps, |k, t, state| {
            times[k] = t;
            states.index_axis_mut(Axis(0), k).assign(&state.as_array());
        });

        Trajectory::from_parts(times, states, end.instability)
    }
}
