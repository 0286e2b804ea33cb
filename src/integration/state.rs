//! Phase-space State and Trajectory Storage
//!
//! A phase state is always a batch: an `(n_particles, 4)` array whose
//! columns are the position `(x, y)` and the velocity `(u, v)`. A single
//! particle is a batch of one, so nothing downstream ever has to ask
//! whether it was handed a scalar or an array.
//!
//! ```text
//!            x      y      u      v
//!   p₀  [  x₀  ,  y₀  ,  u₀  ,  v₀  ]
//!   p₁  [  x₁  ,  y₁  ,  u₁  ,  v₁  ]
//!   …
//! ```

use ndarray::{array, s, Array1, Array2, Array3, ArrayView1, ArrayView2, Axis};

use crate::error::{DynamicsError, DynamicsResult};

/// Column of the x position
pub const X: usize = 0;
/// Column of the y position
pub const Y: usize = 1;
/// Column of the x velocity
pub const U: usize = 2;
/// Column of the y velocity
pub const V: usize = 3;
/// Number of phase-space components per particle
pub const COMPONENTS: usize = 4;

/// Batched phase-space state `[[x, y, u, v]; n_particles]`
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseState {
    coords: Array2<f64>,
}

impl PhaseState {
    /// One particle at `(x, y)` moving with `(u, v)`
    pub fn single(x: f64, y: f64, u: f64, v: f64) -> Self {
        Self {
            coords: array![[x, y, u, v]],
        }
    }

    /// Wrap an `(n_particles, 4)` array
    pub fn from_array(coords: Array2<f64>) -> DynamicsResult<Self> {
        if coords.ncols() != COMPONENTS {
            return Err(DynamicsError::InvalidParameter(format!(
                "phase state needs {} columns, got {}",
                COMPONENTS,
                coords.ncols()
            )));
        }
        if coords.nrows() == 0 {
            return Err(DynamicsError::InvalidParameter(
                "phase state needs at least one particle".to_string(),
            ));
        }
        Ok(Self { coords })
    }

    /// Assemble a batch from per-component columns
    pub fn from_components(x: &[f64], y: &[f64], u: &[f64], v: &[f64]) -> DynamicsResult<Self> {
        let n = x.len();
        if y.len() != n || u.len() != n || v.len() != n {
            return Err(DynamicsError::InvalidParameter(format!(
                "component lengths differ: x={}, y={}, u={}, v={}",
                n,
                y.len(),
                u.len(),
                v.len()
            )));
        }

        let mut coords = Array2::zeros((n, COMPONENTS));
        for (c, column) in [x, y, u, v].into_iter().enumerate() {
            coords.column_mut(c).assign(&ArrayView1::from(column));
        }
        Self::from_array(coords)
    }

    /// A state of the same batch size with every component zero
    pub fn zeros_like(&self) -> Self {
        Self {
            coords: Array2::zeros(self.coords.raw_dim()),
        }
    }

    /// Number of particles in the batch
    pub fn n_particles(&self) -> usize {
        self.coords.nrows()
    }

    pub fn x(&self) -> ArrayView1<'_, f64> {
        self.coords.column(X)
    }

    pub fn y(&self) -> ArrayView1<'_, f64> {
        self.coords.column(Y)
    }

    pub fn u(&self) -> ArrayView1<'_, f64> {
        self.coords.column(U)
    }

    pub fn v(&self) -> ArrayView1<'_, f64> {
        self.coords.column(V)
    }

    /// Raw `(n_particles, 4)` view
    pub fn as_array(&self) -> ArrayView2<'_, f64> {
        self.coords.view()
    }

    /// Mutable access for vector fields that fill a derivative in place
    pub fn as_array_mut(&mut self) -> &mut Array2<f64> {
        &mut self.coords
    }

    pub fn into_array(self) -> Array2<f64> {
        self.coords
    }

    /// Extract particle `j` as a batch of one
    pub fn particle(&self, j: usize) -> Self {
        Self {
            coords: self.coords.slice(s![j..j + 1, ..]).to_owned(),
        }
    }

    /// Particles `[start, end)` as a new batch
    pub fn particles(&self, start: usize, end: usize) -> Self {
        Self {
            coords: self.coords.slice(s![start..end, ..]).to_owned(),
        }
    }

    /// `self + scale · direction`
    pub fn displaced(&self, direction: &PhaseState, scale: f64) -> Self {
        let mut coords = self.coords.clone();
        coords.scaled_add(scale, &direction.coords);
        Self { coords }
    }

    /// In-place `self += scale · direction`
    pub fn accumulate(&mut self, direction: &PhaseState, scale: f64) {
        self.coords.scaled_add(scale, &direction.coords);
    }

    /// Stack two batches (`self` first)
    pub fn concat(&self, other: &PhaseState) -> Self {
        let n = self.n_particles();
        let mut coords = Array2::zeros((n + other.n_particles(), COMPONENTS));
        coords.slice_mut(s![..n, ..]).assign(&self.coords);
        coords.slice_mut(s![n.., ..]).assign(&other.coords);
        Self { coords }
    }

    /// Squared phase-space distance per particle between two equal-sized batches
    pub fn squared_distance(&self, other: &PhaseState) -> Array1<f64> {
        let diff = &self.coords - &other.coords;
        diff.map_axis(Axis(1), |row| row.iter().map(|d| d * d).sum())
    }

    /// True when every component of every particle is finite
    pub fn is_finite(&self) -> bool {
        self.coords.iter().all(|c| c.is_finite())
    }

    /// Number of particles carrying at least one NaN or infinite component
    pub fn non_finite_particles(&self) -> usize {
        self.coords
            .rows()
            .into_iter()
            .filter(|row| row.iter().any(|c| !c.is_finite()))
            .count()
    }
}

/// First step at which a trajectory left the finite numbers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instability {
    /// Index into the trajectory (0 is the first integrated step)
    pub step: usize,
    /// Time stamp of that step
    pub time: f64,
    /// Particles with a non-finite component at that step
    pub particles: usize,
}

/// Time-indexed sequence of batched states produced by one integration run
///
/// The initial state is not part of the trajectory: sample `k` sits at
/// `t0 + (k + 1)·h`.
#[derive(Debug, Clone)]
pub struct Trajectory {
    times: Array1<f64>,
    states: Array3<f64>,
    instability: Option<Instability>,
}

impl Trajectory {
    /// Build from time stamps and an `(n_steps, n_particles, 4)` state array
    pub fn new(times: Array1<f64>, states: Array3<f64>) -> DynamicsResult<Self> {
        let (n_steps, _, components) = states.dim();
        if components != COMPONENTS {
            return Err(DynamicsError::InvalidParameter(format!(
                "trajectory states need {} components, got {}",
                COMPONENTS, components
            )));
        }
        if times.len() != n_steps {
            return Err(DynamicsError::InvalidParameter(format!(
                "{} time stamps for {} states",
                times.len(),
                n_steps
            )));
        }
        Ok(Self {
            times,
            states,
            instability: None,
        })
    }

    pub(crate) fn from_parts(
        times: Array1<f64>,
        states: Array3<f64>,
        instability: Option<Instability>,
    ) -> Self {
        Self {
            times,
            states,
            instability,
        }
    }

    /// Number of stored steps
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn n_particles(&self) -> usize {
        self.states.dim().1
    }

    pub fn times(&self) -> ArrayView1<'_, f64> {
        self.times.view()
    }

    /// Full `(n_steps, n_particles, 4)` array
    pub fn states(&self) -> &Array3<f64> {
        &self.states
    }

    /// One component over time, shape `(n_steps, n_particles)`
    pub fn component(&self, c: usize) -> ArrayView2<'_, f64> {
        self.states.index_axis(Axis(2), c)
    }

    pub fn x(&self) -> ArrayView2<'_, f64> {
        self.component(X)
    }

    pub fn y(&self) -> ArrayView2<'_, f64> {
        self.component(Y)
    }

    pub fn u(&self) -> ArrayView2<'_, f64> {
        self.component(U)
    }

    pub fn v(&self) -> ArrayView2<'_, f64> {
        self.component(V)
    }

    /// Batched state at step `k`
    pub fn state_at(&self, k: usize) -> PhaseState {
        PhaseState {
            coords: self.states.index_axis(Axis(0), k).to_owned(),
        }
    }

    pub fn final_state(&self) -> Option<PhaseState> {
        self.len().checked_sub(1).map(|k| self.state_at(k))
    }

    /// The trajectory of particle `j` alone
    pub fn particle(&self, j: usize) -> Trajectory {
        let states = self.states.slice(s![.., j..j + 1, ..]).to_owned();
        let instability = self.instability.and_then(|_| {
            states
                .outer_iter()
                .position(|step| step.iter().any(|c| !c.is_finite()))
                .map(|step| Instability {
                    step,
                    time: self.times[step],
                    particles: 1,
                })
        });
        Trajectory {
            times: self.times.clone(),
            states,
            instability,
        }
    }

    /// Where the run went non-finite, if it did
    pub fn instability(&self) -> Option<&Instability> {
        self.instability.as_ref()
    }
}
