//! Poincaré Section Extractor: crossings of the x = 0 plane
//!
//! Between consecutive samples i, i+1 with x_i · x_{i+1} < 0 the crossing
//! is located by linear interpolation:
//!
//!   y₀ = y_i + (y_{i+1} − y_i)/(x_{i+1} − x_i) · (0 − x_i)
//!
//! and likewise for v₀. A sample landing exactly on x = 0 fails the strict
//! sign test on both sides and contributes no point.
//!
//! Points are ordered by particle (batch order), then by time within each
//! particle. They are never sorted.

use ndarray::{ArrayView1, ArrayView2, Axis};

use crate::error::{DynamicsError, DynamicsResult};
use crate::integration::{PhaseState, Trajectory, V, X, Y};

/// (y, v) points recorded where orbits cross x = 0
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoincareSection {
    y: Vec<f64>,
    v: Vec<f64>,
}

impl PoincareSection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Section of every particle in a trajectory
    pub fn from_trajectory(trajectory: &Trajectory) -> Self {
        let mut section = Self::new();
        collect_batch(trajectory.x(), trajectory.y(), trajectory.v(), &mut section);
        section
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn v(&self) -> &[f64] {
        &self.v
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.y.iter().copied().zip(self.v.iter().copied())
    }

    pub fn push(&mut self, y: f64, v: f64) {
        self.y.push(y);
        self.v.push(v);
    }

    /// Append another section after this one
    pub fn append(&mut self, other: PoincareSection) {
        self.y.extend(other.y);
        self.v.extend(other.v);
    }

    /// The two rows (y; v) as written to disk
    pub fn rows(&self) -> [&[f64]; 2] {
        [&self.y, &self.v]
    }
}

/// Crossings of a batch of orbits, arrays shaped `(n_samples, n_particles)`
pub fn find_crossings(
    x: ArrayView2<'_, f64>,
    y: ArrayView2<'_, f64>,
    v: ArrayView2<'_, f64>,
) -> DynamicsResult<PoincareSection> {
    if x.dim() != y.dim() || x.dim() != v.dim() {
        return Err(DynamicsError::InvalidParameter(format!(
            "section inputs differ in shape: x {:?}, y {:?}, v {:?}",
            x.dim(),
            y.dim(),
            v.dim()
        )));
    }

    let mut section = PoincareSection::new();
    collect_batch(x, y, v, &mut section);
    Ok(section)
}

/// Crossings of a single orbit, appended to `section`
pub fn orbit_crossings(
    x: ArrayView1<'_, f64>,
    y: ArrayView1<'_, f64>,
    v: ArrayView1<'_, f64>,
    section: &mut PoincareSection,
) {
    let n = x.len().min(y.len()).min(v.len());

    for i in 0..n.saturating_sub(1) {
        if let Some((y0, v0)) = crossing([x[i], x[i + 1]], [y[i], y[i + 1]], [v[i], v[i + 1]]) {
            section.push(y0, v0);
        }
    }
}

/// Section built on the fly from consecutive integrator states
///
/// Feed it every state of a run (e.g. from
/// [`FixedStepIntegrator::propagate`](crate::integration::FixedStepIntegrator::propagate));
/// the result equals the section of the stored trajectory without keeping
/// the trajectory.
#[derive(Debug, Clone)]
pub struct SectionRecorder {
    /// (x, y, v) of every particle at the last observed step
    previous: Vec<[f64; 3]>,
    started: bool,
    per_particle: Vec<PoincareSection>,
}

impl SectionRecorder {
    pub fn new(n_particles: usize) -> Self {
        Self {
            previous: vec![[0.0; 3]; n_particles],
            started: false,
            per_particle: vec![PoincareSection::new(); n_particles],
        }
    }

    /// Record crossings between the last observed state and `state`
    pub fn observe(&mut self, state: &PhaseState) {
        let rows = state.as_array();
        for ((row, last), section) in rows
            .rows()
            .into_iter()
            .zip(self.previous.iter_mut())
            .zip(self.per_particle.iter_mut())
        {
            let current = [row[X], row[Y], row[V]];
            if self.started {
                let x = [last[0], current[0]];
                let y = [last[1], current[1]];
                let v = [last[2], current[2]];
                if let Some((y0, v0)) = crossing(x, y, v) {
                    section.push(y0, v0);
                }
            }
            *last = current;
        }
        self.started = true;
    }

    /// All points, particle by particle
    pub fn finish(self) -> PoincareSection {
        self.per_particle
            .into_iter()
            .fold(PoincareSection::new(), |mut all, section| {
                all.append(section);
                all
            })
    }
}

/// Interpolated (y, v) where x changes sign strictly between two samples
fn crossing(x: [f64; 2], y: [f64; 2], v: [f64; 2]) -> Option<(f64, f64)> {
    if x[0] * x[1] < 0.0 {
        let fraction = (0.0 - x[0]) / (x[1] - x[0]);
        Some((y[0] + (y[1] - y[0]) * fraction, v[0] + (v[1] - v[0]) * fraction))
    } else {
        None
    }
}

fn collect_batch(
    x: ArrayView2<'_, f64>,
    y: ArrayView2<'_, f64>,
    v: ArrayView2<'_, f64>,
    section: &mut PoincareSection,
) {
    for j in 0..x.len_of(Axis(1)) {
        orbit_crossings(x.column(j), y.column(j), v.column(j), section);
    }
}
