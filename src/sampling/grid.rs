//! Mesh grids over a sampling box and the potential map on them

use ndarray::{Array1, Array2};

use super::sampler::SamplingBox;
use crate::error::{DynamicsError, DynamicsResult};
use crate::systems::Potential;

/// Evenly spaced `(X, Y)` grid with `ij` indexing (x varies along rows)
#[derive(Debug, Clone)]
pub struct MeshGrid {
    pub x: Array2<f64>,
    pub y: Array2<f64>,
}

impl MeshGrid {
    /// `resolution × resolution` nodes covering `bounds`, edges included
    pub fn new(bounds: &SamplingBox, resolution: usize) -> DynamicsResult<Self> {
        bounds.validate()?;
        if resolution < 2 {
            return Err(DynamicsError::InvalidParameter(format!(
                "mesh grid needs at least 2 nodes per axis, got {}",
                resolution
            )));
        }

        let xs = Array1::linspace(bounds.x_min, bounds.x_max, resolution);
        let ys = Array1::linspace(bounds.y_min, bounds.y_max, resolution);

        let x = Array2::from_shape_fn((resolution, resolution), |(i, _)| xs[i]);
        let y = Array2::from_shape_fn((resolution, resolution), |(_, j)| ys[j]);

        Ok(Self { x, y })
    }

    /// Potential at every node
    pub fn potential_map<P: Potential + ?Sized>(&self, potential: &P) -> Array2<f64> {
        potential.evaluate_grid(&self.x, &self.y)
    }

    /// Share of nodes with V ≤ E
    pub fn accessible_fraction<P: Potential + ?Sized>(&self, potential: &P, energy: f64) -> f64 {
        let map = self.potential_map(potential);
        let accessible = map.iter().filter(|&&v| v <= energy).count();
        accessible as f64 / map.len() as f64
    }
}
