//! Summaries of reloaded μ dumps

use crate::chaos::regular_fraction;

/// Statistics of one energy level's μ values
#[derive(Debug, Clone, PartialEq)]
pub struct MuSummary {
    pub index: usize,
    pub n_particles: usize,
    pub mean: f64,
    pub median: f64,
    pub regular_fraction: f64,
}

impl MuSummary {
    pub fn from_values(index: usize, values: &[f64], critical_mu: f64) -> Self {
        Self {
            index,
            n_particles: values.len(),
            mean: mean(values),
            median: median(values),
            regular_fraction: regular_fraction(values, critical_mu),
        }
    }
}

/// NaN for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// NaN for an empty slice
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        0.5 * (sorted[mid - 1] + sorted[mid])
    } else {
        sorted[mid]
    }
}
