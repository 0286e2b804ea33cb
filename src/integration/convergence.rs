//! Convergence Study: integrator accuracy against the Kepler circular orbit
//!
//! For each step size h, every scheme integrates the same circular orbit up
//! to a fixed final time and is compared with the closed-form solution.
//! The empirical order is the slope of log(error) against log(h).

use std::time::Instant;

use tracing::info;

use super::integrator::FixedStepIntegrator;
use super::schemes::Scheme;
use super::state::PhaseState;
use crate::error::{DynamicsError, DynamicsResult};
use crate::systems::{energy, Kepler};

/// Accuracy of one scheme at one step size
#[derive(Debug, Clone, Copy)]
pub struct ConvergenceSample {
    pub scheme: Scheme,
    pub step_size: f64,
    pub n_steps: usize,
    /// |E_numerical − E_analytic| at the final time
    pub energy_error: f64,
    /// Euclidean phase-space distance to the analytic state at the final time
    pub state_error: f64,
    /// Wall-clock time of the integration
    pub seconds: f64,
}

/// Integrate the circular Kepler orbit through `initial` for every scheme and step size
///
/// # Arguments
/// * `initial` - A single particle on (or near) a circular orbit
/// * `final_time` - Integration span; `n = round(final_time / h)` steps are taken
/// * `step_sizes` - The h values to sweep
pub fn kepler_convergence(
    initial: &PhaseState,
    final_time: f64,
    step_sizes: &[f64],
) -> DynamicsResult<Vec<ConvergenceSample>> {
    let kepler = Kepler;
    let mut samples = Vec::with_capacity(step_sizes.len() * Scheme::ALL.len());

    for &h in step_sizes {
        let n_steps = (final_time / h).round() as usize;
        if n_steps == 0 {
            return Err(DynamicsError::InvalidParameter(format!(
                "step size {} exceeds the final time {}",
                h, final_time
            )));
        }

        let analytic = kepler.circular_orbit(0.0, initial, h, n_steps)?;
        let reference = analytic
            .final_state()
            .ok_or_else(|| DynamicsError::InvalidParameter("empty analytic orbit".to_string()))?;
        let e_reference = energy::total(&kepler, &reference)[0];

        for scheme in Scheme::ALL {
            let integrator = FixedStepIntegrator::new(scheme, h)?;

            let start = Instant::now();
            let end = integrator.propagate(&kepler, 0.0, initial, n_steps, |_, _, _| {});
            let seconds = start.elapsed().as_secs_f64();

            let energy_error = (energy::total(&kepler, &end.final_state)[0] - e_reference).abs();
            let state_error = end.final_state.squared_distance(&reference)[0].sqrt();

            samples.push(ConvergenceSample {
                scheme,
                step_size: h,
                n_steps,
                energy_error,
                state_error,
                seconds,
            });
        }

        info!(h, n_steps, "convergence sweep point done");
    }

    Ok(samples)
}

/// Least-squares slope of ln(error) against ln(h)
///
/// Pairs with a non-positive or non-finite value are skipped; fewer than
/// two usable pairs yields NaN.
pub fn empirical_order(step_sizes: &[f64], errors: &[f64]) -> f64 {
    let points: Vec<(f64, f64)> = step_sizes
        .iter()
        .zip(errors)
        .filter(|(&h, &e)| h > 0.0 && e > 0.0 && h.is_finite() && e.is_finite())
        .map(|(&h, &e)| (h.ln(), e.ln()))
        .collect();

    least_squares_slope(&points)
}

/// Slope of the least-squares line through `points`
pub(crate) fn least_squares_slope(points: &[(f64, f64)]) -> f64 {
    if points.len() < 2 {
        return f64::NAN;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let sxy: f64 = points.iter().map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();
    let sxx: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();

    if sxx == 0.0 {
        f64::NAN
    } else {
        sxy / sxx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_for(scheme: Scheme, step_sizes: &[f64]) -> f64 {
        let w = PhaseState::single(1.0, 0.0, 0.0, 1.0);
        let samples = kepler_convergence(&w, 8.0, step_sizes).unwrap();
        let errors: Vec<f64> = samples
            .iter()
            .filter(|s| s.scheme == scheme)
            .map(|s| s.state_error)
            .collect();
        empirical_order(step_sizes, &errors)
    }

    #[test]
    fn test_slope_of_exact_power_law() {
        let h = [1e-3, 1e-2, 1e-1];
        let e: Vec<f64> = h.iter().map(|h: &f64| 3.0 * h.powi(4)).collect();
        assert!((empirical_order(&h, &e) - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_slope_needs_two_points() {
        assert!(empirical_order(&[0.1], &[0.01]).is_nan());
        assert!(empirical_order(&[0.1, 0.2], &[0.0, 0.01]).is_nan());
    }

    // Euler's state error saturates at the orbit size on the decade grid
    // {1e-3, 1e-2, 1e-1}, so only RK2 and RK4 are fitted there.
    #[test]
    fn test_decade_grid_orders() {
        let decades = [1e-3, 1e-2, 1e-1];
        let rk2 = order_for(Scheme::Rk2, &decades);
        let rk4 = order_for(Scheme::Rk4, &decades);
        assert!((1.7..2.3).contains(&rk2), "RK2 order {}", rk2);
        assert!((3.6..4.4).contains(&rk4), "RK4 order {}", rk4);
    }

    // RK4 energy error on a circular orbit falls like h⁵, one order faster
    // than the state error, until it meets round-off near h = 1e-3.
    #[test]
    fn test_rk4_energy_error_slope() {
        let w = PhaseState::single(1.0, 0.0, 0.0, 1.0);
        let decades = [1e-3, 1e-2, 1e-1];
        let samples = kepler_convergence(&w, 8.0, &decades).unwrap();
        let errors: Vec<f64> = samples
            .iter()
            .filter(|s| s.scheme == Scheme::Rk4)
            .map(|s| s.energy_error)
            .collect();

        let fitted = empirical_order(&decades, &errors);
        assert!((3.5..5.5).contains(&fitted), "RK4 energy order {}", fitted);

        let coarse = empirical_order(&decades[1..], &errors[1..]);
        assert!((4.5..5.5).contains(&coarse), "RK4 coarse energy order {}", coarse);
    }

    #[test]
    fn test_euler_first_order() {
        let p = order_for(Scheme::Euler, &[1e-3, 2e-3, 4e-3]);
        assert!((0.8..1.3).contains(&p), "Euler order {}", p);
    }

    #[test]
    fn test_rk2_second_order() {
        let p = order_for(Scheme::Rk2, &[5e-3, 1e-2, 2e-2]);
        assert!((1.7..2.3).contains(&p), "RK2 order {}", p);
    }

    #[test]
    fn test_rk4_fourth_order() {
        let p = order_for(Scheme::Rk4, &[2.5e-2, 5e-2, 1e-1]);
        assert!((3.6..4.4).contains(&p), "RK4 order {}", p);
    }

    #[test]
    fn test_energy_error_shrinks_with_step() {
        let w = PhaseState::single(1.0, 0.0, 0.0, 1.0);
        let step_sizes = [1e-1, 1e-2, 1e-3];
        let samples = kepler_convergence(&w, 8.0, &step_sizes).unwrap();

        for scheme in Scheme::ALL {
            let errors: Vec<f64> = samples
                .iter()
                .filter(|s| s.scheme == scheme)
                .map(|s| s.energy_error)
                .collect();
            assert!(
                errors.windows(2).all(|pair| pair[1] < pair[0]),
                "{} energy error not decreasing: {:?}",
                scheme,
                errors
            );
        }
    }

    #[test]
    fn test_higher_order_is_more_accurate() {
        let w = PhaseState::single(1.0, 0.0, 0.0, 1.0);
        let samples = kepler_convergence(&w, 8.0, &[1e-2]).unwrap();
        let err = |s: Scheme| samples.iter().find(|x| x.scheme == s).unwrap().state_error;
        assert!(err(Scheme::Rk4) < err(Scheme::Rk2));
        assert!(err(Scheme::Rk2) < err(Scheme::Euler));
    }
}
