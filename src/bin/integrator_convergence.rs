//! Integrator Convergence: Euler, RK2 and RK4 on the Kepler Circular Orbit
//!
//! Integrates the unit circular orbit (x, y, u, v) = (1, 0, 0, 1) up to a
//! fixed time for a sweep of step sizes and compares against the exact
//! orbit. Prints final energy and state errors, wall time, and the fitted
//! log-log orders.

use anyhow::Result;
use clap::Parser;
use order_chaos_dynamics::{empirical_order, kepler_convergence, PhaseState, Scheme};

mod common;

#[derive(Parser)]
#[command(name = "integrator_convergence")]
#[command(about = "Accuracy and cost of the fixed-step schemes on the Kepler problem")]
struct Cli {
    /// Integration span
    #[arg(short = 't', long, default_value_t = 8.0)]
    final_time: f64,

    /// Comma-separated step sizes (default: 12 values log-spaced in [1e-3, 1e-1])
    #[arg(long, value_delimiter = ',')]
    step_sizes: Vec<f64>,
}

fn main() -> Result<()> {
    common::init_tracing();
    let cli = Cli::parse();

    let step_sizes = if cli.step_sizes.is_empty() {
        (0..12).map(|k| 10f64.powf(-3.0 + 2.0 * k as f64 / 11.0)).collect()
    } else {
        cli.step_sizes
    };

    common::banner("Fixed-Step Integrators: Kepler Convergence Study");

    println!("Initial state (x, y, u, v) = (1, 0, 0, 1), T = {}", cli.final_time);
    println!();

    let initial = PhaseState::single(1.0, 0.0, 0.0, 1.0);
    let samples = kepler_convergence(&initial, cli.final_time, &step_sizes)?;

    println!("{:>8} {:>10} {:>8} {:>14} {:>14} {:>10}",
             "scheme", "h", "steps", "|ΔE|", "|Δw|", "time [ms]");
    println!("───────────────────────────────────────────────────────────────────────");
    for sample in &samples {
        println!("{:>8} {:>10.3e} {:>8} {:>14.4e} {:>14.4e} {:>10.3}",
                 sample.scheme,
                 sample.step_size,
                 sample.n_steps,
                 sample.energy_error,
                 sample.state_error,
                 sample.seconds * 1e3);
    }
    println!("───────────────────────────────────────────────────────────────────────");

    println!("\nEmpirical orders (log-log slope):");
    for scheme in Scheme::ALL {
        let (hs, state_errors, energy_errors): (Vec<f64>, Vec<f64>, Vec<f64>) = samples
            .iter()
            .filter(|s| s.scheme == scheme)
            .fold((Vec::new(), Vec::new(), Vec::new()), |mut acc, s| {
                acc.0.push(s.step_size);
                acc.1.push(s.state_error);
                acc.2.push(s.energy_error);
                acc
            });
        println!("  {:>6}: state {:5.2}   energy {:5.2}",
                 scheme,
                 empirical_order(&hs, &state_errors),
                 empirical_order(&hs, &energy_errors));
    }

    Ok(())
}
