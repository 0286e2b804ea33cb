//! Regular Area: Order-to-Chaos Transition of Hénon–Heiles
//!
//! ## Protocol
//!
//! 1. For each energy E, sample N particles at exactly E and their twins
//! 2. Integrate every pair with the same scheme, step size and step count
//! 3. Sum the squared twin separation over the end of the run (μ)
//! 4. Count μ < μ_c → relative regular area A(E)
//! 5. Dump μ per energy to `phase_separation_<i>.csv`

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use order_chaos_dynamics::output::{phase_separation_path, write_values};
use order_chaos_dynamics::{Execution, HenonHeiles, RegularAreaScan, Scheme, SeparationWindow};

mod common;

#[derive(Parser)]
#[command(name = "regular_area")]
#[command(about = "Relative regular area of the Hénon–Heiles system against energy")]
struct Cli {
    /// JSON experiment configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Particles per energy level
    #[arg(short = 'n', long)]
    population: Option<usize>,

    /// Integration steps per run
    #[arg(long)]
    n_steps: Option<usize>,

    /// Fixed step size h
    #[arg(long)]
    step_size: Option<f64>,

    /// euler, rk2 or rk4
    #[arg(long)]
    scheme: Option<Scheme>,

    /// Sum the separation over the whole run instead of the trailing window
    #[arg(long)]
    full_window: bool,

    /// Integrate each twin pair on its own instead of one batch
    #[arg(long)]
    per_particle: bool,

    /// Base random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for the μ dumps
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    common::init_tracing();
    let cli = Cli::parse();

    let mut config = common::load_config(cli.config.as_deref())?;
    if let Some(population) = cli.population {
        config.population = population;
    }
    if let Some(n_steps) = cli.n_steps {
        config.integration.n_steps = n_steps;
    }
    if let Some(step_size) = cli.step_size {
        config.integration.step_size = step_size;
    }
    if let Some(scheme) = cli.scheme {
        config.integration.scheme = scheme;
    }
    if cli.full_window {
        config.classifier.window = SeparationWindow::Full;
    }
    if cli.per_particle {
        config.classifier.execution = Execution::PerParticle;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(output) = cli.output {
        config.output.directory = output;
    }
    config.validate()?;

    common::banner("Hénon–Heiles: Relative Regular Area vs Energy");

    println!("Parameters:");
    println!("  Energies    = {} levels in [{:.4}, {:.4}]",
             config.energies.len(),
             config.energies.iter().cloned().fold(f64::INFINITY, f64::min),
             config.energies.iter().cloned().fold(f64::NEG_INFINITY, f64::max));
    println!("  N           = {} particles per level", config.population);
    println!("  Scheme      = {}, h = {}, n = {}",
             config.integration.scheme, config.integration.step_size, config.integration.n_steps);
    println!("  Separation  = {:.1e}", config.classifier.separation);
    println!("  Window      = {:?}", config.classifier.window);
    println!("  μ_c         = {:.1e}", config.classifier.critical_mu);
    println!("  Execution   = {:?}", config.classifier.execution);
    match config.seed {
        Some(seed) => println!("  Seed        = {}", seed),
        None => println!("  Seed        = (entropy)"),
    }
    println!();

    let system = HenonHeiles;
    let mut scan = RegularAreaScan::new(
        &system,
        config.sampler()?,
        config.classifier()?,
        config.population,
    )?;
    if let Some(seed) = config.seed {
        scan = scan.with_seed(seed);
    }

    let start = Instant::now();
    let runs = scan.run(&config.energies)?;
    let elapsed = start.elapsed().as_secs_f64();

    let dir = config.output_dir();
    for run in &runs {
        write_values(&phase_separation_path(dir, run.index), &run.measures.mu)?;
    }

    println!("───────────────────────────────────────────────────────────────");
    println!("{:>5} {:>10} {:>10} {:>10} {:>10}", "i", "E", "regular", "unstable", "area");
    println!("───────────────────────────────────────────────────────────────");
    for run in &runs {
        println!("{:>5} {:>10.5} {:>10} {:>10} {:>10.3}",
                 run.index,
                 run.energy,
                 run.regular_count,
                 run.measures.unstable,
                 run.regular_fraction);
    }
    println!("───────────────────────────────────────────────────────────────");

    println!("\nCompleted in {:.1} s", elapsed);
    println!("μ dumps written to {}", dir.display());

    Ok(())
}
