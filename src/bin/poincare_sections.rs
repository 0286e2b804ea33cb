//! Poincaré Sections: x = 0 Surface of Section at Several Energies
//!
//! ## Protocol
//!
//! 1. For each energy, sample N particles at exactly E
//! 2. Integrate them, as one batch (parallel) and/or one by one (linear)
//! 3. Record interpolated (y, v) at every sign change of x
//! 4. Dump `poincare_sections_<linear|parallel>_<i>.csv` (rows: y; v)

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use order_chaos_dynamics::output::{poincare_path, write_section};
use order_chaos_dynamics::{
    EnergySampler, Execution, FixedStepIntegrator, HenonHeiles, PhaseState, PoincareSection,
    ResultSet, SectionRecorder,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

mod common;

const DEFAULT_ENERGIES: [f64; 5] = [1.0 / 100.0, 1.0 / 12.0, 1.0 / 10.0, 1.0 / 8.0, 1.0 / 6.0];

#[derive(Parser)]
#[command(name = "poincare_sections")]
#[command(about = "Poincaré sections (x = 0) of Hénon–Heiles orbits")]
struct Cli {
    /// JSON experiment configuration (population, integration, sampling, output)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated energies
    #[arg(short, long, value_delimiter = ',')]
    energies: Vec<f64>,

    /// Which executions to run: L(inear), P(arallel) or B(oth)
    #[arg(short, long, default_value = "both")]
    results: ResultSet,

    /// Particles per energy level
    #[arg(short = 'n', long)]
    population: Option<usize>,

    /// Base random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for the section dumps
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
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(output) = cli.output {
        config.output.directory = output;
    }
    config.validate()?;

    let energies = if cli.energies.is_empty() {
        DEFAULT_ENERGIES.to_vec()
    } else {
        cli.energies
    };

    common::banner("Hénon–Heiles: Poincaré Sections at x = 0");

    println!("Parameters:");
    println!("  Energies    = {:?}", energies);
    println!("  N           = {} particles per level", config.population);
    println!("  Scheme      = {}, h = {}, n = {}",
             config.integration.scheme, config.integration.step_size, config.integration.n_steps);
    println!("  Results     = {}", cli.results);
    println!();

    let system = HenonHeiles;
    let sampler = config.sampler()?;
    let integrator = config.integrator()?;
    let n_steps = config.integration.n_steps;
    let dir = config.output_dir();

    println!("{:>10} {:>5} {:>10} {:>10} {:>10}", "execution", "i", "E", "points", "time [s]");
    println!("───────────────────────────────────────────────────────────────");

    for &execution in cli.results.executions() {
        for (index, &energy) in energies.iter().enumerate() {
            let mut rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
                None => StdRng::from_os_rng(),
            };
            let population = sample(&sampler, config.population, energy, &mut rng)?;

            let start = Instant::now();
            let section = match execution {
                Execution::Vectorized => section_of(&system, &integrator, &population, n_steps),
                Execution::PerParticle => (0..population.n_particles())
                    .into_par_iter()
                    .map(|j| section_of(&system, &integrator, &population.particle(j), n_steps))
                    .collect::<Vec<_>>()
                    .into_iter()
                    .fold(PoincareSection::new(), |mut all, part| {
                        all.append(part);
                        all
                    }),
            };
            let seconds = start.elapsed().as_secs_f64();

            write_section(&poincare_path(dir, execution, index), &section)?;
            println!("{:>10} {:>5} {:>10.5} {:>10} {:>10.2}",
                     execution.label(), index, energy, section.len(), seconds);
        }
    }

    println!("───────────────────────────────────────────────────────────────");
    println!("\nSection dumps written to {}", dir.display());

    Ok(())
}

fn sample(sampler: &EnergySampler, n: usize, energy: f64, rng: &mut StdRng) -> Result<PhaseState> {
    Ok(sampler.sample(&HenonHeiles, n, energy, rng)?)
}

fn section_of(
    system: &HenonHeiles,
    integrator: &FixedStepIntegrator,
    initial: &PhaseState,
    n_steps: usize,
) -> PoincareSection {
    let mut recorder = SectionRecorder::new(initial.n_particles());
    integrator.propagate(system, 0.0, initial, n_steps, |_, _, state| recorder.observe(state));
    recorder.finish()
}
