//! Area Report: Summaries of Existing Experiment Dumps
//!
//! Reloads `phase_separation_<i>.csv` and the Poincaré dumps of the chosen
//! result set, in index order, and prints per-energy statistics. The
//! result set is asked for on stdin unless given with `--results`.

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use order_chaos_dynamics::chaos::DEFAULT_CRITICAL_MU;
use order_chaos_dynamics::output::{
    indexed_files, poincare_prefix, read_section, read_values, DUMP_EXTENSION,
    PHASE_SEPARATION_PREFIX,
};
use order_chaos_dynamics::{MuSummary, ResultSet};

mod common;

#[derive(Parser)]
#[command(name = "area_report")]
#[command(about = "Report regular areas and Poincaré point counts from dump files")]
struct Cli {
    /// Directory holding the dumps
    #[arg(short, long, default_value = "Output")]
    dir: PathBuf,

    /// Critical separation μ_c
    #[arg(long, default_value_t = DEFAULT_CRITICAL_MU)]
    critical_mu: f64,

    /// L(inear), P(arallel) or B(oth); asked interactively when absent
    #[arg(short, long)]
    results: Option<ResultSet>,
}

fn main() -> Result<()> {
    common::init_tracing();
    let cli = Cli::parse();

    if !cli.dir.is_dir() {
        bail!("dump directory {} does not exist", cli.dir.display());
    }

    common::banner("Hénon–Heiles: Experiment Report");

    let separation_files = indexed_files(&cli.dir, PHASE_SEPARATION_PREFIX, DUMP_EXTENSION)?;
    if separation_files.is_empty() {
        println!("No phase-separation dumps in {}\n", cli.dir.display());
    } else {
        println!("Regular area (μ_c = {:.1e}):", cli.critical_mu);
        println!("───────────────────────────────────────────────────────────────");
        println!("{:>5} {:>6} {:>14} {:>14} {:>8}", "i", "N", "mean μ", "median μ", "area");
        println!("───────────────────────────────────────────────────────────────");
        for (index, path) in &separation_files {
            let values = read_values(path)?;
            let summary = MuSummary::from_values(*index, &values, cli.critical_mu);
            println!("{:>5} {:>6} {:>14.4e} {:>14.4e} {:>8.3}",
                     summary.index,
                     summary.n_particles,
                     summary.mean,
                     summary.median,
                     summary.regular_fraction);
        }
        println!("───────────────────────────────────────────────────────────────\n");
    }

    let results = match cli.results {
        Some(results) => results,
        None => {
            let stdin = io::stdin();
            ResultSet::prompt(&mut stdin.lock(), &mut io::stdout())?
        }
    };

    for &execution in results.executions() {
        let prefix = poincare_prefix(execution);
        let files = indexed_files(&cli.dir, &prefix, DUMP_EXTENSION)?;

        println!("\nPoincaré sections ({}):", execution.label());
        if files.is_empty() {
            println!("  no dumps found");
            continue;
        }

        println!("{:>5} {:>8} {:>22} {:>22}", "i", "points", "y range", "v range");
        for (index, path) in &files {
            let section = read_section(path)?;
            println!("{:>5} {:>8} {:>22} {:>22}",
                     index,
                     section.len(),
                     range(section.y()),
                     range(section.v()));
        }
    }

    Ok(())
}

fn range(values: &[f64]) -> String {
    if values.is_empty() {
        return "-".to_string();
    }
    let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    format!("[{:+.3}, {:+.3}]", lo, hi)
}
