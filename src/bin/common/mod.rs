//! Shared plumbing of the experiment drivers

use std::path::Path;

use anyhow::{Context, Result};
use order_chaos_dynamics::ExperimentConfig;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; otherwise `info`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Configuration file when given, defaults otherwise
#[allow(dead_code)]
pub fn load_config(path: Option<&Path>) -> Result<ExperimentConfig> {
    match path {
        Some(path) => ExperimentConfig::from_json_file(path)
            .with_context(|| format!("loading configuration {}", path.display())),
        None => Ok(ExperimentConfig::default()),
    }
}

pub fn banner(title: &str) {
    println!("═══════════════════════════════════════════════════════════════");
    println!("  {}", title);
    println!("═══════════════════════════════════════════════════════════════\n");
}
