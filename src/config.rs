//! Experiment configuration
//!
//! JSON, every field optional: `{}` describes the standard Hénon–Heiles
//! regular-area experiment.

use std::path::{Path, PathBuf};

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::chaos::{ClassifierSettings, DivergenceClassifier};
use crate::error::{DynamicsError, DynamicsResult};
use crate::integration::{FixedStepIntegrator, Scheme};
use crate::sampling::{EnergySampler, SamplingBox, DEFAULT_MAX_ATTEMPTS_PER_PARTICLE};
use crate::systems::ESCAPE_ENERGY;

/// Full description of one experiment run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Energy levels, scanned in order
    #[serde(default = "default_energies")]
    pub energies: Vec<f64>,
    /// Particles per energy level
    #[serde(default = "default_population")]
    pub population: usize,
    /// Base seed; energy `i` uses `seed + i`. Entropy-seeded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub integration: IntegrationConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegrationConfig {
    #[serde(default)]
    pub scheme: Scheme,
    #[serde(default = "default_step_size")]
    pub step_size: f64,
    #[serde(default = "default_n_steps")]
    pub n_steps: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_x_min")]
    pub x_min: f64,
    #[serde(default = "default_x_max")]
    pub x_max: f64,
    #[serde(default = "default_y_min")]
    pub y_min: f64,
    #[serde(default = "default_y_max")]
    pub y_max: f64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts_per_particle: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the dumps are written to
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
}

fn default_energies() -> Vec<f64> {
    Array1::linspace(1.0 / 100.0, ESCAPE_ENERGY, 20).to_vec()
}
fn default_population() -> usize {
    100
}
fn default_step_size() -> f64 {
    0.01
}
fn default_n_steps() -> usize {
    30_000
}
fn default_x_min() -> f64 {
    SamplingBox::default().x_min
}
fn default_x_max() -> f64 {
    SamplingBox::default().x_max
}
fn default_y_min() -> f64 {
    SamplingBox::default().y_min
}
fn default_y_max() -> f64 {
    SamplingBox::default().y_max
}
fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS_PER_PARTICLE
}
fn default_directory() -> PathBuf {
    PathBuf::from("Output")
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            energies: default_energies(),
            population: default_population(),
            seed: None,
            integration: IntegrationConfig::default(),
            sampling: SamplingConfig::default(),
            classifier: ClassifierSettings::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            scheme: Scheme::default(),
            step_size: default_step_size(),
            n_steps: default_n_steps(),
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            x_min: default_x_min(),
            x_max: default_x_max(),
            y_min: default_y_min(),
            y_max: default_y_max(),
            max_attempts_per_particle: default_max_attempts(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
        }
    }
}

impl SamplingConfig {
    pub fn bounds(&self) -> SamplingBox {
        SamplingBox {
            x_min: self.x_min,
            x_max: self.x_max,
            y_min: self.y_min,
            y_max: self.y_max,
        }
    }
}

impl ExperimentConfig {
    /// Load and validate a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> DynamicsResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> DynamicsResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> DynamicsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> DynamicsResult<()> {
        if self.energies.is_empty() {
            return Err(DynamicsError::Config("energy list is empty".to_string()));
        }
        if let Some(bad) = self.energies.iter().find(|e| !e.is_finite()) {
            return Err(DynamicsError::Config(format!("energy {} is not finite", bad)));
        }
        if self.population == 0 {
            return Err(DynamicsError::Config("population must be at least 1".to_string()));
        }
        if !(self.integration.step_size.is_finite() && self.integration.step_size > 0.0) {
            return Err(DynamicsError::Config(format!(
                "step size must be finite and positive, got {}",
                self.integration.step_size
            )));
        }
        if self.integration.n_steps == 0 {
            return Err(DynamicsError::Config("n_steps must be at least 1".to_string()));
        }
        if self.sampling.max_attempts_per_particle == 0 {
            return Err(DynamicsError::Config(
                "max_attempts_per_particle must be at least 1".to_string(),
            ));
        }

        self.sampling
            .bounds()
            .validate()
            .and_then(|_| self.classifier.validate())
            .map_err(|e| DynamicsError::Config(e.to_string()))
    }

    pub fn integrator(&self) -> DynamicsResult<FixedStepIntegrator> {
        FixedStepIntegrator::new(self.integration.scheme, self.integration.step_size)
    }

    pub fn sampler(&self) -> DynamicsResult<EnergySampler> {
        EnergySampler::new(self.sampling.bounds(), self.sampling.max_attempts_per_particle)
    }

    pub fn classifier(&self) -> DynamicsResult<DivergenceClassifier> {
        DivergenceClassifier::new(self.integrator()?, self.integration.n_steps, self.classifier)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output.directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chaos::{Execution, SeparationWindow};

    #[test]
    fn test_empty_json_gives_defaults() {
        let cfg = ExperimentConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, ExperimentConfig::default());
        assert_eq!(cfg.energies.len(), 20);
        assert!((cfg.energies[0] - 0.01).abs() < 1e-15);
        assert!((cfg.energies[19] - 1.0 / 6.0).abs() < 1e-15);
        assert_eq!(cfg.population, 100);
        assert_eq!(cfg.integration.scheme, Scheme::Rk4);
        assert_eq!(cfg.integration.n_steps, 30_000);
        assert_eq!(cfg.classifier.window, SeparationWindow::Trailing(25));
        assert_eq!(cfg.output_dir(), Path::new("Output"));
    }

    #[test]
    fn test_partial_sections() {
        let json = r#"{
            "energies": [0.0833, 0.1667],
            "seed": 7,
            "integration": { "scheme": "euler", "step_size": 0.001 },
            "sampling": { "y_max": 0.9 },
            "classifier": { "window": "full", "execution": "per_particle" }
        }"#;
        let cfg = ExperimentConfig::from_json_str(json).unwrap();
        assert_eq!(cfg.energies, vec![0.0833, 0.1667]);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.integration.scheme, Scheme::Euler);
        assert_eq!(cfg.integration.n_steps, 30_000);
        assert_eq!(cfg.sampling.y_max, 0.9);
        assert_eq!(cfg.sampling.x_min, -1.0);
        assert_eq!(cfg.classifier.window, SeparationWindow::Full);
        assert_eq!(cfg.classifier.execution, Execution::PerParticle);
        assert_eq!(cfg.classifier.critical_mu, 1e-4);
    }

    #[test]
    fn test_json_round_trip() {
        let mut cfg = ExperimentConfig::default();
        cfg.seed = Some(99);
        cfg.classifier.window = SeparationWindow::Full;
        let back = ExperimentConfig::from_json_str(&cfg.to_json_string().unwrap()).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_validation_rejects() {
        let cases = [
            r#"{ "energies": [] }"#,
            r#"{ "population": 0 }"#,
            r#"{ "integration": { "step_size": 0.0 } }"#,
            r#"{ "integration": { "step_size": -0.01 } }"#,
            r#"{ "integration": { "n_steps": 0 } }"#,
            r#"{ "sampling": { "x_min": 1.0, "x_max": -1.0 } }"#,
            r#"{ "sampling": { "y_min": 0.5, "y_max": 0.5 } }"#,
            r#"{ "sampling": { "max_attempts_per_particle": 0 } }"#,
            r#"{ "classifier": { "separation": -1e-7 } }"#,
            r#"{ "classifier": { "critical_mu": 0.0 } }"#,
            r#"{ "classifier": { "unstable_mu": 0.0 } }"#,
            r#"{ "classifier": { "critical_mu": 1e-2, "unstable_mu": 1e-3 } }"#,
            r#"{ "classifier": { "window": { "trailing": 0 } } }"#,
        ];
        for json in cases {
            assert!(
                matches!(ExperimentConfig::from_json_str(json), Err(DynamicsError::Config(_))),
                "accepted {}",
                json
            );
        }
        assert!(matches!(
            ExperimentConfig::from_json_str(r#"{ "integration": { "scheme": "rk7" } }"#),
            Err(DynamicsError::Json(_))
        ));
    }

    #[test]
    fn test_builds_pipeline_parts() {
        let cfg = ExperimentConfig::default();
        assert_eq!(cfg.integrator().unwrap().step_size(), 0.01);
        assert_eq!(cfg.sampler().unwrap().bounds(), &SamplingBox::default());
        assert_eq!(cfg.classifier().unwrap().n_steps(), 30_000);
    }

    #[test]
    fn test_shipped_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("configs/henon_heiles.json");
        let cfg = ExperimentConfig::from_json_file(&path).unwrap();
        assert_eq!(cfg.energies.len(), 20);
        assert_eq!(cfg.seed, Some(2024));
    }
}
