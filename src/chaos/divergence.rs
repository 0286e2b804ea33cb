//! Divergence Classifier: separation of perturbed twin orbits
//!
//! Each particle is integrated together with a twin whose position starts
//! a distance d away. The separation measure
//!
//!   μ = Σ_k (Δx_k² + Δy_k² + Δu_k² + Δv_k²)
//!
//! sums the squared phase-space distance over the last K samples of the
//! run (or over every sample). Regular orbits stay close to their twin
//! (μ ~ d²), chaotic orbits separate exponentially.
//!
//! A non-finite μ means the integration blew up; it is replaced by a large
//! conventional value so the particle counts as chaotic.

use std::fmt;

use ndarray::Axis;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DynamicsError, DynamicsResult};
use crate::integration::{FixedStepIntegrator, PhaseState, Scheme, Stepper};
use crate::sampling::{EnergySampler, TwinPopulation, DEFAULT_SEPARATION};
use crate::systems::{Potential, VectorField};

/// μ assigned to particles whose integration left the finite numbers
pub const UNSTABLE_MU: f64 = 1e3;

/// Threshold below which an orbit counts as regular
pub const DEFAULT_CRITICAL_MU: f64 = 1e-4;

/// Trailing samples summed into μ by default
pub const DEFAULT_TRAILING_WINDOW: usize = 25;

/// Samples of the run that contribute to μ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparationWindow {
    /// The last `K` samples (all of them when the run is shorter)
    Trailing(usize),
    /// Every sample
    Full,
}

impl SeparationWindow {
    /// Index of the first contributing sample in a run of `n_steps`
    pub fn first_sample(&self, n_steps: usize) -> usize {
        match *self {
            SeparationWindow::Trailing(k) => n_steps.saturating_sub(k),
            SeparationWindow::Full => 0,
        }
    }
}

impl Default for SeparationWindow {
    fn default() -> Self {
        SeparationWindow::Trailing(DEFAULT_TRAILING_WINDOW)
    }
}

/// How a population is pushed through the integrator
///
/// Both strategies give bit-identical μ for the same population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Execution {
    /// Every particle and twin in one batch
    #[default]
    Vectorized,
    /// Each twin pair integrated on its own, pairs spread over the rayon pool
    PerParticle,
}

impl Execution {
    pub const ALL: [Execution; 2] = [Execution::PerParticle, Execution::Vectorized];

    /// Label used in result file names
    pub fn label(&self) -> &'static str {
        match self {
            Execution::Vectorized => "parallel",
            Execution::PerParticle => "linear",
        }
    }
}

impl fmt::Display for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Binary label of an orbit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrbitClass {
    Regular,
    Chaotic,
}

impl OrbitClass {
    /// Regular iff μ < μ_c
    pub fn from_mu(mu: f64, critical_mu: f64) -> Self {
        if mu < critical_mu {
            OrbitClass::Regular
        } else {
            OrbitClass::Chaotic
        }
    }
}

/// Tunable parameters of the classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Initial twin distance d
    pub separation: f64,
    pub window: SeparationWindow,
    /// Critical threshold μ_c
    pub critical_mu: f64,
    /// Replacement for non-finite μ
    pub unstable_mu: f64,
    pub execution: Execution,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            separation: DEFAULT_SEPARATION,
            window: SeparationWindow::default(),
            critical_mu: DEFAULT_CRITICAL_MU,
            unstable_mu: UNSTABLE_MU,
            execution: Execution::default(),
        }
    }
}

impl ClassifierSettings {
    pub fn validate(&self) -> DynamicsResult<()> {
        if !(self.separation.is_finite() && self.separation >= 0.0) {
            return Err(DynamicsError::InvalidParameter(format!(
                "separation must be finite and non-negative, got {}",
                self.separation
            )));
        }
        if !(self.critical_mu.is_finite() && self.critical_mu > 0.0) {
            return Err(DynamicsError::InvalidParameter(format!(
                "critical μ must be finite and positive, got {}",
                self.critical_mu
            )));
        }
        if !(self.unstable_mu.is_finite() && self.unstable_mu >= self.critical_mu) {
            return Err(DynamicsError::InvalidParameter(format!(
                "unstable μ must be finite and at least the critical μ {}, got {}",
                self.critical_mu, self.unstable_mu
            )));
        }
        if self.window == SeparationWindow::Trailing(0) {
            return Err(DynamicsError::InvalidParameter(
                "trailing window must cover at least one sample".to_string(),
            ));
        }
        Ok(())
    }
}

/// μ for every particle of one population
#[derive(Debug, Clone, PartialEq)]
pub struct SeparationMeasures {
    /// Per-particle μ, non-finite values already replaced
    pub mu: Vec<f64>,
    /// Particles whose μ was replaced
    pub unstable: usize,
}

impl SeparationMeasures {
    pub fn n_particles(&self) -> usize {
        self.mu.len()
    }

    pub fn classify(&self, critical_mu: f64) -> Vec<OrbitClass> {
        self.mu
            .iter()
            .map(|&mu| OrbitClass::from_mu(mu, critical_mu))
            .collect()
    }

    pub fn regular_count(&self, critical_mu: f64) -> usize {
        self.mu.iter().filter(|&&mu| mu < critical_mu).count()
    }
}

/// Twin-divergence chaos indicator
#[derive(Debug, Clone, Copy)]
pub struct DivergenceClassifier<S = Scheme> {
    integrator: FixedStepIntegrator<S>,
    n_steps: usize,
    settings: ClassifierSettings,
}

impl<S: Stepper> DivergenceClassifier<S> {
    /// Create a classifier
    ///
    /// # Arguments
    /// * `integrator` - Shared by both members of every twin pair
    /// * `n_steps` - Steps per run (≥ 1)
    /// * `settings` - Separation, window, thresholds and execution
    pub fn new(
        integrator: FixedStepIntegrator<S>,
        n_steps: usize,
        settings: ClassifierSettings,
    ) -> DynamicsResult<Self> {
        if n_steps == 0 {
            return Err(DynamicsError::InvalidParameter(
                "classifier needs at least one integration step".to_string(),
            ));
        }
        settings.validate()?;
        Ok(Self {
            integrator,
            n_steps,
            settings,
        })
    }

    pub fn integrator(&self) -> &FixedStepIntegrator<S> {
        &self.integrator
    }

    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    pub fn settings(&self) -> &ClassifierSettings {
        &self.settings
    }

    /// Sample `n` twin pairs at `energy` and measure them
    pub fn measure_energy<H, R>(
        &self,
        system: &H,
        sampler: &EnergySampler,
        energy: f64,
        n: usize,
        rng: &mut R,
    ) -> DynamicsResult<SeparationMeasures>
    where
        H: Potential + VectorField,
        R: Rng + ?Sized,
    {
        let twins = sampler.sample_twins(system, n, energy, self.settings.separation, rng)?;
        Ok(self.measure_twins(system, &twins))
    }

    /// μ for an existing twin population
    pub fn measure_twins(&self, field: &dyn VectorField, twins: &TwinPopulation) -> SeparationMeasures {
        debug!(
            n_particles = twins.n_particles(),
            n_steps = self.n_steps,
            execution = %self.settings.execution,
            "measuring twin separation"
        );

        let raw = match self.settings.execution {
            Execution::Vectorized => self.window_sums(field, twins),
            Execution::PerParticle => (0..twins.n_particles())
                .into_par_iter()
                .map(|j| self.window_sums(field, &twins.pair(j))[0])
                .collect(),
        };

        self.coerce(raw)
    }

    /// Windowed squared distance for every pair, integrated as one batch
    fn window_sums(&self, field: &dyn VectorField, twins: &TwinPopulation) -> Vec<f64> {
        let n = twins.n_particles();
        let batch = twins.reference.concat(&twins.perturbed);
        let first = self.settings.window.first_sample(self.n_steps);
        let mut sums = vec![0.0; n];

        self.integrator
            .propagate(field, 0.0, &batch, self.n_steps, |k, _, state| {
                if k >= first {
                    accumulate_separation(state, n, &mut sums);
                }
            });

        sums
    }

    fn coerce(&self, mut mu: Vec<f64>) -> SeparationMeasures {
        let mut unstable = 0;
        for value in mu.iter_mut().filter(|value| !value.is_finite()) {
            *value = self.settings.unstable_mu;
            unstable += 1;
        }

        if unstable > 0 {
            warn!(
                unstable,
                n_particles = mu.len(),
                replacement = self.settings.unstable_mu,
                "non-finite separation measures classified as chaotic"
            );
        }

        SeparationMeasures { mu, unstable }
    }
}

/// Add |w_j − w_{n+j}|² to `sums[j]` for a stacked (reference; perturbed) batch
fn accumulate_separation(state: &PhaseState, n: usize, sums: &mut [f64]) {
    let (reference, perturbed) = state.as_array().split_at(Axis(0), n);
    for ((sum, a), b) in sums.iter_mut().zip(reference.rows()).zip(perturbed.rows()) {
        *sum += a
            .iter()
            .zip(b.iter())
            .map(|(p, q)| (p - q) * (p - q))
            .sum::<f64>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::{FieldFn, HenonHeiles};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn classifier(n_steps: usize, settings: ClassifierSettings) -> DivergenceClassifier {
        let integrator = FixedStepIntegrator::new(Scheme::Rk4, 0.01).unwrap();
        DivergenceClassifier::new(integrator, n_steps, settings).unwrap()
    }

    #[test]
    fn test_window_bounds() {
        assert_eq!(SeparationWindow::Trailing(25).first_sample(100), 75);
        assert_eq!(SeparationWindow::Trailing(25).first_sample(10), 0);
        assert_eq!(SeparationWindow::Full.first_sample(100), 0);
    }

    #[test]
    fn test_settings_validation() {
        assert!(ClassifierSettings::default().validate().is_ok());

        let bad = [
            ClassifierSettings { separation: -1e-7, ..Default::default() },
            ClassifierSettings { critical_mu: 0.0, ..Default::default() },
            ClassifierSettings { unstable_mu: f64::NAN, ..Default::default() },
            ClassifierSettings { unstable_mu: 0.0, ..Default::default() },
            ClassifierSettings { critical_mu: 1e4, ..Default::default() },
            ClassifierSettings { window: SeparationWindow::Trailing(0), ..Default::default() },
        ];
        for settings in bad {
            assert!(settings.validate().is_err(), "{:?} should be rejected", settings);
        }

        let at_threshold = ClassifierSettings {
            critical_mu: UNSTABLE_MU,
            ..Default::default()
        };
        assert!(at_threshold.validate().is_ok());

        let integrator = FixedStepIntegrator::new(Scheme::Rk4, 0.01).unwrap();
        assert!(DivergenceClassifier::new(integrator, 0, ClassifierSettings::default()).is_err());
        let low_unstable = ClassifierSettings { unstable_mu: 0.0, ..Default::default() };
        assert!(DivergenceClassifier::new(integrator, 40, low_unstable).is_err());
    }

    #[test]
    fn test_identical_twins_have_zero_mu() {
        let mut rng = StdRng::seed_from_u64(3);
        let settings = ClassifierSettings {
            separation: 0.0,
            window: SeparationWindow::Full,
            ..Default::default()
        };
        let classifier = classifier(500, settings);
        let measures = classifier
            .measure_energy(&HenonHeiles, &EnergySampler::default(), 1.0 / 8.0, 20, &mut rng)
            .unwrap();

        assert_eq!(measures.n_particles(), 20);
        assert!(measures.mu.iter().all(|&mu| mu == 0.0));
        assert_eq!(measures.unstable, 0);
        for critical in [1e-12, 1e-4, 1.0] {
            assert_eq!(measures.regular_count(critical), 20);
            assert!(measures
                .classify(critical)
                .iter()
                .all(|&c| c == OrbitClass::Regular));
        }
    }

    #[test]
    fn test_free_particles_keep_initial_offset() {
        // Uniform motion preserves the offset, so each sample adds d²
        let free = FieldFn(|_t: f64, w: &PhaseState| {
            let mut d = w.zeros_like();
            {
                let out = d.as_array_mut();
                out.column_mut(0).assign(&w.u());
                out.column_mut(1).assign(&w.v());
            }
            d
        });
        let reference = PhaseState::from_components(&[0.0, 1.0], &[0.0, 1.0], &[1.0, 0.0], &[0.0, -1.0])
            .unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let twins = TwinPopulation::perturb(reference, 1e-3, &mut rng).unwrap();

        let settings = ClassifierSettings {
            window: SeparationWindow::Trailing(10),
            ..Default::default()
        };
        let measures = classifier(50, settings).measure_twins(&free, &twins);
        for mu in &measures.mu {
            assert!((mu - 10.0 * 1e-6).abs() < 1e-15, "mu = {}", mu);
        }
    }

    #[test]
    fn test_executions_agree() {
        let mut rng = StdRng::seed_from_u64(5);
        let twins = EnergySampler::default()
            .sample_twins(&HenonHeiles, 12, 1.0 / 7.0, DEFAULT_SEPARATION, &mut rng)
            .unwrap();

        let vectorized = classifier(2000, ClassifierSettings::default()).measure_twins(&HenonHeiles, &twins);
        let per_particle = classifier(
            2000,
            ClassifierSettings {
                execution: Execution::PerParticle,
                ..Default::default()
            },
        )
        .measure_twins(&HenonHeiles, &twins);

        assert_eq!(vectorized, per_particle);
    }

    #[test]
    fn test_full_window_dominates_trailing() {
        let mut rng = StdRng::seed_from_u64(8);
        let twins = EnergySampler::default()
            .sample_twins(&HenonHeiles, 5, 1.0 / 10.0, DEFAULT_SEPARATION, &mut rng)
            .unwrap();

        let trailing = classifier(1000, ClassifierSettings::default()).measure_twins(&HenonHeiles, &twins);
        let full = classifier(
            1000,
            ClassifierSettings {
                window: SeparationWindow::Full,
                ..Default::default()
            },
        )
        .measure_twins(&HenonHeiles, &twins);

        for (t, f) in trailing.mu.iter().zip(&full.mu) {
            assert!(f >= t);
        }
    }

    #[test]
    fn test_blow_up_is_coerced_to_chaotic() {
        // dx/dt = x² escapes to infinity in finite time
        let explosive = FieldFn(|_t: f64, w: &PhaseState| {
            let mut d = w.zeros_like();
            d.as_array_mut().column_mut(0).assign(&w.x().mapv(|x| x * x));
            d
        });
        let reference = PhaseState::single(1.0, 0.0, 0.0, 0.0);
        let perturbed = PhaseState::single(1.0 + 1e-7, 0.0, 0.0, 0.0);
        let twins = TwinPopulation::new(reference, perturbed).unwrap();

        let integrator = FixedStepIntegrator::new(Scheme::Euler, 0.5).unwrap();
        let settings = ClassifierSettings {
            window: SeparationWindow::Full,
            ..Default::default()
        };
        let classifier = DivergenceClassifier::new(integrator, 40, settings).unwrap();
        let measures = classifier.measure_twins(&explosive, &twins);

        assert_eq!(measures.unstable, 1);
        assert_eq!(measures.mu, vec![UNSTABLE_MU]);
        assert_eq!(measures.classify(DEFAULT_CRITICAL_MU), vec![OrbitClass::Chaotic]);
    }

    #[test]
    fn test_orbit_class_threshold_is_strict() {
        assert_eq!(OrbitClass::from_mu(1e-5, 1e-4), OrbitClass::Regular);
        assert_eq!(OrbitClass::from_mu(1e-4, 1e-4), OrbitClass::Chaotic);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&SeparationWindow::Trailing(25)).unwrap();
        assert_eq!(json, r#"{"trailing":25}"#);
        let full: SeparationWindow = serde_json::from_str(r#""full""#).unwrap();
        assert_eq!(full, SeparationWindow::Full);
        let exec: Execution = serde_json::from_str(r#""per_particle""#).unwrap();
        assert_eq!(exec, Execution::PerParticle);
        assert_eq!(Execution::Vectorized.label(), "parallel");
    }
}
