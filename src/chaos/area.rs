//! Regular-area aggregator: share of regular orbits per energy

use std::fmt;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::info;

use super::divergence::{DivergenceClassifier, SeparationMeasures};
use crate::error::{DynamicsError, DynamicsResult};
use crate::integration::{Scheme, Stepper};
use crate::sampling::EnergySampler;
use crate::systems::{Potential, VectorField};

/// Share of `mu` strictly below `critical_mu` (0 for an empty population)
pub fn regular_fraction(mu: &[f64], critical_mu: f64) -> f64 {
    if mu.is_empty() {
        return 0.0;
    }
    mu.iter().filter(|&&m| m < critical_mu).count() as f64 / mu.len() as f64
}

/// Outcome at one energy level
#[derive(Debug, Clone)]
pub struct EnergyRun {
    /// Position in the scanned energy list
    pub index: usize,
    pub energy: f64,
    pub measures: SeparationMeasures,
    pub regular_count: usize,
    /// Relative regular area, regular_count / population
    pub regular_fraction: f64,
}

/// Relative regular area over a list of energies
///
/// Energies are independent: each gets a fresh population and its own
/// random stream, seeded with `seed + index` when a seed is given, and the
/// levels run concurrently on the rayon pool.
pub struct RegularAreaScan<'a, H, S = Scheme> {
    system: &'a H,
    sampler: EnergySampler,
    classifier: DivergenceClassifier<S>,
    population: usize,
    seed: Option<u64>,
}

impl<H, S: fmt::Debug> fmt::Debug for RegularAreaScan<'_, H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegularAreaScan")
            .field("sampler", &self.sampler)
            .field("classifier", &self.classifier)
            .field("population", &self.population)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl<'a, H, S> RegularAreaScan<'a, H, S>
where
    H: Potential + VectorField,
    S: Stepper,
{
    pub fn new(
        system: &'a H,
        sampler: EnergySampler,
        classifier: DivergenceClassifier<S>,
        population: usize,
    ) -> DynamicsResult<Self> {
        check_population(population)?;
        Ok(Self {
            system,
            sampler,
            classifier,
            population,
            seed: None,
        })
    }

    /// Make every energy level reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn classifier(&self) -> &DivergenceClassifier<S> {
        &self.classifier
    }

    pub fn population(&self) -> usize {
        self.population
    }

    /// Classify one population per energy, results in input order
    pub fn run(&self, energies: &[f64]) -> DynamicsResult<Vec<EnergyRun>> {
        energies
            .par_iter()
            .enumerate()
            .map(|(index, &energy)| self.run_energy(index, energy))
            .collect()
    }

    /// Like [`run`](Self::run), with a population size per energy level
    ///
    /// Every size is checked before any level is integrated.
    pub fn run_levels(&self, levels: &[(f64, usize)]) -> DynamicsResult<Vec<EnergyRun>> {
        for &(_, population) in levels {
            check_population(population)?;
        }
        levels
            .par_iter()
            .enumerate()
            .map(|(index, &(energy, population))| self.run_level(index, energy, population))
            .collect()
    }

    /// Classify the population at `energies[index] = energy`
    pub fn run_energy(&self, index: usize, energy: f64) -> DynamicsResult<EnergyRun> {
        self.run_level(index, energy, self.population)
    }

    fn run_level(&self, index: usize, energy: f64, population: usize) -> DynamicsResult<EnergyRun> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => StdRng::from_os_rng(),
        };

        let measures =
            self.classifier
                .measure_energy(self.system, &self.sampler, energy, population, &mut rng)?;

        let critical_mu = self.classifier.settings().critical_mu;
        let regular_count = measures.regular_count(critical_mu);
        let fraction = regular_fraction(&measures.mu, critical_mu);

        info!(
            index,
            energy,
            population,
            regular = regular_count,
            unstable = measures.unstable,
            fraction,
            "energy level classified"
        );

        Ok(EnergyRun {
            index,
            energy,
            measures,
            regular_count,
            regular_fraction: fraction,
        })
    }
}

fn check_population(population: usize) -> DynamicsResult<()> {
    if population == 0 {
        return Err(DynamicsError::InvalidParameter(
            "population must contain at least one particle".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chaos::{ClassifierSettings, Execution};
    use crate::integration::FixedStepIntegrator;
    use crate::systems::HenonHeiles;

    fn scan(system: &HenonHeiles, n_steps: usize, execution: Execution) -> RegularAreaScan<'_, HenonHeiles> {
        let integrator = FixedStepIntegrator::new(Scheme::Rk4, 0.01).unwrap();
        let settings = ClassifierSettings {
            execution,
            ..Default::default()
        };
        let classifier = DivergenceClassifier::new(integrator, n_steps, settings).unwrap();
        RegularAreaScan::new(system, EnergySampler::default(), classifier, 8).unwrap()
    }

    #[test]
    fn test_regular_fraction() {
        assert_eq!(regular_fraction(&[1e-6, 1e-3, 5e-5, 2.0], 1e-4), 0.5);
        assert_eq!(regular_fraction(&[1e-4], 1e-4), 0.0);
        assert_eq!(regular_fraction(&[], 1e-4), 0.0);
    }

    #[test]
    fn test_rejects_empty_population() {
        let integrator = FixedStepIntegrator::new(Scheme::Rk4, 0.01).unwrap();
        let classifier = DivergenceClassifier::new(integrator, 10, ClassifierSettings::default()).unwrap();
        assert!(RegularAreaScan::new(&HenonHeiles, EnergySampler::default(), classifier, 0).is_err());
    }

    #[test]
    fn test_seeded_scan_is_reproducible_and_ordered() {
        let system = HenonHeiles;
        let energies = [1.0 / 100.0, 1.0 / 12.0, 1.0 / 8.0];
        let first = scan(&system, 300, Execution::Vectorized).with_seed(42).run(&energies).unwrap();
        let second = scan(&system, 300, Execution::PerParticle).with_seed(42).run(&energies).unwrap();

        assert_eq!(first.len(), 3);
        for (k, (a, b)) in first.iter().zip(&second).enumerate() {
            assert_eq!(a.index, k);
            assert_eq!(a.energy, energies[k]);
            assert_eq!(a.measures, b.measures);
            assert_eq!(a.measures.n_particles(), 8);
            assert!((0.0..=1.0).contains(&a.regular_fraction));
        }
    }

    #[test]
    fn test_inaccessible_energy_fails() {
        let system = HenonHeiles;
        let result = scan(&system, 10, Execution::Vectorized).with_seed(1).run(&[1.0 / 12.0, -1.0]);
        assert!(matches!(result, Err(DynamicsError::SamplingExhausted { .. })));
    }

    #[test]
    fn test_levels_take_their_own_population() {
        let system = HenonHeiles;
        let scan = scan(&system, 200, Execution::Vectorized).with_seed(13);
        let runs = scan.run_levels(&[(1.0 / 50.0, 3), (1.0 / 9.0, 11)]).unwrap();

        assert_eq!(runs[0].measures.n_particles(), 3);
        assert_eq!(runs[1].measures.n_particles(), 11);
        assert_eq!(runs[1].index, 1);

        // A level at the scan's own population matches the uniform run
        let uniform = scan.run(&[1.0 / 50.0]).unwrap();
        let same = scan.run_levels(&[(1.0 / 50.0, scan.population())]).unwrap();
        assert_eq!(uniform[0].measures, same[0].measures);
    }

    #[test]
    fn test_levels_reject_empty_population() {
        let system = HenonHeiles;
        let result = scan(&system, 10, Execution::Vectorized).run_levels(&[(0.05, 4), (0.1, 0)]);
        assert!(matches!(result, Err(DynamicsError::InvalidParameter(_))));
    }

    #[test]
    fn test_debug_names_scan_settings() {
        let system = HenonHeiles;
        let shown = format!("{:?}", scan(&system, 10, Execution::Vectorized).with_seed(4));
        assert!(shown.starts_with("RegularAreaScan"));
        assert!(shown.contains("population: 8"));
        assert!(shown.contains("Some(4)"));
    }
}
