//! # Order-Chaos-Dynamics
//!
//! Order-to-Chaos Transition in the Hénon–Heiles System via Twin-Orbit
//! Divergence and Poincaré Sections
//!
//! ## Theoretical Framework
//!
//! The Hénon–Heiles potential
//!
//!   V(x, y) = ½(x² + y² + 2x²y − ⅔y³)
//!
//! is the standard non-integrable two-degree-of-freedom Hamiltonian. At low
//! energy almost every orbit is quasi-periodic; approaching the escape
//! energy E = 1/6 the regular islands dissolve into a chaotic sea.
//!
//! ### Methodology
//!
//! 1. **Sampling**: N initial conditions at exactly energy E, drawn by
//!    bounded rejection sampling inside the accessible region V ≤ E
//!
//! 2. **Integration**: fixed-step explicit schemes (Euler, RK2, RK4) applied
//!    to the whole population as one batch
//!
//! 3. **Classification**: each particle is paired with a twin displaced by
//!    d ≈ 1e-7; the summed squared separation μ over the end of the run
//!    labels the orbit regular (μ < μ_c) or chaotic
//!
//! 4. **Aggregation**: the regular share of the population at each energy,
//!    the relative regular area A(E)
//!
//! 5. **Sections**: crossings of x = 0 give the (y, v) Poincaré map
//!
//! ## Key Result
//!
//!   A(E) ≈ 1 for E ≲ 1/12,   A(E) ≪ 1 as E → 1/6
//!
//! ## Data Flow
//!
//! ```text
//! Sampler → (Integrator ∘ Vector Field) → trajectories
//!         → { Poincaré extractor | divergence classifier }
//!         → regular-area scan → flat numeric dumps → reports
//! ```
//!
//! ## References
//!
//! - Hénon & Heiles, AJ 69, 73 (1964)
//! - Gottwald & Melbourne, Proc. R. Soc. A 460, 603 (2004) - 0-1 test

pub mod error;
pub mod config;
pub mod systems;
pub mod integration;
pub mod sampling;
pub mod sections;
pub mod chaos;
pub mod output;

pub use error::{DynamicsError, DynamicsResult};
pub use config::{ExperimentConfig, IntegrationConfig, OutputConfig, SamplingConfig};

// Re-exports from systems
pub use systems::{
    // Traits
    FieldFn,
    HamiltonianSystem,
    Potential,
    VectorField,
    // Hénon-Heiles
    HenonHeiles,
    ESCAPE_ENERGY,
    // Kepler
    Kepler,
};

// Re-exports from integration
pub use integration::{
    // State
    Instability,
    PhaseState,
    Trajectory,
    // Schemes
    ClassicalRk4,
    Euler,
    MidpointRk2,
    Scheme,
    Stepper,
    // Driver
    FixedStepIntegrator,
    Propagation,
    // Convergence
    ConvergenceSample,
    empirical_order,
    kepler_convergence,
};

// Re-exports from sampling
pub use sampling::{
    particle_at_energy,
    EnergySampler,
    MeshGrid,
    SamplingBox,
    TwinPopulation,
};

// Re-exports from sections
pub use sections::{find_crossings, PoincareSection, SectionRecorder};

// Re-exports from chaos
pub use chaos::{
    // Divergence
    ClassifierSettings,
    DivergenceClassifier,
    Execution,
    OrbitClass,
    SeparationMeasures,
    SeparationWindow,
    // Aggregation
    EnergyRun,
    RegularAreaScan,
    regular_fraction,
    // 0-1 test
    ZeroOneTest,
};

// Re-exports from output
pub use output::{MuSummary, ResultSet};
