//! Sampling Module: Initial Conditions at Fixed Energy
//!
//! Builds the populations every experiment starts from:
//!
//! - **Energy sampler**: bounded rejection sampling of positions with
//!   V(x, y) ≤ E, speed fixed by E − V, direction uniform on the circle
//! - **Twin populations**: each particle paired with a copy whose position
//!   is shifted by a small fixed distance at a random angle
//! - **Mesh grids**: regular grids for potential maps and a cheap estimate
//!   of how much of a box is accessible at a given energy

mod sampler;
mod grid;

pub use sampler::{
    particle_at_energy,
    EnergySampler,
    SamplingBox,
    TwinPopulation,
    DEFAULT_MAX_ATTEMPTS_PER_PARTICLE,
    DEFAULT_SEPARATION,
};
pub use grid::MeshGrid;
