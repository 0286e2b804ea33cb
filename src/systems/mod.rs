//! Physical Systems Module: Potentials and their Dynamics
//!
//! Implements the two-dimensional potentials studied by the pipeline:
//!
//! - **Hénon-Heiles**: Non-integrable, order-to-chaos transition with energy
//! - **Kepler**: Integrable point mass, closed-form circular orbits used to
//!   validate the integrators
//!
//! Energies (kinetic, total, drift) live alongside since they only need a
//! [`Potential`].

mod traits;
mod henon_heiles;
mod kepler;
pub mod energy;

pub use traits::{FieldFn, HamiltonianSystem, Potential, VectorField};
pub use henon_heiles::{HenonHeiles, ESCAPE_ENERGY};
pub use kepler::Kepler;
