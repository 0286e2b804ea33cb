//! Sections Module: Poincaré Sections of Integrated Orbits
//!
//! Reduces continuous orbits to the discrete set of (y, v) points where
//! they pierce the x = 0 plane. Regular orbits trace closed curves on the
//! section; chaotic orbits scatter over an area.

mod poincare;

pub use poincare::{find_crossings, orbit_crossings, PoincareSection, SectionRecorder};
