//! Orrery Core - N-body snapshot codec and verification primitives
//!
//! This library provides the three pieces every verification pass is built on:
//! 1. **Snapshot Codec**: the fixed 4 + 64n byte binary layout shared by the
//!    integrator and the reference ephemeris
//! 2. **Energy Model**: kinetic, pairwise gravitational potential and total
//!    energy under an explicit unit system
//! 3. **Divergence Comparator**: per-body position and velocity error between
//!    a reference and an actual snapshot

pub mod body;
pub mod codec;
pub mod energy;
pub mod divergence;

// Re-export key types for convenience
pub use body::{Body, BodyError, Snapshot, SnapshotError};
pub use codec::{decode, encode, CodecError};
pub use energy::{Energies, EnergyModel, UnitSystem};
pub use divergence::{compare, distance, CompareError, Divergence};
