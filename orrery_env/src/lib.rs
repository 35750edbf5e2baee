//! Orrery Data-Source Layer
//!
//! The verification pass consumes snapshots from two independent producers: a
//! reference ephemeris and the simulation under test. Both emit the same
//! binary format, one unit per timestep, named by a sortable time token.
//!
//! This crate hides where those units live behind [`SnapshotSource`], so the
//! pass takes its inputs as explicit parameters instead of reading global
//! paths:
//! - [`DirectorySource`]: `<token>.bin` files in a directory
//! - [`MemorySource`]: an ordered in-memory map
//!
//! # Example
//!
//! ```ignore
//! use orrery_env::{DirectorySource, SnapshotSource};
//!
//! let reference = DirectorySource::new("input/jpl_horizons");
//! for token in reference.tokens()? {
//!     let bytes = reference.read(&token)?;
//!     let snapshot = orrery_core::decode(&bytes)?;
//! }
//! ```

mod directory;
mod error;
mod memory;
mod source;
mod types;

pub use directory::{DirectorySource, DEFAULT_EXTENSION};
pub use error::EnvError;
pub use memory::MemorySource;
pub use source::SnapshotSource;
pub use types::TimeToken;
