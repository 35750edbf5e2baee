//! Orrery Verification Pass
//!
//! Checks a simulated N-body run against a reference ephemeris, timestep by
//! timestep, and produces the time series that downstream plotting consumes.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐      ┌───────────────────┐
//! │ reference source  │      │   actual source   │   (orrery_env)
//! │ (ephemeris *.bin) │      │ (simulator *.bin) │
//! └─────────┬─────────┘      └─────────┬─────────┘
//!           │   matched by time token  │
//!           └────────────┬─────────────┘
//!                        ▼
//!              ┌───────────────────┐
//!              │ SeriesAggregator  │── decode ──► orrery_core::codec
//!              │                   │── energies ► orrery_core::energy
//!              │                   │── compare ─► orrery_core::divergence
//!              └─────────┬─────────┘
//!                        ▼
//!        DiagnosticSeries + DiagnosticEvents
//!                        │
//!          ┌─────────────┼──────────────┐
//!          ▼             ▼              ▼
//!   VerificationSummary  SeriesExport   CSV tables
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use orrery_verify::{SeriesAggregator, VerificationSummary};
//! use orrery_env::DirectorySource;
//! use orrery_core::{EnergyModel, UnitSystem};
//!
//! let reference = DirectorySource::new("input/jpl_horizons");
//! let actual = DirectorySource::new("output/snapshots");
//!
//! let aggregator = SeriesAggregator::new(EnergyModel::new(UnitSystem::Astronomical));
//! let run = aggregator.run(&reference, &actual)?;
//! VerificationSummary::from_run(&run).print();
//! ```

mod aggregator;
mod config;
mod error;
mod events;
mod series;
mod summary;
pub mod exporter;

pub use aggregator::{AggregationRun, SeriesAggregator};
pub use config::{Tolerances, VerifyConfig};
pub use error::VerifyError;
pub use events::{DiagnosticEvent, EventLevel, Side};
pub use series::{DiagnosticSeries, PairDiagnostics, SeriesEntry};
pub use summary::VerificationSummary;
pub use exporter::SeriesExport;
