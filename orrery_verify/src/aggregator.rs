//! Series Aggregator - walks matched snapshot pairs and builds the series.
//!
//! # Pass structure
//!
//! ```text
//!   reference.tokens()  (lexical order)
//!        │
//!        ├─ actual.contains(token)?  no ──► MissingCounterpart (warn), skip
//!        │
//!        ├─ read + decode both sides   err ──► SourceUnavailable / Decode, skip
//!        │
//!        ├─ compare()                  err ──► BodyCountMismatch, skip
//!        │
//!        └─ energies() × 2 + divergence ──► DiagnosticSeries::push
//! ```
//!
//! A failing timestep never aborts the pass. Each pair is processed from its
//! own buffers with no shared mutable state, so pairs are independent of one
//! another; the pass itself stays sequential.

use crate::error::VerifyError;
use crate::events::{DiagnosticEvent, EventLevel, Side};
use crate::series::{DiagnosticSeries, PairDiagnostics};

use orrery_core::{codec, divergence, CompareError, EnergyModel, Snapshot};
use orrery_env::{SnapshotSource, TimeToken};
use tracing::{debug, error, info, warn};

/// Result of one verification pass.
#[derive(Debug, Clone, Default)]
pub struct AggregationRun {
    /// Successfully processed timesteps
    pub series: DiagnosticSeries,

    /// One event per skipped timestep, in reference order
    pub events: Vec<DiagnosticEvent>,

    /// Number of units listed by the reference source
    pub reference_count: usize,
}

impl AggregationRun {
    /// Number of reference timesteps that produced no entry.
    pub fn skipped(&self) -> usize {
        self.events.len()
    }

    /// Events of a given kind (see [`DiagnosticEvent::kind`]).
    pub fn events_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a DiagnosticEvent> + 'a {
        self.events.iter().filter(move |e| e.kind() == kind)
    }

    /// True if any skipped timestep was caused by an error-level event.
    pub fn has_errors(&self) -> bool {
        self.events.iter().any(|e| e.level() == EventLevel::Error)
    }
}

/// Drives the verification pass over two snapshot sources.
#[derive(Debug, Clone, Default)]
pub struct SeriesAggregator {
    model: EnergyModel,
}

impl SeriesAggregator {
    /// Creates an aggregator using the given energy model.
    pub fn new(model: EnergyModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &EnergyModel {
        &self.model
    }

    /// Runs the full pass.
    ///
    /// Fails only if the reference source cannot be listed. Every per-timestep
    /// problem is recorded as an event and the pass moves on.
    pub fn run(
        &self,
        reference: &dyn SnapshotSource,
        actual: &dyn SnapshotSource,
    ) -> Result<AggregationRun, VerifyError> {
        let tokens = reference.tokens()?;

        info!(
            "Verifying {} timesteps: {} against {} (units={})",
            tokens.len(),
            actual.describe(),
            reference.describe(),
            self.model.units()
        );

        let mut run = AggregationRun {
            reference_count: tokens.len(),
            ..Default::default()
        };

        for (rank, token) in tokens.into_iter().enumerate() {
            match self.process_token(&token, reference, actual) {
                Ok(diagnostics) => {
                    let entry = run.series.push(token, rank, diagnostics);
                    debug!(
                        "[{}] E_ref={:.6e} E_act={:.6e} max|dr|={:.3e} max|dv|={:.3e}",
                        entry.time_token,
                        entry.reference_energy.total,
                        entry.actual_energy.total,
                        entry.divergence.max_position_error(),
                        entry.divergence.max_velocity_error(),
                    );
                }
                Err(event) => {
                    match event.level() {
                        EventLevel::Warning => warn!("{}", event),
                        EventLevel::Error => error!("{}", event),
                    }
                    run.events.push(event);
                }
            }
        }

        info!(
            "Processed {}/{} timesteps ({} skipped)",
            run.series.len(),
            run.reference_count,
            run.skipped()
        );

        Ok(run)
    }

    /// Computes energies of both snapshots and their divergence.
    pub fn process_pair(
        &self,
        reference: &Snapshot,
        actual: &Snapshot,
    ) -> Result<PairDiagnostics, CompareError> {
        let divergence = divergence::compare(reference, actual)?;

        Ok(PairDiagnostics {
            reference_energy: self.model.energies(reference),
            actual_energy: self.model.energies(actual),
            divergence,
        })
    }

    fn process_token(
        &self,
        token: &TimeToken,
        reference: &dyn SnapshotSource,
        actual: &dyn SnapshotSource,
    ) -> Result<PairDiagnostics, DiagnosticEvent> {
        if !actual.contains(token) {
            return Err(DiagnosticEvent::MissingCounterpart {
                token: token.clone(),
            });
        }

        let reference_snapshot = load(reference, Side::Reference, token)?;
        let actual_snapshot = load(actual, Side::Actual, token)?;

        self.process_pair(&reference_snapshot, &actual_snapshot)
            .map_err(|e| match e {
                CompareError::BodyCountMismatch { reference, actual } => {
                    DiagnosticEvent::BodyCountMismatch {
                        token: token.clone(),
                        reference,
                        actual,
                    }
                }
            })
    }
}

fn load(source: &dyn SnapshotSource, side: Side, token: &TimeToken) -> Result<Snapshot, DiagnosticEvent> {
    let bytes = source
        .read(token)
        .map_err(|e| DiagnosticEvent::SourceUnavailable {
            token: token.clone(),
            side,
            message: e.to_string(),
        })?;

    codec::decode(&bytes).map_err(|error| DiagnosticEvent::Decode {
        token: token.clone(),
        side,
        error,
    })
}
