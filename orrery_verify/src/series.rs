//! Diagnostic Series - the ordered output of a verification pass.
//!
//! Entries are appended in reference token order and never reordered. An
//! entry's `index` is its chronological rank among *processed* timesteps;
//! when timesteps were skipped it no longer maps linearly to time, which is
//! why every entry also keeps its time token and its rank in the reference
//! listing.

use crate::events::Side;
use orrery_core::{Divergence, Energies};
use orrery_env::TimeToken;
use serde::Serialize;

/// Diagnostics computed for one matched snapshot pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairDiagnostics {
    pub reference_energy: Energies,
    pub actual_energy: Energies,
    pub divergence: Divergence,
}

/// One processed timestep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesEntry {
    /// Position in the series
    pub index: usize,

    /// Position in the reference source listing
    pub reference_rank: usize,

    pub time_token: TimeToken,
    pub reference_energy: Energies,
    pub actual_energy: Energies,

    #[serde(flatten)]
    pub divergence: Divergence,
}

impl SeriesEntry {
    /// Energies of one side.
    pub fn energy(&self, side: Side) -> &Energies {
        match side {
            Side::Reference => &self.reference_energy,
            Side::Actual => &self.actual_energy,
        }
    }

    pub fn position_errors(&self) -> &[f64] {
        &self.divergence.position_errors
    }

    pub fn velocity_errors(&self) -> &[f64] {
        &self.divergence.velocity_errors
    }
}

/// Append-only, time-ordered collection of [`SeriesEntry`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DiagnosticSeries {
    entries: Vec<SeriesEntry>,
}

impl DiagnosticSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the next processed timestep and returns it.
    pub fn push(
        &mut self,
        time_token: TimeToken,
        reference_rank: usize,
        diagnostics: PairDiagnostics,
    ) -> &SeriesEntry {
        let index = self.entries.len();
        self.entries.push(SeriesEntry {
            index,
            reference_rank,
            time_token,
            reference_energy: diagnostics.reference_energy,
            actual_energy: diagnostics.actual_energy,
            divergence: diagnostics.divergence,
        });
        &self.entries[index]
    }

    pub fn entries(&self) -> &[SeriesEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SeriesEntry> {
        self.entries.get(index)
    }

    pub fn first(&self) -> Option<&SeriesEntry> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&SeriesEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SeriesEntry> {
        self.entries.iter()
    }

    /// Time tokens of all processed timesteps, in order.
    pub fn tokens(&self) -> Vec<&TimeToken> {
        self.entries.iter().map(|e| &e.time_token).collect()
    }

    /// Mean kinetic, potential and total energy of one side.
    ///
    /// `None` when no timestep was processed.
    pub fn mean_energies(&self, side: Side) -> Option<Energies> {
        if self.entries.is_empty() {
            return None;
        }
        let sum: Energies = self.entries.iter().map(|e| *e.energy(side)).sum();
        Some(sum / self.entries.len() as f64)
    }

    /// Relative total-energy drift of one side from the first to the last entry.
    pub fn energy_drift(&self, side: Side) -> Option<f64> {
        let first = self.first()?.energy(side);
        let last = self.last()?.energy(side);
        Some(last.relative_drift(first))
    }
}

impl<'a> IntoIterator for &'a DiagnosticSeries {
    type Item = &'a SeriesEntry;
    type IntoIter = std::slice::Iter<'a, SeriesEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
