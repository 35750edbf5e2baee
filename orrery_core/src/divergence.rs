//! Divergence Comparator - per-body distance between two snapshots.
//!
//! Bodies are matched by index only. Producers are expected to keep a stable
//! body order across sources; no matching by mass, label or proximity is
//! attempted.

use crate::body::Snapshot;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from comparing two snapshots.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CompareError {
    #[error("Body count mismatch: reference has {reference}, actual has {actual}")]
    BodyCountMismatch { reference: usize, actual: usize },
}

/// Per-body position and velocity errors for one matched timestep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Divergence {
    /// `|reference[i].position - actual[i].position|`
    pub position_errors: Vec<f64>,

    /// `|reference[i].velocity - actual[i].velocity|`
    pub velocity_errors: Vec<f64>,
}

impl Divergence {
    /// Number of bodies compared.
    pub fn len(&self) -> usize {
        self.position_errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position_errors.is_empty()
    }

    /// Largest position error, 0 for an empty comparison.
    pub fn max_position_error(&self) -> f64 {
        max_of(&self.position_errors)
    }

    /// Largest velocity error, 0 for an empty comparison.
    pub fn max_velocity_error(&self) -> f64 {
        max_of(&self.velocity_errors)
    }

    /// Root mean square of the position errors.
    pub fn rms_position_error(&self) -> f64 {
        rms_of(&self.position_errors)
    }

    /// Root mean square of the velocity errors.
    pub fn rms_velocity_error(&self) -> f64 {
        rms_of(&self.velocity_errors)
    }

    /// Index of the body with the largest position error.
    pub fn worst_body(&self) -> Option<usize> {
        self.position_errors
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(index, _)| index)
    }
}

/// Compares two snapshots body-by-body.
pub fn compare(reference: &Snapshot, actual: &Snapshot) -> Result<Divergence, CompareError> {
    if reference.len() != actual.len() {
        return Err(CompareError::BodyCountMismatch {
            reference: reference.len(),
            actual: actual.len(),
        });
    }

    let (position_errors, velocity_errors) = reference
        .iter()
        .zip(actual.iter())
        .map(|(r, a)| {
            (
                distance(r.position(), a.position()),
                distance(r.velocity(), a.velocity()),
            )
        })
        .unzip();

    Ok(Divergence {
        position_errors,
        velocity_errors,
    })
}

/// Euclidean distance between two vectors.
///
/// The difference is scaled by its largest component before the norm is taken,
/// so distinct vectors never come out as 0 and finite distances stay finite.
pub fn distance(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let delta = a - b;
    let scale = delta.amax();
    if scale == 0.0 || !scale.is_finite() {
        return scale;
    }
    scale * (delta / scale).norm()
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(0.0, f64::max)
}

fn rms_of(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum_squared: f64 = values.iter().map(|v| v * v).sum();
    (sum_squared / values.len() as f64).sqrt()
}
