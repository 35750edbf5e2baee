//! Diagnostic events for skipped timesteps.
//!
//! Every reference timestep either becomes a series entry or produces exactly
//! one event explaining why it was skipped.

use orrery_core::CodecError;
use orrery_env::TimeToken;
use serde::{Serialize, Serializer};

/// Which producer a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Reference ephemeris (ground truth)
    Reference,
    /// Simulation under test
    Actual,
}

impl Side {
    pub fn name(&self) -> &'static str {
        match self {
            Side::Reference => "reference",
            Side::Actual => "actual",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Severity of a diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Warning,
    Error,
}

/// Why a reference timestep produced no series entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticEvent {
    /// The actual source has no unit for this token
    MissingCounterpart { token: TimeToken },

    /// A unit is listed but could not be read
    SourceUnavailable {
        token: TimeToken,
        side: Side,
        message: String,
    },

    /// A unit was read but is not a valid snapshot
    Decode {
        token: TimeToken,
        side: Side,
        #[serde(serialize_with = "serialize_display")]
        error: CodecError,
    },

    /// Both snapshots decoded but disagree on body count
    BodyCountMismatch {
        token: TimeToken,
        reference: usize,
        actual: usize,
    },
}

impl DiagnosticEvent {
    /// Time token of the skipped timestep.
    pub fn token(&self) -> &TimeToken {
        match self {
            DiagnosticEvent::MissingCounterpart { token }
            | DiagnosticEvent::SourceUnavailable { token, .. }
            | DiagnosticEvent::Decode { token, .. }
            | DiagnosticEvent::BodyCountMismatch { token, .. } => token,
        }
    }

    /// Missing counterparts are expected when the runs cover different spans;
    /// everything else points at corrupt or inconsistent data.
    pub fn level(&self) -> EventLevel {
        match self {
            DiagnosticEvent::MissingCounterpart { .. } => EventLevel::Warning,
            _ => EventLevel::Error,
        }
    }

    /// Short machine-friendly kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            DiagnosticEvent::MissingCounterpart { .. } => "missing_counterpart",
            DiagnosticEvent::SourceUnavailable { .. } => "source_unavailable",
            DiagnosticEvent::Decode { .. } => "decode",
            DiagnosticEvent::BodyCountMismatch { .. } => "body_count_mismatch",
        }
    }
}

impl std::fmt::Display for DiagnosticEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticEvent::MissingCounterpart { token } => {
                write!(f, "[{}] no actual snapshot for this timestep", token)
            }
            DiagnosticEvent::SourceUnavailable { token, side, message } => {
                write!(f, "[{}] {} snapshot unreadable: {}", token, side, message)
            }
            DiagnosticEvent::Decode { token, side, error } => {
                write!(f, "[{}] {} snapshot rejected: {}", token, side, error)
            }
            DiagnosticEvent::BodyCountMismatch { token, reference, actual } => {
                write!(
                    f,
                    "[{}] body count mismatch: reference {} vs actual {}",
                    token, reference, actual
                )
            }
        }
    }
}

fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: std::fmt::Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        let missing = DiagnosticEvent::MissingCounterpart { token: "0.1".into() };
        let mismatch = DiagnosticEvent::BodyCountMismatch {
            token: "0.2".into(),
            reference: 3,
            actual: 2,
        };

        assert_eq!(missing.level(), EventLevel::Warning);
        assert_eq!(mismatch.level(), EventLevel::Error);
        assert_eq!(mismatch.token().as_str(), "0.2");
        assert_eq!(
            mismatch.to_string(),
            "[0.2] body count mismatch: reference 3 vs actual 2"
        );
    }

    #[test]
    fn test_serialized_shape() {
        let event = DiagnosticEvent::Decode {
            token: "0.3".into(),
            side: Side::Actual,
            error: CodecError::TruncatedInput { expected: 68, actual: 10 },
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "decode");
        assert_eq!(json["token"], "0.3");
        assert_eq!(json["side"], "actual");
        assert_eq!(json["error"], "Truncated input: expected 68 bytes, got 10");
        assert_eq!(event.kind(), "decode");
    }
}
