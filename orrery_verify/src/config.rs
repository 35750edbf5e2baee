//! Verification run configuration.

use crate::error::VerifyError;
use orrery_core::{EnergyModel, UnitSystem};
use orrery_env::DEFAULT_EXTENSION;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Acceptance thresholds for a verification run.
///
/// Values are plain numbers in the length unit of the configured
/// [`UnitSystem`]; they are never converted. The default position tolerance
/// of `0.01` is sized for astronomical units (0.01 AU). Under `si` the same
/// number means 1 cm, so runs in other units should set it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Largest per-body position error allowed at any timestep, in the
    /// configured length unit
    pub max_position_error: f64,

    /// Largest relative total-energy drift of the actual source over the run
    pub max_energy_drift: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            max_position_error: 1.0e-2,
            max_energy_drift: 1.0e-3,
        }
    }
}

/// Configuration for a verification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Directory of reference (ephemeris) snapshots
    pub reference_dir: PathBuf,

    /// Directory of actual (simulation) snapshots
    pub actual_dir: PathBuf,

    /// Snapshot file extension, without the dot
    pub extension: String,

    /// Unit system of both sources
    pub units: UnitSystem,

    /// Pass/fail thresholds, in the units above
    pub tolerances: Tolerances,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            reference_dir: PathBuf::from("input/jpl_horizons"),
            actual_dir: PathBuf::from("output/snapshots"),
            extension: DEFAULT_EXTENSION.to_string(),
            units: UnitSystem::Astronomical,
            tolerances: Tolerances::default(),
        }
    }
}

impl VerifyConfig {
    /// Parses a JSON config; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, VerifyError> {
        let config: VerifyConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self, VerifyError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| VerifyError::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<(), VerifyError> {
        let g = self.units.gravitational_constant();
        if !g.is_finite() || g <= 0.0 {
            return Err(VerifyError::config(format!(
                "gravitational constant must be finite and positive, got {}",
                g
            )));
        }

        if self.extension.contains(['/', '\\']) {
            return Err(VerifyError::config(format!(
                "extension must not contain path separators: {:?}",
                self.extension
            )));
        }

        let non_negative = |v: f64| v >= 0.0;
        let Tolerances { max_position_error, max_energy_drift } = self.tolerances;
        if !non_negative(max_position_error) || !non_negative(max_energy_drift) {
            return Err(VerifyError::config("tolerances must be non-negative"));
        }

        Ok(())
    }

    /// Energy model for the configured unit system.
    pub fn energy_model(&self) -> EnergyModel {
        EnergyModel::new(self.units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = VerifyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.extension, "bin");
        assert_eq!(config.units, UnitSystem::Astronomical);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = VerifyConfig::from_json_str(
            r#"{
                "reference_dir": "ref",
                "units": { "kind": "custom", "g": 1.0 },
                "tolerances": { "max_position_error": 0.5 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.reference_dir, PathBuf::from("ref"));
        assert_eq!(config.actual_dir, PathBuf::from("output/snapshots"));
        assert_eq!(config.energy_model().gravitational_constant(), 1.0);
        assert_eq!(config.tolerances.max_position_error, 0.5);
        assert_eq!(config.tolerances.max_energy_drift, 1.0e-3);
    }

    #[test]
    fn test_tolerances_are_not_rescaled_by_units() {
        let si = VerifyConfig::from_json_str(r#"{ "units": { "kind": "si" } }"#).unwrap();
        assert_eq!(si.tolerances, Tolerances::default());
        assert_eq!(si.tolerances.max_position_error, 1.0e-2);

        let si_metres = VerifyConfig::from_json_str(
            r#"{ "units": { "kind": "si" }, "tolerances": { "max_position_error": 1.5e9 } }"#,
        )
        .unwrap();
        assert_eq!(si_metres.tolerances.max_position_error, 1.5e9);
        assert_eq!(si_metres.tolerances.max_energy_drift, 1.0e-3);
    }

    #[test]
    fn test_rejects_bad_gravity() {
        let result = VerifyConfig::from_json_str(r#"{ "units": { "kind": "custom", "g": -1.0 } }"#);
        assert!(matches!(result, Err(VerifyError::Config(_))));
    }

    #[test]
    fn test_rejects_bad_extension_and_tolerances() {
        let mut config = VerifyConfig::default();
        config.extension = "../bin".to_string();
        assert!(config.validate().is_err());

        let mut config = VerifyConfig::default();
        config.tolerances.max_energy_drift = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            VerifyConfig::from_json_str("{ not json"),
            Err(VerifyError::Json(_))
        ));
    }
}
