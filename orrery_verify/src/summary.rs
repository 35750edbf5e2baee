//! Run summary and acceptance check.

use crate::aggregator::AggregationRun;
use crate::config::Tolerances;
use crate::events::Side;
use orrery_core::Energies;
use serde::Serialize;

/// Aggregate figures for a whole verification run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationSummary {
    /// Units listed by the reference source
    pub reference_count: usize,
    /// Timesteps in the series
    pub processed: usize,
    /// Timesteps skipped, any cause
    pub skipped: usize,
    pub missing_counterparts: usize,
    pub decode_failures: usize,
    pub count_mismatches: usize,

    pub mean_reference_energy: Option<Energies>,
    pub mean_actual_energy: Option<Energies>,

    /// Relative total-energy change from first to last processed timestep
    pub reference_energy_drift: Option<f64>,
    pub actual_energy_drift: Option<f64>,

    /// Largest per-body errors over the whole run
    pub max_position_error: f64,
    pub max_velocity_error: f64,

    /// Body index and time token where the largest position error occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worst_body: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worst_token: Option<String>,

    /// RMS errors at the last processed timestep
    pub final_rms_position_error: Option<f64>,
    pub final_rms_velocity_error: Option<f64>,
}

impl VerificationSummary {
    /// Reduces a finished run.
    pub fn from_run(run: &AggregationRun) -> Self {
        let series = &run.series;

        let mut max_position_error = 0.0;
        let mut max_velocity_error: f64 = 0.0;
        let mut worst_body = None;
        let mut worst_token = None;

        for entry in series {
            let divergence = &entry.divergence;
            if let Some(body) = divergence.worst_body() {
                if worst_body.is_none() || divergence.max_position_error() > max_position_error {
                    max_position_error = divergence.max_position_error();
                    worst_body = Some(body);
                    worst_token = Some(entry.time_token.to_string());
                }
            }
            max_velocity_error = max_velocity_error.max(divergence.max_velocity_error());
        }

        let last = series.last();

        Self {
            reference_count: run.reference_count,
            processed: series.len(),
            skipped: run.skipped(),
            missing_counterparts: run.events_of_kind("missing_counterpart").count(),
            decode_failures: run.events_of_kind("decode").count()
                + run.events_of_kind("source_unavailable").count(),
            count_mismatches: run.events_of_kind("body_count_mismatch").count(),
            mean_reference_energy: series.mean_energies(Side::Reference),
            mean_actual_energy: series.mean_energies(Side::Actual),
            reference_energy_drift: series.energy_drift(Side::Reference),
            actual_energy_drift: series.energy_drift(Side::Actual),
            max_position_error,
            max_velocity_error,
            worst_body,
            worst_token,
            final_rms_position_error: last.map(|e| e.divergence.rms_position_error()),
            final_rms_velocity_error: last.map(|e| e.divergence.rms_velocity_error()),
        }
    }

    /// Reasons the run fails the given tolerances; empty when it passes.
    pub fn failures(&self, tolerances: &Tolerances) -> Vec<String> {
        let mut reasons = Vec::new();

        if self.processed == 0 {
            reasons.push("no timesteps were processed".to_string());
        }

        if self.max_position_error > tolerances.max_position_error {
            reasons.push(format!(
                "max position error {:.3e} exceeds {:.3e}",
                self.max_position_error, tolerances.max_position_error
            ));
        }

        if let Some(drift) = self.actual_energy_drift {
            if drift.abs() > tolerances.max_energy_drift {
                reasons.push(format!(
                    "energy drift {:.3e} exceeds {:.3e}",
                    drift, tolerances.max_energy_drift
                ));
            }
        }

        reasons
    }

    /// Check if the run passes the acceptance criteria
    pub fn passes(&self, tolerances: &Tolerances) -> bool {
        self.failures(tolerances).is_empty()
    }

    /// Print formatted summary to console
    pub fn print(&self) {
        println!();
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║               ORRERY VERIFICATION SUMMARY                    ║");
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ Reference Snapshots:   {:>10}                            ║", self.reference_count);
        println!("║ Processed:             {:>10}                            ║", self.processed);
        println!("║ Missing Counterpart:   {:>10}                            ║", self.missing_counterparts);
        println!("║ Decode Failures:       {:>10}                            ║", self.decode_failures);
        println!("║ Count Mismatches:      {:>10}                            ║", self.count_mismatches);
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ DIVERGENCE                                                   ║");
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ Max Position Error:    {:>14.6e}                        ║", self.max_position_error);
        println!("║ Max Velocity Error:    {:>14.6e}                        ║", self.max_velocity_error);
        if let (Some(body), Some(token)) = (self.worst_body, &self.worst_token) {
            println!("║ Worst Body:            {:>10} @ {:<16}           ║", body, token);
        }
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ ENERGY (mean)         reference           actual             ║");
        println!("╠══════════════════════════════════════════════════════════════╣");
        if let (Some(r), Some(a)) = (self.mean_reference_energy, self.mean_actual_energy) {
            println!("║ Kinetic:           {:>14.6e}   {:>14.6e}          ║", r.kinetic, a.kinetic);
            println!("║ Potential:         {:>14.6e}   {:>14.6e}          ║", r.potential, a.potential);
            println!("║ Total:             {:>14.6e}   {:>14.6e}          ║", r.total, a.total);
        }
        if let (Some(r), Some(a)) = (self.reference_energy_drift, self.actual_energy_drift) {
            println!("║ Drift (rel):       {:>14.6e}   {:>14.6e}          ║", r, a);
        }
        println!("╚══════════════════════════════════════════════════════════════╝");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::DiagnosticEvent;
    use crate::series::PairDiagnostics;
    use orrery_core::Divergence;

    fn pair(total: f64, position_errors: Vec<f64>) -> PairDiagnostics {
        PairDiagnostics {
            reference_energy: Energies::new(0.5, -2.5),
            actual_energy: Energies::new(0.5, total - 0.5),
            divergence: Divergence {
                velocity_errors: position_errors.iter().map(|e| e / 10.0).collect(),
                position_errors,
            },
        }
    }

    fn sample_run() -> AggregationRun {
        let mut run = AggregationRun {
            reference_count: 4,
            ..Default::default()
        };
        run.series.push("0.0".into(), 0, pair(-2.0, vec![0.0, 0.001]));
        run.series.push("0.2".into(), 2, pair(-2.0002, vec![0.004, 0.002]));
        run.series.push("0.3".into(), 3, pair(-2.0004, vec![0.001, 0.003]));
        run.events.push(DiagnosticEvent::MissingCounterpart { token: "0.1".into() });
        run
    }

    #[test]
    fn test_summary_reduction() {
        let summary = VerificationSummary::from_run(&sample_run());

        assert_eq!(summary.reference_count, 4);
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.missing_counterparts, 1);
        assert_eq!(summary.decode_failures, 0);

        assert_eq!(summary.max_position_error, 0.004);
        assert_eq!(summary.worst_body, Some(0));
        assert_eq!(summary.worst_token.as_deref(), Some("0.2"));
        assert!((summary.max_velocity_error - 0.0004).abs() < 1e-15);

        let drift = summary.actual_energy_drift.unwrap();
        assert!((drift + 2.0e-4).abs() < 1e-9);
        assert_eq!(summary.reference_energy_drift, Some(0.0));
    }

    #[test]
    fn test_tolerances() {
        let summary = VerificationSummary::from_run(&sample_run());

        let loose = Tolerances { max_position_error: 0.01, max_energy_drift: 1e-3 };
        assert!(summary.passes(&loose));

        let tight = Tolerances { max_position_error: 0.001, max_energy_drift: 1e-5 };
        let failures = summary.failures(&tight);
        assert_eq!(failures.len(), 2);
        assert!(failures[0].starts_with("max position error"));
    }

    #[test]
    fn test_empty_run_fails() {
        let summary = VerificationSummary::from_run(&AggregationRun::default());
        assert_eq!(summary.mean_actual_energy, None);
        assert!(!summary.passes(&Tolerances::default()));
    }
}
