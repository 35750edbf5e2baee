//! Orrery verification CLI
//!
//! Compares a directory of simulated snapshots against a directory of
//! reference ephemeris snapshots and reports energy and divergence.

use anyhow::Context;
use clap::Parser;
use orrery_core::UnitSystem;
use orrery_env::DirectorySource;
use orrery_verify::exporter;
use orrery_verify::{SeriesAggregator, SeriesExport, VerificationSummary, VerifyConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Orrery snapshot verification
#[derive(Parser, Debug)]
#[command(name = "orrery-verify")]
#[command(about = "Verify simulated N-body snapshots against a reference ephemeris", long_about = None)]
struct Args {
    /// JSON config file (flags below override its values)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of reference snapshots
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Directory of simulated snapshots
    #[arg(short, long)]
    actual: Option<PathBuf>,

    /// Snapshot file extension
    #[arg(long)]
    extension: Option<String>,

    /// Unit system (astronomical, si, natural)
    #[arg(short, long)]
    units: Option<UnitSystem>,

    /// Explicit gravitational constant (overrides --units)
    #[arg(long)]
    gravity: Option<f64>,

    /// Maximum allowed per-body position error, in the length unit of --units
    /// (default 0.01, sized for AU)
    #[arg(long)]
    max_position_error: Option<f64>,

    /// Maximum allowed relative energy drift of the simulation
    #[arg(long)]
    max_energy_drift: Option<f64>,

    /// Export the full series to a JSON file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Write energy, divergence and frame CSV tables into this directory
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Print the summary as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Loads `--config` (or the defaults), then applies the flags on top.
    fn resolve_config(&self) -> anyhow::Result<VerifyConfig> {
        let config = match &self.config {
            Some(path) => VerifyConfig::from_json_file(path)?,
            None => VerifyConfig::default(),
        };
        self.apply_overrides(config)
    }

    /// Flags win over file values; `--gravity` wins over `--units`.
    fn apply_overrides(&self, mut config: VerifyConfig) -> anyhow::Result<VerifyConfig> {
        if let Some(reference) = &self.reference {
            config.reference_dir = reference.clone();
        }
        if let Some(actual) = &self.actual {
            config.actual_dir = actual.clone();
        }
        if let Some(extension) = &self.extension {
            config.extension = extension.trim_start_matches('.').to_string();
        }
        if let Some(units) = self.units {
            config.units = units;
        }
        if let Some(g) = self.gravity {
            config.units = UnitSystem::Custom { g };
        }
        if let Some(max) = self.max_position_error {
            config.tolerances.max_position_error = max;
        }
        if let Some(max) = self.max_energy_drift {
            config.tolerances.max_energy_drift = max;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    // Logs go to stderr so --json output stays machine-readable
    let result = if std::env::var_os("RUST_LOG").is_some() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let level = if verbose { Level::DEBUG } else { Level::INFO };
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };

    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Returns whether the run passed its tolerances.
fn run(args: &Args) -> anyhow::Result<bool> {
    let config = args.resolve_config()?;

    let reference = DirectorySource::with_extension(&config.reference_dir, &config.extension);
    let actual = DirectorySource::with_extension(&config.actual_dir, &config.extension);

    let aggregator = SeriesAggregator::new(config.energy_model());
    let run = aggregator
        .run(&reference, &actual)
        .with_context(|| format!("cannot list reference snapshots in {}", config.reference_dir.display()))?;

    let summary = VerificationSummary::from_run(&run);
    let failures = summary.failures(&config.tolerances);

    if let Some(path) = &args.export {
        let export = SeriesExport::new(&run, aggregator.model(), &reference, &actual, config.tolerances);
        export.write_to_file(path)?;
        info!("Exported {} timesteps to {}", export.entries.len(), path.display());
    }

    if let Some(dir) = &args.csv_dir {
        exporter::write_csv_tables(dir, &run.series, &reference, &actual)?;
    }

    if args.json {
        let report = serde_json::json!({
            "passed": failures.is_empty(),
            "failure_reasons": failures,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        summary.print();
        if failures.is_empty() {
            info!("✓ Verification passed");
        } else {
            for reason in &failures {
                error!("✗ {}", reason);
            }
        }
    }

    Ok(failures.is_empty())
}

/// 0 when the run passed, 1 when it failed its tolerances, 2 on a fatal error.
fn exit_status(outcome: &anyhow::Result<bool>) -> u8 {
    match outcome {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(_) => 2,
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let outcome = run(&args);
    if let Err(e) = &outcome {
        error!("{:#}", e);
    }
    ExitCode::from(exit_status(&outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use orrery_core::{Body, Snapshot};
    use orrery_env::TimeToken;
    use std::path::Path;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("orrery-verify").chain(args.iter().copied())).unwrap()
    }

    fn write_config(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("verify.json");
        std::fs::write(&path, json).unwrap();
        path
    }

    fn two_bodies(offset: f64) -> Snapshot {
        Snapshot::new(vec![
            Body::new(Vector3::zeros(), Vector3::zeros(), 1.0, 0.0).unwrap(),
            Body::new(Vector3::new(1.0 + offset, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0), 1.0e-6, 0.0)
                .unwrap(),
        ])
        .unwrap()
    }

    /// Writes identical reference and actual series except for `offset` on the last step.
    fn fixture(root: &Path, offset: f64) -> (PathBuf, PathBuf) {
        let reference = DirectorySource::new(root.join("reference"));
        let actual = DirectorySource::new(root.join("actual"));
        for (i, token) in ["0.0", "0.1", "0.2"].iter().enumerate() {
            let token = TimeToken::from(*token);
            reference.write_snapshot(&token, &two_bodies(0.0)).unwrap();
            let shift = if i == 2 { offset } else { 0.0 };
            actual.write_snapshot(&token, &two_bodies(shift)).unwrap();
        }
        (reference.root().to_path_buf(), actual.root().to_path_buf())
    }

    #[test]
    fn test_defaults_without_config_or_flags() {
        let config = parse(&[]).resolve_config().unwrap();
        assert_eq!(config, VerifyConfig::default());
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            temp_dir.path(),
            r#"{
                "reference_dir": "from_file/ref",
                "actual_dir": "from_file/act",
                "units": { "kind": "si" },
                "tolerances": { "max_position_error": 0.5, "max_energy_drift": 0.2 }
            }"#,
        );
        let path = path.to_str().unwrap();

        let file_only = parse(&["--config", path]).resolve_config().unwrap();
        assert_eq!(file_only.reference_dir, PathBuf::from("from_file/ref"));
        assert_eq!(file_only.units, UnitSystem::Si);
        assert_eq!(file_only.tolerances.max_position_error, 0.5);

        let overridden = parse(&[
            "--config",
            path,
            "--reference",
            "cli/ref",
            "--units",
            "natural",
            "--extension",
            ".dat",
            "--max-position-error",
            "0.25",
        ])
        .resolve_config()
        .unwrap();
        assert_eq!(overridden.reference_dir, PathBuf::from("cli/ref"));
        assert_eq!(overridden.actual_dir, PathBuf::from("from_file/act"));
        assert_eq!(overridden.units, UnitSystem::Natural);
        assert_eq!(overridden.extension, "dat");
        assert_eq!(overridden.tolerances.max_position_error, 0.25);
        assert_eq!(overridden.tolerances.max_energy_drift, 0.2);
    }

    #[test]
    fn test_gravity_wins_over_units() {
        let config = parse(&["--units", "si", "--gravity", "2.5"]).resolve_config().unwrap();
        assert_eq!(config.units, UnitSystem::Custom { g: 2.5 });
        assert_eq!(config.energy_model().gravitational_constant(), 2.5);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        assert!(parse(&["--gravity=-1"]).resolve_config().is_err());
        assert!(parse(&["--max-energy-drift=-0.1"]).resolve_config().is_err());
    }

    #[test]
    fn test_exit_status_of_passing_run() {
        let temp_dir = TempDir::new().unwrap();
        let (reference, actual) = fixture(temp_dir.path(), 0.0);
        let args = parse(&[
            "--reference",
            reference.to_str().unwrap(),
            "--actual",
            actual.to_str().unwrap(),
            "--json",
        ]);

        assert_eq!(exit_status(&run(&args)), 0);
    }

    #[test]
    fn test_exit_status_of_failing_run() {
        let temp_dir = TempDir::new().unwrap();
        let (reference, actual) = fixture(temp_dir.path(), 0.5);
        let args = parse(&[
            "--reference",
            reference.to_str().unwrap(),
            "--actual",
            actual.to_str().unwrap(),
            "--json",
        ]);

        assert_eq!(exit_status(&run(&args)), 1);
    }

    #[test]
    fn test_exit_status_of_fatal_run() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("no_such_dir");
        let args = parse(&["--reference", missing.to_str().unwrap(), "--json"]);

        assert_eq!(exit_status(&run(&args)), 2);

        let bad_config = parse(&["--max-position-error=-1"]);
        assert_eq!(exit_status(&run(&bad_config)), 2);
    }
}
