//! JSON and CSV export for downstream plotting and reporting.
//!
//! - [`SeriesExport`]: one JSON document with the whole run
//! - energy / divergence tables: one CSV row per timestep (and body)
//! - frame table: every decoded snapshot of a source, one row per body

use crate::aggregator::AggregationRun;
use crate::config::Tolerances;
use crate::error::VerifyError;
use crate::events::{DiagnosticEvent, Side};
use crate::series::{DiagnosticSeries, SeriesEntry};
use crate::summary::VerificationSummary;

use orrery_core::{codec, EnergyModel, Snapshot, UnitSystem};
use orrery_env::{SnapshotSource, TimeToken};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Complete verification export.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesExport {
    /// Reference source description
    pub reference: String,

    /// Actual source description
    pub actual: String,

    pub units: UnitSystem,
    pub gravitational_constant: f64,

    /// Processed timesteps
    pub entries: Vec<SeriesEntry>,

    /// Skipped timesteps
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<DiagnosticEvent>,

    pub summary: VerificationSummary,
    pub tolerances: Tolerances,
    pub passed: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failure_reasons: Vec<String>,
}

impl SeriesExport {
    /// Builds an export from a finished run.
    pub fn new(
        run: &AggregationRun,
        model: &EnergyModel,
        reference: &dyn SnapshotSource,
        actual: &dyn SnapshotSource,
        tolerances: Tolerances,
    ) -> Self {
        let summary = VerificationSummary::from_run(run);
        let failure_reasons = summary.failures(&tolerances);

        Self {
            reference: reference.describe(),
            actual: actual.describe(),
            units: model.units(),
            gravitational_constant: model.gravitational_constant(),
            entries: run.series.entries().to_vec(),
            events: run.events.clone(),
            passed: failure_reasons.is_empty(),
            summary,
            tolerances,
            failure_reasons,
        }
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &Path) -> Result<(), VerifyError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path).map_err(|e| VerifyError::export(path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| VerifyError::export(path, e))?;
        Ok(())
    }
}

/// Writes `index,time_token,source,kinetic,potential,total`, two rows per timestep.
pub fn write_energy_csv<W: Write>(series: &DiagnosticSeries, mut out: W) -> std::io::Result<()> {
    writeln!(out, "index,time_token,source,kinetic,potential,total")?;
    for entry in series {
        for side in [Side::Reference, Side::Actual] {
            let e = entry.energy(side);
            writeln!(
                out,
                "{},{},{},{:e},{:e},{:e}",
                entry.index, entry.time_token, side, e.kinetic, e.potential, e.total
            )?;
        }
    }
    out.flush()
}

/// Writes `index,time_token,body,position_error,velocity_error`, one row per body.
pub fn write_divergence_csv<W: Write>(series: &DiagnosticSeries, mut out: W) -> std::io::Result<()> {
    writeln!(out, "index,time_token,body,position_error,velocity_error")?;
    for entry in series {
        let rows = entry.position_errors().iter().zip(entry.velocity_errors());
        for (body, (dr, dv)) in rows.enumerate() {
            writeln!(out, "{},{},{},{:e},{:e}", entry.index, entry.time_token, body, dr, dv)?;
        }
    }
    out.flush()
}

/// Header of the frame table.
pub const FRAME_HEADER: &str =
    "source,frame,time_token,body,pos_x,pos_y,pos_z,vel_x,vel_y,vel_z,mass,radius";

/// Writes one snapshot as frame-table rows (no header).
pub fn write_snapshot_rows<W: Write>(
    out: &mut W,
    side: Side,
    frame: usize,
    token: &TimeToken,
    snapshot: &Snapshot,
) -> std::io::Result<()> {
    for (index, body) in snapshot.iter().enumerate() {
        let [x, y, z, vx, vy, vz, mass, radius] = body.to_record();
        writeln!(
            out,
            "{},{},{},{},{:e},{:e},{:e},{:e},{:e},{:e},{:e},{:e}",
            side, frame, token, index, x, y, z, vx, vy, vz, mass, radius
        )?;
    }
    Ok(())
}

/// Dumps every decodable snapshot of a source into the frame table.
///
/// Undecodable units are logged and left out; `frame` is the unit's rank in
/// the source listing, so gaps show where units were dropped. Returns the
/// number of frames written.
pub fn write_frames_csv<W: Write>(
    source: &dyn SnapshotSource,
    side: Side,
    out: &mut W,
) -> Result<usize, VerifyError> {
    let mut written = 0;
    for (frame, token) in source.tokens()?.iter().enumerate() {
        let snapshot = match source.read(token) {
            Ok(bytes) => codec::decode(&bytes).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match snapshot {
            Ok(snapshot) => {
                write_snapshot_rows(out, side, frame, token, &snapshot)
                    .map_err(|e| VerifyError::export(Path::new("<frames>"), e))?;
                written += 1;
            }
            Err(reason) => warn!("[{}] {} frame left out of table: {}", token, side, reason),
        }
    }
    Ok(written)
}

/// Writes `energy.csv`, `divergence.csv` and `frames.csv` into `dir`.
pub fn write_csv_tables(
    dir: &Path,
    series: &DiagnosticSeries,
    reference: &dyn SnapshotSource,
    actual: &dyn SnapshotSource,
) -> Result<Vec<PathBuf>, VerifyError> {
    std::fs::create_dir_all(dir).map_err(|e| VerifyError::export(dir, e))?;

    let energy_path = dir.join("energy.csv");
    write_energy_csv(series, BufWriter::new(create(&energy_path)?))
        .map_err(|e| VerifyError::export(&energy_path, e))?;

    let divergence_path = dir.join("divergence.csv");
    write_divergence_csv(series, BufWriter::new(create(&divergence_path)?))
        .map_err(|e| VerifyError::export(&divergence_path, e))?;

    let frames_path = dir.join("frames.csv");
    let mut frames = BufWriter::new(create(&frames_path)?);
    writeln!(frames, "{}", FRAME_HEADER).map_err(|e| VerifyError::export(&frames_path, e))?;
    let reference_frames = write_frames_csv(reference, Side::Reference, &mut frames)?;
    let actual_frames = write_frames_csv(actual, Side::Actual, &mut frames)?;
    frames.flush().map_err(|e| VerifyError::export(&frames_path, e))?;

    info!(
        "Wrote CSV tables to {} ({} timesteps, {}+{} frames)",
        dir.display(),
        series.len(),
        reference_frames,
        actual_frames
    );

    Ok(vec![energy_path, divergence_path, frames_path])
}

fn create(path: &Path) -> Result<File, VerifyError> {
    File::create(path).map_err(|e| VerifyError::export(path, e))
}
