//! Reporting and export — JSON and CSV artifact generation.
//!
//! Two export formats for generation reports:
//! - **JSON**: full round-trip serialization with schema versioning, plus a
//!   flat spec listing for downstream consumers
//! - **CSV**: per-interaction summary for external analysis tools
//!
//! All persisted artifacts include a `schema_version` field. Unknown versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use thiserror::Error;

use vizgen_core::domain::Spec;

use crate::runner::{GenerationReport, SCHEMA_VERSION};

/// Errors from export and import.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported schema version {found} (max supported: {max})")]
    UnsupportedSchemaVersion { found: u32, max: u32 },
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV writer flush failed")]
    CsvFlush,
    #[error("CSV output is not valid UTF-8")]
    CsvUtf8,
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `GenerationReport` to pretty JSON.
pub fn export_json(report: &GenerationReport) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Deserialize a `GenerationReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<GenerationReport, ExportError> {
    let report: GenerationReport = serde_json::from_str(json)?;
    if report.schema_version > SCHEMA_VERSION {
        return Err(ExportError::UnsupportedSchemaVersion {
            found: report.schema_version,
            max: SCHEMA_VERSION,
        });
    }
    Ok(report)
}

/// Serialize the accepted specs as a flat JSON array, dropping run metadata.
///
/// This is the hand-off format: each element is one renderable spec.
pub fn export_specs_json(report: &GenerationReport) -> Result<String, ExportError> {
    let specs: Vec<&Spec> = report.accepted_specs().collect();
    Ok(serde_json::to_string_pretty(&specs)?)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the per-interaction summary as CSV.
///
/// Columns: interaction, seed, leaves, accepted, rejected
pub fn export_summary_csv(report: &GenerationReport) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["interaction", "seed", "leaves", "accepted", "rejected"])?;
    for record in &report.interactions {
        wtr.write_record([
            record.index.to_string(),
            record.seed.to_string(),
            record.leaves.to_string(),
            record.accepted.to_string(),
            record.rejected().to_string(),
        ])?;
    }

    let data = wtr.into_inner().map_err(|_| ExportError::CsvFlush)?;
    String::from_utf8(data).map_err(|_| ExportError::CsvUtf8)
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a generation run.
///
/// Creates a directory named `{run_id_prefix}_{timestamp}/` under
/// `output_dir` containing:
/// - `manifest.json` — the full `GenerationReport`
/// - `specs.json` — accepted specs as a flat array
/// - `summary.csv` — per-interaction counts
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &GenerationReport, output_dir: &Path) -> Result<PathBuf, ExportError> {
    let short_id = &report.run_id[..report.run_id.len().min(8)];
    let dirname = format!(
        "{}_{}",
        short_id,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir).map_err(|source| ExportError::Io {
        path: run_dir.clone(),
        source,
    })?;

    let manifest = export_json(report)?;
    write_file(run_dir.join("manifest.json"), &manifest)?;

    let specs = export_specs_json(report)?;
    write_file(run_dir.join("specs.json"), &specs)?;

    let summary = export_summary_csv(report)?;
    write_file(run_dir.join("summary.csv"), &summary)?;

    Ok(run_dir)
}

/// Load a `GenerationReport` from an artifact directory's manifest.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<GenerationReport, ExportError> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path).map_err(|source| ExportError::Io {
        path: manifest_path,
        source,
    })?;
    import_json(&json)
}

fn write_file(path: PathBuf, content: &str) -> Result<(), ExportError> {
    std::fs::write(&path, content).map_err(|source| ExportError::Io { path, source })
}
