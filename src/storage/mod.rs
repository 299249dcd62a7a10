use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::core::errors::PipelineError;
use crate::core::models::{ClassificationResult, ScanRecord};

pub const SCAN_RESULTS_FILE: &str = "initial_scan_results.csv";

/// Creates the timestamped run directory under `base` for one pipeline
/// execution. Run directories are never deleted by this system.
pub fn create_run_dir(base: &Path) -> std::io::Result<PathBuf> {
    let name = format!("scan_{}", Local::now().format("%Y-%m-%d_%H-%M-%S"));
    let dir = base.join(name);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn scan_file_path(dir: &Path) -> PathBuf {
    dir.join(SCAN_RESULTS_FILE)
}

/// Overwrites the canonical scan file with the full record set for one call.
pub fn write_scan_csv(records: &[ScanRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads canonical records back. A missing file is an explicit user-facing
/// error carrying the offending path.
pub fn read_scan_csv(path: &Path) -> Result<Vec<ScanRecord>, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::MissingScanFile {
            path: path.to_path_buf(),
        });
    }
    let mut reader = csv::Reader::from_path(path).map_err(|err| PipelineError::Storage {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: ScanRecord = row.map_err(|err| PipelineError::Storage {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Persists one backend's result artifact as pretty-printed JSON named by
/// backend identity.
pub fn write_result_artifact(
    result: &ClassificationResult,
    backend_name: &str,
    dir: &Path,
) -> Result<PathBuf> {
    let path = dir.join(format!("{backend_name}_results.json"));
    let body = serde_json::to_string_pretty(result)?;
    atomic_write(&path, body.as_bytes())?;
    Ok(path)
}

fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("invalid path: no parent directory"))?;
    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let tmp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("failed to create {}", tmp_path.display()))?;
    file.write_all(content)
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;
    file.sync_all()?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to rename {} to {}", tmp_path.display(), path.display()))?;
    Ok(())
}
