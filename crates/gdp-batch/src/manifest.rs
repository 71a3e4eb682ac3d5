use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::job::BatchJobRecord;

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchManifest {
    pub created_at: DateTime<Utc>,
    pub experiment: String,
    pub backend: String,
    pub num_jobs: usize,
    pub success: usize,
    pub failure: usize,
    pub mismatches: usize,
    pub jobs: Vec<BatchJobRecord>,
}

pub fn write_batch_manifest(path: &Path, manifest: &BatchManifest) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating manifest directory '{}'", parent.display()))?;
    }
    let json =
        serde_json::to_string_pretty(manifest).context("serializing batch manifest to JSON")?;
    fs::write(path, json)
        .with_context(|| format!("writing batch manifest '{}'", path.display()))?;
    Ok(())
}

pub fn load_batch_manifest(path: &Path) -> Result<BatchManifest> {
    let file = fs::File::open(path)
        .with_context(|| format!("opening batch manifest '{}'", path.display()))?;
    serde_json::from_reader(file)
        .with_context(|| format!("parsing batch manifest '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::STATUS_OK;
    use tempfile::tempdir;

    #[test]
    fn manifest_writes_and_reads_back() {
        let record = BatchJobRecord {
            job_id: "myopic:extended-base".into(),
            case: "myopic".into(),
            formulation: "extended-base".into(),
            status: STATUS_OK.into(),
            solve_status: Some("optimal".into()),
            objective: Some(12.5),
            expected_ground_periods: Some(10.5),
            expected_air_periods: Some(1.0),
            expected_diversions: None,
            num_variables: Some(40),
            num_constraints: Some(32),
            solve_time_ms: Some(3),
            error: None,
        };
        let manifest = BatchManifest {
            created_at: Utc::now(),
            experiment: "toy".into(),
            backend: "microlp".into(),
            num_jobs: 1,
            success: 1,
            failure: 0,
            mismatches: 0,
            jobs: vec![record.clone()],
        };
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("batch_manifest.json");
        write_batch_manifest(&path, &manifest).unwrap();
        let parsed = load_batch_manifest(&path).unwrap();
        assert_eq!(parsed.experiment, "toy");
        assert_eq!(parsed.jobs.first().unwrap().job_id, record.job_id);
        assert_eq!(parsed.jobs[0].objective, Some(12.5));
    }
}
