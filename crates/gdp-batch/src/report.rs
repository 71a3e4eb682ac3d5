//! `results.csv`: one row per job

use crate::job::BatchJobRecord;
use anyhow::{Context, Result};
use std::path::Path;

pub fn write_results_csv(path: &Path, records: &[BatchJobRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating results CSV '{}'", path.display()))?;
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("writing result row for '{}'", record.job_id))?;
    }
    writer.flush().context("flushing results CSV")?;
    Ok(())
}

pub fn load_results_csv(path: &Path) -> Result<Vec<BatchJobRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening results CSV '{}'", path.display()))?;
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: BatchJobRecord = result.context("parsing results row")?;
        rows.push(row);
    }
    Ok(rows)
}
