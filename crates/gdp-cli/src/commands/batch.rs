use anyhow::{anyhow, Result};
use gdp_batch::{jobs_from_cases, load_spec_from_path, run_batch, BatchRunnerConfig};
use gdp_cli::cli::Commands;

use super::solve_options;

pub fn handle(command: &Commands) -> Result<()> {
    let Commands::Batch {
        spec,
        out,
        threads,
        backend,
        time_limit,
        verbose,
    } = command
    else {
        return Err(anyhow!("batch handler called with another command"));
    };

    let experiment = load_spec_from_path(spec)?;
    let cases = experiment.prepare()?;
    let jobs = jobs_from_cases(&cases);
    if jobs.is_empty() {
        return Err(anyhow!("no jobs could be built from {}", spec.display()));
    }

    let config = BatchRunnerConfig {
        output_root: out.clone(),
        threads: *threads,
        backend: *backend,
        options: solve_options(*time_limit, *verbose)?,
    };
    let summary = run_batch(&experiment.name, &jobs, &config)?;
    println!(
        "batch {} -> {}/{} ok/fail, {} mismatched pairs",
        summary.jobs.len(),
        summary.success,
        summary.failure,
        summary.mismatches
    );
    println!("results: {}", summary.results_path.display());
    println!("manifest: {}", summary.manifest_path.display());
    Ok(())
}
