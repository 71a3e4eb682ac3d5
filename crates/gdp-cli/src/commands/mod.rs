pub mod batch;
pub mod scenarios;
pub mod solve;

use gdp_algo::SolveOptions;
use std::time::Duration;

/// Solver options from the shared `--time-limit` / `--verbose` flags.
pub fn solve_options(time_limit: Option<f64>, verbose: bool) -> anyhow::Result<SolveOptions> {
    let mut options = SolveOptions::default().with_verbose(verbose);
    if let Some(secs) = time_limit {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(anyhow::anyhow!("--time-limit must be positive, got {secs}"));
        }
        options = options.with_time_limit(Duration::from_secs_f64(secs));
    }
    Ok(options)
}
