use crate::job::{BatchJob, BatchJobRecord, STATUS_ERROR, STATUS_MISMATCH, STATUS_OK};
use crate::manifest::{write_batch_manifest, BatchManifest};
use crate::report::write_results_csv;
use anyhow::{Context, Result};
use chrono::Utc;
use gdp_algo::{build_model, BackendKind, PlanSummary, SolveOptions, SolveStatus};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, warn};

/// Relative objective tolerance between equivalent formulations.
pub const CROSS_CHECK_TOLERANCE: f64 = 1e-3;

pub struct BatchRunnerConfig {
    pub output_root: PathBuf,
    /// Worker threads; 0 uses every core.
    pub threads: usize,
    pub backend: BackendKind,
    pub options: SolveOptions,
}

/// Counts and output locations of a finished batch.
pub struct BatchSummary {
    pub success: usize,
    pub failure: usize,
    /// Pairs of equivalent formulations whose optima disagree.
    pub mismatches: usize,
    pub manifest_path: PathBuf,
    pub results_path: PathBuf,
    pub jobs: Vec<BatchJobRecord>,
}

pub fn run_batch(
    experiment: &str,
    jobs: &[BatchJob],
    config: &BatchRunnerConfig,
) -> Result<BatchSummary> {
    fs::create_dir_all(&config.output_root).with_context(|| {
        format!(
            "creating batch output root '{}'",
            config.output_root.display()
        )
    })?;

    let thread_count = if config.threads == 0 {
        num_cpus::get()
    } else {
        config.threads
    };
    let pool = ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .context("building Rayon thread pool for batch runs")?;

    info!(
        experiment,
        jobs = jobs.len(),
        threads = thread_count,
        backend = %config.backend,
        "starting batch"
    );
    let mut records: Vec<BatchJobRecord> =
        pool.install(|| jobs.par_iter().map(|job| run_job(job, config)).collect());

    let mismatches = cross_check(jobs, &mut records);
    let success = records.iter().filter(|record| record.is_success()).count();
    let failure = records.len() - success;

    let results_path = config.output_root.join("results.csv");
    write_results_csv(&results_path, &records)?;

    let manifest = BatchManifest {
        created_at: Utc::now(),
        experiment: experiment.to_string(),
        backend: config.backend.as_str().to_string(),
        num_jobs: records.len(),
        success,
        failure,
        mismatches,
        jobs: records.clone(),
    };
    let manifest_path = config.output_root.join("batch_manifest.json");
    write_batch_manifest(&manifest_path, &manifest)?;

    info!(success, failure, mismatches, "batch finished");
    Ok(BatchSummary {
        success,
        failure,
        mismatches,
        manifest_path,
        results_path,
        jobs: records,
    })
}

fn run_job(job: &BatchJob, config: &BatchRunnerConfig) -> BatchJobRecord {
    let mut record = BatchJobRecord {
        job_id: job.job_id.clone(),
        case: job.case.name.clone(),
        formulation: job.formulation.as_str().to_string(),
        status: STATUS_OK.to_string(),
        solve_status: None,
        objective: None,
        expected_ground_periods: None,
        expected_air_periods: None,
        expected_diversions: None,
        num_variables: None,
        num_constraints: None,
        solve_time_ms: None,
        error: None,
    };
    let started = Instant::now();

    let mut runner = || -> Result<()> {
        let input = job.case.input(job.formulation)?;
        let model = build_model(&input, job.formulation)?;
        let stats = model.stats();
        record.num_variables = Some(stats.num_variables());
        record.num_constraints = Some(stats.num_constraints());

        let backend = config.backend.build_backend()?;
        let solution = backend.solve(&model, &config.options)?;
        let summary = PlanSummary::from_solution(&input, &solution);
        record.solve_status = Some(summary.status.as_str().to_string());
        record.objective = summary.objective;
        record.expected_ground_periods = summary.expected_ground_periods;
        record.expected_air_periods = summary.expected_air_periods;
        record.expected_diversions = summary.expected_diversions;
        record.solve_time_ms = Some(summary.solve_time_ms);
        Ok(())
    };
    if let Err(err) = runner() {
        error!(job = %job.job_id, "batch job failed: {err:#}");
        record.status = STATUS_ERROR.to_string();
        record.error = Some(format!("{err:#}"));
        record.solve_time_ms = Some(started.elapsed().as_millis() as u64);
    }
    record
}

/// Whether two optimal objectives agree. Near zero the tolerance is absolute.
pub fn objectives_agree(a: f64, b: f64) -> bool {
    let scale = a.abs().max(b.abs());
    let diff = (a - b).abs();
    if scale < 0.5 {
        diff <= CROSS_CHECK_TOLERANCE
    } else {
        diff <= CROSS_CHECK_TOLERANCE * scale
    }
}

/// Compare each job with its equivalent formulation on the same case and
/// flag both when their optimal objectives differ. Returns the number of
/// disagreeing pairs.
fn cross_check(jobs: &[BatchJob], records: &mut [BatchJobRecord]) -> usize {
    let optimal = SolveStatus::Optimal.as_str();
    let mut mismatches = 0;
    for i in 0..jobs.len() {
        for j in (i + 1)..jobs.len() {
            if jobs[i].case.name != jobs[j].case.name
                || jobs[j].formulation != jobs[i].formulation.counterpart()
            {
                continue;
            }
            let (a, b) = (&records[i], &records[j]);
            if a.solve_status.as_deref() != Some(optimal)
                || b.solve_status.as_deref() != Some(optimal)
            {
                continue;
            }
            let (Some(obj_a), Some(obj_b)) = (a.objective, b.objective) else {
                continue;
            };
            if objectives_agree(obj_a, obj_b) {
                continue;
            }
            warn!(
                case = %jobs[i].case.name,
                left = %jobs[i].formulation,
                right = %jobs[j].formulation,
                obj_a,
                obj_b,
                "equivalent formulations disagree"
            );
            records[i].status = STATUS_MISMATCH.to_string();
            records[j].status = STATUS_MISMATCH.to_string();
            mismatches += 1;
        }
    }
    mismatches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::jobs_from_cases;
    use crate::spec::PreparedCase;
    use gdp_algo::Formulation;
    use gdp_core::{
        AggregatedDemand, AirborneLimit, CapacityScenario, CostParams, FlightDemand, ScenarioId,
        ScenarioTree,
    };
    use std::sync::Arc;

    #[test]
    fn tolerance_is_relative_above_half() {
        assert!(objectives_agree(1000.0, 1000.9));
        assert!(!objectives_agree(1000.0, 1001.5));
        assert!(objectives_agree(0.0, 0.0009));
        assert!(!objectives_agree(0.0, 0.01));
    }

    fn record(job: &BatchJob, objective: f64) -> BatchJobRecord {
        BatchJobRecord {
            job_id: job.job_id.clone(),
            case: job.case.name.clone(),
            formulation: job.formulation.as_str().into(),
            status: STATUS_OK.into(),
            solve_status: Some("optimal".into()),
            objective: Some(objective),
            expected_ground_periods: None,
            expected_air_periods: None,
            expected_diversions: None,
            num_variables: None,
            num_constraints: None,
            solve_time_ms: None,
            error: None,
        }
    }

    #[test]
    fn cross_check_flags_both_counterparts() {
        let scenario = CapacityScenario::new(ScenarioId::new(0), 1.0, vec![1, 1]).unwrap();
        let case = Arc::new(PreparedCase {
            name: "c".into(),
            tree: ScenarioTree::build(2, vec![scenario], 0).unwrap(),
            demand: Arc::new(AggregatedDemand::new(2)),
            flights: Arc::new(FlightDemand::new(2)),
            costs: CostParams::default(),
            max_airborne: AirborneLimit::Unlimited,
            formulations: vec![
                Formulation::ExtendedBase,
                Formulation::ExtendedDiversion,
                Formulation::PerFlight,
                Formulation::PerFlightDiversion,
            ],
        });
        let jobs = jobs_from_cases(&[case]);
        let mut records = vec![
            record(&jobs[0], 3.0),
            record(&jobs[1], 2.0),
            record(&jobs[2], 4.0),
            record(&jobs[3], 2.0),
        ];
        assert_eq!(cross_check(&jobs, &mut records), 1);
        assert_eq!(records[0].status, STATUS_MISMATCH);
        assert_eq!(records[2].status, STATUS_MISMATCH);
        assert_eq!(records[1].status, STATUS_OK);
        assert_eq!(records[3].status, STATUS_OK);
    }
}
