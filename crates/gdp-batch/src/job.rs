use crate::spec::PreparedCase;
use gdp_algo::Formulation;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const STATUS_OK: &str = "ok";
pub const STATUS_ERROR: &str = "error";
pub const STATUS_MISMATCH: &str = "mismatch";

/// One formulation solved on one case.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub job_id: String,
    pub case: Arc<PreparedCase>,
    pub formulation: Formulation,
}

/// Outcome of a job, one row of `results.csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchJobRecord {
    pub job_id: String,
    pub case: String,
    pub formulation: String,
    /// `ok`, `error`, or `mismatch` when a cross-check failed.
    pub status: String,
    pub solve_status: Option<String>,
    pub objective: Option<f64>,
    pub expected_ground_periods: Option<f64>,
    pub expected_air_periods: Option<f64>,
    pub expected_diversions: Option<f64>,
    pub num_variables: Option<usize>,
    pub num_constraints: Option<usize>,
    pub solve_time_ms: Option<u64>,
    pub error: Option<String>,
}

impl BatchJobRecord {
    pub fn is_success(&self) -> bool {
        self.status != STATUS_ERROR
    }
}

/// One job per case and listed formulation, in listing order.
pub fn jobs_from_cases(cases: &[Arc<PreparedCase>]) -> Vec<BatchJob> {
    cases
        .iter()
        .flat_map(|case| {
            case.formulations.iter().map(move |&formulation| BatchJob {
                job_id: format!("{}:{}", case.name, formulation.as_str()),
                case: Arc::clone(case),
                formulation,
            })
        })
        .collect()
}
