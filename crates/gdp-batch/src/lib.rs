//! Experiment batches: prepare every case of an experiment file, solve each
//! listed formulation in parallel, cross-check equivalent formulations and
//! write `results.csv` plus `batch_manifest.json`.

pub mod job;
pub mod manifest;
pub mod report;
pub mod runner;
pub mod spec;

pub use job::{jobs_from_cases, BatchJob, BatchJobRecord};
pub use manifest::{load_batch_manifest, write_batch_manifest, BatchManifest};
pub use report::{load_results_csv, write_results_csv};
pub use runner::{objectives_agree, run_batch, BatchRunnerConfig, BatchSummary};
pub use spec::{load_spec_from_path, CaseSpec, DemandSpec, ExperimentSpec, PreparedCase};
