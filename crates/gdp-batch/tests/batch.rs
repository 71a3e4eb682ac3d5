use gdp_algo::{BackendKind, SolveOptions};
use gdp_batch::{
    jobs_from_cases, load_batch_manifest, load_results_csv, load_spec_from_path, run_batch,
    BatchRunnerConfig,
};
use std::fs;
use tempfile::tempdir;

const SPEC: &str = r#"
name: small
horizon:
  start: 2017-07-15T12:00:00Z
  end: 2017-07-15T13:30:00Z
scenarios:
  earliest_change: 2
  latest_change: 4
  low_rate: 4
  high_rate: 8
demand:
  inline:
    buckets:
      1: [2, 1, 0, 0, 0, 0]
cases:
  - name: myopic
  - name: informed
    lookahead: 2
    formulations: [extended-base, per-flight]
"#;

#[test]
fn batch_solves_every_case_and_writes_outputs() {
    let dir = tempdir().unwrap();
    let spec_path = dir.path().join("small.yaml");
    fs::write(&spec_path, SPEC).unwrap();

    let spec = load_spec_from_path(&spec_path).unwrap();
    let cases = spec.prepare().unwrap();
    let jobs = jobs_from_cases(&cases);
    assert_eq!(jobs.len(), 8);

    let config = BatchRunnerConfig {
        output_root: dir.path().join("out"),
        threads: 2,
        backend: BackendKind::Microlp,
        options: SolveOptions::default(),
    };
    let summary = run_batch(&spec.name, &jobs, &config).unwrap();
    assert_eq!(summary.success, 8);
    assert_eq!(summary.failure, 0);
    assert_eq!(summary.mismatches, 0);

    for record in &summary.jobs {
        assert_eq!(record.status, "ok", "{}: {:?}", record.job_id, record.error);
        assert_eq!(record.solve_status.as_deref(), Some("optimal"));
        assert!(record.num_variables.unwrap() > 0);
    }

    let rows = load_results_csv(&summary.results_path).unwrap();
    assert_eq!(rows.len(), 8);
    assert_eq!(rows[0].job_id, "myopic:extended-base");

    let manifest = load_batch_manifest(&summary.manifest_path).unwrap();
    assert_eq!(manifest.experiment, "small");
    assert_eq!(manifest.backend, "microlp");
    assert_eq!(manifest.num_jobs, 8);
}
