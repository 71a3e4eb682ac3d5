//! Solver backend boundary
//!
//! A [`SolverBackend`] receives a built [`Model`] and returns a
//! [`ModelSolution`]: per-variable values, objective, status and diagnostics.
//! Infeasible, unbounded and time-limited runs come back as statuses, not
//! errors; [`ModelError::Backend`] is reserved for backends that fail to run.

mod milp;

pub use milp::GoodLpBackend;

use crate::error::{ModelError, ModelResult};
use crate::model::{Model, VarKey};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Parameters for one solve.
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    /// Wall-clock limit; `None` runs to optimality.
    pub time_limit: Option<Duration>,
    /// Forward solver log output.
    pub verbose: bool,
}

impl SolveOptions {
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// The engine reported stopping at its time limit.
    TimeLimit,
    Other(String),
}

impl SolveStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }

    pub fn as_str(&self) -> &str {
        match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::TimeLimit => "time_limit",
            SolveStatus::Other(msg) => msg.as_str(),
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of handing a model to a backend.
#[derive(Debug, Clone)]
pub struct ModelSolution {
    pub status: SolveStatus,
    /// Objective of the returned values, when there are any.
    pub objective: Option<f64>,
    pub solve_time: Duration,
    /// Branch-and-bound nodes, for backends that report them.
    pub node_count: Option<u64>,
    pub backend: String,
    values: HashMap<VarKey, f64>,
}

impl ModelSolution {
    /// A result carrying no variable values (infeasible, unbounded, failed).
    pub fn without_values(status: SolveStatus, backend: &str, solve_time: Duration) -> Self {
        Self {
            status,
            objective: None,
            solve_time,
            node_count: None,
            backend: backend.to_string(),
            values: HashMap::new(),
        }
    }

    /// A result with one value per model variable, in declaration order.
    pub fn with_values(
        status: SolveStatus,
        backend: &str,
        solve_time: Duration,
        model: &Model,
        values: &[f64],
    ) -> ModelResult<Self> {
        if values.len() != model.num_variables() {
            return Err(ModelError::Backend(format!(
                "backend returned {} values for {} variables",
                values.len(),
                model.num_variables()
            )));
        }
        let objective = model.objective().evaluate(|id| values[id.index()]);
        let values = model
            .iter_variables()
            .map(|(id, def)| (def.key, values[id.index()]))
            .collect();
        Ok(Self {
            status,
            objective: Some(objective),
            solve_time,
            node_count: None,
            backend: backend.to_string(),
            values,
        })
    }

    pub fn value(&self, key: &VarKey) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = (&VarKey, f64)> + '_ {
        self.values.iter().map(|(key, &value)| (key, value))
    }
}

/// Executes a planning model.
pub trait SolverBackend: Send + Sync {
    /// Unique identifier (e.g., "microlp", "highs")
    fn id(&self) -> &str;

    fn solve(&self, model: &Model, options: &SolveOptions) -> ModelResult<ModelSolution>;
}

/// MILP engines reachable through [`GoodLpBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum BackendKind {
    /// Pure-Rust branch and bound
    #[default]
    Microlp,
    /// HiGHS (native; requires the `solver-highs` feature)
    Highs,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Microlp => "microlp",
            BackendKind::Highs => "highs",
        }
    }

    /// Whether the engine was compiled into this build.
    pub fn is_compiled(&self) -> bool {
        match self {
            BackendKind::Microlp => cfg!(feature = "solver-microlp"),
            BackendKind::Highs => cfg!(feature = "solver-highs"),
        }
    }

    pub fn available() -> Vec<&'static str> {
        [BackendKind::Microlp, BackendKind::Highs]
            .iter()
            .filter(|kind| kind.is_compiled())
            .map(|kind| kind.as_str())
            .collect()
    }

    pub fn build_backend(self) -> ModelResult<Arc<dyn SolverBackend>> {
        if !self.is_compiled() {
            return Err(ModelError::Backend(format!(
                "backend '{}' is not compiled in; available: {}",
                self.as_str(),
                Self::available().join(", ")
            )));
        }
        Ok(Arc::new(GoodLpBackend::new(self)))
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ModelError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_ascii_lowercase().as_str() {
            "microlp" | "default" => Ok(BackendKind::Microlp),
            "highs" => Ok(BackendKind::Highs),
            other => Err(ModelError::Config(format!(
                "unknown backend '{}'; supported values: microlp, highs",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_kind_parsing_supports_all_engines() {
        assert_eq!("microlp".parse::<BackendKind>().unwrap(), BackendKind::Microlp);
        assert_eq!("HiGHS".parse::<BackendKind>().unwrap(), BackendKind::Highs);
        assert!("gurobi".parse::<BackendKind>().is_err());
    }

    #[test]
    fn default_backend_is_compiled() {
        assert!(BackendKind::default().is_compiled());
        assert!(BackendKind::available().contains(&"microlp"));
        assert_eq!(BackendKind::default().build_backend().unwrap().id(), "microlp");
    }

    #[test]
    fn values_must_cover_every_variable() {
        let model = Model::new("empty");
        let err = ModelSolution::with_values(
            SolveStatus::Optimal,
            "test",
            Duration::ZERO,
            &model,
            &[1.0],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::Backend(_)));
    }
}
