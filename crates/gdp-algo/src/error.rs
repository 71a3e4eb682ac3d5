use crate::model::VarKey;
use gdp_core::GdpError;
use thiserror::Error;

/// Errors raised while building or solving a planning model.
///
/// Solver-reported infeasibility is not an error; it comes back as a
/// [`crate::solver::SolveStatus`].
#[derive(Error, Debug)]
pub enum ModelError {
    /// A constraint referenced a variable that was never declared.
    #[error("variable {0} referenced before creation")]
    MissingVariable(VarKey),

    /// The same variable key was declared twice.
    #[error("variable {0} declared twice")]
    DuplicateVariable(VarKey),

    /// Invalid capability combination or inconsistent inputs
    #[error("Configuration error: {0}")]
    Config(String),

    /// The solver backend failed outright (not an infeasible/limit status)
    #[error("Solver backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Core(#[from] GdpError),
}

pub type ModelResult<T> = Result<T, ModelError>;
