//! # gdp-algo: Ground Delay Program model generation
//!
//! Turns a scenario tree and arrival demand into a minimisation model and
//! hands it to a MILP engine.
//!
//! ## Formulations
//!
//! | Preset | Departure encoding | Arrivals |
//! |--------|--------------------|----------|
//! | [`Formulation::ExtendedBase`] | buckets, plan fixed at period 0 | capped by capacity |
//! | [`Formulation::ExtendedDiversion`] | buckets, plan fixed at period 0 | landings + diversions |
//! | [`Formulation::RevisionDelta`] | period-0 plan + signed corrections | landings + diversions |
//! | [`Formulation::RevisionPlanActual`] | one plan per period | landings + diversions |
//! | [`Formulation::PerFlight`] | binary assignment per flight | capped by capacity |
//! | [`Formulation::PerFlightDiversion`] | binary assignment per flight | landings + diversions |
//!
//! All of them are composed by [`FlowModelBuilder`] from shared sub-builders,
//! selected by [`Capabilities`].
//!
//! ### Architecture
//!
//! - **[`model::Model`]**: solver-neutral variables keyed by [`model::VarKey`]
//!   and tagged constraints, including indicator constraints
//! - **[`solver::SolverBackend`]**: executes a model; [`solver::GoodLpBackend`]
//!   linearizes indicators with big-M rows for `good_lp` engines
//! - **[`PlanSummary`]**: probability-weighted totals of a solution
//!
//! ## Example
//!
//! ```ignore
//! use gdp_algo::{build_model, Formulation, ModelInput, PlanSummary};
//! use gdp_algo::solver::{BackendKind, SolveOptions};
//!
//! let input = ModelInput::new(&tree, &demand, CostParams::default(), AirborneLimit::Unlimited)?;
//! let model = build_model(&input, Formulation::ExtendedDiversion)?;
//! let solution = BackendKind::default()
//!     .build_backend()?
//!     .solve(&model, &SolveOptions::default())?;
//! println!("{:?}", PlanSummary::from_solution(&input, &solution));
//! ```

pub mod error;
pub mod formulation;
pub mod model;
pub mod solver;
pub mod summary;

pub use error::{ModelError, ModelResult};
pub use formulation::{
    build_model, build_model_with, Capabilities, DemandRef, FlowModelBuilder, Formulation,
    Granularity, ModelInput, RevisionEncoding,
};
pub use model::{Model, ModelStats, VarKey};
pub use solver::{BackendKind, ModelSolution, SolveOptions, SolveStatus, SolverBackend};
pub use summary::PlanSummary;
