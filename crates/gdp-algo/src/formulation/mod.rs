//! Planning model formulations
//!
//! Every formulation shares one flow skeleton on the time-expanded graph of
//! `(period, scenario)` nodes:
//!
//! - departure side: scheduled + previously held = newly held + departed;
//! - arrival side: previous airborne + completing departures + enroute =
//!   airborne + landed + diverted, bounded by capacity;
//! - non-anticipativity: scenarios sharing a tree node take identical
//!   decisions for that period.
//!
//! Without revisions the departure plan is fixed at period 0: the decision
//! for period `t` agrees across every node the scenarios shared up to `t`.
//! Revision formulations relax this by re-planning at chosen periods.
//!
//! They differ in how departure decisions are encoded, selected by
//! [`Capabilities`]. [`FlowModelBuilder`] composes the shared sub-builders
//! accordingly. [`Formulation`] names the presets used by the CLI and the
//! experiment batch.

mod arrival;
mod assignment;
mod builder;
mod delta;
mod departure;
mod input;
mod nonanticipativity;
mod plan_actual;
mod revision;

pub use builder::FlowModelBuilder;
pub use input::{DemandRef, ModelInput};

use crate::error::{ModelError, ModelResult};
use crate::model::Model;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How revisions of the departure plan are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionEncoding {
    /// Shared initial plan plus signed corrections per revision period.
    Delta,
    /// One full plan per planning period; consecutive plans agree unless revised.
    PlanActual,
}

/// Whether demand is modelled in duration buckets or flight by flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Bucket,
    PerFlight,
}

/// Feature switches of a formulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub revision: Option<RevisionEncoding>,
    pub granularity: Granularity,
    /// Split arrivals into landings (capacity bounded) and diversions
    /// instead of capping inflow directly.
    pub diversion: bool,
    /// Revision periods allowed per scenario path.
    pub max_revisions: u32,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            revision: None,
            granularity: Granularity::Bucket,
            diversion: false,
            max_revisions: 1,
        }
    }
}

impl Capabilities {
    pub fn with_revision(mut self, encoding: RevisionEncoding) -> Self {
        self.revision = Some(encoding);
        self
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn with_diversion(mut self, diversion: bool) -> Self {
        self.diversion = diversion;
        self
    }

    pub fn with_max_revisions(mut self, max_revisions: u32) -> Self {
        self.max_revisions = max_revisions;
        self
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.revision.is_some() && self.granularity == Granularity::PerFlight {
            return Err(ModelError::Config(
                "plan revisions are only supported with bucket granularity".into(),
            ));
        }
        Ok(())
    }
}

/// Named formulation presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Formulation {
    /// Buckets, one plan fixed at period 0, inflow capped by capacity.
    ExtendedBase,
    /// Buckets, one plan fixed at period 0, landings plus diversions.
    ExtendedDiversion,
    /// Buckets with delta-encoded revisions.
    RevisionDelta,
    /// Buckets with plan/actual-encoded revisions.
    RevisionPlanActual,
    /// One assignment per flight, inflow capped by capacity.
    PerFlight,
    /// One assignment per flight, landings plus diversions.
    PerFlightDiversion,
}

impl Formulation {
    pub const ALL: [Formulation; 6] = [
        Formulation::ExtendedBase,
        Formulation::ExtendedDiversion,
        Formulation::RevisionDelta,
        Formulation::RevisionPlanActual,
        Formulation::PerFlight,
        Formulation::PerFlightDiversion,
    ];

    pub fn capabilities(&self) -> Capabilities {
        let base = Capabilities::default();
        match self {
            Formulation::ExtendedBase => base,
            Formulation::ExtendedDiversion => base.with_diversion(true),
            Formulation::RevisionDelta => base
                .with_revision(RevisionEncoding::Delta)
                .with_diversion(true),
            Formulation::RevisionPlanActual => base
                .with_revision(RevisionEncoding::PlanActual)
                .with_diversion(true),
            Formulation::PerFlight => base.with_granularity(Granularity::PerFlight),
            Formulation::PerFlightDiversion => base
                .with_granularity(Granularity::PerFlight)
                .with_diversion(true),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Formulation::ExtendedBase => "extended-base",
            Formulation::ExtendedDiversion => "extended-diversion",
            Formulation::RevisionDelta => "revision-delta",
            Formulation::RevisionPlanActual => "revision-plan-actual",
            Formulation::PerFlight => "per-flight",
            Formulation::PerFlightDiversion => "per-flight-diversion",
        }
    }

    pub fn available() -> Vec<&'static str> {
        Self::ALL.iter().map(|f| f.as_str()).collect()
    }

    /// Equivalent formulation whose optimum must coincide with this one.
    pub fn counterpart(&self) -> Formulation {
        match self {
            Formulation::ExtendedBase => Formulation::PerFlight,
            Formulation::PerFlight => Formulation::ExtendedBase,
            Formulation::ExtendedDiversion => Formulation::PerFlightDiversion,
            Formulation::PerFlightDiversion => Formulation::ExtendedDiversion,
            Formulation::RevisionDelta => Formulation::RevisionPlanActual,
            Formulation::RevisionPlanActual => Formulation::RevisionDelta,
        }
    }
}

impl fmt::Display for Formulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Formulation {
    type Err = ModelError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let wanted = input.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| {
                ModelError::Config(format!(
                    "unknown formulation '{}'; supported values: {}",
                    input,
                    Self::available().join(", ")
                ))
            })
    }
}

/// Build the model for a preset formulation.
pub fn build_model(input: &ModelInput<'_>, formulation: Formulation) -> ModelResult<Model> {
    build_model_with(input, formulation.capabilities(), formulation.as_str())
}

/// Build a model from explicit capabilities.
pub fn build_model_with(
    input: &ModelInput<'_>,
    capabilities: Capabilities,
    name: &str,
) -> ModelResult<Model> {
    FlowModelBuilder::new(*input, capabilities)
        .with_name(name)
        .build()
}
