//! Typed variable keys
//!
//! Every decision variable in a planning model is addressed by a [`VarKey`].
//! Periods are zero-based; `duration` is the bucket's flight time in periods.

use gdp_core::{FlightId, ScenarioId};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum VarKey {
    /// Bucket units still held on the ground at the end of `period`.
    Ground {
        scenario: ScenarioId,
        period: usize,
        duration: usize,
    },
    /// Bucket units released in `period`.
    Depart {
        scenario: ScenarioId,
        period: usize,
        duration: usize,
    },
    /// Ground-hold for `period` in the plan made at period 0.
    BaseGround {
        scenario: ScenarioId,
        period: usize,
        duration: usize,
    },
    /// Departures in `period` in the plan made at period 0.
    BaseDepart {
        scenario: ScenarioId,
        period: usize,
        duration: usize,
    },
    /// Change to the ground-hold plan for `period` made at `revision`.
    GroundDelta {
        scenario: ScenarioId,
        revision: usize,
        period: usize,
        duration: usize,
    },
    /// Change to the departure plan for `period` made at `revision`.
    DepartDelta {
        scenario: ScenarioId,
        revision: usize,
        period: usize,
        duration: usize,
    },
    /// Ground-hold for `period` as planned at `plan`.
    PlannedGround {
        scenario: ScenarioId,
        plan: usize,
        period: usize,
        duration: usize,
    },
    /// Departures in `period` as planned at `plan`.
    PlannedDepart {
        scenario: ScenarioId,
        plan: usize,
        period: usize,
        duration: usize,
    },
    /// Flight leaves in `period`.
    Assign {
        flight: FlightId,
        period: usize,
        scenario: ScenarioId,
    },
    Air { scenario: ScenarioId, period: usize },
    Land { scenario: ScenarioId, period: usize },
    Divert { scenario: ScenarioId, period: usize },
    /// The plan is revised at `period`.
    Revision { scenario: ScenarioId, period: usize },
}

impl VarKey {
    pub fn scenario(&self) -> ScenarioId {
        match *self {
            VarKey::Ground { scenario, .. }
            | VarKey::Depart { scenario, .. }
            | VarKey::BaseGround { scenario, .. }
            | VarKey::BaseDepart { scenario, .. }
            | VarKey::GroundDelta { scenario, .. }
            | VarKey::DepartDelta { scenario, .. }
            | VarKey::PlannedGround { scenario, .. }
            | VarKey::PlannedDepart { scenario, .. }
            | VarKey::Assign { scenario, .. }
            | VarKey::Air { scenario, .. }
            | VarKey::Land { scenario, .. }
            | VarKey::Divert { scenario, .. }
            | VarKey::Revision { scenario, .. } => scenario,
        }
    }

    /// Period whose physical flow the variable describes.
    pub fn period(&self) -> usize {
        match *self {
            VarKey::Ground { period, .. }
            | VarKey::Depart { period, .. }
            | VarKey::BaseGround { period, .. }
            | VarKey::BaseDepart { period, .. }
            | VarKey::GroundDelta { period, .. }
            | VarKey::DepartDelta { period, .. }
            | VarKey::PlannedGround { period, .. }
            | VarKey::PlannedDepart { period, .. }
            | VarKey::Assign { period, .. }
            | VarKey::Air { period, .. }
            | VarKey::Land { period, .. }
            | VarKey::Divert { period, .. }
            | VarKey::Revision { period, .. } => period,
        }
    }

    pub fn family(&self) -> &'static str {
        match self {
            VarKey::Ground { .. } => "ground",
            VarKey::Depart { .. } => "depart",
            VarKey::BaseGround { .. } => "base_ground",
            VarKey::BaseDepart { .. } => "base_depart",
            VarKey::GroundDelta { .. } => "ground_delta",
            VarKey::DepartDelta { .. } => "depart_delta",
            VarKey::PlannedGround { .. } => "planned_ground",
            VarKey::PlannedDepart { .. } => "planned_depart",
            VarKey::Assign { .. } => "assign",
            VarKey::Air { .. } => "air",
            VarKey::Land { .. } => "land",
            VarKey::Divert { .. } => "divert",
            VarKey::Revision { .. } => "revision",
        }
    }
}

impl fmt::Display for VarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let family = self.family();
        match *self {
            VarKey::Ground {
                scenario,
                period,
                duration,
            }
            | VarKey::Depart {
                scenario,
                period,
                duration,
            }
            | VarKey::BaseGround {
                scenario,
                period,
                duration,
            }
            | VarKey::BaseDepart {
                scenario,
                period,
                duration,
            } => write!(f, "{family}[s{scenario},t{period},d{duration}]"),
            VarKey::GroundDelta {
                scenario,
                revision,
                period,
                duration,
            }
            | VarKey::DepartDelta {
                scenario,
                revision,
                period,
                duration,
            } => write!(f, "{family}[s{scenario},r{revision},t{period},d{duration}]"),
            VarKey::PlannedGround {
                scenario,
                plan,
                period,
                duration,
            }
            | VarKey::PlannedDepart {
                scenario,
                plan,
                period,
                duration,
            } => write!(f, "{family}[s{scenario},k{plan},t{period},d{duration}]"),
            VarKey::Assign {
                flight,
                period,
                scenario,
            } => write!(f, "{family}[f{flight},t{period},s{scenario}]"),
            VarKey::Air { scenario, period }
            | VarKey::Land { scenario, period }
            | VarKey::Divert { scenario, period }
            | VarKey::Revision { scenario, period } => {
                write!(f, "{family}[s{scenario},t{period}]")
            }
        }
    }
}
