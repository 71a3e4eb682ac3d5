//! Expected-value summary of a solved plan

use crate::formulation::{DemandRef, ModelInput};
use crate::model::VarKey;
use crate::solver::{ModelSolution, SolveStatus};
use serde::Serialize;

/// Probability-weighted totals of a solved planning model.
///
/// Quantities are `None` when the solve returned no values; `expected_landings`
/// is also `None` for formulations without explicit landing variables.
#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    pub status: SolveStatus,
    pub objective: Option<f64>,
    /// Flight-periods spent holding on the ground.
    pub expected_ground_periods: Option<f64>,
    /// Flight-periods spent holding in the air.
    pub expected_air_periods: Option<f64>,
    pub expected_diversions: Option<f64>,
    pub expected_landings: Option<f64>,
    /// Flights held on the ground at the end of period 0.
    pub first_period_ground_hold: Option<f64>,
    pub expected_revisions: Option<f64>,
    pub solve_time_ms: u64,
    pub backend: String,
}

#[derive(Default)]
struct Totals {
    ground: f64,
    air: f64,
    divert: f64,
    land: f64,
    first_hold: f64,
    revisions: f64,
    has_landings: bool,
}

impl PlanSummary {
    pub fn from_solution(input: &ModelInput<'_>, solution: &ModelSolution) -> Self {
        let totals = solution.has_values().then(|| accumulate(input, solution));
        Self {
            status: solution.status.clone(),
            objective: solution.objective,
            expected_ground_periods: totals.as_ref().map(|t| t.ground),
            expected_air_periods: totals.as_ref().map(|t| t.air),
            expected_diversions: totals.as_ref().map(|t| t.divert),
            expected_landings: totals
                .as_ref()
                .and_then(|t| t.has_landings.then_some(t.land)),
            first_period_ground_hold: totals.as_ref().map(|t| t.first_hold),
            expected_revisions: totals.as_ref().map(|t| t.revisions),
            solve_time_ms: solution.solve_time.as_millis() as u64,
            backend: solution.backend.clone(),
        }
    }
}

fn accumulate(input: &ModelInput<'_>, solution: &ModelSolution) -> Totals {
    let tree = input.tree();
    let probability = |key: &VarKey| tree.probability(key.scenario()).unwrap_or_default();

    let mut totals = Totals::default();
    for (key, value) in solution.values() {
        let weighted = probability(key) * value;
        match *key {
            VarKey::Ground { period, .. }
            | VarKey::BaseGround { period, .. }
            | VarKey::GroundDelta { period, .. } => {
                totals.ground += weighted;
                if period == 0 {
                    totals.first_hold += weighted;
                }
            }
            VarKey::PlannedGround { plan, period, .. } if plan == period => {
                totals.ground += weighted;
                if period == 0 {
                    totals.first_hold += weighted;
                }
            }
            VarKey::Assign { flight, period, .. } => {
                if let DemandRef::PerFlight(flights) = input.demand() {
                    if let Some(scheduled) = flights.flight(flight) {
                        let delay = period.saturating_sub(scheduled.depart_period);
                        totals.ground += weighted * delay as f64;
                        if scheduled.depart_period == 0 && period > 0 {
                            totals.first_hold += weighted;
                        }
                    }
                }
            }
            VarKey::Air { .. } => totals.air += weighted,
            VarKey::Divert { .. } => totals.divert += weighted,
            VarKey::Land { .. } => {
                totals.land += weighted;
                totals.has_landings = true;
            }
            VarKey::Revision { .. } => totals.revisions += weighted,
            _ => {}
        }
    }
    totals
}
