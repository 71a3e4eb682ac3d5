//! Departure-side encodings
//!
//! A [`DepartureEncoding`] owns the departure decision variables of one
//! formulation: it declares them, writes the departure balance, ties them
//! across tree nodes and tells the arrival sub-builder which departures
//! complete their flight in a given period.
//!
//! For a bucket of duration `d` departures run over `0..=last` with
//! `last = T - 1 - d`. Nothing can be held past `last`, so ground variables
//! only exist for periods `< last` and everything left departs at `last`.

use super::builder::BuildContext;
use super::nonanticipativity::tie_through_period;
use crate::error::ModelResult;
use crate::model::{ConstraintTag, LinearConstraint, LinearExpr, Model, VarKey, VariableDef};
use gdp_core::{AggregatedDemand, ScenarioId};

pub(crate) trait DepartureEncoding {
    fn add_variables(&self, ctx: &BuildContext<'_>, model: &mut Model) -> ModelResult<()>;

    fn add_departure_balance(&self, ctx: &BuildContext<'_>, model: &mut Model) -> ModelResult<()>;

    /// Flights whose departure completes in `period` under `scenario`.
    fn arrivals(
        &self,
        ctx: &BuildContext<'_>,
        model: &Model,
        scenario: ScenarioId,
        period: usize,
    ) -> ModelResult<LinearExpr>;

    fn add_nonanticipativity(&self, ctx: &BuildContext<'_>, model: &mut Model) -> ModelResult<()>;

    /// Gate plan changes on the revision indicators.
    fn add_revision_gates(&self, _ctx: &BuildContext<'_>, _model: &mut Model) -> ModelResult<()> {
        Ok(())
    }
}

/// Bucket durations that can still land inside the horizon, with their last
/// departure period.
pub(crate) fn landable_buckets(
    ctx: &BuildContext<'_>,
    demand: &AggregatedDemand,
) -> Vec<(usize, usize)> {
    demand
        .durations()
        .filter_map(|d| ctx.last_departure(d).map(|last| (d, last)))
        .collect()
}

pub(crate) fn ground(scenario: ScenarioId, period: usize, duration: usize) -> VarKey {
    VarKey::Ground {
        scenario,
        period,
        duration,
    }
}

pub(crate) fn depart(scenario: ScenarioId, period: usize, duration: usize) -> VarKey {
    VarKey::Depart {
        scenario,
        period,
        duration,
    }
}

/// Scenario-indexed ground and departure counts per bucket; the tree's
/// non-anticipativity is the only coupling between scenarios.
pub(crate) struct DynamicBuckets<'a> {
    demand: &'a AggregatedDemand,
}

impl<'a> DynamicBuckets<'a> {
    pub fn new(demand: &'a AggregatedDemand) -> Self {
        Self { demand }
    }
}

impl DepartureEncoding for DynamicBuckets<'_> {
    fn add_variables(&self, ctx: &BuildContext<'_>, model: &mut Model) -> ModelResult<()> {
        let ground_cost = ctx.input.costs().ground_cost;
        for scenario in ctx.scenarios() {
            let s = scenario.id();
            for (d, last) in landable_buckets(ctx, self.demand) {
                for t in 0..=last {
                    model.add_variable(VariableDef::count(depart(s, t, d)))?;
                    if t < last {
                        model.add_variable(
                            VariableDef::count(ground(s, t, d))
                                .cost(ground_cost * scenario.probability()),
                        )?;
                    }
                }
            }
        }
        Ok(())
    }

    fn add_departure_balance(&self, ctx: &BuildContext<'_>, model: &mut Model) -> ModelResult<()> {
        for scenario in ctx.scenarios() {
            let s = scenario.id();
            for (d, last) in landable_buckets(ctx, self.demand) {
                for t in 0..=last {
                    let mut inflow = LinearExpr::constant(f64::from(self.demand.demand(d, t)));
                    if t > 0 {
                        inflow.add_var(model.var(&ground(s, t - 1, d))?);
                    }
                    let mut outflow = LinearExpr::from(model.var(&depart(s, t, d))?);
                    if t < last {
                        outflow.add_var(model.var(&ground(s, t, d))?);
                    }
                    model.add_linear(
                        ConstraintTag::DepartureBalance,
                        LinearConstraint::eq(inflow, outflow),
                    );
                }
            }
        }
        Ok(())
    }

    fn arrivals(
        &self,
        ctx: &BuildContext<'_>,
        model: &Model,
        scenario: ScenarioId,
        period: usize,
    ) -> ModelResult<LinearExpr> {
        let mut expr = LinearExpr::new();
        for (d, last) in landable_buckets(ctx, self.demand) {
            if let Some(t) = period.checked_sub(d).filter(|&t| t <= last) {
                expr.add_var(model.var(&depart(scenario, t, d))?);
            }
        }
        Ok(expr)
    }

    /// The whole plan is fixed at period 0, so the quantity for period `t`
    /// agrees across every node met up to `t`.
    fn add_nonanticipativity(&self, ctx: &BuildContext<'_>, model: &mut Model) -> ModelResult<()> {
        for (d, last) in landable_buckets(ctx, self.demand) {
            for t in 0..=last {
                tie_through_period(model, ctx.tree(), t, |s| depart(s, t, d))?;
                if t < last {
                    tie_through_period(model, ctx.tree(), t, |s| ground(s, t, d))?;
                }
            }
        }
        Ok(())
    }
}
