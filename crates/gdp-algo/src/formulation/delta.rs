//! Cumulative-delta revision encoding
//!
//! Each scenario carries the plan made at period 0 (`BaseGround`,
//! `BaseDepart`). At each revision period `r >= 1` a scenario may add signed
//! corrections to the plan for every period `t >= r`. The plan in force after
//! period `k` is the base plus all corrections made up to `k`, and the
//! realized quantity for period `t` is the plan in force at `t`:
//!
//! ```text
//! plan(s, k, t, d) = BaseGround(s, t, d) + Σ_{1 <= r <= k} GroundDelta(s, r, t, d)
//! ground(s, t, d)  = plan(s, t, t, d)
//! ```
//!
//! Corrections are free integers, forced to zero unless the scenario's
//! revision indicator for `r` is set. The plan made at `k` is tied across the
//! nodes of period `k`, so this encoding admits exactly the plans of
//! [`PlanActualBuckets`](super::plan_actual::PlanActualBuckets).

use super::builder::BuildContext;
use super::departure::{landable_buckets, DepartureEncoding};
use super::nonanticipativity::{tie_across_nodes, tie_exprs_across_nodes};
use super::revision::revision_key;
use crate::error::ModelResult;
use crate::model::{
    ConstraintTag, Indicator, LinearConstraint, LinearExpr, Model, VarKey, VariableDef,
};
use gdp_core::{AggregatedDemand, ScenarioId};

fn base_ground(scenario: ScenarioId, period: usize, duration: usize) -> VarKey {
    VarKey::BaseGround {
        scenario,
        period,
        duration,
    }
}

fn base_depart(scenario: ScenarioId, period: usize, duration: usize) -> VarKey {
    VarKey::BaseDepart {
        scenario,
        period,
        duration,
    }
}

fn ground_delta(scenario: ScenarioId, revision: usize, period: usize, duration: usize) -> VarKey {
    VarKey::GroundDelta {
        scenario,
        revision,
        period,
        duration,
    }
}

fn depart_delta(scenario: ScenarioId, revision: usize, period: usize, duration: usize) -> VarKey {
    VarKey::DepartDelta {
        scenario,
        revision,
        period,
        duration,
    }
}

#[derive(Clone, Copy)]
enum Flow {
    Ground,
    Depart,
}

impl Flow {
    fn base(self, s: ScenarioId, t: usize, d: usize) -> VarKey {
        match self {
            Flow::Ground => base_ground(s, t, d),
            Flow::Depart => base_depart(s, t, d),
        }
    }

    fn delta(self, s: ScenarioId, r: usize, t: usize, d: usize) -> VarKey {
        match self {
            Flow::Ground => ground_delta(s, r, t, d),
            Flow::Depart => depart_delta(s, r, t, d),
        }
    }

    /// Flows that exist for period `t` of a bucket whose last departure is `last`.
    fn at(t: usize, last: usize) -> &'static [Flow] {
        if t < last {
            &[Flow::Depart, Flow::Ground]
        } else {
            &[Flow::Depart]
        }
    }
}

/// Plan for period `t` in force after the corrections made up to `k`.
fn planned(
    model: &Model,
    flow: Flow,
    s: ScenarioId,
    k: usize,
    t: usize,
    d: usize,
) -> ModelResult<LinearExpr> {
    let mut expr = LinearExpr::from(model.var(&flow.base(s, t, d))?);
    for r in 1..=k.min(t) {
        expr.add_var(model.var(&flow.delta(s, r, t, d))?);
    }
    Ok(expr)
}

fn realized(
    model: &Model,
    flow: Flow,
    s: ScenarioId,
    t: usize,
    d: usize,
) -> ModelResult<LinearExpr> {
    planned(model, flow, s, t, t, d)
}

pub(crate) struct DeltaBuckets<'a> {
    demand: &'a AggregatedDemand,
}

impl<'a> DeltaBuckets<'a> {
    pub fn new(demand: &'a AggregatedDemand) -> Self {
        Self { demand }
    }
}

impl DepartureEncoding for DeltaBuckets<'_> {
    fn add_variables(&self, ctx: &BuildContext<'_>, model: &mut Model) -> ModelResult<()> {
        let ground_cost = ctx.input.costs().ground_cost;
        let buckets = landable_buckets(ctx, self.demand);

        // Realized ground is base plus corrections, so both carry the
        // scenario's ground cost.
        for scenario in ctx.scenarios() {
            let s = scenario.id();
            let cost = ground_cost * scenario.probability();
            for &(d, last) in &buckets {
                for t in 0..=last {
                    model.add_variable(VariableDef::count(base_depart(s, t, d)))?;
                    if t < last {
                        model.add_variable(VariableDef::count(base_ground(s, t, d)).cost(cost))?;
                    }
                }
                for r in 1..=last {
                    for t in r..=last {
                        model.add_variable(VariableDef::free_integer(depart_delta(s, r, t, d)))?;
                        if t < last {
                            model.add_variable(
                                VariableDef::free_integer(ground_delta(s, r, t, d)).cost(cost),
                            )?;
                        }
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
                        inflow.add_expr(&realized(model, Flow::Ground, s, t - 1, d)?);
                    }
                    let mut outflow = realized(model, Flow::Depart, s, t, d)?;
                    if t < last {
                        outflow.add_expr(&realized(model, Flow::Ground, s, t, d)?);
                    }
                    model.add_linear(
                        ConstraintTag::DepartureBalance,
                        LinearConstraint::eq(inflow, outflow),
                    );

                    // Base variables are non-negative by bounds; every
                    // corrected plan needs an explicit row.
                    for k in 1..=t {
                        for &flow in Flow::at(t, last) {
                            let plan = planned(model, flow, s, k, t, d)?;
                            model.add_linear(
                                ConstraintTag::RevisionNonNegativity,
                                LinearConstraint::ge(plan, 0.0),
                            );
                        }
                    }
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
                expr.add_expr(&realized(model, Flow::Depart, scenario, t, d)?);
            }
        }
        Ok(expr)
    }

    /// The plan in force after period `k` is decided with the information of
    /// period `k`.
    fn add_nonanticipativity(&self, ctx: &BuildContext<'_>, model: &mut Model) -> ModelResult<()> {
        let tree = ctx.tree();
        for (d, last) in landable_buckets(ctx, self.demand) {
            for t in 0..=last {
                for &flow in Flow::at(t, last) {
                    tie_across_nodes(model, tree, 0, |s| flow.base(s, t, d))?;
                    for k in 1..=t {
                        tie_exprs_across_nodes(model, tree, k, |model, s| {
                            planned(model, flow, s, k, t, d)
                        })?;
                    }
                }
            }
        }
        Ok(())
    }

    fn add_revision_gates(&self, ctx: &BuildContext<'_>, model: &mut Model) -> ModelResult<()> {
        for scenario in ctx.scenarios() {
            let s = scenario.id();
            for (d, last) in landable_buckets(ctx, self.demand) {
                for r in 1..=last {
                    let trigger = model.var(&revision_key(s, r))?;
                    for t in r..=last {
                        let gated = Flow::at(t, last).iter().map(|flow| flow.delta(s, r, t, d));
                        for key in gated {
                            let var = model.var(&key)?;
                            model.add_indicator(
                                ConstraintTag::RevisionGate,
                                Indicator {
                                    trigger,
                                    active_when: false,
                                    constraint: LinearConstraint::eq(var, 0.0),
                                    bound: ctx.indicator_bound,
                                },
                            );
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
