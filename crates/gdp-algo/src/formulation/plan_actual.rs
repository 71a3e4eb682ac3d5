//! Plan/actual revision encoding
//!
//! `PlannedGround(s, k, t, d)` is the ground-hold for period `t` as planned at
//! period `k <= t`. The realized plan is the diagonal `k == t`; only it enters
//! the flow balance and the objective. For `k >= 1` the plan made at `k`
//! equals the plan made at `k - 1` unless the scenario revises at `k`.

use super::builder::BuildContext;
use super::departure::{landable_buckets, DepartureEncoding};
use super::nonanticipativity::tie_across_nodes;
use super::revision::revision_key;
use crate::error::ModelResult;
use crate::model::{
    ConstraintTag, Indicator, LinearConstraint, LinearExpr, Model, VarKey, VariableDef,
};
use gdp_core::{AggregatedDemand, ScenarioId};

fn planned_ground(scenario: ScenarioId, plan: usize, period: usize, duration: usize) -> VarKey {
    VarKey::PlannedGround {
        scenario,
        plan,
        period,
        duration,
    }
}

fn planned_depart(scenario: ScenarioId, plan: usize, period: usize, duration: usize) -> VarKey {
    VarKey::PlannedDepart {
        scenario,
        plan,
        period,
        duration,
    }
}

pub(crate) struct PlanActualBuckets<'a> {
    demand: &'a AggregatedDemand,
}

impl<'a> PlanActualBuckets<'a> {
    pub fn new(demand: &'a AggregatedDemand) -> Self {
        Self { demand }
    }
}

impl DepartureEncoding for PlanActualBuckets<'_> {
    fn add_variables(&self, ctx: &BuildContext<'_>, model: &mut Model) -> ModelResult<()> {
        let ground_cost = ctx.input.costs().ground_cost;
        for scenario in ctx.scenarios() {
            let s = scenario.id();
            for (d, last) in landable_buckets(ctx, self.demand) {
                for k in 0..=last {
                    for t in k..=last {
                        model.add_variable(VariableDef::count(planned_depart(s, k, t, d)))?;
                        if t < last {
                            let cost = if k == t {
                                ground_cost * scenario.probability()
                            } else {
                                0.0
                            };
                            model.add_variable(
                                VariableDef::count(planned_ground(s, k, t, d)).cost(cost),
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
                        inflow.add_var(model.var(&planned_ground(s, t - 1, t - 1, d))?);
                    }
                    let mut outflow = LinearExpr::from(model.var(&planned_depart(s, t, t, d))?);
                    if t < last {
                        outflow.add_var(model.var(&planned_ground(s, t, t, d))?);
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
                expr.add_var(model.var(&planned_depart(scenario, t, t, d))?);
            }
        }
        Ok(expr)
    }

    /// The plan made at `k` is decided with the information of period `k`.
    fn add_nonanticipativity(&self, ctx: &BuildContext<'_>, model: &mut Model) -> ModelResult<()> {
        for (d, last) in landable_buckets(ctx, self.demand) {
            for k in 0..=last {
                for t in k..=last {
                    tie_across_nodes(model, ctx.tree(), k, |s| planned_depart(s, k, t, d))?;
                    if t < last {
                        tie_across_nodes(model, ctx.tree(), k, |s| planned_ground(s, k, t, d))?;
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
                for k in 1..=last {
                    let trigger = model.var(&revision_key(s, k))?;
                    for t in k..=last {
                        let mut pairs = vec![(planned_depart(s, k, t, d), planned_depart(s, k - 1, t, d))];
                        if t < last {
                            pairs.push((planned_ground(s, k, t, d), planned_ground(s, k - 1, t, d)));
                        }
                        for (current, previous) in pairs {
                            let current = model.var(&current)?;
                            let previous = model.var(&previous)?;
                            model.add_indicator(
                                ConstraintTag::RevisionGate,
                                Indicator {
                                    trigger,
                                    active_when: false,
                                    constraint: LinearConstraint::eq(current, previous),
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
