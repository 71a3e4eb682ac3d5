//! Arrival-side balance shared by every formulation
//!
//! Inflow in period `t` under scenario `s` is
//! `enroute[t] + Air(s, t-1) + departures completing at t`.
//!
//! Without diversion: `inflow <= capacity(s, t) + Air(s, t)`.
//! With diversion: `inflow == Air(s, t) + Land(s, t) + Divert(s, t)` and
//! `Land(s, t) <= capacity(s, t)` by bounds.

use super::builder::BuildContext;
use super::departure::DepartureEncoding;
use crate::error::ModelResult;
use crate::model::{ConstraintTag, LinearConstraint, LinearExpr, Model, VarKey, VariableDef};

pub(crate) fn add_variables(ctx: &BuildContext<'_>, model: &mut Model) -> ModelResult<()> {
    let costs = ctx.input.costs();
    let air_bound = ctx.input.max_airborne().upper_bound();
    for scenario in ctx.scenarios() {
        let s = scenario.id();
        let p = scenario.probability();
        for (t, &capacity) in scenario.capacities().iter().enumerate() {
            model.add_variable(
                VariableDef::count(VarKey::Air {
                    scenario: s,
                    period: t,
                })
                .max(air_bound)
                .cost(costs.air_cost * p),
            )?;
            if ctx.capabilities.diversion {
                model.add_variable(
                    VariableDef::count(VarKey::Land {
                        scenario: s,
                        period: t,
                    })
                    .max(f64::from(capacity)),
                )?;
                model.add_variable(
                    VariableDef::count(VarKey::Divert {
                        scenario: s,
                        period: t,
                    })
                    .cost(costs.divert_cost * p),
                )?;
            }
        }
    }
    Ok(())
}

pub(crate) fn add_balance(
    ctx: &BuildContext<'_>,
    departures: &dyn DepartureEncoding,
    model: &mut Model,
) -> ModelResult<()> {
    let demand = ctx.input.demand();
    for scenario in ctx.scenarios() {
        let s = scenario.id();
        for (t, &capacity) in scenario.capacities().iter().enumerate() {
            let mut inflow = LinearExpr::constant(f64::from(demand.enroute(t)));
            if t > 0 {
                inflow.add_var(model.var(&VarKey::Air {
                    scenario: s,
                    period: t - 1,
                })?);
            }
            inflow.add_expr(&departures.arrivals(ctx, model, s, t)?);

            let air = model.var(&VarKey::Air {
                scenario: s,
                period: t,
            })?;
            let constraint = if ctx.capabilities.diversion {
                let outflow: LinearExpr = [
                    air,
                    model.var(&VarKey::Land {
                        scenario: s,
                        period: t,
                    })?,
                    model.var(&VarKey::Divert {
                        scenario: s,
                        period: t,
                    })?,
                ]
                .into_iter()
                .collect();
                LinearConstraint::eq(inflow, outflow)
            } else {
                LinearConstraint::le(
                    inflow,
                    LinearExpr::constant(f64::from(capacity)).with_term(air, 1.0),
                )
            };
            model.add_linear(ConstraintTag::ArrivalBalance, constraint);
        }
    }
    Ok(())
}
