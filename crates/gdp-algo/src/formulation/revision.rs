//! Revision indicators
//!
//! `Revision(s, r)` for `r in 1..T` marks a re-plan at period `r` along
//! scenario `s`. Period 0 is the initial plan and cannot be a revision.

use super::builder::BuildContext;
use super::nonanticipativity::tie_across_nodes;
use crate::error::ModelResult;
use crate::model::{ConstraintTag, LinearConstraint, LinearExpr, Model, VarKey, VariableDef};
use gdp_core::ScenarioId;

pub(crate) fn revision_key(scenario: ScenarioId, period: usize) -> VarKey {
    VarKey::Revision { scenario, period }
}

pub(crate) fn add_variables(ctx: &BuildContext<'_>, model: &mut Model) -> ModelResult<()> {
    for scenario in ctx.scenarios() {
        for r in 1..ctx.num_periods() {
            model.add_variable(VariableDef::binary(revision_key(scenario.id(), r)))?;
        }
    }
    Ok(())
}

/// At most `max_revisions` revision periods per scenario path.
pub(crate) fn add_limits(ctx: &BuildContext<'_>, model: &mut Model) -> ModelResult<()> {
    if ctx.num_periods() < 2 {
        return Ok(());
    }
    let limit = f64::from(ctx.capabilities.max_revisions);
    for scenario in ctx.scenarios() {
        let mut revisions = LinearExpr::new();
        for r in 1..ctx.num_periods() {
            revisions.add_var(model.var(&revision_key(scenario.id(), r))?);
        }
        model.add_linear(
            ConstraintTag::RevisionLimit,
            LinearConstraint::le(revisions, limit),
        );
    }
    Ok(())
}

/// Whether to revise at `r` is decided with the information of period `r`.
pub(crate) fn add_nonanticipativity(ctx: &BuildContext<'_>, model: &mut Model) -> ModelResult<()> {
    for r in 1..ctx.num_periods() {
        tie_across_nodes(model, ctx.tree(), r, |s| revision_key(s, r))?;
    }
    Ok(())
}
