use crate::error::ModelResult;
use crate::model::{ConstraintTag, LinearConstraint, LinearExpr, Model, VarKey};
use gdp_core::{ScenarioId, ScenarioTree};

/// Equate `key_for(s)` across every scenario `s` sharing a node at `period`.
///
/// Each node's first scenario anchors the others, giving `|node| - 1`
/// equalities per node.
pub(crate) fn tie_across_nodes(
    model: &mut Model,
    tree: &ScenarioTree,
    period: usize,
    key_for: impl Fn(ScenarioId) -> VarKey,
) -> ModelResult<()> {
    tie_groups(model, tree.nodes(period), |model, s| {
        Ok(LinearExpr::from(model.var(&key_for(s))?))
    })
}

/// Equate an expression per scenario across every node at `period`.
pub(crate) fn tie_exprs_across_nodes(
    model: &mut Model,
    tree: &ScenarioTree,
    period: usize,
    expr_for: impl Fn(&Model, ScenarioId) -> ModelResult<LinearExpr>,
) -> ModelResult<()> {
    tie_groups(model, tree.nodes(period), expr_for)
}

/// Equate `key_for(s)` across scenarios linked by a shared node at any
/// period `0..=period`.
///
/// A quantity fixed in the period-0 plan and never revised must agree
/// wherever the scenarios were indistinguishable at some point up to
/// `period`, which is the transitive closure of those node partitions.
pub(crate) fn tie_through_period(
    model: &mut Model,
    tree: &ScenarioTree,
    period: usize,
    key_for: impl Fn(ScenarioId) -> VarKey,
) -> ModelResult<()> {
    let groups = linked_groups(tree, period);
    tie_groups(model, &groups, |model, s| {
        Ok(LinearExpr::from(model.var(&key_for(s))?))
    })
}

fn tie_groups(
    model: &mut Model,
    groups: &[Vec<ScenarioId>],
    expr_for: impl Fn(&Model, ScenarioId) -> ModelResult<LinearExpr>,
) -> ModelResult<()> {
    for group in groups {
        let Some((&anchor, rest)) = group.split_first() else {
            continue;
        };
        let anchor = expr_for(&*model, anchor)?;
        for &other in rest {
            let expr = expr_for(&*model, other)?;
            model.add_linear(
                ConstraintTag::NonAnticipativity,
                LinearConstraint::eq(expr, anchor.clone()),
            );
        }
    }
    Ok(())
}

/// Scenario groups joined by any node at periods `0..=period`, in scenario order.
fn linked_groups(tree: &ScenarioTree, period: usize) -> Vec<Vec<ScenarioId>> {
    let ids: Vec<ScenarioId> = tree.scenarios().iter().map(|s| s.id()).collect();
    let index = |id: ScenarioId| ids.iter().position(|&other| other == id);

    let mut parent: Vec<usize> = (0..ids.len()).collect();
    fn root(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for t in 0..=period.min(tree.num_periods().saturating_sub(1)) {
        for node in tree.nodes(t) {
            let mut members = node.iter().filter_map(|&id| index(id));
            let Some(first) = members.next() else {
                continue;
            };
            for other in members {
                let (a, b) = (root(&mut parent, first), root(&mut parent, other));
                if a != b {
                    parent[b.max(a)] = a.min(b);
                }
            }
        }
    }

    let mut groups: Vec<(usize, Vec<ScenarioId>)> = Vec::new();
    for (i, &id) in ids.iter().enumerate() {
        let r = root(&mut parent, i);
        match groups.iter_mut().find(|(group, _)| *group == r) {
            Some((_, members)) => members.push(id),
            None => groups.push((r, vec![id])),
        }
    }
    groups.into_iter().map(|(_, members)| members).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdp_core::{CapacityScenario, Grouping, ScenarioTreeBuilder};

    fn scenario(id: usize, capacity: &[u32]) -> CapacityScenario {
        CapacityScenario::new(ScenarioId::new(id), 1.0 / 3.0, capacity.to_vec()).unwrap()
    }

    #[test]
    fn test_linked_groups_join_rejoined_windows() {
        // Window nodes: {0,1}{2} at t0, {0}{1}{2} at t1, {0}{1,2} at t2
        let tree = ScenarioTreeBuilder::new(3)
            .grouping(Grouping::Window)
            .scenario(scenario(0, &[1, 1, 1]))
            .scenario(scenario(1, &[1, 2, 2]))
            .scenario(scenario(2, &[2, 3, 2]))
            .build()
            .unwrap();
        let ids = |v: &[usize]| v.iter().map(|&i| ScenarioId::new(i)).collect::<Vec<_>>();

        assert_eq!(linked_groups(&tree, 0), vec![ids(&[0, 1]), ids(&[2])]);
        assert_eq!(linked_groups(&tree, 1), vec![ids(&[0, 1]), ids(&[2])]);
        assert_eq!(linked_groups(&tree, 2), vec![ids(&[0, 1, 2])]);
        // Periods past the horizon reuse the full closure.
        assert_eq!(linked_groups(&tree, 9), vec![ids(&[0, 1, 2])]);
    }
}
