//! Non-anticipativity scenario tree
//!
//! For every period the tree partitions the scenario set into nodes. Two
//! scenarios share a node when the planner cannot tell them apart at that
//! period: their capacities agree over the comparison window given by the
//! [`Grouping`] policy and the lookahead.
//!
//! Grouping compares each scenario against one representative per node.
//! Exact equality is transitive, so the resulting partition does not depend
//! on which member represents a node.

use crate::error::{GdpError, GdpResult};
use crate::scenario::{CapacityScenario, ScenarioId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use tracing::warn;

const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Which capacity periods decide whether two scenarios are distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    /// Compare `[t, min(t + L, T - 1)]`.
    #[default]
    Window,
    /// Compare `[0, min(t + L, T - 1)]`: revealed history plus lookahead.
    /// Nodes only ever split over time.
    History,
}

impl Grouping {
    /// Inclusive period range compared at `period`. `num_periods` must be non-zero.
    pub fn comparison_window(
        self,
        period: usize,
        lookahead: usize,
        num_periods: usize,
    ) -> RangeInclusive<usize> {
        let end = period.saturating_add(lookahead).min(num_periods - 1);
        match self {
            Grouping::Window => period..=end,
            Grouping::History => 0..=end,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grouping::Window => "window",
            Grouping::History => "history",
        }
    }
}

impl FromStr for Grouping {
    type Err = GdpError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_ascii_lowercase().as_str() {
            "window" | "default" => Ok(Grouping::Window),
            "history" | "prefix" => Ok(Grouping::History),
            other => Err(GdpError::Config(format!(
                "unknown grouping '{other}'; supported values: window, history"
            ))),
        }
    }
}

/// Builder for [`ScenarioTree`]
#[derive(Debug, Clone)]
pub struct ScenarioTreeBuilder {
    num_periods: usize,
    lookahead: usize,
    grouping: Grouping,
    scenarios: Vec<CapacityScenario>,
}

impl ScenarioTreeBuilder {
    pub fn new(num_periods: usize) -> Self {
        Self {
            num_periods,
            lookahead: 0,
            grouping: Grouping::default(),
            scenarios: Vec::new(),
        }
    }

    pub fn lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn scenario(mut self, scenario: CapacityScenario) -> Self {
        self.scenarios.push(scenario);
        self
    }

    pub fn scenarios(mut self, scenarios: impl IntoIterator<Item = CapacityScenario>) -> Self {
        self.scenarios.extend(scenarios);
        self
    }

    pub fn build(self) -> GdpResult<ScenarioTree> {
        let Self {
            num_periods,
            lookahead,
            grouping,
            mut scenarios,
        } = self;

        if num_periods == 0 {
            return Err(GdpError::Config("scenario tree needs at least one period".into()));
        }
        if scenarios.is_empty() {
            return Err(GdpError::Config("scenario set contains no scenarios".into()));
        }
        let mut seen = HashSet::new();
        for scenario in &scenarios {
            if !seen.insert(scenario.id()) {
                return Err(GdpError::Config(format!(
                    "duplicate scenario id {} in scenario set",
                    scenario.id()
                )));
            }
            if scenario.num_periods() != num_periods {
                return Err(GdpError::Config(format!(
                    "scenario {} has {} capacity periods, horizon has {}",
                    scenario.id(),
                    scenario.num_periods(),
                    num_periods
                )));
            }
        }

        let total: f64 = scenarios.iter().map(|s| s.probability()).sum();
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            warn!(total, "scenario probabilities do not sum to 1");
        }

        scenarios.sort_by_key(|s| s.id());
        let index: HashMap<ScenarioId, usize> = scenarios
            .iter()
            .enumerate()
            .map(|(pos, s)| (s.id(), pos))
            .collect();

        let mut partitions = Vec::with_capacity(num_periods);
        let mut node_of = Vec::with_capacity(num_periods);
        for period in 0..num_periods {
            let window = grouping.comparison_window(period, lookahead, num_periods);
            let nodes = partition(&scenarios, window);

            let mut membership = vec![0; scenarios.len()];
            for (node_idx, node) in nodes.iter().enumerate() {
                for &pos in node {
                    membership[pos] = node_idx;
                }
            }
            node_of.push(membership);
            partitions.push(
                nodes
                    .into_iter()
                    .map(|node| node.into_iter().map(|pos| scenarios[pos].id()).collect())
                    .collect(),
            );
        }

        Ok(ScenarioTree {
            num_periods,
            lookahead,
            grouping,
            scenarios,
            index,
            partitions,
            node_of,
        })
    }
}

/// Group scenario positions whose capacities agree over `window`.
fn partition(scenarios: &[CapacityScenario], window: RangeInclusive<usize>) -> Vec<Vec<usize>> {
    let mut nodes: Vec<Vec<usize>> = Vec::new();
    for (pos, scenario) in scenarios.iter().enumerate() {
        let existing = nodes
            .iter_mut()
            .find(|node| scenarios[node[0]].agrees_on(scenario, window.clone()));
        match existing {
            Some(node) => node.push(pos),
            None => nodes.push(vec![pos]),
        }
    }
    nodes
}

/// Per-period partition of scenarios into non-anticipativity nodes.
///
/// Read-only after construction. Scenarios are stored in id order.
#[derive(Debug, Clone)]
pub struct ScenarioTree {
    num_periods: usize,
    lookahead: usize,
    grouping: Grouping,
    scenarios: Vec<CapacityScenario>,
    index: HashMap<ScenarioId, usize>,
    partitions: Vec<Vec<Vec<ScenarioId>>>,
    node_of: Vec<Vec<usize>>,
}

impl ScenarioTree {
    /// Build a tree with the default [`Grouping::Window`] policy.
    pub fn build(
        num_periods: usize,
        scenarios: impl IntoIterator<Item = CapacityScenario>,
        lookahead: usize,
    ) -> GdpResult<Self> {
        ScenarioTreeBuilder::new(num_periods)
            .lookahead(lookahead)
            .scenarios(scenarios)
            .build()
    }

    pub fn builder(num_periods: usize) -> ScenarioTreeBuilder {
        ScenarioTreeBuilder::new(num_periods)
    }

    pub fn num_periods(&self) -> usize {
        self.num_periods
    }

    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    pub fn grouping(&self) -> Grouping {
        self.grouping
    }

    pub fn num_scenarios(&self) -> usize {
        self.scenarios.len()
    }

    /// Scenarios in id order.
    pub fn scenarios(&self) -> &[CapacityScenario] {
        &self.scenarios
    }

    pub fn scenario_ids(&self) -> impl Iterator<Item = ScenarioId> + '_ {
        self.scenarios.iter().map(|s| s.id())
    }

    pub fn scenario(&self, id: ScenarioId) -> Option<&CapacityScenario> {
        self.index.get(&id).map(|&pos| &self.scenarios[pos])
    }

    pub fn probability(&self, id: ScenarioId) -> Option<f64> {
        self.scenario(id).map(|s| s.probability())
    }

    pub fn capacity(&self, id: ScenarioId, period: usize) -> Option<u32> {
        self.scenario(id).and_then(|s| s.capacity(period))
    }

    pub fn total_probability(&self) -> f64 {
        self.scenarios.iter().map(|s| s.probability()).sum()
    }

    /// Nodes at `period`; empty past the horizon.
    pub fn nodes(&self, period: usize) -> &[Vec<ScenarioId>] {
        self.partitions
            .get(period)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn num_nodes(&self, period: usize) -> usize {
        self.nodes(period).len()
    }

    /// Index into [`ScenarioTree::nodes`] of the node holding `id` at `period`.
    pub fn node_index(&self, period: usize, id: ScenarioId) -> Option<usize> {
        let pos = *self.index.get(&id)?;
        self.node_of.get(period).map(|membership| membership[pos])
    }

    pub fn same_node(&self, period: usize, a: ScenarioId, b: ScenarioId) -> bool {
        match (self.node_index(period, a), self.node_index(period, b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// One line per scenario: id, probability and capacity profile.
    pub fn describe_scenarios(&self) -> String {
        self.scenarios
            .iter()
            .map(|s| format!("{}: {}\n", s.id(), s))
            .collect()
    }
}

impl fmt::Display for ScenarioTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (period, nodes) in self.partitions.iter().enumerate() {
            write!(f, "{period}: {{")?;
            for (i, node) in nodes.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                let ids: Vec<String> = node.iter().map(|id| id.to_string()).collect();
                write!(f, "{{{}}}", ids.join(","))?;
            }
            writeln!(f, "}}")?;
        }
        Ok(())
    }
}
