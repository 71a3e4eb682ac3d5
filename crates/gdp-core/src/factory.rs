//! Canonical "low-to-high" capacity scenario generator
//!
//! Models a single step change from a `low` to a `high` hourly arrival rate
//! at an unknown period in `[earliest_change, latest_change)`. Each candidate
//! change period yields one scenario whose id is that period.
//!
//! Capacities are spread over rolling one-hour blocks: before the change the
//! blocks are aligned to period 0, from the change on they are aligned to the
//! change period. The `k`-th period of a block receives
//! `floor((k + 1) * rate / periods_per_hour)` minus what the block already
//! received, so each complete block totals exactly `rate`.

use crate::error::{GdpError, GdpResult};
use crate::scenario::{CapacityScenario, ScenarioId};
use crate::tree::{Grouping, ScenarioTree, ScenarioTreeBuilder};
use serde::{Deserialize, Serialize};

/// Share of probability mass given to the first hour of candidates when
/// alternate probabilities are requested.
const EARLY_HOUR_MASS: f64 = 0.4;

/// Parameters of the low-to-high scenario family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowToHigh {
    pub num_periods: usize,
    /// First candidate change period (inclusive)
    pub earliest_change: usize,
    /// Last candidate change period (exclusive)
    pub latest_change: usize,
    /// Arrivals per hour before the change
    pub low_rate: u32,
    /// Arrivals per hour from the change on
    pub high_rate: u32,
    pub periods_per_hour: usize,
    /// Weight the first hour of candidates at 40% of the mass instead of uniformly.
    #[serde(default)]
    pub alt_probs: bool,
    #[serde(default)]
    pub lookahead: usize,
    #[serde(default)]
    pub grouping: Grouping,
}

impl LowToHigh {
    pub fn new(
        num_periods: usize,
        earliest_change: usize,
        latest_change: usize,
        low_rate: u32,
        high_rate: u32,
        periods_per_hour: usize,
    ) -> Self {
        Self {
            num_periods,
            earliest_change,
            latest_change,
            low_rate,
            high_rate,
            periods_per_hour,
            alt_probs: false,
            lookahead: 0,
            grouping: Grouping::default(),
        }
    }

    pub fn with_alt_probs(mut self, alt_probs: bool) -> Self {
        self.alt_probs = alt_probs;
        self
    }

    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn with_grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn num_candidates(&self) -> usize {
        self.latest_change.saturating_sub(self.earliest_change)
    }

    pub fn validate(&self) -> GdpResult<()> {
        if self.num_periods == 0 {
            return Err(GdpError::Config("low-to-high family needs at least one period".into()));
        }
        if self.periods_per_hour == 0 {
            return Err(GdpError::Config("periods_per_hour must be positive".into()));
        }
        if self.earliest_change >= self.latest_change {
            return Err(GdpError::Config(format!(
                "earliest change {} must precede latest change {}",
                self.earliest_change, self.latest_change
            )));
        }
        if self.alt_probs && self.num_candidates() <= self.periods_per_hour {
            return Err(GdpError::Config(format!(
                "alternate probabilities need more than {} candidate change periods, got {}",
                self.periods_per_hour,
                self.num_candidates()
            )));
        }
        Ok(())
    }

    /// One scenario per candidate change period, in change order.
    pub fn scenarios(&self) -> GdpResult<Vec<CapacityScenario>> {
        self.validate()?;
        let count = self.num_candidates();
        (self.earliest_change..self.latest_change)
            .enumerate()
            .map(|(position, change)| {
                CapacityScenario::new(
                    ScenarioId::new(change),
                    self.probability(position, count),
                    self.capacity_profile(change),
                )
            })
            .collect()
    }

    pub fn build_tree(&self) -> GdpResult<ScenarioTree> {
        ScenarioTreeBuilder::new(self.num_periods)
            .lookahead(self.lookahead)
            .grouping(self.grouping)
            .scenarios(self.scenarios()?)
            .build()
    }

    fn probability(&self, position: usize, count: usize) -> f64 {
        if !self.alt_probs {
            return 1.0 / count as f64;
        }
        if position < self.periods_per_hour {
            EARLY_HOUR_MASS / self.periods_per_hour as f64
        } else {
            (1.0 - EARLY_HOUR_MASS) / (count - self.periods_per_hour) as f64
        }
    }

    /// Per-period capacity when the rate switches at `change`.
    pub fn capacity_profile(&self, change: usize) -> Vec<u32> {
        let per_hour = self.periods_per_hour as u64;
        let mut profile = Vec::with_capacity(self.num_periods);
        let mut allocated = 0u64;
        for period in 0..self.num_periods {
            let (rate, offset) = if period >= change {
                (self.high_rate, period - change)
            } else {
                (self.low_rate, period)
            };
            let k = offset as u64 % per_hour;
            if k == 0 {
                allocated = 0;
            }
            let cumulative = (k + 1) * u64::from(rate) / per_hour;
            profile.push((cumulative - allocated) as u32);
            allocated = cumulative;
        }
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_probabilities_sum_to_one() {
        let family = LowToHigh::new(40, 8, 29, 30, 60, 4);
        let scenarios = family.scenarios().unwrap();
        assert_eq!(scenarios.len(), 21);
        let total: f64 = scenarios.iter().map(|s| s.probability()).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_alternate_probabilities_split_forty_sixty() {
        let family = LowToHigh::new(40, 8, 20, 30, 60, 4).with_alt_probs(true);
        let scenarios = family.scenarios().unwrap();
        let early: f64 = scenarios[..4].iter().map(|s| s.probability()).sum();
        let late: f64 = scenarios[4..].iter().map(|s| s.probability()).sum();
        assert!((early - 0.4).abs() < 1e-9);
        assert!((late - 0.6).abs() < 1e-9);
        assert!((scenarios[0].probability() - 0.1).abs() < 1e-12);
        assert!((scenarios[4].probability() - 0.075).abs() < 1e-12);
    }

    #[test]
    fn test_alternate_probabilities_need_enough_candidates() {
        let family = LowToHigh::new(40, 8, 12, 30, 60, 4).with_alt_probs(true);
        assert!(matches!(family.scenarios(), Err(GdpError::Config(_))));
    }

    #[test]
    fn test_scenario_ids_are_change_periods() {
        let family = LowToHigh::new(12, 3, 6, 4, 8, 4);
        let ids: Vec<usize> = family
            .scenarios()
            .unwrap()
            .iter()
            .map(|s| s.id().value())
            .collect();
        assert_eq!(ids, vec![3, 4, 5]);
    }

    #[test]
    fn test_profile_rebases_hour_at_change() {
        // 4 periods per hour; low = 6/h, high = 10/h, change at period 6.
        let family = LowToHigh::new(12, 6, 7, 6, 10, 4);
        let profile = family.capacity_profile(6);
        // Low hour aligned to period 0: floor(6k/4) increments 1,2,1,2.
        assert_eq!(&profile[0..4], &[1, 2, 1, 2]);
        // Partial low block before the change.
        assert_eq!(&profile[4..6], &[1, 2]);
        // High hour aligned to period 6: floor(10k/4) increments 2,3,2,3.
        assert_eq!(&profile[6..10], &[2, 3, 2, 3]);
        assert_eq!(&profile[10..12], &[2, 3]);
    }

    /// Every complete hour block of every scenario totals the block's rate.
    #[test]
    fn test_hourly_capacity_conservation() {
        for (low, high, per_hour) in [(30u32, 60u32, 4usize), (7, 13, 3), (0, 5, 6), (11, 11, 1)] {
            let family = LowToHigh::new(30, 2, 20, low, high, per_hour);
            for scenario in family.scenarios().unwrap() {
                let change = scenario.id().value();
                let caps = scenario.capacities();
                let mut start = 0;
                while start + per_hour <= change {
                    let block: u32 = caps[start..start + per_hour].iter().sum();
                    assert_eq!(block, low, "low block at {start}, change {change}");
                    start += per_hour;
                }
                let mut start = change;
                while start + per_hour <= caps.len() {
                    let block: u32 = caps[start..start + per_hour].iter().sum();
                    assert_eq!(block, high, "high block at {start}, change {change}");
                    start += per_hour;
                }
            }
        }
    }

    #[test]
    fn test_tree_from_family_shares_root_node() {
        let tree = LowToHigh::new(16, 4, 8, 4, 8, 4)
            .with_lookahead(2)
            .build_tree()
            .unwrap();
        assert_eq!(tree.num_scenarios(), 4);
        // Window [0, 2] precedes every change.
        assert_eq!(tree.num_nodes(0), 1);
        // Window [6, 8] has seen changes at 4, 5, 6, 7 differently.
        assert!(tree.num_nodes(6) > 1);
    }

    #[test]
    fn test_rejects_inverted_change_range() {
        assert!(LowToHigh::new(10, 5, 5, 1, 2, 4).validate().is_err());
        assert!(LowToHigh::new(10, 1, 5, 1, 2, 0).validate().is_err());
    }
}
