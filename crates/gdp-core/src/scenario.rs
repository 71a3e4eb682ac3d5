//! Capacity scenarios: one realization of arrival capacity per period.

use crate::error::{GdpError, GdpResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Unique identifier for a capacity scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(usize);

impl ScenarioId {
    #[inline]
    pub fn new(value: usize) -> Self {
        ScenarioId(value)
    }

    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Arrival capacity per period under one realization of the weather.
///
/// Scenarios are immutable once constructed; trees and models share them
/// by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityScenario {
    id: ScenarioId,
    probability: f64,
    capacity: Vec<u32>,
}

impl CapacityScenario {
    /// Create a scenario. The probability must lie in `(0, 1]`.
    pub fn new(id: ScenarioId, probability: f64, capacity: Vec<u32>) -> GdpResult<Self> {
        if !(probability > 0.0 && probability <= 1.0) {
            return Err(GdpError::Config(format!(
                "scenario {id} has probability {probability}, expected a value in (0, 1]"
            )));
        }
        Ok(Self {
            id,
            probability,
            capacity,
        })
    }

    pub fn id(&self) -> ScenarioId {
        self.id
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Capacity in `period`, or `None` past the end of the horizon.
    pub fn capacity(&self, period: usize) -> Option<u32> {
        self.capacity.get(period).copied()
    }

    pub fn capacities(&self) -> &[u32] {
        &self.capacity
    }

    pub fn num_periods(&self) -> usize {
        self.capacity.len()
    }

    /// Total arrivals the airport can accept over the whole horizon.
    pub fn total_capacity(&self) -> u64 {
        self.capacity.iter().map(|&c| u64::from(c)).sum()
    }

    /// Whether both scenarios have element-wise equal capacity over `window`.
    ///
    /// A window reaching past either horizon never matches.
    pub fn agrees_on(&self, other: &CapacityScenario, window: RangeInclusive<usize>) -> bool {
        match (
            self.capacity.get(window.clone()),
            other.capacity.get(window),
        ) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for CapacityScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P={:.4}, C:", self.probability)?;
        for c in &self.capacity {
            write!(f, " {c}")?;
        }
        Ok(())
    }
}
