//! Scalar planning parameters shared by every formulation

use serde::{Deserialize, Serialize};

/// Unit costs charged per flight and period (diversion: per flight).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostParams {
    #[serde(default = "default_ground_cost")]
    pub ground_cost: f64,
    #[serde(default = "default_air_cost")]
    pub air_cost: f64,
    #[serde(default = "default_divert_cost")]
    pub divert_cost: f64,
}

fn default_ground_cost() -> f64 {
    1.0
}

fn default_air_cost() -> f64 {
    2.0
}

fn default_divert_cost() -> f64 {
    100.0
}

impl Default for CostParams {
    fn default() -> Self {
        Self {
            ground_cost: default_ground_cost(),
            air_cost: default_air_cost(),
            divert_cost: default_divert_cost(),
        }
    }
}

impl CostParams {
    pub fn new(ground_cost: f64, air_cost: f64, divert_cost: f64) -> Self {
        Self {
            ground_cost,
            air_cost,
            divert_cost,
        }
    }

    pub fn with_ground_cost(mut self, cost: f64) -> Self {
        self.ground_cost = cost;
        self
    }

    pub fn with_air_cost(mut self, cost: f64) -> Self {
        self.air_cost = cost;
        self
    }

    pub fn with_divert_cost(mut self, cost: f64) -> Self {
        self.divert_cost = cost;
        self
    }

    /// Price a diversion as `factor` hours of airborne holding.
    pub fn with_divert_factor(mut self, factor: f64, periods_per_hour: usize) -> Self {
        self.divert_cost = factor * periods_per_hour as f64 * self.air_cost;
        self
    }
}

/// Cap on the number of flights holding in the air in any period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirborneLimit {
    #[default]
    Unlimited,
    Limited(u32),
}

impl AirborneLimit {
    /// Upper bound for airborne-holding variables.
    pub fn upper_bound(&self) -> f64 {
        match self {
            AirborneLimit::Unlimited => f64::INFINITY,
            AirborneLimit::Limited(max) => f64::from(*max),
        }
    }

    pub fn is_limited(&self) -> bool {
        matches!(self, AirborneLimit::Limited(_))
    }
}

impl From<Option<u32>> for AirborneLimit {
    fn from(value: Option<u32>) -> Self {
        value.map_or(AirborneLimit::Unlimited, AirborneLimit::Limited)
    }
}
