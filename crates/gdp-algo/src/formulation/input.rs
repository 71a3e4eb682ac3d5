use super::Granularity;
use crate::error::{ModelError, ModelResult};
use gdp_core::{AggregatedDemand, AirborneLimit, CostParams, FlightDemand, ScenarioTree};

/// Borrowed demand in either shape.
#[derive(Debug, Clone, Copy)]
pub enum DemandRef<'a> {
    Aggregated(&'a AggregatedDemand),
    PerFlight(&'a FlightDemand),
}

impl<'a> DemandRef<'a> {
    pub fn num_periods(&self) -> usize {
        match self {
            DemandRef::Aggregated(d) => d.num_periods(),
            DemandRef::PerFlight(d) => d.num_periods(),
        }
    }

    pub fn enroute(&self, period: usize) -> u32 {
        match self {
            DemandRef::Aggregated(d) => d.enroute(period),
            DemandRef::PerFlight(d) => d.enroute(period),
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            DemandRef::Aggregated(_) => Granularity::Bucket,
            DemandRef::PerFlight(_) => Granularity::PerFlight,
        }
    }

    /// Sitting flights plus enroute flights.
    pub fn total_units(&self) -> u64 {
        match self {
            DemandRef::Aggregated(d) => d.total_sitting() + d.total_enroute(),
            DemandRef::PerFlight(d) => d.len() as u64 + d.total_enroute(),
        }
    }
}

impl<'a> From<&'a AggregatedDemand> for DemandRef<'a> {
    fn from(demand: &'a AggregatedDemand) -> Self {
        DemandRef::Aggregated(demand)
    }
}

impl<'a> From<&'a FlightDemand> for DemandRef<'a> {
    fn from(demand: &'a FlightDemand) -> Self {
        DemandRef::PerFlight(demand)
    }
}

/// Read-only view of everything a formulation consumes.
///
/// The caller owns the tree and the demand.
#[derive(Debug, Clone, Copy)]
pub struct ModelInput<'a> {
    tree: &'a ScenarioTree,
    demand: DemandRef<'a>,
    costs: CostParams,
    max_airborne: AirborneLimit,
}

impl<'a> ModelInput<'a> {
    /// Combine a tree and demand over the same horizon.
    pub fn new(
        tree: &'a ScenarioTree,
        demand: impl Into<DemandRef<'a>>,
        costs: CostParams,
        max_airborne: AirborneLimit,
    ) -> ModelResult<Self> {
        let demand = demand.into();
        if demand.num_periods() != tree.num_periods() {
            return Err(ModelError::Config(format!(
                "demand covers {} periods, scenario tree covers {}",
                demand.num_periods(),
                tree.num_periods()
            )));
        }
        Ok(Self {
            tree,
            demand,
            costs,
            max_airborne,
        })
    }

    pub fn tree(&self) -> &'a ScenarioTree {
        self.tree
    }

    pub fn demand(&self) -> DemandRef<'a> {
        self.demand
    }

    pub fn costs(&self) -> &CostParams {
        &self.costs
    }

    pub fn max_airborne(&self) -> AirborneLimit {
        self.max_airborne
    }

    pub fn num_periods(&self) -> usize {
        self.tree.num_periods()
    }

    /// Last period a unit of this duration can leave and still land in the horizon.
    pub fn last_departure(&self, duration: usize) -> Option<usize> {
        (self.num_periods() - 1).checked_sub(duration)
    }
}
