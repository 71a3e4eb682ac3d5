//! Core data model for Ground Delay Program planning: capacity scenarios,
//! non-anticipativity trees, planning horizons and arrival demand.

pub mod demand;
pub mod error;
pub mod factory;
pub mod flight;
pub mod horizon;
pub mod params;
pub mod scenario;
pub mod tree;

pub use demand::{AggregatedDemand, DemandAggregator, FlightDemand};
pub use error::{GdpError, GdpResult};
pub use factory::LowToHigh;
pub use flight::{DiscreteFlight, FlightId, FlightStatus, ScheduledFlight};
pub use horizon::Horizon;
pub use params::{AirborneLimit, CostParams};
pub use scenario::{CapacityScenario, ScenarioId};
pub use tree::{Grouping, ScenarioTree, ScenarioTreeBuilder};
