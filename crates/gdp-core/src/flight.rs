//! Flights, before and after discretization

use crate::horizon::Horizon;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Unique identifier for a flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlightId(u32);

impl FlightId {
    #[inline]
    pub fn new(value: u32) -> Self {
        FlightId(value)
    }

    #[inline]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for FlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a flight stands relative to a planning horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightStatus {
    /// Arrives inside the horizon and has not left yet: ground-holdable.
    Sitting,
    /// Arrives inside the horizon but departed before it started.
    Airborne,
    /// Arrives outside the horizon.
    Outside,
}

/// A scheduled arrival at the planning airport, with absolute UTC times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledFlight {
    pub id: FlightId,
    pub origin: String,
    pub destination: String,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
}

impl ScheduledFlight {
    pub fn new(
        id: FlightId,
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            id,
            origin: origin.into(),
            destination: destination.into(),
            departure,
            arrival: departure + duration,
        }
    }

    pub fn duration(&self) -> Duration {
        self.arrival - self.departure
    }

    pub fn status(&self, horizon: &Horizon) -> FlightStatus {
        if !horizon.contains(self.arrival) {
            FlightStatus::Outside
        } else if self.departure < horizon.start() {
            FlightStatus::Airborne
        } else {
            FlightStatus::Sitting
        }
    }
}

/// A flight expressed in periods. Equality and hashing use the id only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DiscreteFlight {
    pub id: FlightId,
    pub depart_period: usize,
    pub duration: usize,
}

impl DiscreteFlight {
    pub fn new(id: FlightId, depart_period: usize, duration: usize) -> Self {
        Self {
            id,
            depart_period,
            duration,
        }
    }

    /// Period the flight lands in when it leaves on schedule.
    pub fn scheduled_arrival(&self) -> usize {
        self.depart_period + self.duration
    }
}

impl PartialEq for DiscreteFlight {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DiscreteFlight {}

impl Hash for DiscreteFlight {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
