//! Arrival demand over a planning horizon
//!
//! Two shapes of the same information:
//! - [`AggregatedDemand`]: per duration bucket, the number of flights scheduled
//!   to depart in each period.
//! - [`FlightDemand`]: one [`DiscreteFlight`] per sitting flight.
//!
//! Both carry `enroute[t]`, the flights already airborne when the horizon
//! starts that arrive in period `t`.
//!
//! A flight departing in period `t` with duration `d` must be able to land
//! inside the horizon, so `t + d <= T - 1`. Both shapes enforce this when
//! demand is added.

use crate::error::{GdpError, GdpResult};
use crate::flight::{DiscreteFlight, FlightId, FlightStatus, ScheduledFlight};
use crate::horizon::Horizon;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn check_landable(num_periods: usize, period: usize, duration: usize) -> GdpResult<()> {
    if period + duration >= num_periods {
        return Err(GdpError::Config(format!(
            "demand departing in period {period} with duration {duration} cannot land within {num_periods} periods"
        )));
    }
    Ok(())
}

fn check_enroute(num_periods: usize, enroute: &[u32]) -> GdpResult<()> {
    if enroute.len() != num_periods {
        return Err(GdpError::Config(format!(
            "enroute counts cover {} periods, horizon has {}",
            enroute.len(),
            num_periods
        )));
    }
    Ok(())
}

/// Departures per (duration bucket, period) plus airborne arrivals per period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedDemand {
    num_periods: usize,
    buckets: BTreeMap<usize, Vec<u32>>,
    enroute: Vec<u32>,
}

impl AggregatedDemand {
    /// Empty demand over `num_periods` periods.
    pub fn new(num_periods: usize) -> Self {
        Self {
            num_periods,
            buckets: BTreeMap::new(),
            enroute: vec![0; num_periods],
        }
    }

    /// Replace the departures of one duration bucket.
    pub fn with_bucket(mut self, duration: usize, counts: Vec<u32>) -> GdpResult<Self> {
        if counts.len() != self.num_periods {
            return Err(GdpError::Config(format!(
                "bucket {duration} covers {} periods, horizon has {}",
                counts.len(),
                self.num_periods
            )));
        }
        for (period, &count) in counts.iter().enumerate() {
            if count > 0 {
                check_landable(self.num_periods, period, duration)?;
            }
        }
        self.buckets.insert(duration, counts);
        Ok(self)
    }

    pub fn with_enroute(mut self, enroute: Vec<u32>) -> GdpResult<Self> {
        check_enroute(self.num_periods, &enroute)?;
        self.enroute = enroute;
        Ok(self)
    }

    /// Add `count` departures of duration `duration` in `period`.
    pub fn add(&mut self, duration: usize, period: usize, count: u32) -> GdpResult<()> {
        check_landable(self.num_periods, period, duration)?;
        let num_periods = self.num_periods;
        self.buckets
            .entry(duration)
            .or_insert_with(|| vec![0; num_periods])[period] += count;
        Ok(())
    }

    pub fn add_enroute(&mut self, period: usize, count: u32) -> GdpResult<()> {
        let slot = self.enroute.get_mut(period).ok_or_else(|| {
            GdpError::Config(format!(
                "enroute arrival in period {period} lies outside {} periods",
                self.num_periods
            ))
        })?;
        *slot += count;
        Ok(())
    }

    pub fn num_periods(&self) -> usize {
        self.num_periods
    }

    /// Duration buckets in increasing order.
    pub fn durations(&self) -> impl Iterator<Item = usize> + '_ {
        self.buckets.keys().copied()
    }

    pub fn bucket(&self, duration: usize) -> Option<&[u32]> {
        self.buckets.get(&duration).map(Vec::as_slice)
    }

    pub fn demand(&self, duration: usize, period: usize) -> u32 {
        self.buckets
            .get(&duration)
            .and_then(|counts| counts.get(period))
            .copied()
            .unwrap_or(0)
    }

    pub fn enroute(&self, period: usize) -> u32 {
        self.enroute.get(period).copied().unwrap_or(0)
    }

    pub fn enroute_counts(&self) -> &[u32] {
        &self.enroute
    }

    /// Flights that can still be ground held.
    pub fn total_sitting(&self) -> u64 {
        self.buckets
            .values()
            .flatten()
            .map(|&c| u64::from(c))
            .sum()
    }

    pub fn total_enroute(&self) -> u64 {
        self.enroute.iter().map(|&c| u64::from(c)).sum()
    }
}

/// Individual sitting flights plus airborne arrivals per period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightDemand {
    num_periods: usize,
    flights: BTreeMap<FlightId, DiscreteFlight>,
    enroute: Vec<u32>,
}

impl FlightDemand {
    pub fn new(num_periods: usize) -> Self {
        Self {
            num_periods,
            flights: BTreeMap::new(),
            enroute: vec![0; num_periods],
        }
    }

    /// One flight per unit of aggregated demand, numbered in bucket order.
    pub fn from_aggregated(demand: &AggregatedDemand) -> GdpResult<Self> {
        let mut flights = FlightDemand::new(demand.num_periods());
        let mut next_id = 0u32;
        for duration in demand.durations() {
            for period in 0..demand.num_periods() {
                for _ in 0..demand.demand(duration, period) {
                    flights.add_flight(DiscreteFlight::new(FlightId::new(next_id), period, duration))?;
                    next_id += 1;
                }
            }
        }
        flights.with_enroute(demand.enroute_counts().to_vec())
    }

    pub fn with_flight(mut self, flight: DiscreteFlight) -> GdpResult<Self> {
        self.add_flight(flight)?;
        Ok(self)
    }

    pub fn add_flight(&mut self, flight: DiscreteFlight) -> GdpResult<()> {
        check_landable(self.num_periods, flight.depart_period, flight.duration)?;
        if self.flights.contains_key(&flight.id) {
            return Err(GdpError::Config(format!("duplicate flight id {}", flight.id)));
        }
        self.flights.insert(flight.id, flight);
        Ok(())
    }

    pub fn with_enroute(mut self, enroute: Vec<u32>) -> GdpResult<Self> {
        check_enroute(self.num_periods, &enroute)?;
        self.enroute = enroute;
        Ok(self)
    }

    pub fn add_enroute(&mut self, period: usize, count: u32) -> GdpResult<()> {
        let slot = self.enroute.get_mut(period).ok_or_else(|| {
            GdpError::Config(format!(
                "enroute arrival in period {period} lies outside {} periods",
                self.num_periods
            ))
        })?;
        *slot += count;
        Ok(())
    }

    pub fn num_periods(&self) -> usize {
        self.num_periods
    }

    /// Flights in id order.
    pub fn flights(&self) -> impl Iterator<Item = &DiscreteFlight> + '_ {
        self.flights.values()
    }

    pub fn flight(&self, id: FlightId) -> Option<&DiscreteFlight> {
        self.flights.get(&id)
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    pub fn enroute(&self, period: usize) -> u32 {
        self.enroute.get(period).copied().unwrap_or(0)
    }

    pub fn enroute_counts(&self) -> &[u32] {
        &self.enroute
    }

    pub fn total_enroute(&self) -> u64 {
        self.enroute.iter().map(|&c| u64::from(c)).sum()
    }
}

/// Turns scheduled flights into demand over a fixed horizon.
#[derive(Debug, Clone, Copy)]
pub struct DemandAggregator {
    horizon: Horizon,
}

impl DemandAggregator {
    pub fn new(horizon: Horizon) -> Self {
        Self { horizon }
    }

    pub fn horizon(&self) -> &Horizon {
        &self.horizon
    }

    /// Bucket sitting flights by duration and count airborne arrivals.
    pub fn aggregate(&self, flights: &[ScheduledFlight]) -> GdpResult<AggregatedDemand> {
        let mut demand = AggregatedDemand::new(self.horizon.num_periods());
        for flight in flights {
            match flight.status(&self.horizon) {
                FlightStatus::Sitting => {
                    let (period, duration) = self.discretize(flight)?;
                    demand.add(duration, period, 1)?;
                }
                FlightStatus::Airborne => demand.add_enroute(self.arrival_period(flight)?, 1)?,
                FlightStatus::Outside => {}
            }
        }
        Ok(demand)
    }

    /// One [`DiscreteFlight`] per sitting flight, plus airborne arrivals.
    pub fn flight_indexed(&self, flights: &[ScheduledFlight]) -> GdpResult<FlightDemand> {
        let mut demand = FlightDemand::new(self.horizon.num_periods());
        for flight in flights {
            match flight.status(&self.horizon) {
                FlightStatus::Sitting => {
                    let (period, duration) = self.discretize(flight)?;
                    demand.add_flight(DiscreteFlight::new(flight.id, period, duration))?;
                }
                FlightStatus::Airborne => demand.add_enroute(self.arrival_period(flight)?, 1)?,
                FlightStatus::Outside => {}
            }
        }
        Ok(demand)
    }

    fn discretize(&self, flight: &ScheduledFlight) -> GdpResult<(usize, usize)> {
        let period = self.horizon.index_of(flight.departure).ok_or_else(|| {
            GdpError::Validation(format!("flight {} departs before the horizon", flight.id))
        })?;
        Ok((period, self.horizon.periods_in(flight.duration())))
    }

    fn arrival_period(&self, flight: &ScheduledFlight) -> GdpResult<usize> {
        self.horizon.index_of(flight.arrival).ok_or_else(|| {
            GdpError::Validation(format!("flight {} arrives before the horizon", flight.id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2011, 8, 1, 12, 0, 0).unwrap()
    }

    fn flight(id: u32, dep_minutes: i64, duration_minutes: i64) -> ScheduledFlight {
        ScheduledFlight::new(
            FlightId::new(id),
            "ORD",
            "ATL",
            start() + Duration::minutes(dep_minutes),
            Duration::minutes(duration_minutes),
        )
    }

    fn horizon() -> Horizon {
        Horizon::new(start(), start() + Duration::hours(2), Duration::minutes(15)).unwrap()
    }

    fn schedule() -> Vec<ScheduledFlight> {
        vec![
            flight(0, 0, 35),    // sitting, period 0, 2 periods
            flight(1, 10, 40),   // sitting, period 0, 2 periods
            flight(2, 31, 61),   // sitting, period 2, 4 periods
            flight(3, -20, 50),  // airborne, lands 12:30 -> period 2
            flight(4, -90, 60),  // lands 11:30 -> outside
            flight(5, 100, 60),  // lands 13:40 -> outside
        ]
    }

    #[test]
    fn test_aggregate_buckets_sitting_flights() {
        let demand = DemandAggregator::new(horizon()).aggregate(&schedule()).unwrap();
        assert_eq!(demand.num_periods(), 8);
        assert_eq!(demand.durations().collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(demand.demand(2, 0), 2);
        assert_eq!(demand.demand(4, 2), 1);
        assert_eq!(demand.total_sitting(), 3);
        assert_eq!(demand.enroute(2), 1);
        assert_eq!(demand.total_enroute(), 1);
    }

    #[test]
    fn test_flight_indexed_keeps_ids() {
        let demand = DemandAggregator::new(horizon())
            .flight_indexed(&schedule())
            .unwrap();
        assert_eq!(demand.len(), 3);
        let f2 = demand.flight(FlightId::new(2)).unwrap();
        assert_eq!((f2.depart_period, f2.duration), (2, 4));
        assert!(demand.flight(FlightId::new(3)).is_none());
        assert_eq!(demand.enroute_counts(), &[0, 0, 1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_rejects_demand_that_cannot_land() {
        let demand = AggregatedDemand::new(4);
        assert!(demand.clone().with_bucket(1, vec![0, 0, 1, 0]).is_ok());
        assert!(matches!(
            demand.with_bucket(1, vec![0, 0, 0, 1]),
            Err(GdpError::Config(_))
        ));

        let mut flights = FlightDemand::new(4);
        assert!(flights.add_flight(DiscreteFlight::new(FlightId::new(0), 1, 3)).is_err());
    }

    #[test]
    fn test_rejects_mismatched_lengths() {
        assert!(AggregatedDemand::new(4).with_bucket(1, vec![1, 0, 0]).is_err());
        assert!(AggregatedDemand::new(4).with_enroute(vec![0; 5]).is_err());
        assert!(FlightDemand::new(3).with_enroute(vec![0; 2]).is_err());
    }

    #[test]
    fn test_rejects_duplicate_flight_ids() {
        let flights = FlightDemand::new(6)
            .with_flight(DiscreteFlight::new(FlightId::new(1), 0, 2))
            .unwrap();
        assert!(flights
            .with_flight(DiscreteFlight::new(FlightId::new(1), 1, 2))
            .is_err());
    }

    #[test]
    fn test_expand_aggregated_into_flights() {
        let demand = AggregatedDemand::new(5)
            .with_bucket(1, vec![2, 0, 1, 0, 0])
            .unwrap()
            .with_bucket(3, vec![1, 0, 0, 0, 0])
            .unwrap()
            .with_enroute(vec![0, 1, 0, 0, 0])
            .unwrap();
        let flights = FlightDemand::from_aggregated(&demand).unwrap();
        assert_eq!(flights.len(), 4);
        let shapes: Vec<(usize, usize)> = flights
            .flights()
            .map(|f| (f.depart_period, f.duration))
            .collect();
        assert_eq!(shapes, vec![(0, 1), (0, 1), (2, 1), (0, 3)]);
        assert_eq!(flights.total_enroute(), 1);
    }
}
