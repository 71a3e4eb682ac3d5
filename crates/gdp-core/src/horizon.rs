//! Planning horizon discretization
//!
//! Maps absolute instants onto period indices. All arithmetic floors to
//! whole periods; sub-second remainders are ignored.

use crate::error::{GdpError, GdpResult};
use chrono::{DateTime, Duration, Utc};

/// Half-open planning window `[start, end)` split into periods of equal length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    period: Duration,
}

impl Horizon {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, period: Duration) -> GdpResult<Self> {
        if period.num_seconds() <= 0 {
            return Err(GdpError::Config(format!(
                "period length must be at least one second, got {period}"
            )));
        }
        if end < start {
            return Err(GdpError::Config(format!(
                "horizon ends ({end}) before it starts ({start})"
            )));
        }
        Ok(Self { start, end, period })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn period_length(&self) -> Duration {
        self.period
    }

    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.start <= time && time < self.end
    }

    /// Period holding `time`, or `None` before the start.
    pub fn index_of(&self, time: DateTime<Utc>) -> Option<usize> {
        time_to_index(time, self.start, self.period)
    }

    /// Number of whole periods in `duration`.
    pub fn periods_in(&self, duration: Duration) -> usize {
        duration_to_periods(duration, self.period)
    }

    pub fn num_periods(&self) -> usize {
        num_periods(self.start, self.end, self.period)
    }

    pub fn periods_per_hour(&self) -> usize {
        duration_to_periods(Duration::hours(1), self.period)
    }
}

/// `floor(duration / period)`, zero for negative durations.
pub fn duration_to_periods(duration: Duration, period: Duration) -> usize {
    let period_secs = period.num_seconds();
    if period_secs <= 0 || duration.num_seconds() < 0 {
        return 0;
    }
    (duration.num_seconds() / period_secs) as usize
}

/// `floor((time - start) / period)`, `None` when `time` precedes `start`.
pub fn time_to_index(time: DateTime<Utc>, start: DateTime<Utc>, period: Duration) -> Option<usize> {
    if time < start {
        return None;
    }
    Some(duration_to_periods(time - start, period))
}

/// Periods needed to cover `[start, end)`: a trailing partial period counts.
pub fn num_periods(start: DateTime<Utc>, end: DateTime<Utc>, period: Duration) -> usize {
    let Some(last) = time_to_index(end, start, period) else {
        return 0;
    };
    let period_secs = period.num_seconds();
    if period_secs <= 0 || (end - start).num_seconds() % period_secs == 0 {
        last
    } else {
        last + 1
    }
}
