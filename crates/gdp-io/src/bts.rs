//! BTS on-time performance reader
//!
//! Selects the flights scheduled to arrive at one airport inside a planning
//! window. Departure times in the file are local to the origin airport
//! (`CRSDepTime`, `Hmm`); durations are scheduled elapsed minutes. Arrival is
//! departure plus duration. Kept flights are numbered in file order.

use crate::airports::AirportDirectory;
use crate::error::{IoError, IoResult};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use gdp_core::{FlightId, Horizon, ScheduledFlight};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct BtsRecord {
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Month")]
    month: u32,
    #[serde(rename = "DayofMonth")]
    day: u32,
    #[serde(rename = "Origin")]
    origin: String,
    #[serde(rename = "Dest")]
    dest: String,
    #[serde(rename = "CRSDepTime")]
    dep_time: String,
    /// Blank for some cancelled or diverted legs.
    #[serde(rename = "CRSElapsedTime")]
    elapsed_minutes: Option<f64>,
}

/// Monthly file name used by the BTS download tool.
pub fn monthly_file(directory: &Path, year: i32, month: u32) -> PathBuf {
    directory.join(format!("On_Time_On_Time_Performance_{year}_{month}.csv"))
}

/// Parse an `Hmm` clock time. `2400` is midnight at the end of the day,
/// reported as `(00:00, true)`.
pub fn parse_clock(value: &str) -> IoResult<(NaiveTime, bool)> {
    let trimmed = value.trim();
    let raw: u32 = trimmed
        .parse()
        .map_err(|_| IoError::Parse(format!("invalid Hmm time '{value}'")))?;
    let (hours, minutes) = (raw / 100, raw % 100);
    if hours == 24 && minutes == 0 {
        return Ok((NaiveTime::MIN, true));
    }
    NaiveTime::from_hms_opt(hours, minutes, 0)
        .map(|time| (time, false))
        .ok_or_else(|| IoError::Parse(format!("invalid Hmm time '{value}'")))
}

/// Scheduled elapsed minutes as a whole-minute duration.
pub fn scheduled_duration(minutes: f64) -> IoResult<Duration> {
    let invalid = || IoError::Parse(format!("invalid scheduled elapsed time '{minutes}'"));
    if !minutes.is_finite() || minutes < 0.0 {
        return Err(invalid());
    }
    Duration::try_minutes(minutes.round() as i64).ok_or_else(invalid)
}

fn at_row(row: usize) -> impl Fn(IoError) -> IoError {
    move |err| match err {
        IoError::Parse(msg) => IoError::Parse(format!("row {row}: {msg}")),
        other => other,
    }
}

/// Resolve a local wall-clock time. Ambiguous times take the earlier
/// instant; times skipped by a DST jump are pushed forward past the gap.
fn localize(tz: Tz, local: NaiveDateTime) -> IoResult<DateTime<Utc>> {
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
        .map(|time| time.with_timezone(&Utc))
        .ok_or_else(|| IoError::Parse(format!("local time {local} does not exist in {tz}")))
}

/// Reads scheduled arrivals from BTS on-time files.
pub struct BtsReader<'a> {
    airports: &'a AirportDirectory,
}

impl<'a> BtsReader<'a> {
    pub fn new(airports: &'a AirportDirectory) -> Self {
        Self { airports }
    }

    pub fn read_arrivals_path(
        &self,
        path: &Path,
        airport: &str,
        window: &Horizon,
    ) -> IoResult<Vec<ScheduledFlight>> {
        self.read_arrivals(File::open(path)?, airport, window)
    }

    /// Flights bound for `airport` whose scheduled arrival falls in `window`.
    pub fn read_arrivals(
        &self,
        reader: impl Read,
        airport: &str,
        window: &Horizon,
    ) -> IoResult<Vec<ScheduledFlight>> {
        let airport = airport.trim();
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv.headers()?.clone();
        let dest = headers
            .iter()
            .position(|name| name == "Dest")
            .ok_or_else(|| IoError::Parse("missing Dest column".into()))?;

        let mut flights = Vec::new();
        let mut next_id = 0u32;
        let mut scanned = 0usize;
        // Only rows bound for the airport are decoded; other rows may carry
        // fields this reader does not accept.
        for (index, raw) in csv.records().enumerate() {
            let raw = raw?;
            let row = index + 2;
            scanned += 1;
            if !raw.get(dest).is_some_and(|code| code.eq_ignore_ascii_case(airport)) {
                continue;
            }
            let record: BtsRecord = raw.deserialize(Some(&headers))?;
            let Some(elapsed) = record.elapsed_minutes else {
                debug!(row, origin = %record.origin, "no scheduled elapsed time, skipping");
                continue;
            };
            let departure = self.departure(&record).map_err(at_row(row))?;
            let duration = scheduled_duration(elapsed).map_err(at_row(row))?;
            let flight = ScheduledFlight::new(
                FlightId::new(next_id),
                record.origin.to_ascii_uppercase(),
                record.dest.to_ascii_uppercase(),
                departure,
                duration,
            );
            if window.contains(flight.arrival) {
                flights.push(flight);
                next_id += 1;
            } else {
                debug!(row, origin = %record.origin, "arrival outside window");
            }
        }

        info!(
            airport,
            scanned,
            kept = flights.len(),
            "read scheduled arrivals"
        );
        Ok(flights)
    }

    fn departure(&self, record: &BtsRecord) -> IoResult<DateTime<Utc>> {
        let date = NaiveDate::from_ymd_opt(record.year, record.month, record.day).ok_or_else(|| {
            IoError::Parse(format!(
                "invalid date {}-{}-{}",
                record.year, record.month, record.day
            ))
        })?;
        let (time, next_day) = parse_clock(&record.dep_time)?;
        let mut local = date.and_time(time);
        if next_day {
            local += Duration::days(1);
        }
        let tz = self.airports.timezone(&record.origin)?;
        localize(tz, local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clock() {
        assert_eq!(
            parse_clock("830").unwrap(),
            (NaiveTime::from_hms_opt(8, 30, 0).unwrap(), false)
        );
        assert_eq!(
            parse_clock("0005").unwrap(),
            (NaiveTime::from_hms_opt(0, 5, 0).unwrap(), false)
        );
        assert_eq!(parse_clock("2400").unwrap(), (NaiveTime::MIN, true));
        assert!(parse_clock("1260").is_err());
        assert!(parse_clock("2430").is_err());
        assert!(parse_clock("noon").is_err());
    }

    #[test]
    fn test_scheduled_duration_rounds_to_minutes() {
        assert_eq!(scheduled_duration(120.0).unwrap(), Duration::minutes(120));
        assert_eq!(scheduled_duration(89.6).unwrap(), Duration::minutes(90));
        assert_eq!(scheduled_duration(59.4).unwrap(), Duration::minutes(59));
        assert!(scheduled_duration(f64::NAN).is_err());
        assert!(scheduled_duration(f64::INFINITY).is_err());
        assert!(scheduled_duration(-5.0).is_err());
        assert!(scheduled_duration(1e300).is_err());
    }

    #[test]
    fn test_monthly_file_name() {
        let path = monthly_file(Path::new("/data"), 2017, 7);
        assert!(path.ends_with("On_Time_On_Time_Performance_2017_7.csv"));
    }

    #[test]
    fn test_localize_uses_zone_offset() {
        let local = NaiveDate::from_ymd_opt(2017, 7, 15)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let utc = localize(chrono_tz::America::Chicago, local).unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2017, 7, 15, 13, 0, 0).unwrap());

        // 02:30 does not exist on 2017-03-12 in Chicago.
        let gap = NaiveDate::from_ymd_opt(2017, 3, 12)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let utc = localize(chrono_tz::America::Chicago, gap).unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2017, 3, 12, 8, 30, 0).unwrap());
    }
}
