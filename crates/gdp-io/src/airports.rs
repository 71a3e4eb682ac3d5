//! Airport directory: IANA time zones and VFR/IFR arrival rates
//!
//! Loaded once, explicitly, and passed by reference to whatever needs it.
//! Lookups normalize codes (trim, upper-case) and fail with
//! [`IoError::UnknownAirport`] instead of guessing.

use crate::error::{IoError, IoResult};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Hourly arrival rates under visual and instrument conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportCapacity {
    pub vfr: u32,
    pub ifr: u32,
}

#[derive(Debug, Deserialize)]
struct CapacityRow {
    #[serde(rename = "AIRPORT")]
    airport: String,
    #[serde(rename = "VFR")]
    vfr: u32,
    #[serde(rename = "IFR")]
    ifr: u32,
}

#[derive(Debug, Clone, Default)]
pub struct AirportDirectory {
    timezones: HashMap<String, Tz>,
    capacities: HashMap<String, AirportCapacity>,
}

impl AirportDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the time zone table and, optionally, the capacity table.
    pub fn load(timezones: &Path, capacities: Option<&Path>) -> IoResult<Self> {
        let mut directory = Self::new();
        directory.read_timezones(BufReader::new(File::open(timezones)?))?;
        if let Some(path) = capacities {
            directory.read_capacities(File::open(path)?)?;
        }
        debug!(
            timezones = directory.timezones.len(),
            capacities = directory.capacities.len(),
            "loaded airport directory"
        );
        Ok(directory)
    }

    /// Read whitespace-separated `IATA  Area/City` lines. Blank lines are skipped.
    pub fn read_timezones(&mut self, reader: impl BufRead) -> IoResult<()> {
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let mut fields = line.split_whitespace();
            let Some(code) = fields.next() else {
                continue;
            };
            let zone = fields.next().ok_or_else(|| {
                IoError::Parse(format!(
                    "time zone table line {}: missing zone for airport '{}'",
                    line_no + 1,
                    code
                ))
            })?;
            let tz: Tz = zone.parse().map_err(|_| IoError::InvalidTimeZone {
                airport: code.to_string(),
                zone: zone.to_string(),
            })?;
            self.timezones.insert(normalize(code), tz);
        }
        Ok(())
    }

    /// Read an `AIRPORT,VFR,IFR` CSV table.
    pub fn read_capacities(&mut self, reader: impl Read) -> IoResult<()> {
        let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        for row in csv.deserialize() {
            let row: CapacityRow = row?;
            self.capacities.insert(
                normalize(&row.airport),
                AirportCapacity {
                    vfr: row.vfr,
                    ifr: row.ifr,
                },
            );
        }
        Ok(())
    }

    pub fn with_timezone(mut self, code: &str, tz: Tz) -> Self {
        self.timezones.insert(normalize(code), tz);
        self
    }

    pub fn with_capacity(mut self, code: &str, capacity: AirportCapacity) -> Self {
        self.capacities.insert(normalize(code), capacity);
        self
    }

    pub fn timezone(&self, code: &str) -> IoResult<Tz> {
        let key = normalize(code);
        self.timezones
            .get(&key)
            .copied()
            .ok_or(IoError::UnknownAirport(key))
    }

    pub fn capacity(&self, code: &str) -> IoResult<AirportCapacity> {
        let key = normalize(code);
        self.capacities
            .get(&key)
            .copied()
            .ok_or(IoError::UnknownAirport(key))
    }

    pub fn vfr(&self, code: &str) -> IoResult<u32> {
        self.capacity(code).map(|c| c.vfr)
    }

    pub fn ifr(&self, code: &str) -> IoResult<u32> {
        self.capacity(code).map(|c| c.ifr)
    }

    pub fn num_timezones(&self) -> usize {
        self.timezones.len()
    }
}
