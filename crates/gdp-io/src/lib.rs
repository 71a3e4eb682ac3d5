//! Data boundary for GDP planning: historical schedules and airport tables.
//!
//! - [`AirportDirectory`]: IANA time zones and VFR/IFR arrival rates by IATA code
//! - [`BtsReader`]: scheduled arrivals at one airport from BTS on-time CSV files

pub mod airports;
pub mod bts;
pub mod error;

pub use airports::{AirportCapacity, AirportDirectory};
pub use bts::{monthly_file, parse_clock, BtsReader};
pub use error::{IoError, IoResult};
