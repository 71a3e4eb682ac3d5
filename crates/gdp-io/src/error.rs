use thiserror::Error;

/// Failures at the data boundary: reading schedules and airport tables.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Airport code missing from the directory.
    #[error("airport '{0}' not found in the airport directory")]
    UnknownAirport(String),

    #[error("invalid time zone '{zone}' for airport '{airport}'")]
    InvalidTimeZone { airport: String, zone: String },

    /// Malformed field in an otherwise readable file.
    #[error("Parse error: {0}")]
    Parse(String),
}

pub type IoResult<T> = Result<T, IoError>;
