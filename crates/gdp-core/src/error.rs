//! Error type for scenario, demand and horizon handling
//!
//! Domain crates wrap [`GdpError`] in their own error enums where they need
//! extra variants (see `gdp_algo::ModelError`).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GdpError {
    /// Input data that cannot describe a real schedule, such as a flight
    /// departing or arriving outside the horizon.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Inconsistent horizons, malformed scenario sets, invalid generator
    /// parameters.
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type GdpResult<T> = Result<T, GdpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GdpError::Config("lookahead exceeds horizon".into());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("lookahead exceeds horizon"));
    }

    #[test]
    fn test_validation_propagates_with_question_mark() {
        fn inner() -> GdpResult<()> {
            Err(GdpError::Validation("flight 3 departs before the horizon".into()))
        }

        fn outer() -> GdpResult<u32> {
            inner()?;
            Ok(1)
        }

        let err = outer().unwrap_err();
        assert!(matches!(err, GdpError::Validation(_)));
        assert!(err.to_string().contains("departs before the horizon"));
    }
}
