//! Error types for the cost core.
//!
//! Cost arithmetic itself never fails; these errors come from boundary
//! validation, job status changes and configuration loading.

use thiserror::Error;

use crate::models::JobStatus;

/// Result type for cost core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A numeric input is negative, non-finite or out of range.
    #[error("invalid value for {field}: {value}")]
    InvalidInput {
        /// Name of the offending field.
        field: &'static str,
        value: f64,
    },

    #[error("cannot move job from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("failed to read configuration")]
    Io(#[from] std::io::Error),

    #[error("malformed configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Reject negative and non-finite values.
pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidInput { field, value })
    }
}

/// Reject zero, negative and non-finite values.
pub(crate) fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidInput { field, value })
    }
}

/// Check an optional field only when it is present.
pub(crate) fn non_negative_opt(field: &'static str, value: Option<f64>) -> Result<()> {
    value.map_or(Ok(()), |value| non_negative(field, value))
}

/// Like [`non_negative`], but also rejects values at or above 1.
pub(crate) fn unit_fraction(field: &'static str, value: f64) -> Result<()> {
    non_negative(field, value)?;
    if value < 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidInput { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_negative_accepts_zero_and_positive() {
        assert!(non_negative("x", 0.0).is_ok());
        assert!(non_negative("x", 12.5).is_ok());
    }

    #[test]
    fn non_negative_rejects_bad_numbers() {
        assert!(non_negative("x", -0.1).is_err());
        assert!(non_negative("x", f64::NAN).is_err());
        assert!(non_negative("x", f64::INFINITY).is_err());
    }

    #[test]
    fn positive_rejects_zero() {
        assert!(positive("density", 1.24).is_ok());
        assert!(positive("density", 0.0).is_err());
        assert!(positive("density", f64::NAN).is_err());
    }

    #[test]
    fn absent_optional_value_passes() {
        assert!(non_negative_opt("price", None).is_ok());
        assert!(non_negative_opt("price", Some(-1.0)).is_err());
    }

    #[test]
    fn unit_fraction_is_half_open() {
        assert!(unit_fraction("rate", 0.0).is_ok());
        assert!(unit_fraction("rate", 0.99).is_ok());
        let err = unit_fraction("rate", 1.0).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for rate: 1");
    }
}
