//! Data models for SAFE.Guard entities.
//!
//! The server speaks Portuguese field names; serde renames map them onto
//! the Rust names here.
//!
//! - `Alert`: risk alerts with a level and message
//! - `Sensor`: sensor types attached to stations
//! - `Reading`: individual sensor measurements
//! - `Risk`: detected risks (read-only)
//! - `Station`: monitoring stations, optionally geolocated

pub mod alert;
pub mod reading;
pub mod risk;
pub mod sensor;
pub mod station;

use thiserror::Error;

pub use alert::{Alert, AlertFilter, AlertInput};
pub use reading::{Reading, ReadingInput};
pub use risk::{Risk, RiskLevel};
pub use sensor::{Sensor, SensorInput};
pub use station::{Station, StationFilter, StationInput};

/// Form input rejected before it is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Fill in all fields")]
    MissingFields,

    #[error("{0} must be a number")]
    NotANumber(&'static str),

    #[error("{0} must be a whole number")]
    NotAnInteger(&'static str),

    #[error("Unknown risk level: {0}")]
    UnknownRiskLevel(String),
}

/// Trimmed, non-empty text or `MissingFields`
pub(crate) fn required(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingFields)
    } else {
        Ok(trimmed.to_string())
    }
}
