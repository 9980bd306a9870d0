use chrono::{DateTime, Utc};
use thiserror::Error;

/// Terminal failures of a single fee calculation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeeError {
    #[error("Unsupported city: {0}")]
    UnsupportedCity(String),

    #[error("Unsupported vehicle type: {0}")]
    UnsupportedVehicleType(String),

    #[error("No weather data available for station: {station} at {at}")]
    WeatherDataUnavailable { station: String, at: DateTime<Utc> },

    #[error("Usage of selected vehicle type is forbidden")]
    VehicleUseForbidden { rule: &'static str, reason: String },
}

impl FeeError {
    /// Reason attached to a prohibition, if this is one
    #[must_use]
    pub fn prohibition_reason(&self) -> Option<&str> {
        match self {
            FeeError::VehicleUseForbidden { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FeeError>;
