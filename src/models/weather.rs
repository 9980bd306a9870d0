//! Weather observation snapshot used for pricing

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Most recent observation of a station at or before some instant.
///
/// Every measurement is optional: stations regularly omit values, and an
/// absent value never counts as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Station name as published in the observations feed
    pub station: String,
    /// WMO station code
    pub wmo_code: Option<String>,
    /// Air temperature in Celsius
    pub air_temperature: Option<f64>,
    /// Wind speed in m/s
    pub wind_speed: Option<f64>,
    /// Free-text phenomenon label, e.g. "Light snow shower"
    pub phenomenon: Option<String>,
    /// When the station made the observation
    pub observed_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    /// Snapshot with no measurements
    #[must_use]
    pub fn new(station: impl Into<String>, observed_at: DateTime<Utc>) -> Self {
        Self {
            station: station.into(),
            wmo_code: None,
            air_temperature: None,
            wind_speed: None,
            phenomenon: None,
            observed_at,
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, celsius: f64) -> Self {
        self.air_temperature = Some(celsius);
        self
    }

    #[must_use]
    pub fn with_wind_speed(mut self, ms: f64) -> Self {
        self.wind_speed = Some(ms);
        self
    }

    #[must_use]
    pub fn with_phenomenon(mut self, phenomenon: impl Into<String>) -> Self {
        self.phenomenon = Some(phenomenon.into());
        self
    }

    #[must_use]
    pub fn with_wmo_code(mut self, code: impl Into<String>) -> Self {
        self.wmo_code = Some(code.into());
        self
    }
}

/// Snapshot measurement a rule depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherField {
    AirTemperature,
    WindSpeed,
    Phenomenon,
}

impl fmt::Display for WeatherField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherField::AirTemperature => write!(f, "air temperature"),
            WeatherField::WindSpeed => write!(f, "wind speed"),
            WeatherField::Phenomenon => write!(f, "weather phenomenon"),
        }
    }
}
