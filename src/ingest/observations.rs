//! Parser for the Estonian Environment Agency observations feed
//!
//! The feed looks like:
//!
//! ```xml
//! <observations timestamp="1711972800">
//!   <station>
//!     <name>Tallinn-Harku</name>
//!     <wmocode>26038</wmocode>
//!     <phenomenon>Light snow shower</phenomenon>
//!     <airtemperature>-2.1</airtemperature>
//!     <windspeed>4.3</windspeed>
//!   </station>
//! </observations>
//! ```
//!
//! Stations leave elements empty when a sensor did not report.

use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::error::DeliveryFeeError;
use crate::models::WeatherSnapshot;

#[derive(Debug, Deserialize)]
struct ObservationsXml {
    #[serde(rename = "@timestamp")]
    timestamp: Option<String>,
    #[serde(rename = "station", default)]
    stations: Vec<StationXml>,
}

#[derive(Debug, Deserialize)]
struct StationXml {
    name: Option<String>,
    wmocode: Option<String>,
    phenomenon: Option<String>,
    airtemperature: Option<String>,
    windspeed: Option<String>,
}

/// One decoded feed document
#[derive(Debug, Clone, PartialEq)]
pub struct Observations {
    pub observed_at: DateTime<Utc>,
    pub snapshots: Vec<WeatherSnapshot>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_number(value: Option<String>) -> Option<f64> {
    non_empty(value)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
    non_empty(value)
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

impl StationXml {
    fn into_snapshot(self, observed_at: DateTime<Utc>) -> Option<WeatherSnapshot> {
        Some(WeatherSnapshot {
            station: non_empty(self.name)?,
            wmo_code: non_empty(self.wmocode),
            air_temperature: parse_number(self.airtemperature),
            wind_speed: parse_number(self.windspeed),
            phenomenon: non_empty(self.phenomenon),
            observed_at,
        })
    }
}

/// Decode a feed document.
///
/// The document `timestamp` attribute dates every observation; when it is
/// missing or malformed `fallback_time` is used. Stations without a name
/// are dropped.
pub fn parse_observations(
    xml: &str,
    fallback_time: DateTime<Utc>,
) -> Result<Observations, DeliveryFeeError> {
    let document: ObservationsXml = from_str(xml).map_err(|e| {
        DeliveryFeeError::import(format!("Failed to parse observations XML: {e}"))
    })?;

    let observed_at = parse_timestamp(document.timestamp).unwrap_or(fallback_time);
    let snapshots = document
        .stations
        .into_iter()
        .filter_map(|station| station.into_snapshot(observed_at))
        .collect();

    Ok(Observations {
        observed_at,
        snapshots,
    })
}
