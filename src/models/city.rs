//! Supported cities and their reference weather stations

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::fee::{FeeError, Result};

/// City served by couriers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    #[serde(rename = "tallinn")]
    Tallinn,
    #[serde(rename = "tartu")]
    Tartu,
    #[serde(rename = "pärnu", alias = "parnu")]
    Parnu,
}

impl City {
    pub const ALL: [City; 3] = [City::Tallinn, City::Tartu, City::Parnu];

    /// Lower-case identifier used in requests and configuration
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            City::Tallinn => "tallinn",
            City::Tartu => "tartu",
            City::Parnu => "pärnu",
        }
    }

    /// Weather station whose observations price deliveries in this city
    #[must_use]
    pub fn station(self) -> &'static str {
        match self {
            City::Tallinn => "Tallinn-Harku",
            City::Tartu => "Tartu-Tõravere",
            City::Parnu => "Pärnu",
        }
    }
}

impl FromStr for City {
    type Err = FeeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "tallinn" => Ok(City::Tallinn),
            "tartu" => Ok(City::Tartu),
            "pärnu" | "parnu" => Ok(City::Parnu),
            _ => Err(FeeError::UnsupportedCity(s.to_string())),
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Map a raw city identifier to its reference station
pub fn resolve_station(city: &str) -> Result<&'static str> {
    city.parse::<City>().map(City::station)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_station_is_case_insensitive() {
        assert_eq!(resolve_station("Tallinn").unwrap(), "Tallinn-Harku");
        assert_eq!(resolve_station("TARTU").unwrap(), "Tartu-Tõravere");
        assert_eq!(resolve_station("PÄRNU").unwrap(), "Pärnu");
        assert_eq!(resolve_station("parnu").unwrap(), "Pärnu");
    }

    #[test]
    fn test_unknown_city() {
        let err = resolve_station("unknowncity").unwrap_err();
        assert_eq!(err, FeeError::UnsupportedCity("unknowncity".to_string()));
    }

    #[test]
    fn test_every_city_has_a_distinct_station() {
        let mut stations: Vec<_> = City::ALL.iter().map(|c| c.station()).collect();
        stations.sort_unstable();
        stations.dedup();
        assert_eq!(stations.len(), City::ALL.len());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&City::Parnu).unwrap(), "\"pärnu\"");
        let city: City = serde_json::from_str("\"parnu\"").unwrap();
        assert_eq!(city, City::Parnu);
    }
}
