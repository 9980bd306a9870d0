//! Courier vehicle types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::fee::{FeeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Car,
    Scooter,
    Bike,
}

impl VehicleType {
    pub const ALL: [VehicleType; 3] = [VehicleType::Car, VehicleType::Scooter, VehicleType::Bike];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            VehicleType::Car => "car",
            VehicleType::Scooter => "scooter",
            VehicleType::Bike => "bike",
        }
    }

    /// Riders exposed to the air temperature
    #[must_use]
    pub fn is_open_air(self) -> bool {
        matches!(self, VehicleType::Scooter | VehicleType::Bike)
    }
}

impl FromStr for VehicleType {
    type Err = FeeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "car" => Ok(VehicleType::Car),
            "scooter" => Ok(VehicleType::Scooter),
            "bike" => Ok(VehicleType::Bike),
            _ => Err(FeeError::UnsupportedVehicleType(s.to_string())),
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
