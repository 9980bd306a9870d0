//! Base fee table keyed by city and vehicle type

use std::collections::HashMap;

use crate::error::DeliveryFeeError;
use crate::models::{City, VehicleType};

use super::{FeeError, Result};

/// Flat per-(city, vehicle) charge before any weather adjustment
#[derive(Debug, Clone, PartialEq)]
pub struct BaseFeeTable {
    fees: HashMap<City, HashMap<VehicleType, f64>>,
}

impl Default for BaseFeeTable {
    fn default() -> Self {
        Self::from_entries([
            (City::Tallinn, VehicleType::Car, 4.0),
            (City::Tallinn, VehicleType::Scooter, 3.5),
            (City::Tallinn, VehicleType::Bike, 3.0),
            (City::Tartu, VehicleType::Car, 3.5),
            (City::Tartu, VehicleType::Scooter, 3.0),
            (City::Tartu, VehicleType::Bike, 2.5),
            (City::Parnu, VehicleType::Car, 3.0),
            (City::Parnu, VehicleType::Scooter, 2.5),
            (City::Parnu, VehicleType::Bike, 2.0),
        ])
    }
}

impl BaseFeeTable {
    pub fn from_entries(entries: impl IntoIterator<Item = (City, VehicleType, f64)>) -> Self {
        let mut fees: HashMap<City, HashMap<VehicleType, f64>> = HashMap::new();
        for (city, vehicle, fee) in entries {
            fees.entry(city).or_default().insert(vehicle, fee);
        }
        Self { fees }
    }

    /// Build the table from the `[fees.base]` configuration section
    pub fn from_config(
        base: &HashMap<String, HashMap<String, f64>>,
    ) -> std::result::Result<Self, DeliveryFeeError> {
        let mut entries = Vec::new();
        for (city, vehicles) in base {
            let city: City = city
                .parse()
                .map_err(|e: FeeError| DeliveryFeeError::config(format!("fees.base: {e}")))?;
            for (vehicle, fee) in vehicles {
                let vehicle: VehicleType = vehicle.parse().map_err(|e: FeeError| {
                    DeliveryFeeError::config(format!("fees.base.{city}: {e}"))
                })?;
                if !fee.is_finite() || *fee < 0.0 {
                    return Err(DeliveryFeeError::config(format!(
                        "fees.base.{city}.{vehicle} must be a non-negative amount, got {fee}"
                    )));
                }
                entries.push((city, vehicle, *fee));
            }
        }
        Ok(Self::from_entries(entries))
    }

    /// Look up the base fee for raw request identifiers.
    ///
    /// The city is validated before the vehicle type, so an unknown city is
    /// reported even when the vehicle type is unknown too.
    pub fn base_fee(&self, city: &str, vehicle_type: &str) -> Result<f64> {
        self.resolve(city, vehicle_type).map(|(_, _, fee)| fee)
    }

    /// Parse request identifiers once and look up their fee.
    ///
    /// Errors carry the identifiers as the caller spelled them.
    pub fn resolve(&self, city: &str, vehicle_type: &str) -> Result<(City, VehicleType, f64)> {
        let parsed_city: City = city.parse()?;
        if !self.fees.contains_key(&parsed_city) {
            return Err(FeeError::UnsupportedCity(city.to_string()));
        }

        let vehicle: VehicleType = vehicle_type.parse()?;
        self.fee(parsed_city, vehicle)
            .map(|fee| (parsed_city, vehicle, fee))
            .map_err(|_| FeeError::UnsupportedVehicleType(vehicle_type.to_string()))
    }

    /// Typed lookup
    pub fn fee(&self, city: City, vehicle: VehicleType) -> Result<f64> {
        let by_vehicle = self
            .fees
            .get(&city)
            .ok_or_else(|| FeeError::UnsupportedCity(city.name().to_string()))?;
        by_vehicle
            .get(&vehicle)
            .copied()
            .ok_or_else(|| FeeError::UnsupportedVehicleType(vehicle.name().to_string()))
    }
}
