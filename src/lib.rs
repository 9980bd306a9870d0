//! Delivery fee calculation for food couriers
//!
//! This library prices a delivery from the city, the courier's vehicle and
//! the latest weather observation of the city's reference station, and
//! provides the ingestion and HTTP plumbing around that calculation.

pub mod api;
pub mod config;
pub mod error;
pub mod fee;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod web;

// Re-export core types for public API
pub use config::DeliveryFeeConfig;
pub use error::DeliveryFeeError;
pub use fee::{
    BaseFeeTable, FeeBreakdown, FeeCalculator, FeeError, SnapshotProvider, SnapshotStore,
    SurchargeEvaluator, SurchargeThresholds,
};
pub use ingest::WeatherImporter;
pub use models::{City, VehicleType, WeatherSnapshot, resolve_station};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, DeliveryFeeError>;
