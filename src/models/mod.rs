//! Domain models for delivery fee calculation
//!
//! - City: supported cities and their weather stations
//! - Vehicle: courier vehicle types
//! - Weather: observation snapshots

pub mod city;
pub mod vehicle;
pub mod weather;

pub use city::{City, resolve_station};
pub use vehicle::VehicleType;
pub use weather::{WeatherField, WeatherSnapshot};
