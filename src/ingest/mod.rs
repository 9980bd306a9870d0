//! Weather observation import

pub mod importer;
pub mod observations;

pub use importer::{ImportSummary, WeatherImporter, next_import_at};
pub use observations::{Observations, parse_observations};
