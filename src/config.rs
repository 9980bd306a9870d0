//! Configuration management for the delivery fee service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::DeliveryFeeError;
use crate::fee::{BaseFeeTable, SurchargeEvaluator, SurchargeThresholds};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "DELIVERY_FEE_CONFIG";

/// Root configuration structure for the delivery fee service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryFeeConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Weather observation import configuration
    pub weather: WeatherConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Fee tables and surcharge thresholds
    pub fees: FeesConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
}

/// Weather observation feed settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Observations XML feed
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
    /// Stations whose observations are kept
    #[serde(default = "default_stations")]
    pub stations: Vec<String>,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for failed requests
    #[serde(default = "default_weather_max_retries")]
    pub max_retries: u32,
    /// Minute past every hour at which the feed is imported
    #[serde(default = "default_import_minute")]
    pub import_minute: u32,
    /// Import once immediately when the service starts
    #[serde(default = "default_import_on_startup")]
    pub import_on_startup: bool,
    /// Hours of observation history kept per station; 0 keeps everything.
    /// The newest observation of a station is never dropped.
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Fee tables, read once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeesConfig {
    /// city -> vehicle type -> base fee
    #[serde(default = "default_base_fees")]
    pub base: HashMap<String, HashMap<String, f64>>,
    #[serde(default)]
    pub surcharges: SurchargeThresholds,
}

// Default value functions
fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_request_timeout() -> u32 {
    10
}

fn default_feed_url() -> String {
    "https://www.ilmateenistus.ee/ilma_andmed/xml/observations.php".to_string()
}

fn default_stations() -> Vec<String> {
    vec![
        "Tallinn-Harku".to_string(),
        "Tartu-Tõravere".to_string(),
        "Pärnu".to_string(),
    ]
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_weather_max_retries() -> u32 {
    3
}

fn default_import_minute() -> u32 {
    15
}

fn default_import_on_startup() -> bool {
    true
}

fn default_retention_hours() -> u32 {
    24 * 31
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_base_fees() -> HashMap<String, HashMap<String, f64>> {
    let row = |car: f64, scooter: f64, bike: f64| {
        HashMap::from([
            ("car".to_string(), car),
            ("scooter".to_string(), scooter),
            ("bike".to_string(), bike),
        ])
    };
    HashMap::from([
        ("tallinn".to_string(), row(4.0, 3.5, 3.0)),
        ("tartu".to_string(), row(3.5, 3.0, 2.5)),
        ("pärnu".to_string(), row(3.0, 2.5, 2.0)),
    ])
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            stations: default_stations(),
            timeout_seconds: default_weather_timeout(),
            max_retries: default_weather_max_retries(),
            import_minute: default_import_minute(),
            import_on_startup: default_import_on_startup(),
            retention_hours: default_retention_hours(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for FeesConfig {
    fn default() -> Self {
        Self {
            base: default_base_fees(),
            surcharges: SurchargeThresholds::default(),
        }
    }
}

impl FeesConfig {
    /// Base fee table described by `[fees.base]`
    pub fn base_fee_table(&self) -> std::result::Result<BaseFeeTable, DeliveryFeeError> {
        BaseFeeTable::from_config(&self.base)
    }

    /// Standard rules using `[fees.surcharges]`
    #[must_use]
    pub fn evaluator(&self) -> SurchargeEvaluator {
        SurchargeEvaluator::standard(&self.surcharges)
    }
}

impl DeliveryFeeConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
            .unwrap_or_else(|| {
                let local = PathBuf::from("config.toml");
                if local.exists() {
                    local
                } else {
                    Self::get_config_path().unwrap_or(local)
                }
            });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. DELIVERY_FEE_SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("DELIVERY_FEE")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("weather.stations")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: DeliveryFeeConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("delivery-fee").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.weather.feed_url.is_empty() {
            self.weather.feed_url = default_feed_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.fees.base.is_empty() {
            self.fees.base = default_base_fees();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_fees()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.request_timeout_seconds > 300 {
            return Err(
                DeliveryFeeError::config("Request timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.weather.timeout_seconds > 300 {
            return Err(DeliveryFeeError::config(
                "Weather feed timeout cannot exceed 300 seconds",
            )
            .into());
        }

        if self.weather.max_retries > 10 {
            return Err(
                DeliveryFeeError::config("Weather feed max retries cannot exceed 10").into(),
            );
        }

        if self.weather.import_minute > 59 {
            return Err(
                DeliveryFeeError::config("Import minute must be between 0 and 59").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(DeliveryFeeError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(DeliveryFeeError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.weather.feed_url.starts_with("http://")
            && !self.weather.feed_url.starts_with("https://")
        {
            return Err(DeliveryFeeError::config(
                "Weather feed URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        if self.weather.stations.iter().all(|s| s.trim().is_empty()) {
            return Err(
                DeliveryFeeError::config("At least one weather station must be configured").into(),
            );
        }

        Ok(())
    }

    /// Validate fee tables and surcharge thresholds
    fn validate_fees(&self) -> Result<()> {
        self.fees.base_fee_table()?;

        let s = &self.fees.surcharges;
        let amounts = [
            ("extreme_cold_fee", s.extreme_cold_fee),
            ("freezing_fee", s.freezing_fee),
            ("windy_fee", s.windy_fee),
            ("snow_or_sleet_fee", s.snow_or_sleet_fee),
            ("shower_fee", s.shower_fee),
            ("rain_fee", s.rain_fee),
        ];
        if let Some((name, value)) = amounts.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            return Err(DeliveryFeeError::config(format!(
                "fees.surcharges.{name} must be a non-negative amount, got {value}"
            ))
            .into());
        }

        if s.extreme_cold_below > s.freezing_at_or_below {
            return Err(DeliveryFeeError::config(
                "fees.surcharges.extreme_cold_below cannot be above freezing_at_or_below",
            )
            .into());
        }

        if s.windy_from > s.forbidden_wind_above {
            return Err(DeliveryFeeError::config(
                "fees.surcharges.windy_from cannot be above forbidden_wind_above",
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{City, VehicleType};

    #[test]
    fn test_default_config() {
        let config = DeliveryFeeConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.weather.feed_url,
            "https://www.ilmateenistus.ee/ilma_andmed/xml/observations.php"
        );
        assert_eq!(config.weather.stations.len(), 3);
        assert_eq!(config.weather.import_minute, 15);
        assert_eq!(config.weather.retention_hours, 744);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_fee_table_matches_builtin() {
        let config = DeliveryFeeConfig::default();
        assert_eq!(config.fees.base_fee_table().unwrap(), BaseFeeTable::default());
        assert_eq!(
            config
                .fees
                .base_fee_table()
                .unwrap()
                .fee(City::Parnu, VehicleType::Bike)
                .unwrap(),
            2.0
        );
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = DeliveryFeeConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = DeliveryFeeConfig::default();
        config.weather.import_minute = 60;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Import minute"));
    }

    #[test]
    fn test_config_validation_rejects_inverted_wind_band() {
        let mut config = DeliveryFeeConfig::default();
        config.fees.surcharges.windy_from = 25.0;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("windy_from"));
    }

    #[test]
    fn test_config_validation_rejects_unknown_city() {
        let mut config = DeliveryFeeConfig::default();
        config
            .fees
            .base
            .insert("riga".to_string(), HashMap::from([("car".to_string(), 3.0)]));
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Unsupported city"));
    }

    #[test]
    fn test_apply_defaults_fills_empty_values() {
        let mut config = DeliveryFeeConfig::default();
        config.logging.format = String::new();
        config.fees.base.clear();
        config.apply_defaults();
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.fees.base.len(), 3);
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("delivery-fee-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9191

[weather]
stations = ["Pärnu"]

[fees.base.tallinn]
car = 5.0

[fees.surcharges]
rain_fee = 0.75
"#,
        )
        .unwrap();

        let config = DeliveryFeeConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.server.port, 9191);
        assert_eq!(config.weather.stations, vec!["Pärnu".to_string()]);
        assert_eq!(config.fees.surcharges.rain_fee, 0.75);
        assert_eq!(config.fees.surcharges.windy_fee, 0.5);

        let table = config.fees.base_fee_table().unwrap();
        assert_eq!(table.fee(City::Tallinn, VehicleType::Car).unwrap(), 5.0);
        assert!(table.fee(City::Tartu, VehicleType::Car).is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = DeliveryFeeConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("delivery-fee"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
