//! Runtime configuration, read once at startup from the process environment.

use crate::error::ConfigError;
use bon::Builder;
use log::info;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_RAW_DIR: &str = "data/raw";
pub const DEFAULT_TABLES_DIR: &str = "data/tables";
pub const DEFAULT_UNITS: &str = "metric";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_RATE_LIMIT_MS: u64 = 1000;

/// Settings for the extraction stage.
#[derive(Debug, Clone, Builder)]
pub struct ExtractConfig {
    /// Location names in the order they are processed.
    #[builder(default)]
    pub locations: Vec<String>,
    #[builder(into)]
    pub api_key: String,
    #[builder(into, default = PathBuf::from(DEFAULT_RAW_DIR))]
    pub storage_path: PathBuf,
    #[builder(into, default = DEFAULT_UNITS.to_string())]
    pub units: String,
    #[builder(default = Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))]
    pub request_timeout: Duration,
    #[builder(default = Duration::from_millis(DEFAULT_RATE_LIMIT_MS))]
    pub rate_limit: Duration,
}

impl ExtractConfig {
    /// Reads `OWM_API_KEY`, `CITIES`, `RAW_DIR`, `UNITS`, `REQUEST_TIMEOUT_SECS`
    /// and `RATE_LIMIT_MS` through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        info!("Getting API key from environment");
        let api_key = lookup("OWM_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let units = match lookup("UNITS") {
            Some(units) => units.trim().to_string(),
            None => DEFAULT_UNITS.to_string(),
        };

        let storage_path = lookup("RAW_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RAW_DIR));

        let config = Self {
            locations: parse_locations(&lookup("CITIES").unwrap_or_default()),
            api_key,
            storage_path,
            units,
            request_timeout: Duration::from_secs(parse_number(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            rate_limit: Duration::from_millis(parse_number(
                &lookup,
                "RATE_LIMIT_MS",
                DEFAULT_RATE_LIMIT_MS,
            )?),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.locations.is_empty() {
            return Err(ConfigError::NoLocations);
        }
        if self.units.trim().is_empty() {
            return Err(ConfigError::EmptyUnits);
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "REQUEST_TIMEOUT_SECS".to_string(),
                value: "0".to_string(),
                reason: "timeout must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Settings for the load stage.
///
/// `host`, `database` and `driver` describe an external store. They are
/// carried for sinks that need them; the parquet sink only uses `tables_path`.
#[derive(Debug, Clone, Builder)]
pub struct LoadConfig {
    #[builder(into, default = PathBuf::from(DEFAULT_TABLES_DIR))]
    pub tables_path: PathBuf,
    #[builder(into)]
    pub host: Option<String>,
    #[builder(into)]
    pub database: Option<String>,
    #[builder(into)]
    pub driver: Option<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl LoadConfig {
    /// Reads `TABLES_DIR`, `HOST`, `DATABASE` and `DRIVER` through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            tables_path: non_empty("TABLES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TABLES_DIR)),
            host: non_empty("HOST"),
            database: non_empty("DATABASE"),
            driver: non_empty("DRIVER"),
        }
    }
}

/// Complete configuration of one pipeline run.
#[derive(Debug, Clone)]
pub struct EtlConfig {
    pub extract: ExtractConfig,
    pub load: LoadConfig,
}

impl EtlConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            extract: ExtractConfig::from_lookup(&lookup)?,
            load: LoadConfig::from_lookup(&lookup),
        })
    }
}

/// Splits a comma-separated list, trimming names and dropping empty entries.
pub fn parse_locations(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_number(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}
