use crate::extract::error::ExtractError;
use crate::load::error::LoadError;
use crate::transform::error::TransformError;
use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration problems. These are the only errors that stop a run
/// before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OpenWeatherMap API key not found. Set OWM_API_KEY in the environment")]
    MissingApiKey,

    #[error("No locations found. Set CITIES to a comma-separated list")]
    NoLocations,

    #[error("Units measure not found. Set UNITS to a non-empty value")]
    EmptyUnits,

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum EtlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("Failed to create directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to inspect directory '{0}'")]
    DirMetadata(PathBuf, #[source] std::io::Error),

    #[error("Path exists but is not a directory: '{0}'")]
    NotADirectory(PathBuf),

    #[error("Extraction requires an extract configuration")]
    MissingExtractConfig,
}
