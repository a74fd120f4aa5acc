use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode JSON body from {url}")]
    JsonParse {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected payload from {url}: {message}")]
    UnexpectedPayload { url: String, message: String },

    #[error("Failed to build request for {0}")]
    RequestBuild(String, #[source] reqwest::Error),

    #[error("Failed to write artifact '{0}'")]
    ArtifactWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to encode JSON")]
    ArtifactEncode(#[source] serde_json::Error),

    #[error("Failed to write manifest '{0}'")]
    ManifestWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to read manifest '{0}'")]
    ManifestRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode manifest '{0}'")]
    ManifestDecode(PathBuf, #[source] serde_json::Error),
}

impl ExtractError {
    /// Maps a failed `error_for_status` into the status variant when a status is known.
    pub(crate) fn from_status(url: String, e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => ExtractError::HttpStatus {
                url,
                status,
                source: e,
            },
            None => ExtractError::NetworkRequest(url, e),
        }
    }
}
