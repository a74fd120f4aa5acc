use crate::extract::error::ExtractError;
use crate::types::artifact::RawArtifact;
use crate::types::dataset_kind::DatasetKind;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Replaces every character that is not alphanumeric, `-` or `_` with `_`.
///
/// # Examples
///
/// ```
/// use weather_etl::sanitize_location;
///
/// assert_eq!(sanitize_location("New York"), "New_York");
/// assert_eq!(sanitize_location("../etc"), "___etc");
/// ```
pub fn sanitize_location(location: &str) -> String {
    location
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Write-once storage for raw payloads under a single directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `raw_{kind}_{location}_{stamp}.json`, with `_{n}` before the extension on retries.
    pub fn file_name(kind: DatasetKind, location: &str, run_stamp: &str, attempt: u32) -> String {
        let base = format!(
            "{}{}_{}",
            kind.artifact_file_prefix(),
            sanitize_location(location),
            run_stamp
        );
        if attempt == 0 {
            format!("{base}.json")
        } else {
            format!("{base}_{attempt}.json")
        }
    }

    /// Persists `payload` as a new file. An existing file is never overwritten;
    /// a numeric suffix is added instead.
    pub async fn save(
        &self,
        location: &str,
        kind: DatasetKind,
        run_stamp: &str,
        fetched_at: DateTime<Utc>,
        payload: &Value,
    ) -> Result<RawArtifact, ExtractError> {
        let bytes = serde_json::to_vec_pretty(payload).map_err(ExtractError::ArtifactEncode)?;

        let mut attempt = 0;
        let (path, mut file) = loop {
            let path = self
                .root
                .join(Self::file_name(kind, location, run_stamp, attempt));
            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < MAX_NAME_ATTEMPTS => {
                    attempt += 1;
                }
                Err(e) => return Err(ExtractError::ArtifactWrite(path, e)),
            }
        };

        file.write_all(&bytes)
            .await
            .map_err(|e| ExtractError::ArtifactWrite(path.clone(), e))?;
        file.flush()
            .await
            .map_err(|e| ExtractError::ArtifactWrite(path.clone(), e))?;

        Ok(RawArtifact {
            location: location.to_string(),
            kind,
            path,
            fetched_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_name_encodes_kind_location_and_stamp() {
        assert_eq!(
            ArtifactStore::file_name(DatasetKind::AirPollution, "New York", "20250101_120000", 0),
            "raw_air_pollution_New_York_20250101_120000.json"
        );
        assert_eq!(
            ArtifactStore::file_name(DatasetKind::CurrentWeather, "Athens", "20250101_120000", 2),
            "raw_current_weather_Athens_20250101_120000_2.json"
        );
    }

    #[tokio::test]
    async fn saved_payload_reads_back_unchanged() -> Result<(), ExtractError> {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let payload = json!({
            "coord": {"lon": 23.72, "lat": 37.98},
            "main": {"temp": 27.06, "feels_like": 28.31, "humidity": 40},
            "name": "Αθήνα",
            "dt": 1690000000
        });

        let artifact = store
            .save("Athens", DatasetKind::CurrentWeather, "20250101_120000", Utc::now(), &payload)
            .await?;

        assert_eq!(artifact.kind, DatasetKind::CurrentWeather);
        assert!(artifact.path.starts_with(dir.path()));
        let restored: Value = serde_json::from_slice(&std::fs::read(&artifact.path).unwrap()).unwrap();
        assert_eq!(restored, payload);
        Ok(())
    }

    #[tokio::test]
    async fn repeated_saves_never_collide() -> Result<(), ExtractError> {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let first = store
            .save("Athens", DatasetKind::AirPollution, "20250101_120000", Utc::now(), &json!({"n": 1}))
            .await?;
        let second = store
            .save("Athens", DatasetKind::AirPollution, "20250101_120000", Utc::now(), &json!({"n": 2}))
            .await?;

        assert_ne!(first.path, second.path);
        let first_body: Value = serde_json::from_slice(&std::fs::read(&first.path).unwrap()).unwrap();
        assert_eq!(first_body, json!({"n": 1}));
        Ok(())
    }

    #[tokio::test]
    async fn missing_directory_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("absent"));
        let result = store
            .save("Athens", DatasetKind::AirPollution, "20250101_120000", Utc::now(), &json!({}))
            .await;
        assert!(matches!(result, Err(ExtractError::ArtifactWrite(..))));
    }
}
