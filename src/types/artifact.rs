//! Persisted fetch results and the index handed from extraction to transform.

use crate::extract::error::ExtractError;
use crate::types::dataset_kind::DatasetKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Reference to one raw JSON document written after a successful fetch.
///
/// The dataset kind is recorded when the file is written, so the transform
/// stage never has to guess it from the file name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawArtifact {
    pub location: String,
    pub kind: DatasetKind,
    pub path: PathBuf,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationArtifacts {
    pub location: String,
    pub artifacts: Vec<RawArtifact>,
}

/// Location -> artifacts written for it, in extraction order.
///
/// A location with an empty artifact list was resolved but every fetch failed;
/// a location that could not be resolved has no entry at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedFileIndex {
    entries: Vec<LocationArtifacts>,
}

impl SavedFileIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the artifacts of a location, replacing any previous entry for it.
    pub fn insert(&mut self, location: impl Into<String>, artifacts: Vec<RawArtifact>) {
        let location = location.into();
        match self.entries.iter_mut().find(|e| e.location == location) {
            Some(entry) => entry.artifacts = artifacts,
            None => self.entries.push(LocationArtifacts {
                location,
                artifacts,
            }),
        }
    }

    pub fn get(&self, location: &str) -> Option<&[RawArtifact]> {
        self.entries
            .iter()
            .find(|e| e.location == location)
            .map(|e| e.artifacts.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RawArtifact])> {
        self.entries
            .iter()
            .map(|e| (e.location.as_str(), e.artifacts.as_slice()))
    }

    /// Number of locations in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of artifacts across all locations.
    pub fn artifact_count(&self) -> usize {
        self.entries.iter().map(|e| e.artifacts.len()).sum()
    }

    /// Writes the index as JSON so a later run can reprocess the same artifacts.
    pub async fn write_manifest(&self, path: &Path) -> Result<(), ExtractError> {
        let bytes = serde_json::to_vec_pretty(self).map_err(ExtractError::ArtifactEncode)?;
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| ExtractError::ManifestWrite(path.to_path_buf(), e))
    }

    pub async fn read_manifest(path: &Path) -> Result<Self, ExtractError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ExtractError::ManifestRead(path.to_path_buf(), e))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ExtractError::ManifestDecode(path.to_path_buf(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(location: &str, kind: DatasetKind) -> RawArtifact {
        RawArtifact {
            location: location.to_string(),
            kind,
            path: PathBuf::from(format!("{}{}.json", kind.artifact_file_prefix(), location)),
            fetched_at: DateTime::from_timestamp(1_690_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn insert_replaces_existing_location() {
        let mut index = SavedFileIndex::new();
        index.insert("Athens", vec![artifact("Athens", DatasetKind::AirPollution)]);
        index.insert("Paris", vec![]);
        index.insert(
            "Athens",
            vec![
                artifact("Athens", DatasetKind::CurrentWeather),
                artifact("Athens", DatasetKind::ForecastWeather),
            ],
        );

        assert_eq!(index.len(), 2);
        assert_eq!(index.artifact_count(), 2);
        assert_eq!(index.get("Paris"), Some(&[][..]));
        assert!(index.get("Berlin").is_none());
        let locations: Vec<_> = index.iter().map(|(l, _)| l).collect();
        assert_eq!(locations, ["Athens", "Paris"]);
    }

    #[tokio::test]
    async fn manifest_round_trip() -> Result<(), ExtractError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        let mut index = SavedFileIndex::new();
        index.insert(
            "New York",
            vec![artifact("New_York", DatasetKind::ForecastWeather)],
        );

        index.write_manifest(&path).await?;
        let restored = SavedFileIndex::read_manifest(&path).await?;
        assert_eq!(restored, index);
        Ok(())
    }

    #[tokio::test]
    async fn missing_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = SavedFileIndex::read_manifest(&dir.path().join("nope.json")).await;
        assert!(matches!(result, Err(ExtractError::ManifestRead(..))));
    }
}
