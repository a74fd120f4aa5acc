use crate::context::RunContext;
use crate::extract::artifact_store::ArtifactStore;
use crate::extract::{Geocoder, WeatherSource};
use crate::types::artifact::{RawArtifact, SavedFileIndex};
use crate::types::coordinate::LatLon;
use crate::types::dataset_kind::DatasetKind;
use chrono::Utc;
use log::{debug, error, info, warn};
use std::time::Duration;

/// Drives geocoding and dataset fetching for every configured location.
///
/// Runs strictly sequentially. A failed dataset never stops the remaining
/// datasets of a location, and a failed location never stops the run.
pub struct Extractor<G, W> {
    geocoder: G,
    source: W,
    store: ArtifactStore,
    run_stamp: String,
    pause: Duration,
}

impl<G: Geocoder, W: WeatherSource> Extractor<G, W> {
    pub fn new(ctx: &RunContext, geocoder: G, source: W, store: ArtifactStore) -> Self {
        Self {
            geocoder,
            source,
            store,
            run_stamp: ctx.run_stamp().to_string(),
            pause: ctx.rate_limit(),
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn run_stamp(&self) -> &str {
        &self.run_stamp
    }

    /// Extracts all locations. Unresolvable locations get no entry in the index.
    pub async fn extract(&self, locations: &[String]) -> SavedFileIndex {
        let mut index = SavedFileIndex::new();
        for location in locations {
            info!("Fetching coordinates for {}", location);
            let Some(coordinate) = self.geocoder.resolve(location).await else {
                warn!("Skipping {}: no coordinates resolved", location);
                continue;
            };

            info!("Fetching weather data for {}", location);
            let artifacts = self.extract_location(location, coordinate).await;
            if artifacts.is_empty() {
                warn!("Every dataset request failed for {}", location);
            }
            index.insert(location.clone(), artifacts);
        }
        info!(
            "Extraction saved {} artifacts for {} locations",
            index.artifact_count(),
            index.len()
        );
        index
    }

    /// Fetches and persists each dataset kind for one resolved location.
    pub async fn extract_location(&self, location: &str, coordinate: LatLon) -> Vec<RawArtifact> {
        let mut saved = Vec::with_capacity(DatasetKind::ALL.len());
        for kind in DatasetKind::ALL {
            match self.source.fetch(coordinate, kind).await {
                Ok(payload) => {
                    match self
                        .store
                        .save(location, kind, &self.run_stamp, Utc::now(), &payload)
                        .await
                    {
                        Ok(artifact) => {
                            info!(
                                "Saved {} data for {} at {}",
                                kind,
                                location,
                                artifact.path.display()
                            );
                            saved.push(artifact);
                        }
                        Err(e) => error!("Error saving {} data for {}: {:?}", kind, location, e),
                    }
                }
                Err(e) => error!("Error fetching {} data for {}: {:?}", kind, location, e),
            }

            debug!("Sleeping {:?} to respect the API rate limit", self.pause);
            tokio::time::sleep(self.pause).await;
        }
        saved
    }
}
