//! Extraction stage: geocode each location, fetch the three datasets and persist them.

pub mod artifact_store;
pub mod coordinate_resolver;
pub mod dataset_fetcher;
pub mod error;
pub mod extractor;

use crate::extract::error::ExtractError;
use crate::types::coordinate::LatLon;
use crate::types::dataset_kind::DatasetKind;
use serde_json::Value;
use std::future::Future;

/// Resolves a location name to a coordinate.
///
/// Failures are absorbed by the implementation: `None` means the location is
/// skipped for this run, whatever the cause.
pub trait Geocoder {
    fn resolve(&self, location: &str) -> impl Future<Output = Option<LatLon>> + Send;
}

/// Retrieves one raw JSON payload for a coordinate and dataset kind.
pub trait WeatherSource {
    fn fetch(
        &self,
        location: LatLon,
        kind: DatasetKind,
    ) -> impl Future<Output = Result<Value, ExtractError>> + Send;
}

impl<T: Geocoder + Sync> Geocoder for &T {
    fn resolve(&self, location: &str) -> impl Future<Output = Option<LatLon>> + Send {
        (**self).resolve(location)
    }
}

impl<T: WeatherSource + Sync> WeatherSource for &T {
    fn fetch(
        &self,
        location: LatLon,
        kind: DatasetKind,
    ) -> impl Future<Output = Result<Value, ExtractError>> + Send {
        (**self).fetch(location, kind)
    }
}
