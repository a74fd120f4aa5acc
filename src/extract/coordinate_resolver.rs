//! OpenWeatherMap direct geocoding client.
//!
//! See <https://openweathermap.org/api/geocoding-api>

use crate::context::RunContext;
use crate::extract::error::ExtractError;
use crate::extract::Geocoder;
use crate::types::coordinate::LatLon;
use log::{error, info, warn};
use reqwest::{Client, Request};
use serde_json::Value;

pub const GEOCODING_URL: &str = "http://api.openweathermap.org/geo/1.0/direct";
const CANDIDATE_LIMIT: &str = "5";

/// Maps a location name to the coordinate of the first geocoding candidate.
#[derive(Debug, Clone)]
pub struct CoordinateResolver {
    http: Client,
    api_key: String,
    base_url: String,
}

impl CoordinateResolver {
    pub fn new(ctx: &RunContext, api_key: impl Into<String>) -> Self {
        Self {
            http: ctx.http().clone(),
            api_key: api_key.into(),
            base_url: GEOCODING_URL.to_string(),
        }
    }

    /// Points the resolver at a different geocoding endpoint (mirrors, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub(crate) fn build_request(&self, location: &str) -> Result<Request, ExtractError> {
        self.http
            .get(&self.base_url)
            .query(&[
                ("q", location),
                ("limit", CANDIDATE_LIMIT),
                ("appid", self.api_key.as_str()),
            ])
            .build()
            .map_err(|e| ExtractError::RequestBuild(self.base_url.clone(), e.without_url()))
    }

    /// Performs the lookup, surfacing every failure as an error.
    ///
    /// `Ok(None)` means the endpoint answered with zero candidates.
    pub async fn lookup(&self, location: &str) -> Result<Option<LatLon>, ExtractError> {
        let request = self.build_request(location)?;
        let url = self.base_url.clone();

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| ExtractError::NetworkRequest(url.clone(), e.without_url()))?;
        let response = response
            .error_for_status()
            .map_err(|e| ExtractError::from_status(url.clone(), e.without_url()))?;
        let body: Value = response.json().await.map_err(|e| ExtractError::JsonParse {
            url: url.clone(),
            source: e.without_url(),
        })?;

        parse_candidates(&body)
            .map_err(|message| ExtractError::UnexpectedPayload { url, message })
    }
}

impl Geocoder for CoordinateResolver {
    async fn resolve(&self, location: &str) -> Option<LatLon> {
        match self.lookup(location).await {
            Ok(Some(coordinate)) => {
                info!(
                    "Coordinates for {}: lat={}, lon={}",
                    location,
                    coordinate.lat(),
                    coordinate.lon()
                );
                Some(coordinate)
            }
            Ok(None) => {
                warn!("No coordinates found for {}", location);
                None
            }
            Err(e) => {
                error!("Error fetching coordinates for {}: {:?}", location, e);
                None
            }
        }
    }
}

/// Picks the first candidate of a direct-geocoding response.
fn parse_candidates(body: &Value) -> Result<Option<LatLon>, String> {
    let candidates = body
        .as_array()
        .ok_or_else(|| "geocoding response is not an array".to_string())?;

    let Some(first) = candidates.first() else {
        return Ok(None);
    };

    let lat = coordinate_value(&first["lat"]).ok_or("missing lat in first candidate")?;
    let lon = coordinate_value(&first["lon"]).ok_or("missing lon in first candidate")?;
    Ok(Some(LatLon(lat, lon)))
}

fn coordinate_value(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse::<f64>().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn resolver() -> CoordinateResolver {
        let ctx = RunContext::with_client(Client::new(), Duration::ZERO);
        CoordinateResolver::new(&ctx, "fake_key")
    }

    #[test]
    fn builds_direct_geocoding_request() {
        let request = resolver().build_request("Athens").unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://api.openweathermap.org/geo/1.0/direct?q=Athens&limit=5&appid=fake_key"
        );
        assert_eq!(request.method(), reqwest::Method::GET);
    }

    #[test]
    fn respects_custom_base_url() {
        let request = resolver()
            .with_base_url("http://localhost:8080/geo")
            .build_request("")
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8080/geo?q=&limit=5&appid=fake_key"
        );
    }

    #[test]
    fn picks_first_candidate() {
        let body = json!([
            {"name": "Athens", "lat": 37.98, "lon": 23.72, "country": "GR"},
            {"name": "Athens", "lat": 33.96, "lon": -83.38, "country": "US"}
        ]);
        assert_eq!(parse_candidates(&body), Ok(Some(LatLon(37.98, 23.72))));
    }

    #[test]
    fn empty_candidates_resolve_to_none() {
        assert_eq!(parse_candidates(&json!([])), Ok(None));
    }

    #[test]
    fn malformed_candidates_are_errors() {
        assert!(parse_candidates(&json!({"cod": 401})).is_err());
        assert!(parse_candidates(&json!([{"lat": 1.0}])).is_err());
    }

    #[tokio::test]
    async fn unreachable_endpoint_resolves_to_none() {
        let ctx = RunContext::new(Duration::from_millis(500), Duration::ZERO).unwrap();
        let resolver =
            CoordinateResolver::new(&ctx, "fake_key").with_base_url("http://127.0.0.1:9/geo");
        assert_eq!(resolver.resolve("Athens").await, None);
    }
}
