use crate::context::RunContext;
use crate::extract::error::ExtractError;
use crate::extract::WeatherSource;
use crate::types::coordinate::LatLon;
use crate::types::dataset_kind::DatasetKind;
use log::{debug, info};
use reqwest::{Client, Request};
use serde_json::Value;

pub const WEATHER_API_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Downloads one current-weather, forecast or air-pollution document per call.
#[derive(Debug, Clone)]
pub struct DatasetFetcher {
    http: Client,
    api_key: String,
    units: String,
    base_url: String,
}

impl DatasetFetcher {
    pub fn new(ctx: &RunContext, api_key: impl Into<String>, units: impl Into<String>) -> Self {
        Self {
            http: ctx.http().clone(),
            api_key: api_key.into(),
            units: units.into(),
            base_url: WEATHER_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Endpoint URL for `kind`, without query parameters.
    pub fn endpoint(&self, kind: DatasetKind) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            kind.path_segment()
        )
    }

    pub(crate) fn build_request(
        &self,
        location: LatLon,
        kind: DatasetKind,
    ) -> Result<Request, ExtractError> {
        let url = self.endpoint(kind);
        self.http
            .get(&url)
            .query(&[
                ("lat", location.lat().to_string()),
                ("lon", location.lon().to_string()),
                ("units", self.units.clone()),
                ("appid", self.api_key.clone()),
            ])
            .build()
            .map_err(|e| ExtractError::RequestBuild(url, e.without_url()))
    }

    /// Fetches and decodes one payload. The body must be a JSON object;
    /// anything else is reported as an unexpected payload.
    pub async fn fetch_kind(&self, location: LatLon, kind: DatasetKind) -> Result<Value, ExtractError> {
        let request = self.build_request(location, kind)?;
        let url = self.endpoint(kind);
        debug!("Requesting {} data from {}", kind, url);

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

        if !body.is_object() {
            return Err(ExtractError::UnexpectedPayload {
                url,
                message: format!("expected a JSON object for {} data", kind),
            });
        }
        info!("Fetched {} data from {}", kind, url);
        Ok(body)
    }
}

impl WeatherSource for DatasetFetcher {
    async fn fetch(&self, location: LatLon, kind: DatasetKind) -> Result<Value, ExtractError> {
        self.fetch_kind(location, kind).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fetcher() -> DatasetFetcher {
        let ctx = RunContext::with_client(Client::new(), Duration::ZERO);
        DatasetFetcher::new(&ctx, "fake_key", "metric")
    }

    #[test]
    fn builds_one_request_per_kind() {
        let fetcher = fetcher();
        let urls: Vec<String> = DatasetKind::ALL
            .iter()
            .map(|kind| {
                fetcher
                    .build_request(LatLon(37.98, 23.72), *kind)
                    .unwrap()
                    .url()
                    .to_string()
            })
            .collect();

        assert_eq!(
            urls,
            [
                "https://api.openweathermap.org/data/2.5/weather?lat=37.98&lon=23.72&units=metric&appid=fake_key",
                "https://api.openweathermap.org/data/2.5/forecast?lat=37.98&lon=23.72&units=metric&appid=fake_key",
                "https://api.openweathermap.org/data/2.5/air_pollution?lat=37.98&lon=23.72&units=metric&appid=fake_key",
            ]
        );
    }

    #[test]
    fn trailing_slash_in_base_url_is_ignored() {
        let fetcher = fetcher().with_base_url("http://localhost:8080/data/");
        assert_eq!(
            fetcher.endpoint(DatasetKind::ForecastWeather),
            "http://localhost:8080/data/forecast"
        );
    }

    #[tokio::test]
    async fn connection_failure_is_a_network_error() {
        let ctx = RunContext::new(Duration::from_millis(500), Duration::ZERO).unwrap();
        let fetcher =
            DatasetFetcher::new(&ctx, "fake_key", "metric").with_base_url("http://127.0.0.1:9");
        let result = fetcher
            .fetch_kind(LatLon(37.98, 23.72), DatasetKind::CurrentWeather)
            .await;
        assert!(matches!(result, Err(ExtractError::NetworkRequest(..))));
    }
}
