//! Defines the three OpenWeatherMap datasets fetched per location and the
//! fixed table schema each one is normalized into.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three OpenWeatherMap response categories fetched for every location.
///
/// The kind travels with every persisted artifact from the moment it is written,
/// so the transform stage dispatches on this value instead of inspecting file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    /// `/data/2.5/weather`: a single observation object per location.
    CurrentWeather,
    /// `/data/2.5/forecast`: a `list` of 3-hourly entries plus one shared `city.coord`.
    ForecastWeather,
    /// `/data/2.5/air_pollution`: a `list` of AQI entries plus one shared `coord`.
    AirPollution,
}

impl DatasetKind {
    /// Every kind, in the order they are requested for a location.
    pub const ALL: [DatasetKind; 3] = [
        DatasetKind::CurrentWeather,
        DatasetKind::ForecastWeather,
        DatasetKind::AirPollution,
    ];

    /// Endpoint path segment under `/data/2.5/`.
    pub(crate) fn path_segment(&self) -> &'static str {
        match self {
            DatasetKind::CurrentWeather => "weather",
            DatasetKind::ForecastWeather => "forecast",
            DatasetKind::AirPollution => "air_pollution",
        }
    }

    /// Name of the output table, also used in artifact file names.
    pub fn table_name(&self) -> &'static str {
        match self {
            DatasetKind::CurrentWeather => "current_weather",
            DatasetKind::ForecastWeather => "forecast_weather",
            DatasetKind::AirPollution => "air_pollution",
        }
    }

    pub(crate) fn artifact_file_prefix(&self) -> String {
        format!("raw_{}_", self.table_name())
    }

    /// Column names of the normalized table, in frame order.
    pub fn column_names(&self) -> Vec<&'static str> {
        match self {
            DatasetKind::CurrentWeather | DatasetKind::ForecastWeather => vec![
                "city",
                "dt",
                "main_temp",
                "main_feels_like",
                "main_temp_max",
                "main_temp_min",
                "main_humidity",
                "main_pressure",
                "coord_lat",
                "coord_lon",
            ],
            DatasetKind::AirPollution => vec![
                "city",
                "dt",
                "main_aqi",
                "main_aqi_desc",
                "components_co",
                "components_no",
                "components_no2",
                "components_o3",
                "components_so2",
                "components_pm2_5",
                "components_pm10",
                "components_nh3",
                "coord_lat",
                "coord_lon",
            ],
        }
    }
}

/// Allows formatting a `DatasetKind` variant using its table name.
///
/// # Examples
///
/// ```
/// use weather_etl::DatasetKind;
///
/// assert_eq!(DatasetKind::AirPollution.to_string(), "air_pollution");
/// assert_eq!(format!("{}", DatasetKind::CurrentWeather), "current_weather");
/// ```
impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_name())
    }
}
