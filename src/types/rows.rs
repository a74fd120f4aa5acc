//! Flat records produced by the payload normalizers, one per output table row.

use crate::types::aqi_category::AqiCategory;
use chrono::{DateTime, Utc};
use polars::prelude::*;

/// Fill value for a missing `dt`: the Unix epoch.
pub const EPOCH_SENTINEL: i64 = 0;

/// Fill value for a missing `main_aqi`. Deliberately outside 1..=5 so the row
/// is labelled "Unknown" rather than given a real category.
pub const MISSING_AQI_SENTINEL: i64 = -1;

/// Behaviour shared by every normalized row type, used by the table assembler.
pub trait NormalizedRow: Sized {
    /// Location the row belongs to (first half of the dedup key).
    fn city(&self) -> &str;

    /// Event time in seconds since the epoch (second half of the dedup key).
    fn dt(&self) -> Option<i64>;

    /// Applies the per-kind default-fill map to missing cells.
    fn fill_defaults(&mut self);

    /// Builds a frame whose columns follow [`crate::DatasetKind::column_names`].
    /// The `dt` column is still raw epoch milliseconds at this point.
    fn to_frame(rows: &[Self]) -> PolarsResult<DataFrame>;

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.dt().and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// A current-weather observation or one forecast entry.
///
/// Both endpoints normalize into the same column set, so the row type is shared
/// and the table kind is carried by the assembler instead.
#[derive(Debug, PartialEq, Clone)]
pub struct WeatherRow {
    pub city: String,
    pub dt: Option<i64>,
    pub main_temp: Option<f64>,
    pub main_feels_like: Option<f64>,
    pub main_temp_max: Option<f64>,
    pub main_temp_min: Option<f64>,
    pub main_humidity: Option<i64>,
    pub main_pressure: Option<i64>,
    pub coord_lat: Option<f64>,
    pub coord_lon: Option<f64>,
}

/// Pollutant concentrations in μg/m³, as reported under `components`.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Components {
    pub co: Option<f64>,
    pub no: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub so2: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub nh3: Option<f64>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct AirPollutionRow {
    pub city: String,
    pub dt: Option<i64>,
    pub main_aqi: Option<i64>,
    pub main_aqi_desc: String,
    pub components: Components,
    pub coord_lat: Option<f64>,
    pub coord_lon: Option<f64>,
}

fn dt_millis<R: NormalizedRow>(rows: &[R]) -> Vec<Option<i64>> {
    rows.iter()
        .map(|row| row.dt().and_then(|secs| secs.checked_mul(1000)))
        .collect()
}

impl NormalizedRow for WeatherRow {
    fn city(&self) -> &str {
        &self.city
    }

    fn dt(&self) -> Option<i64> {
        self.dt
    }

    fn fill_defaults(&mut self) {
        self.dt.get_or_insert(EPOCH_SENTINEL);
    }

    fn to_frame(rows: &[Self]) -> PolarsResult<DataFrame> {
        polars::df!(
            "city" => rows.iter().map(|r| r.city.as_str()).collect::<Vec<_>>(),
            "dt" => dt_millis(rows),
            "main_temp" => rows.iter().map(|r| r.main_temp).collect::<Vec<_>>(),
            "main_feels_like" => rows.iter().map(|r| r.main_feels_like).collect::<Vec<_>>(),
            "main_temp_max" => rows.iter().map(|r| r.main_temp_max).collect::<Vec<_>>(),
            "main_temp_min" => rows.iter().map(|r| r.main_temp_min).collect::<Vec<_>>(),
            "main_humidity" => rows.iter().map(|r| r.main_humidity).collect::<Vec<_>>(),
            "main_pressure" => rows.iter().map(|r| r.main_pressure).collect::<Vec<_>>(),
            "coord_lat" => rows.iter().map(|r| r.coord_lat).collect::<Vec<_>>(),
            "coord_lon" => rows.iter().map(|r| r.coord_lon).collect::<Vec<_>>()
        )
    }
}

impl NormalizedRow for AirPollutionRow {
    fn city(&self) -> &str {
        &self.city
    }

    fn dt(&self) -> Option<i64> {
        self.dt
    }

    fn fill_defaults(&mut self) {
        self.dt.get_or_insert(EPOCH_SENTINEL);
        self.main_aqi.get_or_insert(MISSING_AQI_SENTINEL);
        self.main_aqi_desc = AqiCategory::describe(self.main_aqi).to_string();
    }

    fn to_frame(rows: &[Self]) -> PolarsResult<DataFrame> {
        let component = |pick: fn(&Components) -> Option<f64>| {
            rows.iter().map(|r| pick(&r.components)).collect::<Vec<_>>()
        };
        polars::df!(
            "city" => rows.iter().map(|r| r.city.as_str()).collect::<Vec<_>>(),
            "dt" => dt_millis(rows),
            "main_aqi" => rows.iter().map(|r| r.main_aqi).collect::<Vec<_>>(),
            "main_aqi_desc" => rows.iter().map(|r| r.main_aqi_desc.as_str()).collect::<Vec<_>>(),
            "components_co" => component(|c| c.co),
            "components_no" => component(|c| c.no),
            "components_no2" => component(|c| c.no2),
            "components_o3" => component(|c| c.o3),
            "components_so2" => component(|c| c.so2),
            "components_pm2_5" => component(|c| c.pm2_5),
            "components_pm10" => component(|c| c.pm10),
            "components_nh3" => component(|c| c.nh3),
            "coord_lat" => rows.iter().map(|r| r.coord_lat).collect::<Vec<_>>(),
            "coord_lon" => rows.iter().map(|r| r.coord_lon).collect::<Vec<_>>()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pollution(aqi: Option<i64>) -> AirPollutionRow {
        AirPollutionRow {
            city: "Athens".to_string(),
            dt: None,
            main_aqi: aqi,
            main_aqi_desc: AqiCategory::describe(aqi).to_string(),
            components: Components::default(),
            coord_lat: Some(37.98),
            coord_lon: Some(23.72),
        }
    }

    #[test]
    fn missing_aqi_fills_to_unknown_sentinel() {
        let mut row = pollution(None);
        row.fill_defaults();
        assert_eq!(row.main_aqi, Some(MISSING_AQI_SENTINEL));
        assert_eq!(row.main_aqi_desc, "Unknown");
        assert_eq!(row.dt, Some(EPOCH_SENTINEL));
        assert_eq!(row.timestamp(), DateTime::from_timestamp(0, 0));
    }

    #[test]
    fn present_aqi_is_not_touched_by_fill() {
        let mut row = pollution(Some(4));
        row.dt = Some(1_690_000_000);
        row.fill_defaults();
        assert_eq!(row.main_aqi, Some(4));
        assert_eq!(row.main_aqi_desc, "Poor");
        assert_eq!(row.dt, Some(1_690_000_000));
    }

    #[test]
    fn empty_frame_keeps_schema() {
        let frame = AirPollutionRow::to_frame(&[]).unwrap();
        assert_eq!(frame.height(), 0);
        assert_eq!(frame.width(), 14);
    }
}
