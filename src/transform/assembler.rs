use crate::transform::error::TransformError;
use crate::transform::table::{NormalizedTable, TransformOutput};
use crate::types::dataset_kind::DatasetKind;
use crate::types::rows::{AirPollutionRow, NormalizedRow, WeatherRow, EPOCH_SENTINEL};
use log::debug;
use polars::prelude::*;
use std::collections::HashSet;

/// Drops every row whose (`city`, `dt`) pair was already seen, keeping the
/// first occurrence, then applies each row's default-fill map.
///
/// The key uses the filled `dt`, so a row lacking `dt` and a row stamped at
/// the epoch are duplicates of each other.
pub fn dedup_and_fill<R: NormalizedRow>(rows: Vec<R>) -> Vec<R> {
    let before = rows.len();
    let mut seen: HashSet<(String, i64)> = HashSet::with_capacity(before);
    let mut kept: Vec<R> = rows
        .into_iter()
        .filter(|row| {
            let dt = row.dt().unwrap_or(EPOCH_SENTINEL);
            seen.insert((row.city().to_string(), dt))
        })
        .collect();
    if kept.len() < before {
        debug!("Dropped {} duplicate rows", before - kept.len());
    }
    kept.iter_mut().for_each(NormalizedRow::fill_defaults);
    kept
}

/// Deduplicates, fills and converts rows into a table with a `Datetime` `dt` column.
pub fn assemble<R: NormalizedRow>(
    kind: DatasetKind,
    rows: Vec<R>,
) -> Result<NormalizedTable, TransformError> {
    let rows = dedup_and_fill(rows);
    let frame = R::to_frame(&rows)
        .and_then(with_datetime_dt)
        .map_err(|source| TransformError::Polars { kind, source })?;
    Ok(NormalizedTable::new(kind, frame))
}

fn with_datetime_dt(frame: DataFrame) -> PolarsResult<DataFrame> {
    frame
        .lazy()
        .with_column(col("dt").cast(DataType::Datetime(TimeUnit::Milliseconds, None)))
        .collect()
}

/// Collects normalized rows per dataset kind across all locations.
///
/// Rows are kept in push order, which makes the first-occurrence rule of
/// [`dedup_and_fill`] follow the order artifacts were processed in.
#[derive(Debug, Default)]
pub struct TableAssembler {
    current_weather: Vec<WeatherRow>,
    forecast_weather: Vec<WeatherRow>,
    air_pollution: Vec<AirPollutionRow>,
}

impl TableAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_current_weather(&mut self, rows: Vec<WeatherRow>) {
        self.current_weather.extend(rows);
    }

    pub fn push_forecast_weather(&mut self, rows: Vec<WeatherRow>) {
        self.forecast_weather.extend(rows);
    }

    pub fn push_air_pollution(&mut self, rows: Vec<AirPollutionRow>) {
        self.air_pollution.extend(rows);
    }

    pub fn finish(self) -> Result<TransformOutput, TransformError> {
        Ok(TransformOutput {
            air_pollution: assemble(DatasetKind::AirPollution, self.air_pollution)?,
            current_weather: assemble(DatasetKind::CurrentWeather, self.current_weather)?,
            forecast_weather: assemble(DatasetKind::ForecastWeather, self.forecast_weather)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::rows::{Components, MISSING_AQI_SENTINEL};

    fn weather(city: &str, dt: Option<i64>, temp: f64) -> WeatherRow {
        WeatherRow {
            city: city.to_string(),
            dt,
            main_temp: Some(temp),
            main_feels_like: None,
            main_temp_max: None,
            main_temp_min: None,
            main_humidity: None,
            main_pressure: None,
            coord_lat: Some(37.98),
            coord_lon: Some(23.72),
        }
    }

    fn pollution(city: &str, dt: Option<i64>, aqi: Option<i64>) -> AirPollutionRow {
        AirPollutionRow {
            city: city.to_string(),
            dt,
            main_aqi: aqi,
            main_aqi_desc: crate::AqiCategory::describe(aqi).to_string(),
            components: Components::default(),
            coord_lat: Some(37.98),
            coord_lon: Some(23.72),
        }
    }

    fn column_names(table: &NormalizedTable) -> Vec<&str> {
        table
            .frame()
            .get_column_names()
            .iter()
            .map(|name| name.as_str())
            .collect()
    }

    #[test]
    fn keeps_first_occurrence_per_city_and_dt() {
        let rows = vec![
            weather("Athens", Some(1), 10.0),
            weather("Athens", Some(1), 99.0),
            weather("Paris", Some(1), 20.0),
            weather("Athens", Some(2), 30.0),
        ];
        let kept = dedup_and_fill(rows);
        let temps: Vec<_> = kept.iter().map(|r| (r.city.as_str(), r.main_temp)).collect();
        assert_eq!(
            temps,
            [("Athens", Some(10.0)), ("Paris", Some(20.0)), ("Athens", Some(30.0))]
        );
    }

    #[test]
    fn missing_dt_collapses_with_epoch_rows() {
        let rows = vec![
            weather("Athens", None, 1.0),
            weather("Athens", None, 2.0),
            weather("Athens", Some(0), 3.0),
            weather("Paris", Some(0), 4.0),
        ];
        let kept = dedup_and_fill(rows);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.dt == Some(0)));
        assert_eq!(kept[0].main_temp, Some(1.0));
        assert_eq!(kept[1].city, "Paris");
    }

    #[test]
    fn assembled_frame_has_unique_city_and_dt() -> Result<(), TransformError> {
        let table = assemble(
            DatasetKind::ForecastWeather,
            vec![
                weather("Athens", None, 1.0),
                weather("Athens", Some(0), 2.0),
                weather("Athens", Some(1_690_000_000), 3.0),
                weather("Athens", Some(1_690_000_000), 4.0),
                weather("Paris", None, 5.0),
                weather("Paris", Some(1_690_000_000), 6.0),
            ],
        )?;
        assert_eq!(table.height(), 4);
        let frame = table.frame();
        let city = frame.column("city").unwrap().str().unwrap();
        let dt = frame.column("dt").unwrap().cast(&DataType::Int64).unwrap();
        let keys: HashSet<_> = city.into_iter().zip(dt.i64().unwrap()).collect();
        assert_eq!(keys.len(), table.height());
        assert_eq!(table.frame().column("dt").unwrap().null_count(), 0);
        Ok(())
    }

    #[test]
    fn air_pollution_fill_marks_unknown() {
        let kept = dedup_and_fill(vec![
            pollution("Athens", Some(1_690_000_000), None),
            pollution("Athens", Some(1_690_003_600), Some(0)),
            pollution("Athens", Some(1_690_007_200), Some(5)),
        ]);
        for row in &kept {
            let in_range = row.main_aqi.is_some_and(|aqi| (1..=5).contains(&aqi));
            assert_eq!(row.main_aqi_desc == "Unknown", !in_range);
        }
        assert_eq!(kept[0].main_aqi, Some(MISSING_AQI_SENTINEL));
        assert_eq!(kept[2].main_aqi_desc, "Very Poor");
    }

    #[test]
    fn duplicate_pollution_rows_collapse_to_one() -> Result<(), TransformError> {
        let table = assemble(
            DatasetKind::AirPollution,
            vec![
                pollution("Athens", Some(1_690_000_000), Some(3)),
                pollution("Athens", Some(1_690_000_000), Some(4)),
            ],
        )?;
        assert_eq!(table.height(), 1);
        assert_eq!(table.name(), "air_pollution");
        let desc = table.frame().column("main_aqi_desc").unwrap().str().unwrap().get(0);
        assert_eq!(desc, Some("Moderate"));
        Ok(())
    }

    #[test]
    fn dt_column_is_datetime() -> Result<(), TransformError> {
        let table = assemble(
            DatasetKind::CurrentWeather,
            vec![weather("Athens", Some(1_690_000_000), 27.06)],
        )?;
        let dtype = table.frame().column("dt").unwrap().dtype().clone();
        assert_eq!(dtype, DataType::Datetime(TimeUnit::Milliseconds, None));
        assert_eq!(column_names(&table), DatasetKind::CurrentWeather.column_names());
        Ok(())
    }

    #[test]
    fn empty_kinds_produce_empty_tables_with_schema() -> Result<(), TransformError> {
        let output = TableAssembler::new().finish()?;
        for kind in DatasetKind::ALL {
            let table = output.get(kind);
            assert!(table.is_empty());
            assert_eq!(table.kind(), kind);
            assert_eq!(column_names(table), kind.column_names());
        }
        Ok(())
    }
}
