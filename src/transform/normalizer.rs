//! One pure normalization function per dataset kind.
//!
//! Each takes a parsed payload and the location it was fetched for and returns
//! flat rows, or an error when the payload is missing a key the kind cannot do
//! without. Optional per-entry values that are absent or not numeric become `None`.

use crate::transform::error::TransformError;
use crate::transform::json::flatten;
use crate::types::aqi_category::AqiCategory;
use crate::types::dataset_kind::DatasetKind;
use crate::types::rows::{AirPollutionRow, Components, WeatherRow};
use chrono::DateTime;
use log::warn;
use serde_json::{Map, Value};

const CURRENT_WEATHER_FIELDS: [&str; 9] = [
    "main_temp",
    "main_feels_like",
    "main_temp_max",
    "main_temp_min",
    "main_humidity",
    "main_pressure",
    "dt",
    "coord_lat",
    "coord_lon",
];

type Flat = Map<String, Value>;

fn get_opt_float(flat: &Flat, key: &str) -> Option<f64> {
    flat.get(key).and_then(Value::as_f64)
}

/// Whole numbers only. `50.0` reads as `50`; `0.6` is treated as missing, not rounded.
fn get_opt_int(flat: &Flat, key: &str) -> Option<i64> {
    flat.get(key).and_then(|v| {
        v.as_i64().or_else(|| {
            v.as_f64()
                .filter(|f| f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(f))
                .map(|f| f as i64)
        })
    })
}

/// Seconds since the epoch, kept only if chrono can represent it as a timestamp.
fn get_opt_timestamp(flat: &Flat, key: &str) -> Option<i64> {
    get_opt_int(flat, key).filter(|secs| DateTime::from_timestamp(*secs, 0).is_some())
}

fn ensure_object(kind: DatasetKind, doc: &Value) -> Result<(), TransformError> {
    if doc.is_object() {
        Ok(())
    } else {
        Err(TransformError::UnexpectedShape {
            kind,
            message: "top level is not a JSON object".to_string(),
        })
    }
}

fn missing(kind: DatasetKind, field: &str) -> TransformError {
    TransformError::MissingField {
        kind,
        field: field.to_string(),
    }
}

fn entry_list<'a>(kind: DatasetKind, doc: &'a Value) -> Result<&'a [Value], TransformError> {
    doc.get("list")
        .ok_or_else(|| missing(kind, "list"))?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| TransformError::UnexpectedShape {
            kind,
            message: "'list' is not an array".to_string(),
        })
}

/// Reads the `lat`/`lon` pair shared by every entry of a list payload.
fn shared_coordinate(
    kind: DatasetKind,
    coord: Option<&Value>,
    path: &str,
) -> Result<(Option<f64>, Option<f64>), TransformError> {
    let coord = coord
        .filter(|c| c.is_object())
        .ok_or_else(|| missing(kind, path))?;
    Ok((
        coord.get("lat").and_then(Value::as_f64),
        coord.get("lon").and_then(Value::as_f64),
    ))
}

fn entries<'a>(
    kind: DatasetKind,
    city: &'a str,
    list: &'a [Value],
) -> impl Iterator<Item = Flat> + 'a {
    list.iter().enumerate().filter_map(move |(i, entry)| {
        if entry.is_object() {
            Some(flatten(entry))
        } else {
            warn!("Skipping malformed {} entry {} for {}", kind, i, city);
            None
        }
    })
}

/// Current weather: one object, one row. Every kept column must be present
/// as a key (nested or already flattened); `null` values are allowed.
pub fn normalize_current_weather(doc: &Value, city: &str) -> Result<Vec<WeatherRow>, TransformError> {
    let kind = DatasetKind::CurrentWeather;
    ensure_object(kind, doc)?;
    let flat = flatten(doc);
    if let Some(field) = CURRENT_WEATHER_FIELDS.iter().find(|f| !flat.contains_key(**f)) {
        return Err(missing(kind, field));
    }

    Ok(vec![WeatherRow {
        city: city.to_string(),
        dt: get_opt_timestamp(&flat, "dt"),
        main_temp: get_opt_float(&flat, "main_temp"),
        main_feels_like: get_opt_float(&flat, "main_feels_like"),
        main_temp_max: get_opt_float(&flat, "main_temp_max"),
        main_temp_min: get_opt_float(&flat, "main_temp_min"),
        main_humidity: get_opt_int(&flat, "main_humidity"),
        main_pressure: get_opt_int(&flat, "main_pressure"),
        coord_lat: get_opt_float(&flat, "coord_lat"),
        coord_lon: get_opt_float(&flat, "coord_lon"),
    }])
}

/// Forecast: one row per `list` entry, all sharing the `city.coord` pair.
pub fn normalize_forecast_weather(doc: &Value, city: &str) -> Result<Vec<WeatherRow>, TransformError> {
    let kind = DatasetKind::ForecastWeather;
    ensure_object(kind, doc)?;
    let list = entry_list(kind, doc)?;
    let city_obj = doc.get("city").ok_or_else(|| missing(kind, "city"))?;
    let (coord_lat, coord_lon) = shared_coordinate(kind, city_obj.get("coord"), "city.coord")?;

    Ok(entries(kind, city, list)
        .map(|flat| WeatherRow {
            city: city.to_string(),
            dt: get_opt_timestamp(&flat, "dt"),
            main_temp: get_opt_float(&flat, "main_temp"),
            main_feels_like: get_opt_float(&flat, "main_feels_like"),
            main_temp_max: get_opt_float(&flat, "main_temp_max"),
            main_temp_min: get_opt_float(&flat, "main_temp_min"),
            main_humidity: get_opt_int(&flat, "main_humidity"),
            main_pressure: get_opt_int(&flat, "main_pressure"),
            coord_lat,
            coord_lon,
        })
        .collect())
}

/// Air pollution: one row per `list` entry, all sharing the top-level `coord`.
/// `main_aqi_desc` is derived here and is "Unknown" for anything outside 1..=5.
pub fn normalize_air_pollution(doc: &Value, city: &str) -> Result<Vec<AirPollutionRow>, TransformError> {
    let kind = DatasetKind::AirPollution;
    ensure_object(kind, doc)?;
    let list = entry_list(kind, doc)?;
    let (coord_lat, coord_lon) = shared_coordinate(kind, doc.get("coord"), "coord")?;

    Ok(entries(kind, city, list)
        .map(|flat| {
            let main_aqi = get_opt_int(&flat, "main_aqi");
            AirPollutionRow {
                city: city.to_string(),
                dt: get_opt_timestamp(&flat, "dt"),
                main_aqi,
                main_aqi_desc: AqiCategory::describe(main_aqi).to_string(),
                components: Components {
                    co: get_opt_float(&flat, "components_co"),
                    no: get_opt_float(&flat, "components_no"),
                    no2: get_opt_float(&flat, "components_no2"),
                    o3: get_opt_float(&flat, "components_o3"),
                    so2: get_opt_float(&flat, "components_so2"),
                    pm2_5: get_opt_float(&flat, "components_pm2_5"),
                    pm10: get_opt_float(&flat, "components_pm10"),
                    nh3: get_opt_float(&flat, "components_nh3"),
                },
                coord_lat,
                coord_lon,
            }
        })
        .collect())
}
