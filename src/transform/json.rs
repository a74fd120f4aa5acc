//! Reading persisted artifacts and flattening nested JSON into column-style keys.

use crate::transform::error::TransformError;
use log::error;
use serde_json::{Map, Value};
use std::path::Path;

pub const KEY_SEPARATOR: &str = "_";

/// Reads and parses one artifact, reporting why it could not be used.
pub fn read_json(path: &Path) -> Result<Value, TransformError> {
    let bytes =
        std::fs::read(path).map_err(|e| TransformError::ArtifactRead(path.to_path_buf(), e))?;
    serde_json::from_slice(&bytes).map_err(|e| TransformError::JsonParse(path.to_path_buf(), e))
}

/// Like [`read_json`], but a missing or corrupt file is logged and yields `None`.
pub fn load_json(path: &Path) -> Option<Value> {
    match read_json(path) {
        Ok(value) => Some(value),
        Err(TransformError::ArtifactRead(path, e)) if e.kind() == std::io::ErrorKind::NotFound => {
            error!("Missing file: {}", path.display());
            None
        }
        Err(TransformError::JsonParse(path, e)) => {
            error!("Corrupted JSON in {}: {}", path.display(), e);
            None
        }
        Err(e) => {
            error!("Unexpected error with {}: {:?}", path.display(), e);
            None
        }
    }
}

/// Flattens nested objects into a single level, joining keys with `_`.
///
/// `{"main": {"temp": 25}}` and `{"main_temp": 25}` both produce the key
/// `main_temp`. Arrays and scalars are kept as leaf values. A non-object
/// input yields an empty map.
pub fn flatten(value: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    if let Value::Object(object) = value {
        flatten_into(object, None, &mut out);
    }
    out
}

fn flatten_into(object: &Map<String, Value>, prefix: Option<&str>, out: &mut Map<String, Value>) {
    for (key, value) in object {
        let name = match prefix {
            Some(prefix) => format!("{prefix}{KEY_SEPARATOR}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(child) if !child.is_empty() => flatten_into(child, Some(&name), out),
            _ => {
                out.insert(name, value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn load_json_reads_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.json");
        std::fs::write(&path, r#"{"key": "value"}"#).unwrap();
        assert_eq!(load_json(&path), Some(json!({"key": "value"})));
    }

    #[test]
    fn load_json_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_json(&dir.path().join("missing.json")), None);
        assert!(matches!(
            read_json(&dir.path().join("missing.json")),
            Err(TransformError::ArtifactRead(..))
        ));
    }

    #[test]
    fn load_json_corrupt_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ invalid json }").unwrap();
        assert_eq!(load_json(&path), None);
        assert!(matches!(read_json(&path), Err(TransformError::JsonParse(..))));
    }

    #[test]
    fn flattens_nested_and_keeps_flat_keys() {
        let flat = flatten(&json!({
            "coord": {"lat": 37.98, "lon": 23.72},
            "main": {"temp": 27.06},
            "main_humidity": 40,
            "weather": [{"id": 800}],
            "empty": {},
            "dt": 1690000000
        }));

        assert_eq!(flat["coord_lat"], json!(37.98));
        assert_eq!(flat["coord_lon"], json!(23.72));
        assert_eq!(flat["main_temp"], json!(27.06));
        assert_eq!(flat["main_humidity"], json!(40));
        assert_eq!(flat["weather"], json!([{"id": 800}]));
        assert_eq!(flat["empty"], json!({}));
        assert_eq!(flat["dt"], json!(1690000000));
        assert!(!flat.contains_key("coord"));
    }

    #[test]
    fn deep_nesting_joins_every_level() {
        let flat = flatten(&json!({"city": {"coord": {"lat": 1.5}}}));
        assert_eq!(flat["city_coord_lat"], json!(1.5));
        assert!(flatten(&json!([1, 2])).is_empty());
    }
}
