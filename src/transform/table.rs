//! Contains `NormalizedTable`, the per-kind output of the transform stage.

use crate::types::dataset_kind::DatasetKind;
use polars::prelude::DataFrame;

/// A deduplicated, default-filled table for one dataset kind.
///
/// The wrapped frame follows [`DatasetKind::column_names`] exactly, with `dt`
/// as a millisecond `Datetime` column. No two rows share a (`city`, `dt`) pair.
/// An empty table still carries the full schema.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    kind: DatasetKind,
    frame: DataFrame,
}

impl NormalizedTable {
    pub(crate) fn new(kind: DatasetKind, frame: DataFrame) -> Self {
        Self { kind, frame }
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    /// Destination table name for the load step.
    pub fn name(&self) -> &'static str {
        self.kind.table_name()
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }
}

/// The three tables produced by one transform pass.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub air_pollution: NormalizedTable,
    pub current_weather: NormalizedTable,
    pub forecast_weather: NormalizedTable,
}

impl TransformOutput {
    /// Tables in load order.
    pub fn tables(&self) -> [&NormalizedTable; 3] {
        [
            &self.air_pollution,
            &self.current_weather,
            &self.forecast_weather,
        ]
    }

    pub fn get(&self, kind: DatasetKind) -> &NormalizedTable {
        match kind {
            DatasetKind::CurrentWeather => &self.current_weather,
            DatasetKind::ForecastWeather => &self.forecast_weather,
            DatasetKind::AirPollution => &self.air_pollution,
        }
    }
}
