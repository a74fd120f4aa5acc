mod config;
mod context;
mod error;
mod pipeline;
mod types;
mod utils;

pub mod extract;
pub mod load;
pub mod transform;

pub use config::*;
pub use context::{format_run_stamp, RunContext};
pub use error::{ConfigError, EtlError};
pub use pipeline::*;
pub use utils::ensure_dir_exists;

pub use types::aqi_category::{AqiCategory, UNKNOWN_AQI_LABEL};
pub use types::artifact::{LocationArtifacts, RawArtifact, SavedFileIndex};
pub use types::coordinate::LatLon;
pub use types::dataset_kind::DatasetKind;
pub use types::rows::{
    AirPollutionRow, Components, NormalizedRow, WeatherRow, EPOCH_SENTINEL, MISSING_AQI_SENTINEL,
};

pub use extract::artifact_store::{sanitize_location, ArtifactStore};
pub use extract::coordinate_resolver::CoordinateResolver;
pub use extract::dataset_fetcher::DatasetFetcher;
pub use extract::error::ExtractError;
pub use extract::extractor::Extractor;
pub use extract::{Geocoder, WeatherSource};

pub use load::error::LoadError;
pub use load::parquet_sink::{read_table_files, ParquetTableSink};
pub use load::TableSink;

pub use transform::assembler::{assemble, dedup_and_fill, TableAssembler};
pub use transform::error::TransformError;
pub use transform::json::{flatten, load_json};
pub use transform::normalizer::{
    normalize_air_pollution, normalize_current_weather, normalize_forecast_weather,
};
pub use transform::table::{NormalizedTable, TransformOutput};
pub use transform::transformer::transform;
