use crate::types::dataset_kind::DatasetKind;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Failed to read artifact '{0}'")]
    ArtifactRead(PathBuf, #[source] std::io::Error),

    #[error("Corrupted JSON in artifact '{0}'")]
    JsonParse(PathBuf, #[source] serde_json::Error),

    #[error("Missing expected field '{field}' in {kind} payload")]
    MissingField { kind: DatasetKind, field: String },

    #[error("Unexpected {kind} payload shape: {message}")]
    UnexpectedShape { kind: DatasetKind, message: String },

    #[error("Failed building {kind} table: {source}")]
    Polars {
        kind: DatasetKind,
        #[source]
        source: PolarsError,
    },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
