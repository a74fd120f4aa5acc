//! Load stage: hands assembled tables to an append-only store.

pub mod error;
pub mod parquet_sink;

use crate::load::error::LoadError;
use crate::transform::table::NormalizedTable;
use std::future::Future;

/// Append-only destination for normalized tables, keyed by table name.
///
/// Implementations only ever add rows; they never rewrite what an earlier
/// run stored.
pub trait TableSink {
    fn append(&self, table: &NormalizedTable) -> impl Future<Output = Result<(), LoadError>> + Send;
}
