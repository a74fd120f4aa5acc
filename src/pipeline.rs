//! Chains extraction, transform and load into one run.

use crate::config::{EtlConfig, LoadConfig};
use crate::context::RunContext;
use crate::error::EtlError;
use crate::extract::artifact_store::ArtifactStore;
use crate::extract::coordinate_resolver::CoordinateResolver;
use crate::extract::dataset_fetcher::DatasetFetcher;
use crate::extract::extractor::Extractor;
use crate::extract::{Geocoder, WeatherSource};
use crate::load::parquet_sink::ParquetTableSink;
use crate::load::TableSink;
use crate::transform::error::TransformError;
use crate::transform::table::TransformOutput;
use crate::transform::transformer::transform;
use crate::types::artifact::SavedFileIndex;
use crate::utils::ensure_dir_exists;
use bon::bon;
use log::{error, info};
use std::path::{Path, PathBuf};
use tokio::task;

/// What one full run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub index: SavedFileIndex,
    pub manifest_path: PathBuf,
    pub output: TransformOutput,
}

/// The top-level client: owns the run context and configuration of one run.
///
/// # Examples
///
/// ```no_run
/// # use weather_etl::{EtlConfig, EtlError, WeatherEtl};
/// # async fn run() -> Result<(), EtlError> {
/// let etl = WeatherEtl::new(EtlConfig::from_env()?).await?;
/// let report = etl.run().call().await?;
/// println!("{} rows of air pollution", report.output.air_pollution.height());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WeatherEtl {
    ctx: RunContext,
    config: EtlConfig,
}

#[bon]
impl WeatherEtl {
    /// Validates `config`, builds the run context and creates the raw and
    /// table directories.
    pub async fn new(config: EtlConfig) -> Result<Self, EtlError> {
        config.extract.validate()?;
        let ctx = RunContext::from_config(&config.extract).map_err(EtlError::HttpClient)?;
        ensure_dir_exists(&config.extract.storage_path).await?;
        ensure_dir_exists(&config.load.tables_path).await?;
        Ok(Self { ctx, config })
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    pub fn config(&self) -> &EtlConfig {
        &self.config
    }

    /// Fetches every configured location and records the saved-file manifest.
    pub async fn extract(&self) -> Result<(SavedFileIndex, PathBuf), EtlError> {
        let extract = &self.config.extract;
        let resolver = CoordinateResolver::new(&self.ctx, extract.api_key.as_str());
        let fetcher = DatasetFetcher::new(&self.ctx, extract.api_key.as_str(), extract.units.as_str());
        let store = ArtifactStore::new(&extract.storage_path);
        let extractor = Extractor::new(&self.ctx, resolver, fetcher, store);
        extract_and_record(&extractor, &extract.locations).await
    }

    /// Runs extract, transform and (unless `skip_load`) load.
    #[builder]
    pub async fn run(&self, #[builder(default)] skip_load: bool) -> Result<RunReport, EtlError> {
        info!("Starting run {}", self.ctx.run_stamp());
        let (index, manifest_path) = self.extract().await?;
        let output = transform_index(index.clone()).await?;

        if skip_load {
            info!("Skipping load step");
        } else {
            let sink = parquet_sink(&self.config.load, self.ctx.run_stamp());
            load_tables(&sink, &output).await?;
        }

        info!("Run {} finished", self.ctx.run_stamp());
        Ok(RunReport {
            index,
            manifest_path,
            output,
        })
    }
}

/// Extracts `locations` and writes `manifest_{run_stamp}.json` next to the artifacts.
pub async fn extract_and_record<G: Geocoder, W: WeatherSource>(
    extractor: &Extractor<G, W>,
    locations: &[String],
) -> Result<(SavedFileIndex, PathBuf), EtlError> {
    let root = extractor.store().root();
    ensure_dir_exists(root).await?;
    let index = extractor.extract(locations).await;

    let manifest_path = root.join(format!("manifest_{}.json", extractor.run_stamp()));
    index.write_manifest(&manifest_path).await?;
    info!("Wrote manifest {}", manifest_path.display());
    Ok((index, manifest_path))
}

/// Runs the transform stage on a blocking task.
pub async fn transform_index(index: SavedFileIndex) -> Result<TransformOutput, EtlError> {
    let output = task::spawn_blocking(move || transform(&index))
        .await
        .map_err(TransformError::from)??;
    Ok(output)
}

/// Re-runs transform on the artifacts listed in a manifest from an earlier run.
pub async fn reprocess(manifest: &Path) -> Result<TransformOutput, EtlError> {
    info!("Reprocessing artifacts listed in {}", manifest.display());
    let index = SavedFileIndex::read_manifest(manifest).await?;
    transform_index(index).await
}

/// Appends the tables in load order. Stops at the first failing table.
pub async fn load_tables<S: TableSink>(sink: &S, output: &TransformOutput) -> Result<(), EtlError> {
    for table in output.tables() {
        if let Err(e) = sink.append(table).await {
            error!("Loading {} failed: {}", table.name(), e);
            return Err(e.into());
        }
    }
    Ok(())
}

/// Builds the sink described by `config`.
pub fn parquet_sink(config: &LoadConfig, run_stamp: &str) -> ParquetTableSink {
    if let Some(host) = &config.host {
        info!(
            "Relational store configured at {} (database {:?}, driver {:?}); writing parquet tables to {}",
            host,
            config.database,
            config.driver,
            config.tables_path.display()
        );
    }
    ParquetTableSink::new(&config.tables_path, run_stamp)
}
