use crate::load::error::LoadError;
use crate::load::TableSink;
use crate::transform::table::NormalizedTable;
use log::info;
use polars::prelude::*;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::{fs, task};

const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Appends each table as a new parquet file under `{root}/{table_name}/`.
///
/// Every append creates a fresh `{table_name}_{run_stamp}.parquet` file, so a
/// table directory is the union of all runs that ever loaded into it.
#[derive(Debug, Clone)]
pub struct ParquetTableSink {
    root: PathBuf,
    run_stamp: String,
}

impl ParquetTableSink {
    pub fn new(root: impl Into<PathBuf>, run_stamp: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            run_stamp: run_stamp.into(),
        }
    }

    pub fn table_dir(&self, table_name: &str) -> PathBuf {
        self.root.join(table_name)
    }

    /// Writes a DataFrame to a new Parquet file on a blocking task.
    async fn write_new_file(
        mut df: DataFrame,
        dir: PathBuf,
        base_name: String,
    ) -> Result<PathBuf, LoadError> {
        task::spawn_blocking(move || {
            let mut attempt = 0;
            let (path, file) = loop {
                let name = if attempt == 0 {
                    format!("{base_name}.parquet")
                } else {
                    format!("{base_name}_{attempt}.parquet")
                };
                let path = dir.join(name);
                match OpenOptions::new().write(true).create_new(true).open(&path) {
                    Ok(file) => break (path, file),
                    Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < MAX_NAME_ATTEMPTS => {
                        attempt += 1;
                    }
                    Err(e) => return Err(LoadError::ParquetWriteIo(path, e)),
                }
            };
            ParquetWriter::new(file)
                .with_compression(ParquetCompression::Snappy)
                .finish(&mut df)
                .map_err(|e| LoadError::ParquetWritePolars(path.clone(), e))?;
            Ok(path)
        })
        .await?
    }
}

impl TableSink for ParquetTableSink {
    async fn append(&self, table: &NormalizedTable) -> Result<(), LoadError> {
        if table.is_empty() {
            info!("Table {} is empty, nothing to load", table.name());
            return Ok(());
        }

        let dir = self.table_dir(table.name());
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| LoadError::DirCreation(dir.clone(), e))?;

        let base_name = format!("{}_{}", table.name(), self.run_stamp);
        let path = Self::write_new_file(table.frame().clone(), dir, base_name).await?;
        info!(
            "Appended {} rows to {} at {}",
            table.height(),
            table.name(),
            path.display()
        );
        Ok(())
    }
}

/// Reads back every parquet file of one table directory, in file-name order.
pub fn read_table_files(dir: &Path) -> PolarsResult<Vec<DataFrame>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "parquet"))
        .collect();
    paths.sort();
    paths
        .iter()
        .map(|path| ParquetReader::new(std::fs::File::open(path)?).finish())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::assembler::assemble;
    use crate::types::dataset_kind::DatasetKind;
    use crate::types::rows::WeatherRow;

    fn table() -> NormalizedTable {
        let row = WeatherRow {
            city: "Athens".to_string(),
            dt: Some(1_690_000_000),
            main_temp: Some(27.06),
            main_feels_like: Some(28.31),
            main_temp_max: None,
            main_temp_min: None,
            main_humidity: Some(40),
            main_pressure: Some(1012),
            coord_lat: Some(37.98),
            coord_lon: Some(23.72),
        };
        assemble(DatasetKind::CurrentWeather, vec![row]).unwrap()
    }

    #[tokio::test]
    async fn appends_never_overwrite() -> Result<(), LoadError> {
        let dir = tempfile::tempdir().unwrap();
        let sink = ParquetTableSink::new(dir.path(), "20250101_120000");
        let table = table();

        sink.append(&table).await?;
        sink.append(&table).await?;

        let frames = read_table_files(&sink.table_dir("current_weather")).unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.height() == 1));
        assert_eq!(frames[0].width(), table.frame().width());
        Ok(())
    }

    #[tokio::test]
    async fn empty_tables_write_nothing() -> Result<(), LoadError> {
        let dir = tempfile::tempdir().unwrap();
        let sink = ParquetTableSink::new(dir.path(), "20250101_120000");
        let empty = assemble::<WeatherRow>(DatasetKind::ForecastWeather, vec![]).unwrap();

        sink.append(&empty).await?;

        assert!(!sink.table_dir("forecast_weather").exists());
        Ok(())
    }
}
