use crate::transform::assembler::TableAssembler;
use crate::transform::error::TransformError;
use crate::transform::json::load_json;
use crate::transform::normalizer::{
    normalize_air_pollution, normalize_current_weather, normalize_forecast_weather,
};
use crate::transform::table::TransformOutput;
use crate::types::artifact::{RawArtifact, SavedFileIndex};
use crate::types::dataset_kind::DatasetKind;
use log::{error, info};

/// Normalizes every artifact in `index` and assembles one table per kind.
///
/// Artifacts that are missing, corrupt or of an unexpected shape are logged
/// and skipped; only a failure to build a table frame is returned as an error.
pub fn transform(index: &SavedFileIndex) -> Result<TransformOutput, TransformError> {
    let mut assembler = TableAssembler::new();
    for (city, artifacts) in index.iter() {
        for artifact in artifacts {
            process_artifact(&mut assembler, city, artifact);
        }
    }
    let output = assembler.finish()?;
    for table in output.tables() {
        info!("Assembled {} table with {} rows", table.name(), table.height());
    }
    Ok(output)
}

fn process_artifact(assembler: &mut TableAssembler, city: &str, artifact: &RawArtifact) {
    let path = artifact.path.display();
    info!("Processing {} data for {} from {}", artifact.kind, city, path);
    let Some(doc) = load_json(&artifact.path) else {
        return;
    };

    let pushed = match artifact.kind {
        DatasetKind::CurrentWeather => normalize_current_weather(&doc, city).map(|rows| {
            let n = rows.len();
            assembler.push_current_weather(rows);
            n
        }),
        DatasetKind::ForecastWeather => normalize_forecast_weather(&doc, city).map(|rows| {
            let n = rows.len();
            assembler.push_forecast_weather(rows);
            n
        }),
        DatasetKind::AirPollution => normalize_air_pollution(&doc, city).map(|rows| {
            let n = rows.len();
            assembler.push_air_pollution(rows);
            n
        }),
    };

    match pushed {
        Ok(n) => info!(
            "Finished processing {} data for {} from {} ({} rows)",
            artifact.kind, city, path, n
        ),
        Err(e) => error!("Dropping {} for {}: {}", path, city, e),
    }
}
