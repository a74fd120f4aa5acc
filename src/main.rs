use anyhow::Context;
use argh::FromArgs;
use chrono::Local;
use log::info;
use std::path::PathBuf;
use weather_etl::{
    ensure_dir_exists, format_run_stamp, load_tables, parquet_sink, reprocess, EtlConfig,
    LoadConfig, WeatherEtl,
};

#[derive(FromArgs)]
/// Fetch weather, forecast and air pollution data and normalize it into tables
struct Args {
    /// transform and load the artifacts listed in this manifest instead of fetching
    #[argh(option)]
    reprocess: Option<PathBuf>,

    /// stop after the transform step
    #[argh(switch)]
    skip_load: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args: Args = argh::from_env();

    if let Some(manifest) = &args.reprocess {
        let load = LoadConfig::from_lookup(|key| std::env::var(key).ok());
        let output = reprocess(manifest)
            .await
            .with_context(|| format!("Reprocessing {} failed", manifest.display()))?;
        if !args.skip_load {
            ensure_dir_exists(&load.tables_path).await?;
            let sink = parquet_sink(&load, &format_run_stamp(Local::now()));
            load_tables(&sink, &output).await?;
        }
        info!("Reprocessing finished");
        return Ok(());
    }

    let config = EtlConfig::from_env().context("Invalid configuration")?;
    let etl = WeatherEtl::new(config).await?;
    let report = etl.run().skip_load(args.skip_load).call().await?;
    for table in report.output.tables() {
        info!("{}: {} rows", table.name(), table.height());
    }
    info!("Manifest for reprocessing: {}", report.manifest_path.display());
    Ok(())
}
