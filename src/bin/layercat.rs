use anyhow::Context;
use clap::Parser;
use layercat::{
    CatalogImporter, CatalogParams, GdalEngine, MapfileExporter, ProcessReport, RegionOutcome,
    SpatialReference,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about = "Build dated raster layer catalogs and MapServer mapfiles", long_about = None)]
struct Cli {
    /// Root directory holding one sub-directory per region
    root_dir: PathBuf,

    /// Base WMS URL; each region is published under <BASE_URL>/<region>
    base_url: String,

    /// Destination spatial reference, e.g. "EPSG:4326" or "3857"
    #[arg(long, default_value = "EPSG:4326", value_parser = parse_srs)]
    epsg: SpatialReference,

    /// Title of the published WMS service
    #[arg(long, default_value = "Locust WMS Service")]
    title: String,

    /// Write a JSON summary of every region to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

fn parse_srs(value: &str) -> Result<SpatialReference, String> {
    value.parse().map_err(|e: layercat::CatalogError| e.to_string())
}

/// Fails the run when any region could not be exported
fn check_report(report: &ProcessReport) -> anyhow::Result<()> {
    if report.failed_count() > 0 {
        anyhow::bail!(
            "{} of {} regions failed",
            report.failed_count(),
            report.regions.len()
        );
    }
    Ok(())
}

fn write_report(report: &ProcessReport, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).with_context(|| format!("Failed to write report {}", path.display()))?;
    log::info!("Report written to {}", path.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let params = CatalogParams {
        target: cli.epsg,
        service_title: cli.title,
        ..CatalogParams::default()
    };

    let importer = CatalogImporter::new(
        &cli.root_dir,
        &cli.base_url,
        params,
        GdalEngine::new(),
        MapfileExporter::new(),
    );
    let report = importer.process()?;

    for region in &report.regions {
        match &region.outcome {
            RegionOutcome::Exported { layers, latest_date, output } => log::info!(
                "{}: {} layers, latest {} -> {}",
                region.region,
                layers,
                latest_date,
                output.display()
            ),
            RegionOutcome::Failed { error } => log::error!("{}: {}", region.region, error),
        }
    }

    if let Some(path) = &cli.report {
        write_report(&report, path)?;
    }

    check_report(&report)
}
