use crate::core::catalog::{CatalogBuilder, CatalogParams};
use crate::core::latest::tag_latest;
use crate::io::engine::RasterEngine;
use crate::io::layout;
use crate::io::mapfile::CatalogExporter;
use crate::types::CatalogResult;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// How one region ended
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RegionOutcome {
    Exported {
        layers: usize,
        latest_date: NaiveDate,
        output: PathBuf,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionReport {
    pub region: String,
    pub outcome: RegionOutcome,
}

/// Summary of a `process()` run, one entry per region in processing order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessReport {
    pub regions: Vec<RegionReport>,
}

impl ProcessReport {
    pub fn exported_count(&self) -> usize {
        self.regions
            .iter()
            .filter(|r| matches!(r.outcome, RegionOutcome::Exported { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.regions.len() - self.exported_count()
    }

    pub fn region(&self, name: &str) -> Option<&RegionOutcome> {
        self.regions.iter().find(|r| r.region == name).map(|r| &r.outcome)
    }
}

/// Walks `root/region/date/file`, building and exporting one catalog per region
pub struct CatalogImporter<E: RasterEngine, X: CatalogExporter> {
    root: PathBuf,
    base_url: String,
    params: CatalogParams,
    engine: E,
    exporter: X,
}

impl<E: RasterEngine, X: CatalogExporter> CatalogImporter<E, X> {
    /// `base_url` is the service root; each region is published under `base_url + region`
    pub fn new<P: AsRef<Path>>(
        root: P,
        base_url: &str,
        params: CatalogParams,
        engine: E,
        exporter: X,
    ) -> Self {
        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Self {
            root: root.as_ref().to_path_buf(),
            base_url,
            params,
            engine,
            exporter,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn exporter(&self) -> &X {
        &self.exporter
    }

    /// Process every region under the root.
    ///
    /// Only an unreadable root is an error; a failing region is logged, recorded in the
    /// report and the next region is attempted.
    pub fn process(&self) -> CatalogResult<ProcessReport> {
        log::info!(
            "Importing regions from {} into {}",
            self.root.display(),
            self.params.target
        );

        let builder = CatalogBuilder::new(&self.engine, self.params.clone());
        let mut report = ProcessReport::default();

        for (region, region_path) in layout::list_directories(&self.root)? {
            let outcome = match self.process_region(&builder, &region, &region_path) {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::error!("Region {} failed: {}", region, e);
                    RegionOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            report.regions.push(RegionReport { region, outcome });
        }

        log::info!(
            "Processed {} regions: {} exported, {} failed",
            report.regions.len(),
            report.exported_count(),
            report.failed_count()
        );
        Ok(report)
    }

    fn process_region(
        &self,
        builder: &CatalogBuilder<'_, E>,
        region: &str,
        region_path: &Path,
    ) -> CatalogResult<RegionOutcome> {
        let catalog = tag_latest(builder.build_region_catalog(region_path)?)?;
        let latest_date = catalog[0].date;

        let output = region_path.join(&self.params.mapfile_name);
        let url = format!("{}{}", self.base_url, region);
        self.exporter
            .export(&catalog, &url, &output, &self.params.service_title)?;

        log::info!(
            "Region {}: {} layers, latest {}",
            region,
            catalog.len(),
            latest_date
        );

        Ok(RegionOutcome::Exported {
            layers: catalog.len(),
            latest_date,
            output,
        })
    }
}
