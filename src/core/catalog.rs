use crate::core::extent::compute_extent;
use crate::core::pyramids::{OverviewParams, PyramidValidator};
use crate::core::reproject::{ReprojectionDecider, ReprojectionParams};
use crate::io::engine::{RasterDataset, RasterEngine};
use crate::io::layout::{self, RasterSelector};
use crate::types::{CatalogError, CatalogResult, ErrorScope, LayerDescriptor, SpatialReference};
use chrono::NaiveDate;
use std::path::Path;

/// Parameters for catalog building
#[derive(Debug, Clone)]
pub struct CatalogParams {
    /// Spatial reference every catalogued layer is delivered in
    pub target: SpatialReference,
    /// Region sub-directory that is never catalogued
    pub archive_dir: String,
    /// Which files of a date directory are rasters to catalogue
    pub selector: RasterSelector,
    /// Mapfile written into each region root
    pub mapfile_name: String,
    /// Service title handed to the exporter
    pub service_title: String,
    pub reprojection: ReprojectionParams,
    pub overviews: OverviewParams,
}

impl Default for CatalogParams {
    fn default() -> Self {
        Self {
            target: SpatialReference::wgs84(),
            archive_dir: "archive".to_string(),
            selector: RasterSelector::default(),
            mapfile_name: "mapserver.map".to_string(),
            service_title: "Locust WMS Service".to_string(),
            reprojection: ReprojectionParams::default(),
            overviews: OverviewParams::default(),
        }
    }
}

/// Builds the layer list of one region
pub struct CatalogBuilder<'a, E: RasterEngine> {
    engine: &'a E,
    params: CatalogParams,
    reprojector: ReprojectionDecider,
    pyramids: PyramidValidator,
}

impl<'a, E: RasterEngine> CatalogBuilder<'a, E> {
    pub fn new(engine: &'a E, params: CatalogParams) -> Self {
        let reprojector = ReprojectionDecider::new(params.reprojection.clone());
        let pyramids = PyramidValidator::new(params.overviews.clone());
        Self {
            engine,
            params,
            reprojector,
            pyramids,
        }
    }

    pub fn params(&self) -> &CatalogParams {
        &self.params
    }

    /// Catalogue every qualifying raster below `region_path`, in date then name order.
    ///
    /// A file that fails is logged and skipped. A badly named date directory fails the
    /// whole region before any raster is touched.
    pub fn build_region_catalog(&self, region_path: &Path) -> CatalogResult<Vec<LayerDescriptor>> {
        let date_dirs = layout::list_date_directories(region_path, &self.params.archive_dir)?;
        log::info!(
            "Cataloguing {} ({} date directories)",
            region_path.display(),
            date_dirs.len()
        );

        let mut catalog = Vec::new();
        for (date, date_path) in date_dirs {
            for raster_path in layout::list_rasters(&date_path, &self.params.selector)? {
                match self.build_layer(region_path, &raster_path, date) {
                    Ok(layer) => {
                        log::debug!("Catalogued {} ({})", layer.layer_name, layer.iso_date());
                        catalog.push(layer);
                    }
                    Err(e) if e.scope() == ErrorScope::File => {
                        log::warn!("Skipping {}: {}", raster_path.display(), e);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(catalog)
    }

    /// Normalize, pyramid and describe a single raster
    pub fn build_layer(
        &self,
        region_path: &Path,
        raster_path: &Path,
        date: NaiveDate,
    ) -> CatalogResult<LayerDescriptor> {
        let target = &self.params.target;
        let mut dataset = self.reprojector.normalize(self.engine, raster_path, target)?;
        let served_path = dataset.path().to_path_buf();

        let outcome = self.pyramids.ensure_pyramids(self.engine, &mut dataset, &served_path)?;
        log::debug!("Pyramids for {}: {:?}", served_path.display(), outcome);

        let (width, height) = dataset.raster_size();
        let extent = compute_extent(&dataset.geo_transform()?, width, height)?;

        let relative_path = served_path
            .strip_prefix(region_path)
            .map_err(|_| CatalogError::Engine(format!(
                "{} is outside region {}",
                served_path.display(),
                region_path.display()
            )))?
            .to_path_buf();

        Ok(LayerDescriptor {
            relative_path,
            layer_name: layout::layer_name(raster_path),
            spatial_reference: target.to_string(),
            width,
            height,
            extent,
            date,
            is_latest: false,
        })
    }
}
