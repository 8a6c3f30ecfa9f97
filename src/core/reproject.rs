use crate::io::engine::{RasterDataset, RasterEngine};
use crate::io::layout;
use crate::types::{CatalogError, CatalogResult, SpatialReference};
use std::fs;
use std::path::Path;

/// Output settings for reprojected rasters
#[derive(Debug, Clone)]
pub struct ReprojectionParams {
    /// GDAL driver short name
    pub format: String,
    /// Driver creation options, `KEY=VALUE`
    pub creation_options: Vec<String>,
}

impl Default for ReprojectionParams {
    fn default() -> Self {
        Self {
            format: "GTiff".to_string(),
            creation_options: vec![
                "TILED=YES".to_string(),     // Tiled layout for windowed reads
                "COMPRESS=LZW".to_string(),  // Lossless
            ],
        }
    }
}

/// Brings rasters into the catalog's spatial reference
pub struct ReprojectionDecider {
    params: ReprojectionParams,
}

impl ReprojectionDecider {
    pub fn new(params: ReprojectionParams) -> Self {
        Self { params }
    }

    pub fn standard() -> Self {
        Self::new(ReprojectionParams::default())
    }

    /// Open `path` and return a dataset in `target`.
    ///
    /// A raster already in `target` is returned as opened. Anything else is warped into
    /// `{code}_mapserver_{file_name}` beside the source, replacing the output of any
    /// earlier run.
    pub fn normalize<E: RasterEngine>(
        &self,
        engine: &E,
        path: &Path,
        target: &SpatialReference,
    ) -> CatalogResult<E::Dataset> {
        let dataset = engine.open(path)?;

        let native = dataset
            .spatial_reference()?
            .ok_or_else(|| CatalogError::MissingSpatialReference(path.to_path_buf()))?;

        if native == *target {
            log::debug!("{} already in {}", path.display(), target);
            return Ok(dataset);
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| CatalogError::RasterOpen {
                path: path.to_path_buf(),
                message: "path has no file name".to_string(),
            })?;
        let destination = path.with_file_name(layout::reprojection_artifact_name(target, &file_name));

        // A stale output would keep its old overviews alive
        for stale in [layout::overview_path(&destination), destination.clone()] {
            if stale.exists() {
                log::debug!("Removing previous output {}", stale.display());
                fs::remove_file(&stale)?;
            }
        }

        log::info!(
            "Reprojecting {} from {} to {} -> {}",
            path.display(),
            native,
            target,
            destination.display()
        );

        engine.reproject(&dataset, &destination, target, &self.params)
    }
}
