use crate::core::pyramids::OverviewParams;
use crate::core::reproject::ReprojectionParams;
use crate::types::{CatalogResult, SpatialReference};
use std::path::Path;

/// Read-only view of an opened raster
pub trait RasterDataset {
    /// File the dataset was opened from
    fn path(&self) -> &Path;

    /// Authority and code of the embedded spatial reference, `None` when the raster has none
    fn spatial_reference(&self) -> CatalogResult<Option<SpatialReference>>;

    /// Raw affine coefficients as reported by the raster library
    fn geo_transform(&self) -> CatalogResult<Vec<f64>>;

    /// (width, height) in pixels
    fn raster_size(&self) -> (usize, usize);
}

/// Result of opening an existing overview sidecar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverviewProbe {
    Valid,
    Corrupt(String),
}

/// Raster library capabilities needed by the catalog builder
pub trait RasterEngine {
    type Dataset: RasterDataset;

    /// Open a raster; failures are reported as `CatalogError::RasterOpen`
    fn open(&self, path: &Path) -> CatalogResult<Self::Dataset>;

    /// Warp `source` into `target` and write the result to `destination`
    fn reproject(
        &self,
        source: &Self::Dataset,
        destination: &Path,
        target: &SpatialReference,
        params: &ReprojectionParams,
    ) -> CatalogResult<Self::Dataset>;

    /// Check whether the overview file at `overview_path` is readable
    fn probe_overview(&self, overview_path: &Path) -> OverviewProbe;

    /// Build the external overview pyramid for `dataset`
    fn build_overviews(&self, dataset: &mut Self::Dataset, params: &OverviewParams)
        -> CatalogResult<()>;
}
