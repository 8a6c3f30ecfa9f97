//! layercat: raster layer catalogs for map services
//!
//! Walks an imagery tree laid out as `root/region/YYYYMMDD/file`, brings every selected
//! raster into a common spatial reference, keeps overview pyramids in shape, computes
//! layer extents and hands a dated, latest-tagged catalog per region to an exporter
//! (a MapServer mapfile by default).

pub mod types;
pub mod io;
pub mod core;

// Re-export main types and functions for easier access
pub use crate::types::{
    CatalogError, CatalogResult, ErrorScope, Extent, GeoTransform, LayerDescriptor,
    SpatialReference, LATEST_SUFFIX,
};

pub use crate::core::{
    compute_extent, tag_latest, CatalogBuilder, CatalogImporter, CatalogParams, OverviewParams,
    ProcessReport, PyramidOutcome, PyramidValidator, RegionOutcome, ReprojectionDecider,
    ReprojectionParams,
};

pub use crate::io::{
    CatalogExporter, GdalEngine, MapfileExporter, OverviewProbe, RasterDataset, RasterEngine,
    RasterSelector,
};
