//! I/O modules: raster engine seam, GDAL backend, directory layout and catalog export

pub mod engine;
pub mod gdal_engine;
pub mod layout;
pub mod mapfile;

pub use engine::{OverviewProbe, RasterDataset, RasterEngine};
pub use gdal_engine::{GdalEngine, GdalRaster};
pub use layout::RasterSelector;
pub use mapfile::{CatalogExporter, MapfileExporter};
