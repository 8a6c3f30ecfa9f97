//! Core catalog building modules

pub mod extent;
pub mod reproject;
pub mod pyramids;
pub mod catalog;
pub mod latest;
pub mod importer;

// Re-export main types
pub use extent::compute_extent;
pub use reproject::{ReprojectionDecider, ReprojectionParams};
pub use pyramids::{PyramidValidator, OverviewParams, PyramidOutcome};
pub use catalog::{CatalogBuilder, CatalogParams};
pub use latest::tag_latest;
pub use importer::{CatalogImporter, ProcessReport, RegionOutcome, RegionReport};
