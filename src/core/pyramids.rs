use crate::io::engine::{OverviewProbe, RasterEngine};
use crate::io::layout;
use crate::types::CatalogResult;
use std::fs;
use std::path::Path;

/// Overview pyramid settings
#[derive(Debug, Clone)]
pub struct OverviewParams {
    /// Value for GDAL's COMPRESS_OVERVIEW option
    pub compression: String,
    /// Resampling algorithm name
    pub resampling: String,
    /// Reduction factors, finest first
    pub factors: Vec<i32>,
}

impl Default for OverviewParams {
    fn default() -> Self {
        Self {
            compression: "DEFLATE".to_string(),
            resampling: "AVERAGE".to_string(),
            factors: vec![2, 4, 8, 16, 32, 64],
        }
    }
}

/// What `ensure_pyramids` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PyramidOutcome {
    /// An overview file was present and readable
    Valid,
    /// No overview file existed; one was built
    Built,
    /// The overview file was unreadable; it was deleted and rebuilt
    Rebuilt { reason: String },
}

/// Keeps an external `.ovr` pyramid next to every catalogued raster
pub struct PyramidValidator {
    params: OverviewParams,
}

impl PyramidValidator {
    pub fn new(params: OverviewParams) -> Self {
        Self { params }
    }

    pub fn standard() -> Self {
        Self::new(OverviewParams::default())
    }

    pub fn params(&self) -> &OverviewParams {
        &self.params
    }

    /// Make sure `base_path.ovr` exists and opens cleanly, rebuilding it from `dataset`
    /// when it is missing or corrupt.
    pub fn ensure_pyramids<E: RasterEngine>(
        &self,
        engine: &E,
        dataset: &mut E::Dataset,
        base_path: &Path,
    ) -> CatalogResult<PyramidOutcome> {
        let overview = layout::overview_path(base_path);

        let mut corrupt_reason = None;
        if overview.is_file() {
            match engine.probe_overview(&overview) {
                OverviewProbe::Valid => {
                    log::debug!("Overviews valid: {}", overview.display());
                    return Ok(PyramidOutcome::Valid);
                }
                OverviewProbe::Corrupt(reason) => {
                    log::warn!("Removing corrupt overviews {}: {}", overview.display(), reason);
                    fs::remove_file(&overview)?;
                    corrupt_reason = Some(reason);
                }
            }
        }

        log::info!("Building pyramids for: {}", base_path.display());
        engine.build_overviews(dataset, &self.params)?;

        Ok(match corrupt_reason {
            Some(reason) => PyramidOutcome::Rebuilt { reason },
            None => PyramidOutcome::Built,
        })
    }
}
