//! Directory layout of the imagery tree: `root/region/YYYYMMDD/file`

use crate::types::{CatalogError, CatalogResult, SpatialReference};
use chrono::NaiveDate;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Infix of files written by the reprojection step
pub const REPROJECTION_INFIX: &str = "_mapserver_";

/// Extension of external overview sidecars
pub const OVERVIEW_EXTENSION: &str = "ovr";

fn date_dir_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{8}$").expect("valid date pattern"))
}

fn artifact_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+_mapserver_").expect("valid artifact pattern"))
}

/// Parse a date directory name strictly as `YYYYMMDD`
pub fn parse_date_dir(name: &str) -> CatalogResult<NaiveDate> {
    if !date_dir_pattern().is_match(name) {
        return Err(CatalogError::DateParse(name.to_string()));
    }
    NaiveDate::parse_from_str(name, "%Y%m%d").map_err(|_| CatalogError::DateParse(name.to_string()))
}

/// Name of the reprojected copy of `file_name`, e.g. `4326_mapserver_image_RGB.tif`
pub fn reprojection_artifact_name(target: &SpatialReference, file_name: &str) -> String {
    format!("{}{}{}", target.code, REPROJECTION_INFIX, file_name)
}

/// Whether `file_name` was produced by an earlier reprojection run
pub fn is_reprojection_artifact(file_name: &str) -> bool {
    artifact_pattern().is_match(file_name)
}

/// Sidecar path GDAL uses for external overviews of `base`
pub fn overview_path(base: &Path) -> PathBuf {
    let mut path = base.as_os_str().to_owned();
    path.push(".");
    path.push(OVERVIEW_EXTENSION);
    PathBuf::from(path)
}

/// File base name without extension; everything after the first `.` is dropped
pub fn layer_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match file_name.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => file_name,
    }
}

/// Raster selection rules applied inside a date directory
#[derive(Debug, Clone)]
pub struct RasterSelector {
    /// Case-sensitive substring a raster file name must contain
    pub token: String,
    /// Skip files written by earlier reprojection runs
    pub skip_artifacts: bool,
}

impl Default for RasterSelector {
    fn default() -> Self {
        Self {
            token: "RGB".to_string(),
            skip_artifacts: true,
        }
    }
}

impl RasterSelector {
    pub fn accepts(&self, file_name: &str) -> bool {
        if file_name.ends_with(OVERVIEW_EXTENSION) || !file_name.contains(&self.token) {
            return false;
        }
        !(self.skip_artifacts && is_reprojection_artifact(file_name))
    }
}

/// Sub-directories of `path` as (name, path), sorted by name
pub fn list_directories(path: &Path) -> CatalogResult<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();
        if !entry_path.is_dir() {
            continue;
        }
        dirs.push((entry.file_name().to_string_lossy().into_owned(), entry_path));
    }
    dirs.sort();
    Ok(dirs)
}

/// Dated sub-directories of a region, sorted by name.
///
/// Every directory other than `archive_dir` must be named `YYYYMMDD`; the first
/// one that is not fails the whole listing.
pub fn list_date_directories(
    region_path: &Path,
    archive_dir: &str,
) -> CatalogResult<Vec<(NaiveDate, PathBuf)>> {
    list_directories(region_path)?
        .into_iter()
        .filter(|(name, _)| name != archive_dir)
        .map(|(name, path)| Ok((parse_date_dir(&name)?, path)))
        .collect()
}

/// Raster files of a date directory accepted by `selector`, sorted by name
pub fn list_rasters(date_path: &Path, selector: &RasterSelector) -> CatalogResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(date_path)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if selector.accepts(&name) {
            files.push(path);
        } else {
            log::trace!("Skipping {}", path.display());
        }
    }
    files.sort();
    Ok(files)
}
