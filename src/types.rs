use chrono::NaiveDate;
use std::path::PathBuf;

/// Bounding box as `[min_x, min_y, max_x, max_y]` in the layer's reference units
pub type Extent = [f64; 4];

/// Marker appended to the display name of layers from the most recent date
pub const LATEST_SUFFIX: &str = "_LATEST";

/// Spatial reference identified by authority and code (e.g. `EPSG:4326`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpatialReference {
    pub authority: String,
    pub code: u32,
}

impl SpatialReference {
    pub fn epsg(code: u32) -> Self {
        Self {
            authority: "EPSG".to_string(),
            code,
        }
    }

    /// WGS 84 geographic coordinates, the default catalog reference
    pub fn wgs84() -> Self {
        Self::epsg(4326)
    }
}

impl Default for SpatialReference {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl std::fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.authority, self.code)
    }
}

impl std::str::FromStr for SpatialReference {
    type Err = CatalogError;

    /// Accepts `EPSG:4326`, `epsg:4326` or a bare `4326`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (authority, code) = match s.split_once(':') {
            Some((authority, code)) => (authority.trim().to_uppercase(), code.trim()),
            None => ("EPSG".to_string(), s),
        };

        if authority.is_empty() {
            return Err(CatalogError::InvalidSpatialReference(s.to_string()));
        }

        let code = code
            .parse::<u32>()
            .map_err(|_| CatalogError::InvalidSpatialReference(s.to_string()))?;

        Ok(Self { authority, code })
    }
}

/// Affine geotransform coefficients, in GDAL order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Build from a raw coefficient slice; anything but 6 values is rejected
    pub fn from_coefficients(coefficients: &[f64]) -> CatalogResult<Self> {
        match coefficients {
            &[top_left_x, pixel_width, rotation_x, top_left_y, rotation_y, pixel_height] => {
                Ok(Self {
                    top_left_x,
                    pixel_width,
                    rotation_x,
                    top_left_y,
                    rotation_y,
                    pixel_height,
                })
            }
            _ => Err(CatalogError::InvalidGeoTransform(coefficients.len())),
        }
    }

    pub fn to_array(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }
}

/// One raster's catalog entry
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDescriptor {
    /// Path of the served raster, relative to the region root
    pub relative_path: PathBuf,
    /// File base name without extension
    pub layer_name: String,
    /// Destination reference, `AUTHORITY:CODE`
    pub spatial_reference: String,
    pub width: usize,
    pub height: usize,
    pub extent: Extent,
    /// Acquisition date taken from the `YYYYMMDD` folder name
    pub date: NaiveDate,
    /// Set by the latest tagger for every layer of the region's most recent date
    pub is_latest: bool,
}

impl LayerDescriptor {
    /// ISO 8601 calendar date, `YYYY-MM-DD`
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Layer name as published to the map service
    pub fn display_name(&self) -> String {
        if self.is_latest {
            format!("{}{}", self.layer_name, LATEST_SUFFIX)
        } else {
            self.layer_name.clone()
        }
    }

    pub fn with_latest(self, is_latest: bool) -> Self {
        Self { is_latest, ..self }
    }
}

/// Where an error stops processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    /// The current file is skipped, the region continues
    File,
    /// The current region is abandoned, sibling regions continue
    Region,
}

/// Error types for catalog building
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("Cannot open raster {}: {message}", .path.display())]
    RasterOpen { path: PathBuf, message: String },

    #[error("Raster {} has no authority code in its spatial reference", .0.display())]
    MissingSpatialReference(PathBuf),

    #[error("Invalid geotransform: expected 6 coefficients, got {0}")]
    InvalidGeoTransform(usize),

    #[error("Reprojection of {} failed: {message}", .path.display())]
    Reprojection { path: PathBuf, message: String },

    #[error("Overview build for {} failed: {message}", .path.display())]
    Overview { path: PathBuf, message: String },

    #[error("Raster engine error: {0}")]
    Engine(String),

    #[error("Date directory name '{0}' is not a YYYYMMDD date")]
    DateParse(String),

    #[error("Catalog is empty: no layers were produced")]
    EmptyCatalog,

    #[error("Catalog export to {} failed: {message}", .path.display())]
    Export { path: PathBuf, message: String },

    #[error("Invalid spatial reference: '{0}'")]
    InvalidSpatialReference(String),
}

impl CatalogError {
    pub fn scope(&self) -> ErrorScope {
        match self {
            CatalogError::DateParse(_)
            | CatalogError::EmptyCatalog
            | CatalogError::Export { .. }
            | CatalogError::InvalidSpatialReference(_) => ErrorScope::Region,
            _ => ErrorScope::File,
        }
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
