#![allow(dead_code)]

//! File-backed stand-ins for the raster engine and the exporter.
//!
//! A fake raster is a small text file:
//!
//! ```text
//! epsg=32633
//! size=200x100
//! gt=10,0.5,0,50,0,-0.5
//! ```

use layercat::io::layout;
use layercat::{
    CatalogError, CatalogExporter, CatalogResult, LayerDescriptor, OverviewParams, OverviewProbe,
    RasterDataset, RasterEngine, ReprojectionParams, SpatialReference,
};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

pub const OVERVIEW_MARK: &str = "fake overview";

pub const NORTH_UP: [f64; 6] = [10.0, 0.5, 0.0, 50.0, 0.0, -0.5];

/// Write a fake raster; `epsg: None` leaves out the spatial reference
pub fn write_raster(path: &Path, epsg: Option<u32>, size: (usize, usize), gt: &[f64]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut text = String::new();
    if let Some(code) = epsg {
        text.push_str(&format!("epsg={}\n", code));
    }
    text.push_str(&format!("size={}x{}\n", size.0, size.1));
    let coefficients: Vec<String> = gt.iter().map(|v| v.to_string()).collect();
    text.push_str(&format!("gt={}\n", coefficients.join(",")));
    fs::write(path, text).unwrap();
}

pub fn write_wgs84_raster(path: &Path) {
    write_raster(path, Some(4326), (20, 10), &NORTH_UP);
}

/// Sorted file names in `dir`
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[derive(Debug, Clone)]
pub struct FakeRaster {
    path: PathBuf,
    epsg: Option<u32>,
    size: (usize, usize),
    gt: Vec<f64>,
}

impl RasterDataset for FakeRaster {
    fn path(&self) -> &Path {
        &self.path
    }

    fn spatial_reference(&self) -> CatalogResult<Option<SpatialReference>> {
        Ok(self.epsg.map(SpatialReference::epsg))
    }

    fn geo_transform(&self) -> CatalogResult<Vec<f64>> {
        Ok(self.gt.clone())
    }

    fn raster_size(&self) -> (usize, usize) {
        self.size
    }
}

/// Records every engine call so tests can assert what was touched
#[derive(Debug, Default)]
pub struct FakeEngine {
    pub opened: RefCell<Vec<PathBuf>>,
    pub reprojected: RefCell<Vec<(PathBuf, PathBuf)>>,
    pub probed: RefCell<Vec<PathBuf>>,
    pub overview_builds: RefCell<Vec<PathBuf>>,
}

impl FakeEngine {
    fn parse(path: &Path, text: &str) -> Option<FakeRaster> {
        let mut epsg = None;
        let mut size = None;
        let mut gt = None;
        for line in text.lines() {
            let (key, value) = line.split_once('=')?;
            match key {
                "epsg" => epsg = Some(value.parse().ok()?),
                "size" => {
                    let (w, h) = value.split_once('x')?;
                    size = Some((w.parse().ok()?, h.parse().ok()?));
                }
                "gt" => {
                    gt = Some(
                        value
                            .split(',')
                            .map(|v| v.parse::<f64>().ok())
                            .collect::<Option<Vec<f64>>>()?,
                    );
                }
                _ => return None,
            }
        }
        Some(FakeRaster {
            path: path.to_path_buf(),
            epsg,
            size: size?,
            gt: gt?,
        })
    }
}

impl RasterEngine for FakeEngine {
    type Dataset = FakeRaster;

    fn open(&self, path: &Path) -> CatalogResult<FakeRaster> {
        self.opened.borrow_mut().push(path.to_path_buf());
        let text = fs::read_to_string(path).map_err(|e| CatalogError::RasterOpen {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(path, &text).ok_or_else(|| CatalogError::RasterOpen {
            path: path.to_path_buf(),
            message: "not recognized as a supported file format".to_string(),
        })
    }

    fn reproject(
        &self,
        source: &FakeRaster,
        destination: &Path,
        target: &SpatialReference,
        _params: &ReprojectionParams,
    ) -> CatalogResult<FakeRaster> {
        self.reprojected
            .borrow_mut()
            .push((source.path.clone(), destination.to_path_buf()));
        write_raster(destination, Some(target.code), source.size, &source.gt);
        Ok(FakeRaster {
            path: destination.to_path_buf(),
            epsg: Some(target.code),
            size: source.size,
            gt: source.gt.clone(),
        })
    }

    fn probe_overview(&self, overview_path: &Path) -> OverviewProbe {
        self.probed.borrow_mut().push(overview_path.to_path_buf());
        match fs::read_to_string(overview_path) {
            Ok(text) if text == OVERVIEW_MARK => OverviewProbe::Valid,
            Ok(_) => OverviewProbe::Corrupt("GDAL Error 4: not a TIFF file".to_string()),
            Err(e) => OverviewProbe::Corrupt(e.to_string()),
        }
    }

    fn build_overviews(&self, dataset: &mut FakeRaster, params: &OverviewParams) -> CatalogResult<()> {
        assert_eq!(params.factors, vec![2, 4, 8, 16, 32, 64]);
        self.overview_builds.borrow_mut().push(dataset.path.clone());
        fs::write(layout::overview_path(&dataset.path), OVERVIEW_MARK)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Export {
    pub catalog: Vec<LayerDescriptor>,
    pub base_url: String,
    pub output: PathBuf,
    pub title: String,
}

/// Keeps every exported catalog in memory
#[derive(Debug, Default)]
pub struct RecordingExporter {
    pub exports: RefCell<Vec<Export>>,
}

impl RecordingExporter {
    pub fn catalog_for(&self, region: &str) -> Option<Vec<LayerDescriptor>> {
        self.exports
            .borrow()
            .iter()
            .find(|e| e.base_url.ends_with(&format!("/{}", region)))
            .map(|e| e.catalog.clone())
    }
}

impl CatalogExporter for RecordingExporter {
    fn export(
        &self,
        catalog: &[LayerDescriptor],
        base_url: &str,
        output_path: &Path,
        title: &str,
    ) -> CatalogResult<()> {
        self.exports.borrow_mut().push(Export {
            catalog: catalog.to_vec(),
            base_url: base_url.to_string(),
            output: output_path.to_path_buf(),
            title: title.to_string(),
        });
        Ok(())
    }
}
