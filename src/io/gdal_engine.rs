use crate::core::pyramids::OverviewParams;
use crate::core::reproject::ReprojectionParams;
use crate::io::engine::{OverviewProbe, RasterDataset, RasterEngine};
use crate::types::{CatalogError, CatalogResult, SpatialReference};
use gdal::Dataset;
use gdal_sys::{CPLErr, CPLErrorNum};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_void};
use std::path::{Path, PathBuf};

/// GDAL dataset together with the path it was opened from
pub struct GdalRaster {
    path: PathBuf,
    dataset: Dataset,
}

impl GdalRaster {
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

impl RasterDataset for GdalRaster {
    fn path(&self) -> &Path {
        &self.path
    }

    fn spatial_reference(&self) -> CatalogResult<Option<SpatialReference>> {
        let srs = match self.dataset.spatial_ref() {
            Ok(srs) => srs,
            Err(e) => {
                log::debug!("No spatial reference in {}: {}", self.path.display(), e);
                return Ok(None);
            }
        };

        match (srs.auth_name(), srs.auth_code()) {
            (Ok(authority), Ok(code)) => Ok(u32::try_from(code).ok().map(|code| SpatialReference {
                authority: authority.to_uppercase(),
                code,
            })),
            (Err(e), _) | (_, Err(e)) => {
                log::debug!("No authority code in {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    fn geo_transform(&self) -> CatalogResult<Vec<f64>> {
        Ok(self.dataset.geo_transform()?.to_vec())
    }

    fn raster_size(&self) -> (usize, usize) {
        self.dataset.raster_size()
    }
}

/// Raster engine backed by the GDAL library
#[derive(Debug, Default)]
pub struct GdalEngine;

impl GdalEngine {
    pub fn new() -> Self {
        Self
    }
}

impl RasterEngine for GdalEngine {
    type Dataset = GdalRaster;

    fn open(&self, path: &Path) -> CatalogResult<GdalRaster> {
        let dataset = Dataset::open(path).map_err(|e| CatalogError::RasterOpen {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(GdalRaster {
            path: path.to_path_buf(),
            dataset,
        })
    }

    fn reproject(
        &self,
        source: &GdalRaster,
        destination: &Path,
        target: &SpatialReference,
        params: &ReprojectionParams,
    ) -> CatalogResult<GdalRaster> {
        let mut args = vec!["-of".to_string(), params.format.clone()];
        for option in &params.creation_options {
            args.push("-co".to_string());
            args.push(option.clone());
        }
        args.push("-t_srs".to_string());
        args.push(target.to_string());

        log::debug!("gdalwarp {} -> {}", args.join(" "), destination.display());

        warp(&source.dataset, destination, &args).map_err(|message| {
            CatalogError::Reprojection {
                path: source.path.clone(),
                message,
            }
        })?;

        self.open(destination)
    }

    fn probe_overview(&self, overview_path: &Path) -> OverviewProbe {
        let capture = ErrorCapture::install();
        let opened = Dataset::open(overview_path);
        let captured = capture.take();
        drop(capture);

        match opened {
            Err(e) => OverviewProbe::Corrupt(e.to_string()),
            Ok(_) => match captured.into_iter().next() {
                Some(message) => OverviewProbe::Corrupt(message),
                None => OverviewProbe::Valid,
            },
        }
    }

    fn build_overviews(&self, raster: &mut GdalRaster, params: &OverviewParams) -> CatalogResult<()> {
        gdal::config::set_config_option("COMPRESS_OVERVIEW", &params.compression)?;

        raster
            .dataset
            .build_overviews(&params.resampling, &params.factors, &[])
            .map_err(|e| CatalogError::Overview {
                path: raster.path.clone(),
                message: e.to_string(),
            })
    }
}

/// Collects GDAL failures raised on this thread while it is alive.
///
/// The handler goes on GDAL's thread-local handler stack and is popped on drop, so
/// whatever handler was active before is back in place afterwards.
struct ErrorCapture {
    errors: *mut Vec<String>,
}

impl ErrorCapture {
    fn install() -> Self {
        let errors = Box::into_raw(Box::<Vec<String>>::default());
        unsafe {
            gdal_sys::CPLPushErrorHandlerEx(Some(capture_handler), errors as *mut c_void);
        }
        Self { errors }
    }

    fn take(&self) -> Vec<String> {
        unsafe { std::mem::take(&mut *self.errors) }
    }
}

impl Drop for ErrorCapture {
    fn drop(&mut self) {
        unsafe {
            gdal_sys::CPLPopErrorHandler();
            drop(Box::from_raw(self.errors));
        }
    }
}

/// Only failures count; warnings and debug output are ignored
unsafe extern "C" fn capture_handler(class: CPLErr::Type, code: CPLErrorNum, message: *const c_char) {
    if class != CPLErr::CE_Failure && class != CPLErr::CE_Fatal {
        return;
    }
    let errors = gdal_sys::CPLGetErrorHandlerUserData() as *mut Vec<String>;
    if errors.is_null() {
        return;
    }
    let message = if message.is_null() {
        String::new()
    } else {
        CStr::from_ptr(message).to_string_lossy().into_owned()
    };
    (*errors).push(format!("GDAL Error {}: {}", code, message));
}

/// Run GDALWarp on a single source dataset; the safe bindings do not wrap it
fn warp(source: &Dataset, destination: &Path, args: &[String]) -> Result<(), String> {
    let c_destination = CString::new(destination.to_string_lossy().as_bytes())
        .map_err(|e| format!("Invalid destination path: {}", e))?;
    let c_args = args
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("Invalid warp option: {}", e))?;

    let mut argv: Vec<*mut c_char> = c_args.iter().map(|arg| arg.as_ptr() as *mut c_char).collect();
    argv.push(std::ptr::null_mut());

    unsafe {
        let options = gdal_sys::GDALWarpAppOptionsNew(argv.as_mut_ptr(), std::ptr::null_mut());
        if options.is_null() {
            return Err(format!("GDAL rejected warp options: {}", last_error_message()));
        }

        let mut sources = [source.c_dataset()];
        let mut usage_error: c_int = 0;
        let output = gdal_sys::GDALWarp(
            c_destination.as_ptr(),
            std::ptr::null_mut(),
            1,
            sources.as_mut_ptr(),
            options,
            &mut usage_error,
        );
        gdal_sys::GDALWarpAppOptionsFree(options);

        if output.is_null() {
            return Err(last_error_message());
        }
        gdal_sys::GDALClose(output);
    }

    Ok(())
}

fn last_error_message() -> String {
    unsafe {
        let message = gdal_sys::CPLGetLastErrorMsg();
        if message.is_null() {
            return "unknown GDAL error".to_string();
        }
        CStr::from_ptr(message).to_string_lossy().into_owned()
    }
}
