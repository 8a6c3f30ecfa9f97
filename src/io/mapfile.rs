use crate::types::{CatalogError, CatalogResult, Extent, LayerDescriptor};
use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;

/// Consumer of a finished, tagged region catalog
pub trait CatalogExporter {
    fn export(
        &self,
        catalog: &[LayerDescriptor],
        base_url: &str,
        output_path: &Path,
        title: &str,
    ) -> CatalogResult<()>;
}

/// Writes a MapServer mapfile publishing every layer of a region over WMS
#[derive(Debug, Clone, Default)]
pub struct MapfileExporter;

impl MapfileExporter {
    pub fn new() -> Self {
        Self
    }

    /// Render the mapfile text for `catalog`
    pub fn render(
        &self,
        catalog: &[LayerDescriptor],
        base_url: &str,
        title: &str,
    ) -> Result<String, fmt::Error> {
        let mut out = String::new();
        write_mapfile(&mut out, catalog, base_url, title)?;
        Ok(out)
    }
}

impl CatalogExporter for MapfileExporter {
    fn export(
        &self,
        catalog: &[LayerDescriptor],
        base_url: &str,
        output_path: &Path,
        title: &str,
    ) -> CatalogResult<()> {
        log::info!(
            "Writing mapfile with {} layers: {}",
            catalog.len(),
            output_path.display()
        );

        let text = self
            .render(catalog, base_url, title)
            .map_err(|e| CatalogError::Export {
                path: output_path.to_path_buf(),
                message: e.to_string(),
            })?;

        fs::write(output_path, text).map_err(|e| CatalogError::Export {
            path: output_path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

fn write_mapfile(
    out: &mut String,
    catalog: &[LayerDescriptor],
    base_url: &str,
    title: &str,
) -> fmt::Result {
    let srs = catalog
        .first()
        .map(|layer| layer.spatial_reference.clone())
        .unwrap_or_else(|| "EPSG:4326".to_string());
    let projection = format!("init={}", srs.to_lowercase());

    writeln!(out, "MAP")?;
    writeln!(out, "  NAME {}", quote(title))?;
    writeln!(out, "  STATUS ON")?;
    if let Some(extent) = union_extent(catalog) {
        writeln!(out, "  EXTENT {}", format_extent(&extent))?;
    }
    writeln!(out, "  PROJECTION")?;
    writeln!(out, "    {}", quote(&projection))?;
    writeln!(out, "  END")?;
    writeln!(out, "  WEB")?;
    writeln!(out, "    METADATA")?;
    writeln!(out, "      \"wms_title\" {}", quote(title))?;
    writeln!(out, "      \"wms_onlineresource\" {}", quote(&format!("{}?", base_url)))?;
    writeln!(out, "      \"wms_srs\" {}", quote(&srs))?;
    writeln!(out, "      \"wms_enable_request\" \"*\"")?;
    writeln!(out, "    END")?;
    writeln!(out, "  END")?;

    for layer in catalog {
        let name = layer.display_name();
        writeln!(out, "  LAYER")?;
        writeln!(out, "    NAME {}", quote(&name))?;
        writeln!(out, "    TYPE RASTER")?;
        writeln!(out, "    STATUS ON")?;
        writeln!(out, "    DATA {}", quote(&layer.relative_path.to_string_lossy()))?;
        writeln!(out, "    EXTENT {}", format_extent(&layer.extent))?;
        writeln!(out, "    PROJECTION")?;
        writeln!(out, "      {}", quote(&projection))?;
        writeln!(out, "    END")?;
        writeln!(out, "    METADATA")?;
        writeln!(out, "      \"wms_title\" {}", quote(&name))?;
        writeln!(out, "      \"wms_srs\" {}", quote(&layer.spatial_reference))?;
        writeln!(out, "      \"wms_extent\" {}", quote(&format_extent(&layer.extent)))?;
        writeln!(out, "      \"wms_timeextent\" {}", quote(&layer.iso_date()))?;
        writeln!(
            out,
            "      \"wcs_size\" {}",
            quote(&format!("{} {}", layer.width, layer.height))
        )?;
        writeln!(out, "    END")?;
        writeln!(out, "  END")?;
    }

    writeln!(out, "END")
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn format_extent(extent: &Extent) -> String {
    format!("{} {} {} {}", extent[0], extent[1], extent[2], extent[3])
}

fn union_extent(catalog: &[LayerDescriptor]) -> Option<Extent> {
    catalog.iter().map(|layer| layer.extent).reduce(|acc, e| {
        [
            acc[0].min(e[0]),
            acc[1].min(e[1]),
            acc[2].max(e[2]),
            acc[3].max(e[3]),
        ]
    })
}
