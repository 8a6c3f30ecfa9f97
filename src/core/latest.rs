use crate::types::{CatalogError, CatalogResult, LayerDescriptor};

/// Order a region catalog newest first and flag the layers of the most recent date.
///
/// The sort is stable, so layers sharing a date keep their build order. Only the
/// leading run of entries carrying the first entry's date is flagged.
pub fn tag_latest(mut catalog: Vec<LayerDescriptor>) -> CatalogResult<Vec<LayerDescriptor>> {
    catalog.sort_by(|a, b| b.date.cmp(&a.date));

    let latest = catalog.first().ok_or(CatalogError::EmptyCatalog)?.date;

    let mut in_latest_run = true;
    Ok(catalog
        .into_iter()
        .map(|layer| {
            in_latest_run &= layer.date == latest;
            layer.with_latest(in_latest_run)
        })
        .collect())
}
