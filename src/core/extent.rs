use crate::types::{CatalogResult, Extent, GeoTransform};

/// Compute `[min_x, min_y, max_x, max_y]` for a raster from its affine transform.
///
/// The corners are taken as-is from the transform (no rounding, no reordering), so a
/// degenerate raster yields a degenerate box rather than an error.
pub fn compute_extent(geo_transform: &[f64], width: usize, height: usize) -> CatalogResult<Extent> {
    let gt = GeoTransform::from_coefficients(geo_transform)?;
    let (w, h) = (width as f64, height as f64);

    let min_x = gt.top_left_x;
    let max_y = gt.top_left_y;
    let max_x = gt.top_left_x + gt.pixel_width * w + gt.rotation_x * h;
    let min_y = gt.top_left_y + gt.rotation_y * w + gt.pixel_height * h;

    Ok([min_x, min_y, max_x, max_y])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CatalogError;
    use approx::assert_relative_eq;

    #[test]
    fn test_north_up_extent() {
        let gt = [10.0, 0.01, 0.0, 45.0, 0.0, -0.01];
        let extent = compute_extent(&gt, 200, 100).unwrap();

        assert_relative_eq!(extent[0], 10.0);
        assert_relative_eq!(extent[1], 44.0, epsilon = 1e-12);
        assert_relative_eq!(extent[2], 12.0, epsilon = 1e-12);
        assert_relative_eq!(extent[3], 45.0);
        assert!(extent[0] <= extent[2]);
    }

    #[test]
    fn test_rotation_terms() {
        let gt = [0.0, 2.0, 0.5, 100.0, 0.25, -2.0];
        let extent = compute_extent(&gt, 10, 20).unwrap();

        // max_x = 0 + 2*10 + 0.5*20, min_y = 100 + 0.25*10 - 2*20
        assert_eq!(extent, [0.0, 62.5, 30.0, 100.0]);
    }

    #[test]
    fn test_deterministic() {
        let gt = [-73.123456789, 0.000123, 0.0, 40.987654321, 0.0, -0.000123];
        let first = compute_extent(&gt, 4096, 3072).unwrap();
        let second = compute_extent(&gt, 4096, 3072).unwrap();
        assert_eq!(
            first.map(f64::to_bits),
            second.map(f64::to_bits)
        );
    }

    #[test]
    fn test_degenerate_raster() {
        let gt = [5.0, 1.0, 0.0, 7.0, 0.0, -1.0];
        assert_eq!(compute_extent(&gt, 0, 0).unwrap(), [5.0, 7.0, 5.0, 7.0]);
    }

    #[test]
    fn test_malformed_transform() {
        let result = compute_extent(&[1.0, 2.0, 3.0, 4.0, 5.0], 10, 10);
        assert!(matches!(result, Err(CatalogError::InvalidGeoTransform(5))));

        let result = compute_extent(&[0.0; 7], 10, 10);
        assert!(matches!(result, Err(CatalogError::InvalidGeoTransform(7))));
    }
}
