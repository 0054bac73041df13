//! Deterministic placeholder temperature fields.
//!
//! Used whenever the vendor decoder is not compiled in: the pipeline
//! still produces a raster, clearly marked as synthetic in its
//! metadata. The field is a pure function of the resolution, with all
//! intermediate math in f64, so repeated runs are bit-identical.

use itertools::iproduct;
use ndarray::Array2;

use crate::error::{ConvertError, Result};
use crate::FloatGrid;

/// Generates the placeholder field for a `width` x `height` sensor.
///
/// A mild gradient from 20°C with two radial hot spots, one at the
/// image center and one offset 100 px up-left of it. Values are not
/// clamped to any device range.
pub fn generate(width: u32, height: u32) -> Result<FloatGrid> {
    if width == 0 || height == 0 {
        return Err(ConvertError::InvalidResolution { width, height });
    }

    let (w, h) = (width as usize, height as usize);
    // integer division, matching the sensor center convention
    let cx = (width / 2) as f64;
    let cy = (height / 2) as f64;

    let mut grid = Array2::<f32>::zeros((h, w));
    for (i, j) in iproduct!(0..h, 0..w) {
        let x = j as f64;
        let y = i as f64;

        let baseline = 20.0 + 20.0 * (y / h as f64) * (x / w as f64);
        let d1 = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
        let d2 = ((x - cx + 100.0).powi(2) + (y - cy + 100.0).powi(2)).sqrt();
        let temp = baseline + 60.0 * (-d1 / 50.0).exp() + 45.0 * (-d2 / 30.0).exp();

        grid[(i, j)] = temp as f32;
    }
    Ok(grid)
}
