//! Best-effort pixel-dimension probe.

use std::path::Path;

use tracing::{debug, warn};

use crate::device::DeviceModel;

/// Reads the container's pixel dimensions, `(width, height)`.
///
/// Only the image header is inspected; pixel content is never decoded
/// here. Detection is best-effort: on any I/O or decode failure the
/// `fallback` model's native resolution is returned so the pipeline
/// can keep going.
pub fn detect(path: &Path, fallback: DeviceModel) -> (u32, u32) {
    match image::image_dimensions(path) {
        Ok((width, height)) => {
            debug!(path = %path.display(), width, height, "detected source resolution");
            (width, height)
        }
        Err(err) => {
            let resolution = fallback.resolution();
            warn!(
                path = %path.display(),
                error = %err,
                fallback = %fallback,
                "could not detect resolution, using model default"
            );
            resolution
        }
    }
}
