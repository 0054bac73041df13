//! Temperature-grid acquisition.
//!
//! The pipeline is polymorphic over where temperatures come from: the
//! vendor SDK when it is compiled in, or the deterministic synthetic
//! field when it is not. The choice is made once at startup; callers
//! see it only through [`Provenance`] in the output metadata.

use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::metadata::Provenance;
use crate::synthetic;
use crate::FloatGrid;

/// A source of per-pixel temperature grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadiometricSource {
    /// Real measurements decoded by the DJI Thermal SDK.
    #[cfg(feature = "dji")]
    Hardware,
    /// Deterministic placeholder field.
    Synthetic,
}

impl RadiometricSource {
    /// Picks the best available source.
    ///
    /// The hardware decoder is preferred whenever the crate was built
    /// with the `dji` feature; otherwise the vendor library is simply
    /// unavailable and the synthetic fallback is selected. That
    /// condition is logged, not raised: a missing SDK must never stop
    /// the pipeline.
    pub fn select(sdk_path: Option<&Path>) -> Self {
        #[cfg(feature = "dji")]
        {
            if let Some(path) = sdk_path {
                tracing::debug!(
                    path = %path.display(),
                    "vendor SDK is resolved at link time, ignoring --sdk-path"
                );
            }
            tracing::debug!("vendor decoder compiled in, using hardware measurements");
            RadiometricSource::Hardware
        }

        #[cfg(not(feature = "dji"))]
        {
            if let Some(path) = sdk_path {
                tracing::warn!(
                    path = %path.display(),
                    "--sdk-path given but this build has no vendor decoder (enable the `dji` feature)"
                );
            }
            let unavailable =
                ConvertError::VendorUnavailable("built without the `dji` feature".to_owned());
            tracing::warn!(
                error = %unavailable,
                "falling back to synthetic temperature data; output will be marked accordingly"
            );
            RadiometricSource::Synthetic
        }
    }

    pub fn provenance(self) -> Provenance {
        match self {
            #[cfg(feature = "dji")]
            RadiometricSource::Hardware => Provenance::Hardware,
            RadiometricSource::Synthetic => Provenance::Synthetic,
        }
    }

    /// Turns raw source bytes into a temperature grid.
    ///
    /// `resolution` is the detected container resolution; the synthetic
    /// generator shapes its field with it. The hardware decoder trusts
    /// the radiometric payload's own dimensions instead and uses the
    /// hint only for validation.
    pub fn decode(self, bytes: &[u8], resolution: (u32, u32)) -> Result<FloatGrid> {
        if bytes.is_empty() {
            return Err(ConvertError::EmptySource);
        }
        let (width, height) = resolution;
        if width == 0 || height == 0 {
            return Err(ConvertError::InvalidResolution { width, height });
        }

        match self {
            #[cfg(feature = "dji")]
            RadiometricSource::Hardware => crate::dji::RJpeg::try_from_bytes(bytes)?.temperatures(),
            RadiometricSource::Synthetic => synthetic::generate(width, height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_is_rejected() {
        let source = RadiometricSource::Synthetic;
        assert!(matches!(
            source.decode(&[], (640, 512)),
            Err(ConvertError::EmptySource)
        ));
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let source = RadiometricSource::Synthetic;
        assert!(matches!(
            source.decode(b"payload", (0, 512)),
            Err(ConvertError::InvalidResolution { .. })
        ));
    }

    #[test]
    fn synthetic_decode_matches_generator() {
        let source = RadiometricSource::Synthetic;
        let grid = source.decode(b"payload", (64, 48)).unwrap();
        assert_eq!(grid, synthetic::generate(64, 48).unwrap());
    }

    #[cfg(not(feature = "dji"))]
    #[test]
    fn select_without_vendor_is_synthetic() {
        let source = RadiometricSource::select(None);
        assert_eq!(source, RadiometricSource::Synthetic);
        assert_eq!(source.provenance(), Provenance::Synthetic);
    }
}
