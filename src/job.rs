//! End-to-end single-file conversion.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::device::DeviceModel;
use crate::encode::{self, TiffCompression};
use crate::error::{JobError, JobStage};
use crate::metadata::ConversionMetadata;
use crate::resolution;
use crate::source::RadiometricSource;

/// One radiometric image in, one temperature raster out.
///
/// The job is the unit of isolation in a batch run: any stage failure
/// aborts this file only, tagged with the stage it came from.
#[derive(Debug, Clone, Copy)]
pub struct ConversionJob {
    pub source: RadiometricSource,
    pub model: DeviceModel,
    pub compression: TiffCompression,
}

impl ConversionJob {
    pub fn new(source: RadiometricSource, model: DeviceModel, compression: TiffCompression) -> Self {
        ConversionJob {
            source,
            model,
            compression,
        }
    }

    /// Runs detect -> read -> decode -> encode for a single file.
    pub fn run(&self, input: &Path, output: &Path) -> Result<ConversionMetadata, JobError> {
        let resolution = resolution::detect(input, self.model);

        let bytes = fs::read(input)
            .map_err(Into::into)
            .map_err(JobError::at(JobStage::Read, input))?;
        info!(
            path = %input.display(),
            size = bytes.len(),
            width = resolution.0,
            height = resolution.1,
            "read radiometric source"
        );

        let grid = self
            .source
            .decode(&bytes, resolution)
            .map_err(JobError::at(JobStage::Decode, input))?;

        let original_file = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());
        let metadata = ConversionMetadata::new(
            &original_file,
            bytes.len() as u64,
            self.source.provenance(),
            resolution,
            self.model,
            grid.dim(),
        );

        encode::encode(&grid, &metadata, output, self.compression)
            .map_err(JobError::at(JobStage::Encode, input))?;

        let (min, max) = grid
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &t| {
                (min.min(t), max.max(t))
            });
        let spec = self.model.spec();
        if !spec.temperature_in_range(f64::from(min)) || !spec.temperature_in_range(f64::from(max)) {
            warn!(
                model = %self.model,
                min_c = f64::from(min),
                max_c = f64::from(max),
                "temperatures fall outside the device's measurable range"
            );
        }
        info!(
            output = %output.display(),
            min_c = f64::from(min),
            max_c = f64::from(max),
            source = %metadata.data_source,
            "conversion complete"
        );

        Ok(metadata)
    }
}
