//! Convert radiometric R-JPEGs from DJI thermal drone payloads into
//! calibrated temperature rasters.
//!
//! The pipeline for one file is detect -> acquire -> encode:
//!
//! 1. [`resolution::detect`] reads the container's pixel dimensions,
//! falling back to the [device model's](device::DeviceModel) native
//! resolution when the container is unreadable.
//! 2. A [`RadiometricSource`] turns the raw bytes into a grid of
//! per-pixel temperatures in °C. With the `dji` feature this goes
//! through the vendor SDK bindings; without it, a deterministic
//! [`synthetic`] field stands in and the output is marked as such.
//! 3. [`encode`] persists the grid as a single-channel 16-bit TIFF,
//! one count per 0.1°C, with the conversion metadata embedded in the
//! ImageDescription tag.
//!
//! [`batch::run_batch`] applies the same job across a directory tree
//! under bounded concurrency, isolating per-file failures.
//!
//! # Usage
//!
//! ```rust
//! # fn demo() -> anyhow::Result<()> {
//! use std::path::Path;
//! use thermal_raster::{ConversionJob, DeviceModel, RadiometricSource, TiffCompression};
//!
//! let source = RadiometricSource::select(None);
//! let job = ConversionJob::new(source, DeviceModel::M30T, TiffCompression::Lzw);
//! let metadata = job.run(Path::new("DJI_0001_T.jpg"), Path::new("DJI_0001_T.tiff"))?;
//! println!("real data: {}", metadata.is_real_data);
//! # Ok(())
//! # }
//! ```

pub mod cli;

pub mod batch;
pub mod device;
#[cfg(feature = "dji")]
pub mod dji;
pub mod encode;
pub mod error;
pub mod job;
pub mod logger;
pub mod metadata;
pub mod resolution;
pub mod source;
pub mod synthetic;

pub use crate::device::DeviceModel;
pub use crate::encode::TiffCompression;
pub use crate::error::{ConvertError, JobError, JobStage, Result};
pub use crate::job::ConversionJob;
pub use crate::metadata::{ConversionMetadata, Provenance};
pub use crate::source::RadiometricSource;

/// Row-major grid of per-pixel temperatures in °C, shape `(height, width)`.
pub type FloatGrid = ndarray::Array2<f32>;
