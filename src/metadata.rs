//! Conversion provenance embedded in output rasters.
//!
//! The whole struct is serialized as JSON into the TIFF ImageDescription
//! tag, so downstream tooling can recover how a raster was produced
//! without re-running the converter.

use chrono::Local;
use serde_derive::*;

use crate::device::DeviceModel;

/// Attached to every synthetic raster so nobody mistakes it for a
/// measurement.
pub const SYNTHETIC_WARNING: &str =
    "simulated temperature field, not real measurements; install the DJI Thermal SDK to decode radiometric data";

/// Where a temperature grid came from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Decoded from the sensor payload by the vendor SDK.
    Hardware,
    /// Deterministic placeholder field.
    Synthetic,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Hardware => write!(f, "hardware"),
            Provenance::Synthetic => write!(f, "synthetic"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConversionMetadata {
    pub original_file: String,
    /// ISO-8601 conversion timestamp.
    pub conversion_time: String,
    /// Source size in bytes.
    pub file_size: u64,
    pub data_source: Provenance,
    pub temperature_unit: String,
    pub detected_width: u32,
    pub detected_height: u32,
    pub device_model: String,
    /// Grid shape as `[height, width]`.
    pub data_shape: (usize, usize),
    pub is_real_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ConversionMetadata {
    /// Builds the metadata record for one conversion.
    ///
    /// `is_real_data` and the synthetic warning are derived from the
    /// provenance here and nowhere else, so the two can never disagree.
    pub fn new(
        original_file: &str,
        file_size: u64,
        data_source: Provenance,
        resolution: (u32, u32),
        model: DeviceModel,
        data_shape: (usize, usize),
    ) -> Self {
        let is_real_data = data_source == Provenance::Hardware;
        ConversionMetadata {
            original_file: original_file.to_owned(),
            conversion_time: Local::now().to_rfc3339(),
            file_size,
            data_source,
            temperature_unit: "Celsius (0.1°C precision)".to_owned(),
            detected_width: resolution.0,
            detected_height: resolution.1,
            device_model: model.to_string(),
            data_shape,
            is_real_data,
            warning: if is_real_data {
                None
            } else {
                Some(SYNTHETIC_WARNING.to_owned())
            },
        }
    }
}
