//! Writes temperature grids as tagged 16-bit TIFF rasters.
//!
//! Temperatures are stored as signed 16-bit fixed point, scaled by 10
//! to keep 0.1°C precision. The conversion metadata rides along in the
//! ImageDescription tag as JSON.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use std::str::FromStr;

use chrono::Local;
use tiff::encoder::{colortype, compression::DeflateLevel, Compression, TiffEncoder};
use tiff::tags::Tag;
use tracing::debug;

use crate::error::{ConvertError, Result};
use crate::metadata::ConversionMetadata;
use crate::FloatGrid;

/// Software tag written into every output raster.
pub const SOFTWARE: &str = concat!("thermal-raster v", env!("CARGO_PKG_VERSION"));

/// DocumentName tag identifying the source format.
pub const DOCUMENT_NAME: &str = "DJI R-JPEG Temperature Data";

/// Fixed-point multiplier: one count per 0.1°C.
pub const TEMPERATURE_SCALE: f64 = 10.0;

// DocumentName (269) is not in the tiff crate's tag enum
const TAG_DOCUMENT_NAME: Tag = Tag::Unknown(269);

/// TIFF compression choices exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    Lzw,
    Zip,
    None,
}

impl TiffCompression {
    fn to_tiff(self) -> Compression {
        match self {
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::Zip => Compression::Deflate(DeflateLevel::Balanced),
            TiffCompression::None => Compression::Uncompressed,
        }
    }
}

impl FromStr for TiffCompression {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lzw" => Ok(TiffCompression::Lzw),
            "zip" => Ok(TiffCompression::Zip),
            "none" => Ok(TiffCompression::None),
            _ => Err(ConvertError::UnsupportedCompression(s.to_owned())),
        }
    }
}

/// Scales one temperature to its fixed-point raster value.
pub fn scale_temperature(temperature: f32) -> Result<i16> {
    let scaled = (f64::from(temperature) * TEMPERATURE_SCALE).round();
    if !scaled.is_finite() || scaled < f64::from(i16::MIN) || scaled > f64::from(i16::MAX) {
        return Err(ConvertError::PrecisionOverflow(f64::from(temperature)));
    }
    Ok(scaled as i16)
}

/// Persists `grid` at `out_path` as a single-channel 16-bit TIFF.
///
/// The whole grid is scaled before anything touches the filesystem, so
/// a [`ConvertError::PrecisionOverflow`] writes no file at all. The
/// raster itself goes to a `.part` sibling first and is renamed into
/// place, so a failed write never leaves a partial file at the final
/// path. Parent directories are created as needed.
pub fn encode(
    grid: &FloatGrid,
    metadata: &ConversionMetadata,
    out_path: &Path,
    compression: TiffCompression,
) -> Result<()> {
    let (height, width) = grid.dim();
    if width == 0 || height == 0 {
        return Err(ConvertError::InvalidResolution {
            width: width as u32,
            height: height as u32,
        });
    }

    let mut samples = Vec::with_capacity(width * height);
    for &temperature in grid.iter() {
        samples.push(scale_temperature(temperature)?);
    }

    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| write_failed(out_path, e))?;
        }
    }

    let part_path = out_path.with_extension("tiff.part");
    let written = write_tiff(
        &part_path,
        width as u32,
        height as u32,
        &samples,
        metadata,
        compression,
    );
    if let Err(reason) = written {
        let _ = fs::remove_file(&part_path);
        return Err(ConvertError::WriteFailed {
            path: out_path.to_path_buf(),
            reason,
        });
    }

    if let Err(e) = fs::rename(&part_path, out_path) {
        let _ = fs::remove_file(&part_path);
        return Err(write_failed(out_path, e));
    }

    debug!(path = %out_path.display(), width, height, "wrote temperature raster");
    Ok(())
}

fn write_failed(path: &Path, err: std::io::Error) -> ConvertError {
    ConvertError::WriteFailed {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

fn write_tiff(
    path: &Path,
    width: u32,
    height: u32,
    samples: &[i16],
    metadata: &ConversionMetadata,
    compression: TiffCompression,
) -> std::result::Result<(), String> {
    let description = serde_json::to_string(metadata).map_err(|e| e.to_string())?;
    let datetime = Local::now().format("%Y:%m:%d %H:%M:%S").to_string();

    let file = File::create(path).map_err(|e| e.to_string())?;
    let mut tiff = TiffEncoder::new(BufWriter::new(file))
        .map_err(|e| e.to_string())?
        .with_compression(compression.to_tiff());

    let mut image = tiff
        .new_image::<colortype::GrayI16>(width, height)
        .map_err(|e| e.to_string())?;
    image
        .encoder()
        .write_tag(Tag::ImageDescription, description.as_str())
        .map_err(|e| e.to_string())?;
    image
        .encoder()
        .write_tag(Tag::Software, SOFTWARE)
        .map_err(|e| e.to_string())?;
    image
        .encoder()
        .write_tag(Tag::DateTime, datetime.as_str())
        .map_err(|e| e.to_string())?;
    image
        .encoder()
        .write_tag(TAG_DOCUMENT_NAME, DOCUMENT_NAME)
        .map_err(|e| e.to_string())?;
    image.write_data(samples).map_err(|e| e.to_string())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceModel;
    use crate::metadata::Provenance;
    use ndarray::Array2;
    use tiff::decoder::{Decoder, DecodingResult};
    use tiff::tags::Tag;

    fn metadata_for(grid: &FloatGrid) -> ConversionMetadata {
        let (height, width) = grid.dim();
        ConversionMetadata::new(
            "DJI_0001_T.jpg",
            150_000,
            Provenance::Synthetic,
            (width as u32, height as u32),
            DeviceModel::M30T,
            (height, width),
        )
    }

    fn decode_samples(path: &Path) -> (u32, u32, Vec<i16>) {
        let mut decoder = Decoder::new(std::fs::File::open(path).unwrap()).unwrap();
        let (width, height) = decoder.dimensions().unwrap();
        match decoder.read_image().unwrap() {
            DecodingResult::I16(values) => (width, height, values),
            other => panic!("unexpected sample format: {:?}", other),
        }
    }

    #[test]
    fn compression_names_parse() {
        assert_eq!("lzw".parse::<TiffCompression>().unwrap(), TiffCompression::Lzw);
        assert_eq!("ZIP".parse::<TiffCompression>().unwrap(), TiffCompression::Zip);
        assert_eq!("none".parse::<TiffCompression>().unwrap(), TiffCompression::None);
        assert!(matches!(
            "fast".parse::<TiffCompression>(),
            Err(ConvertError::UnsupportedCompression(c)) if c == "fast"
        ));
    }

    #[test]
    fn scaling_keeps_tenth_degree_precision() {
        assert_eq!(scale_temperature(25.5).unwrap(), 255);
        assert_eq!(scale_temperature(-20.0).unwrap(), -200);
        assert_eq!(scale_temperature(0.04).unwrap(), 0);
        assert_eq!(scale_temperature(399.96).unwrap(), 4000);
    }

    #[test]
    fn scaling_rejects_out_of_range_and_non_finite() {
        assert!(matches!(
            scale_temperature(4000.0),
            Err(ConvertError::PrecisionOverflow(_))
        ));
        assert!(matches!(
            scale_temperature(-4000.0),
            Err(ConvertError::PrecisionOverflow(_))
        ));
        assert!(matches!(
            scale_temperature(f32::NAN),
            Err(ConvertError::PrecisionOverflow(_))
        ));
    }

    #[test]
    fn round_trip_recovers_temperatures_within_precision() {
        let temps = [-20.0f32, -0.05, 0.0, 25.53, 99.99, 399.9, 1599.9, -10.01];
        let grid = Array2::from_shape_vec((2, 4), temps.to_vec()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("roundtrip.tiff");

        encode(&grid, &metadata_for(&grid), &out, TiffCompression::None).unwrap();

        let (width, height, samples) = decode_samples(&out);
        assert_eq!((width, height), (4, 2));
        for (sample, expected) in samples.iter().zip(temps.iter()) {
            let recovered = f64::from(*sample) / TEMPERATURE_SCALE;
            assert!(
                (recovered - f64::from(*expected)).abs() <= 0.05,
                "{} came back as {}",
                expected,
                recovered
            );
        }
    }

    #[test]
    fn overflow_writes_no_file() {
        let grid = Array2::from_elem((4, 4), 4000.0f32);
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("overflow.tiff");

        let err = encode(&grid, &metadata_for(&grid), &out, TiffCompression::Lzw).unwrap_err();
        assert!(matches!(err, ConvertError::PrecisionOverflow(_)));
        assert!(!out.exists());
        assert!(!out.with_extension("tiff.part").exists());
    }

    #[test]
    fn lzw_output_carries_metadata_tags() {
        let grid = crate::synthetic::generate(16, 8).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("tagged.tiff");

        encode(&grid, &metadata_for(&grid), &out, TiffCompression::Lzw).unwrap();

        let mut decoder = Decoder::new(std::fs::File::open(&out).unwrap()).unwrap();
        let description = decoder
            .get_tag_ascii_string(Tag::ImageDescription)
            .unwrap();
        let parsed: ConversionMetadata = serde_json::from_str(&description).unwrap();
        assert!(!parsed.is_real_data);
        assert_eq!(parsed.data_source, Provenance::Synthetic);
        assert_eq!(parsed.data_shape, (8, 16));

        let software = decoder.get_tag_ascii_string(Tag::Software).unwrap();
        assert_eq!(software, SOFTWARE);
        let document = decoder.get_tag_ascii_string(Tag::Unknown(269)).unwrap();
        assert_eq!(document, DOCUMENT_NAME);
    }

    #[test]
    fn parent_directories_are_created() {
        let grid = Array2::from_elem((2, 2), 21.5f32);
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/deeper/out.tiff");

        encode(&grid, &metadata_for(&grid), &out, TiffCompression::Zip).unwrap();
        assert!(out.exists());
    }
}
