//! Registry of supported thermal payload models.
//!
//! The table is fixed at compile time and loaded once; lookups never
//! mutate it. Parameters follow the published DJI payload data sheets.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;

use crate::error::ConvertError;

/// Supported payload models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeviceModel {
    M30T,
    H20T,
    H30T,
    M2EA,
}

/// Fallback when the caller does not specify a model.
pub const DEFAULT_MODEL: DeviceModel = DeviceModel::M30T;

/// Physical parameters of a payload's thermal sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSpec {
    pub model: DeviceModel,
    pub name: &'static str,
    /// Inclusive measurable range in °C.
    pub temperature_range: (f64, f64),
    /// Native sensor resolution, `(width, height)`.
    pub resolution: (u32, u32),
    /// Pixel pitch in µm.
    pub pixel_pitch_um: f64,
    pub input_extensions: &'static [&'static str],
    /// Spectral band in µm.
    pub spectral_range_um: (f64, f64),
    /// NETD in °C.
    pub thermal_sensitivity_c: f64,
}

impl DeviceSpec {
    /// Whether `temperature` lies within the sensor's measurable range,
    /// bounds included.
    pub fn temperature_in_range(&self, temperature: f64) -> bool {
        let (min, max) = self.temperature_range;
        (min..=max).contains(&temperature)
    }
}

const RJPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

lazy_static! {
    static ref REGISTRY: BTreeMap<DeviceModel, DeviceSpec> = {
        let mut table = BTreeMap::new();
        for spec in [
            DeviceSpec {
                model: DeviceModel::M30T,
                name: "DJI M30T",
                temperature_range: (-20.0, 400.0),
                resolution: (640, 512),
                pixel_pitch_um: 12.0,
                input_extensions: RJPEG_EXTENSIONS,
                spectral_range_um: (8.0, 14.0),
                thermal_sensitivity_c: 0.05,
            },
            DeviceSpec {
                model: DeviceModel::H20T,
                name: "DJI H20T",
                temperature_range: (-20.0, 550.0),
                resolution: (640, 512),
                pixel_pitch_um: 12.0,
                input_extensions: RJPEG_EXTENSIONS,
                spectral_range_um: (8.0, 14.0),
                thermal_sensitivity_c: 0.05,
            },
            DeviceSpec {
                model: DeviceModel::H30T,
                name: "DJI H30T",
                temperature_range: (-20.0, 1600.0),
                resolution: (640, 512),
                pixel_pitch_um: 12.0,
                input_extensions: RJPEG_EXTENSIONS,
                spectral_range_um: (8.0, 14.0),
                thermal_sensitivity_c: 0.05,
            },
            DeviceSpec {
                model: DeviceModel::M2EA,
                name: "DJI Mavic 2 Enterprise Advanced",
                temperature_range: (-10.0, 400.0),
                resolution: (640, 512),
                pixel_pitch_um: 17.0,
                input_extensions: RJPEG_EXTENSIONS,
                spectral_range_um: (8.0, 14.0),
                thermal_sensitivity_c: 0.1,
            },
        ] {
            table.insert(spec.model, spec);
        }
        table
    };
}

impl DeviceModel {
    /// All supported models, in the fixed registry order.
    pub fn all() -> &'static [DeviceModel] {
        &[
            DeviceModel::M30T,
            DeviceModel::H20T,
            DeviceModel::H30T,
            DeviceModel::M2EA,
        ]
    }

    pub fn spec(self) -> &'static DeviceSpec {
        &REGISTRY[&self]
    }

    /// Native sensor resolution, `(width, height)`.
    pub fn resolution(self) -> (u32, u32) {
        self.spec().resolution
    }
}

impl FromStr for DeviceModel {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "M30T" => Ok(DeviceModel::M30T),
            "H20T" => Ok(DeviceModel::H20T),
            "H30T" => Ok(DeviceModel::H30T),
            "M2EA" => Ok(DeviceModel::M2EA),
            _ => Err(ConvertError::UnknownModel(s.to_owned())),
        }
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            DeviceModel::M30T => "M30T",
            DeviceModel::H20T => "H20T",
            DeviceModel::H30T => "H30T",
            DeviceModel::M2EA => "M2EA",
        };
        write!(f, "{}", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;

    #[test]
    fn lookup_is_case_insensitive() {
        let lower: DeviceModel = "m30t".parse().unwrap();
        let upper: DeviceModel = "M30T".parse().unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.spec(), upper.spec());
    }

    #[test]
    fn unknown_model_is_rejected() {
        let err = "X9".parse::<DeviceModel>().unwrap_err();
        assert!(matches!(err, ConvertError::UnknownModel(m) if m == "X9"));
    }

    #[test]
    fn registry_order_is_fixed() {
        let ids: Vec<String> = DeviceModel::all().iter().map(|m| m.to_string()).collect();
        assert_eq!(ids, ["M30T", "H20T", "H30T", "M2EA"]);
    }

    #[test]
    fn temperature_range_is_inclusive() {
        let spec = DeviceModel::H20T.spec();
        assert!(spec.temperature_in_range(-20.0));
        assert!(spec.temperature_in_range(550.0));
        assert!(spec.temperature_in_range(0.0));
        assert!(!spec.temperature_in_range(-20.1));
        assert!(!spec.temperature_in_range(550.1));
    }

    #[test]
    fn every_model_has_a_spec() {
        for model in DeviceModel::all() {
            let spec = model.spec();
            assert_eq!(spec.model, *model);
            assert!(spec.resolution.0 > 0 && spec.resolution.1 > 0);
            assert!(spec.temperature_range.0 < spec.temperature_range.1);
        }
    }
}
