//! Safe wrapper over the DJI Thermal SDK (`libdirp`).
//!
//! Only compiled with the `dji` feature. The SDK owns the parsed
//! R-JPEG behind an opaque handle; temperatures come back as one f32
//! per pixel, already calibrated by the vendor.

use std::mem::{size_of, MaybeUninit};

use ndarray::Array2;

use dji_thermal_sys::*;

use crate::error::{ConvertError, Result};
use crate::FloatGrid;

#[derive(Debug)]
pub struct RJpeg {
    handle: DIRP_HANDLE,
}

unsafe impl Send for RJpeg {}

impl RJpeg {
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self> {
        let size = bytes.len() as i32;
        let mut handle = MaybeUninit::uninit();
        let ret = unsafe { dirp_create_from_rjpeg(bytes.as_ptr(), size, handle.as_mut_ptr()) };
        if ret != 0 {
            return Err(ConvertError::DecodeFailed(format!(
                "dirp_create_from_rjpeg returned {}",
                ret
            )));
        }

        Ok(RJpeg {
            handle: unsafe { handle.assume_init() },
        })
    }

    /// Resolution of the radiometric payload, `(width, height)`.
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        let mut resolution = MaybeUninit::uninit();
        let ret = unsafe { dirp_get_rjpeg_resolution(self.handle, resolution.as_mut_ptr()) };
        if ret != 0 {
            return Err(ConvertError::DecodeFailed(format!(
                "dirp_get_rjpeg_resolution returned {}",
                ret
            )));
        }

        let resolution = unsafe { resolution.assume_init() };
        if resolution.width <= 0 || resolution.height <= 0 {
            return Err(ConvertError::InvalidResolution {
                width: resolution.width.max(0) as u32,
                height: resolution.height.max(0) as u32,
            });
        }
        Ok((resolution.width as u32, resolution.height as u32))
    }

    /// Per-pixel temperatures in °C, row-major.
    pub fn temperatures(&self) -> Result<FloatGrid> {
        let (width, height) = self.dimensions()?;
        let num_values = (width as usize) * (height as usize);

        let mut values = Vec::with_capacity(num_values);
        let ret = unsafe {
            dirp_measure_ex(
                self.handle,
                values.as_mut_ptr(),
                (num_values * size_of::<f32>()) as i32,
            )
        };
        if ret != 0 {
            return Err(ConvertError::DecodeFailed(format!(
                "dirp_measure_ex returned {}",
                ret
            )));
        }
        unsafe {
            values.set_len(num_values);
        }

        Array2::from_shape_vec((height as usize, width as usize), values)
            .map_err(|e| ConvertError::DecodeFailed(e.to_string()))
    }
}

impl Drop for RJpeg {
    fn drop(&mut self) {
        unsafe {
            dirp_destroy(self.handle);
        }
    }
}
