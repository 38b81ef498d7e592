//! Detection mask

use anpr_types::{Error, Result};

/// Pixel mask restricting where the engine looks for plates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionMask {
    pixels: Vec<u8>,
    bytes_per_pixel: u32,
    width: u32,
    height: u32,
}

impl DetectionMask {
    /// Build a mask. The buffer must hold exactly `bytes_per_pixel * width * height` bytes.
    pub fn new(pixels: Vec<u8>, bytes_per_pixel: u32, width: u32, height: u32) -> Result<Self> {
        if bytes_per_pixel == 0 || width == 0 || height == 0 {
            return Err(Error::InvalidArgument(format!(
                "mask dimensions must be non-zero: {}bpp {}x{}",
                bytes_per_pixel, width, height
            )));
        }

        let expected = bytes_per_pixel as u64 * width as u64 * height as u64;
        if pixels.len() as u64 != expected {
            return Err(Error::InvalidArgument(format!(
                "mask buffer has {} bytes, expected {} ({}bpp {}x{})",
                pixels.len(),
                expected,
                bytes_per_pixel,
                width,
                height
            )));
        }

        Ok(Self {
            pixels,
            bytes_per_pixel,
            width,
            height,
        })
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        self.bytes_per_pixel
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
