use crate::slice::Slice;

use image::{ImageBuffer, Luma};
use rayon::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("slice dimensions do not match its pixel buffer")]
    InvalidSlice,
}

/// Linear VOI window parameters (window center / window width).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiWindow {
    pub center: f32,
    pub width: f32,
}

impl VoiWindow {
    pub fn new(center: f32, width: f32) -> Self {
        Self { center, width }
    }

    pub fn lower(&self) -> f32 {
        self.center - self.width / 2.0
    }

    pub fn upper(&self) -> f32 {
        self.center + self.width / 2.0
    }

    /// Map one intensity to an 8-bit display value.
    ///
    /// Saturates exactly at the window bounds and is linear in between;
    /// monotonic non-decreasing over the whole input range.
    pub fn apply(&self, value: f32) -> u8 {
        let lower = self.lower();
        let upper = self.upper();
        if value <= lower {
            0
        } else if value >= upper {
            u8::MAX
        } else {
            (((value - lower) / (upper - lower)) * 255.0).round() as u8
        }
    }
}

/// Row-major 8-bit grayscale output, one byte per pixel.
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl Raster {
    /// Convert into an [`image::ImageBuffer`] for saving or display.
    pub fn into_image(self) -> Option<ImageBuffer<Luma<u8>, Vec<u8>>> {
        ImageBuffer::from_raw(self.width as u32, self.height as u32, self.pixels)
    }
}

/// Render a slice to an 8-bit raster through the given window.
///
/// # Errors
///
/// Returns [`RenderError::InvalidSlice`] when the slice's buffer does not
/// match its dimensions. That is a caller bug, but it must surface as a
/// typed error rather than take down the host.
pub fn render(slice: &Slice, window: VoiWindow) -> Result<Raster, RenderError> {
    if slice.width == 0 || slice.height == 0 || slice.pixels.len() != slice.width * slice.height {
        return Err(RenderError::InvalidSlice);
    }
    let pixels: Vec<u8> = slice.pixels.par_iter().map(|&v| window.apply(v)).collect();
    Ok(Raster {
        width: slice.width,
        height: slice.height,
        pixels,
    })
}
