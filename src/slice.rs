use crate::enums::Plane;
use crate::volume::Volume;

use ndarray::s;

/// A 2D cut through a [`Volume`], owned by the caller.
///
/// `pixels` is row-major with `len == width * height`; `spacing` carries
/// the physical millimetre spacing of the cut's two axes so the
/// presentation layer can scale the image correctly.
pub struct Slice {
    pub plane: Plane,
    /// Source index along the fixed axis; 0 for projections.
    pub index: usize,
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<f32>,
    pub spacing: (f32, f32),
}

impl Slice {
    /// Intensity at the given pixel coordinate.
    pub fn sample(&self, x: usize, y: usize) -> f32 {
        self.pixels[y * self.width + x]
    }
}

impl Volume {
    /// Extract the cut at `index` in the given plane.
    ///
    /// Returns `None` for an out-of-range index rather than an error:
    /// indices are driven by interactive scroll controls that transiently
    /// overrun, and those requests are expected and harmless.
    pub fn slice(&self, plane: Plane, index: usize) -> Option<Slice> {
        if index >= self.extent(plane) {
            return None;
        }
        let (width, height, spacing) = self.plane_geometry(plane);
        let pixels: Vec<f32> = match plane {
            Plane::Axial => self.data.slice(s![index, .., ..]).iter().copied().collect(),
            // The raw sagittal view is (depth, height); transpose it into
            // image convention before flattening.
            Plane::Sagittal => self
                .data
                .slice(s![.., .., index])
                .t()
                .iter()
                .copied()
                .collect(),
            Plane::Coronal => self.data.slice(s![.., index, ..]).iter().copied().collect(),
        };
        Some(Slice {
            plane,
            index,
            width,
            height,
            pixels,
            spacing,
        })
    }
}
