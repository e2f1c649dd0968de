use crate::enums::Plane;
use crate::renderer::VoiWindow;

use ndarray::Array3;

/// Smallest slice spacing the engine will accept, in millimetres.
pub const MIN_SPACING_MM: f32 = 1e-3;

/// A reconstructed 3D scalar field plus its spatial calibration.
///
/// Once built a volume is immutable; any number of threads may extract
/// slices or projections from it concurrently without locking.
pub struct Volume {
    /// Calibrated intensities, indexed as `[z, y, x]`.
    pub data: Array3<f32>,
    /// Physical spacing in millimetres along (x, y, z).
    pub spacing: (f32, f32, f32),
    /// Physical position of the first slice.
    pub origin: [f32; 3],
    pub rescale_slope: f32,
    pub rescale_intercept: f32,
    /// Display window captured from the input stack, if it carried one.
    pub default_window: Option<VoiWindow>,
}

impl Volume {
    pub fn new(data: Array3<f32>, spacing: (f32, f32, f32)) -> Self {
        Self {
            data,
            spacing: (spacing.0, spacing.1, spacing.2.max(MIN_SPACING_MM)),
            origin: [0.0; 3],
            rescale_slope: 1.0,
            rescale_intercept: 0.0,
            default_window: None,
        }
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn width(&self) -> usize {
        self.data.dim().2
    }

    pub fn height(&self) -> usize {
        self.data.dim().1
    }

    pub fn depth(&self) -> usize {
        self.data.dim().0
    }

    /// Intensity at the given voxel coordinate.
    pub fn voxel(&self, x: usize, y: usize, z: usize) -> f32 {
        self.data[[z, y, x]]
    }

    /// Largest valid cut index for the given plane.
    pub fn max_index(&self, plane: Plane) -> usize {
        self.extent(plane).saturating_sub(1)
    }

    /// Number of voxels along the axis a cut in `plane` is taken across.
    pub(crate) fn extent(&self, plane: Plane) -> usize {
        match plane {
            Plane::Axial => self.depth(),
            Plane::Sagittal => self.width(),
            Plane::Coronal => self.height(),
        }
    }

    /// Output dimensions and per-axis spacing of a cut in `plane`.
    ///
    /// Always returns (width, height, (spacing x, spacing y)) in image
    /// convention; the fixed axis is the one perpendicular to the plane.
    pub(crate) fn plane_geometry(&self, plane: Plane) -> (usize, usize, (f32, f32)) {
        let (spacing_x, spacing_y, spacing_z) = self.spacing;
        match plane {
            Plane::Axial => (self.width(), self.height(), (spacing_x, spacing_y)),
            Plane::Sagittal => (self.depth(), self.height(), (spacing_z, spacing_y)),
            Plane::Coronal => (self.width(), self.depth(), (spacing_x, spacing_z)),
        }
    }
}
