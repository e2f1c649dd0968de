/// One of the three canonical orthogonal anatomical cutting planes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Plane {
    Axial,
    Sagittal,
    Coronal,
}

/// Reduction applied along the projected axis of a slab.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectionMode {
    /// Maximum intensity projection.
    Max,
    /// Minimum intensity projection.
    Min,
    /// Average intensity projection.
    Average,
}
