use ndarray::Array2;

/// One 2D cross-sectional image as handed over by the import layer.
///
/// Implementors own the byte-level decoding; the engine only ever sees
/// decoded raw samples and per-slice attributes. Every accessor is
/// optional because real stacks routinely miss attributes.
pub trait SliceSource {
    fn rows(&self) -> Option<usize>;

    fn columns(&self) -> Option<usize>;

    /// 3D position of the slice's first pixel, in millimetres.
    fn position(&self) -> Option<[f32; 3]>;

    /// Scalar fallback location along the stacking axis.
    fn slice_location(&self) -> Option<f32>;

    fn rescale_slope(&self) -> Option<f32>;

    fn rescale_intercept(&self) -> Option<f32>;

    fn window_center(&self) -> Option<f32>;

    fn window_width(&self) -> Option<f32>;

    /// Physical spacing (row, column) in millimetres.
    fn pixel_spacing(&self) -> Option<(f32, f32)>;

    /// Decoded raw samples, shape (rows, columns).
    ///
    /// `None` signals a decode failure and aborts the whole build.
    fn pixel_data(&self) -> Option<Array2<f32>>;
}

/// Position of a slice along the stacking axis.
///
/// Prefers the z component of the 3D position, falls back to the scalar
/// slice location, and finally to 0.0. This is the only ordering key the
/// builder uses.
pub fn stack_position<S: SliceSource + ?Sized>(source: &S) -> f32 {
    if let Some(position) = source.position() {
        return position[2];
    }
    if let Some(location) = source.slice_location() {
        return location;
    }
    0.0
}
