use crate::renderer::VoiWindow;
use crate::source::{SliceSource, stack_position};
use crate::volume::{MIN_SPACING_MM, Volume};

use log::{debug, warn};
use ndarray::{Array2, Array3, s};
use rayon::prelude::*;
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VolumeBuildError {
    #[error("a volume needs at least two slices, got {0}")]
    InsufficientSlices(usize),

    #[error("slices report inconsistent dimensions")]
    InconsistentDimensions,

    #[error("slice reports no rows/columns")]
    MissingDimensions,

    #[error("no pixel data could be decoded for slice {0}")]
    MissingPixelData(usize),
}

pub struct VolumeBuilder;

impl VolumeBuilder {
    /// Reconstruct a volume from a set of slice sources.
    ///
    /// Slices are sorted by their stack position before stacking, so the
    /// input order does not need to match the spatial order. Calibration
    /// metadata (rescale, display window, pixel spacing, origin) is taken
    /// from the first sorted slice and applied volume-wide.
    ///
    /// # Errors
    ///
    /// Fails before allocating the volume buffer if fewer than two slices
    /// are given, if any slice reports no dimensions, or if dimensions
    /// disagree. Fails without returning a partial volume if any slice's
    /// pixel data cannot be decoded.
    pub fn build<S: SliceSource + Sync>(sources: &[S]) -> Result<Volume, VolumeBuildError> {
        if sources.len() < 2 {
            return Err(VolumeBuildError::InsufficientSlices(sources.len()));
        }

        let mut ordered: Vec<&S> = sources.iter().collect();
        ordered.sort_by(|a, b| {
            stack_position(*a)
                .partial_cmp(&stack_position(*b))
                .unwrap_or(Ordering::Equal)
        });

        let (rows, columns) = Self::validate_dimensions(&ordered)?;
        debug!(
            "stacking {} slices of {}x{} into a volume",
            ordered.len(),
            columns,
            rows
        );

        let frames = Self::decode_frames(&ordered, rows, columns)?;
        let mut data = Array3::<f32>::zeros((frames.len(), rows, columns));
        for (i, frame) in frames.iter().enumerate() {
            data.slice_mut(s![i, .., ..]).assign(frame);
        }

        let first = ordered[0];
        let rescale_slope = first.rescale_slope().unwrap_or(1.0);
        let rescale_intercept = first.rescale_intercept().unwrap_or(0.0);
        if rescale_slope != 1.0 || rescale_intercept != 0.0 {
            data.mapv_inplace(|raw| raw.mul_add(rescale_slope, rescale_intercept));
        }

        let (row_spacing, column_spacing) = first.pixel_spacing().unwrap_or_else(|| {
            warn!("first slice reports no pixel spacing, assuming 1.0 mm");
            (1.0, 1.0)
        });

        let mut volume = Volume::new(
            data,
            (column_spacing, row_spacing, Self::slice_spacing(&ordered)),
        );
        volume.origin = first.position().unwrap_or([0.0; 3]);
        volume.rescale_slope = rescale_slope;
        volume.rescale_intercept = rescale_intercept;
        volume.default_window = match (first.window_center(), first.window_width()) {
            (Some(center), Some(width)) => Some(VoiWindow::new(center, width)),
            _ => None,
        };
        Ok(volume)
    }

    fn validate_dimensions<S: SliceSource>(
        ordered: &[&S],
    ) -> Result<(usize, usize), VolumeBuildError> {
        let rows = ordered[0].rows().ok_or(VolumeBuildError::MissingDimensions)?;
        let columns = ordered[0]
            .columns()
            .ok_or(VolumeBuildError::MissingDimensions)?;
        for source in &ordered[1..] {
            let dimensions = source
                .rows()
                .zip(source.columns())
                .ok_or(VolumeBuildError::MissingDimensions)?;
            if dimensions != (rows, columns) {
                return Err(VolumeBuildError::InconsistentDimensions);
            }
        }
        Ok((rows, columns))
    }

    fn decode_frames<S: SliceSource + Sync>(
        ordered: &[&S],
        rows: usize,
        columns: usize,
    ) -> Result<Vec<Array2<f32>>, VolumeBuildError> {
        ordered
            .par_iter()
            .enumerate()
            .map(|(i, source)| {
                let frame = source
                    .pixel_data()
                    .ok_or(VolumeBuildError::MissingPixelData(i))?;
                if frame.dim() != (rows, columns) {
                    return Err(VolumeBuildError::InconsistentDimensions);
                }
                Ok(frame)
            })
            .collect()
    }

    fn slice_spacing<S: SliceSource>(ordered: &[&S]) -> f32 {
        let z_first = stack_position(ordered[0]);
        let z_last = stack_position(ordered[ordered.len() - 1]);
        let spacing = (z_last - z_first).abs() / (ordered.len() - 1) as f32;
        if spacing < MIN_SPACING_MM {
            warn!("degenerate slice spacing {spacing} mm, clamping to {MIN_SPACING_MM} mm");
        }
        spacing.max(MIN_SPACING_MM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::Plane;

    #[derive(Clone, Default)]
    struct TestSlice {
        rows: Option<usize>,
        columns: Option<usize>,
        position: Option<[f32; 3]>,
        location: Option<f32>,
        slope: Option<f32>,
        intercept: Option<f32>,
        center: Option<f32>,
        window_width: Option<f32>,
        spacing: Option<(f32, f32)>,
        frame: Option<Array2<f32>>,
    }

    impl SliceSource for TestSlice {
        fn rows(&self) -> Option<usize> {
            self.rows
        }

        fn columns(&self) -> Option<usize> {
            self.columns
        }

        fn position(&self) -> Option<[f32; 3]> {
            self.position
        }

        fn slice_location(&self) -> Option<f32> {
            self.location
        }

        fn rescale_slope(&self) -> Option<f32> {
            self.slope
        }

        fn rescale_intercept(&self) -> Option<f32> {
            self.intercept
        }

        fn window_center(&self) -> Option<f32> {
            self.center
        }

        fn window_width(&self) -> Option<f32> {
            self.window_width
        }

        fn pixel_spacing(&self) -> Option<(f32, f32)> {
            self.spacing
        }

        fn pixel_data(&self) -> Option<Array2<f32>> {
            self.frame.clone()
        }
    }

    /// 2x2 slice at z millimetres whose samples encode z*1000 + y*10 + x.
    fn phantom_slice(z: usize) -> TestSlice {
        TestSlice {
            rows: Some(2),
            columns: Some(2),
            position: Some([0.0, 0.0, z as f32]),
            frame: Some(Array2::from_shape_fn((2, 2), |(y, x)| {
                (z * 1000 + y * 10 + x) as f32
            })),
            ..TestSlice::default()
        }
    }

    fn float_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn builds_sorted_volume_with_derived_spacing() {
        let sources = [
            phantom_slice(2),
            phantom_slice(0),
            phantom_slice(3),
            phantom_slice(1),
        ];
        let volume = VolumeBuilder::build(&sources).unwrap();

        assert_eq!(volume.dim(), (4, 2, 2));
        assert!(float_eq(volume.spacing.2, 1.0));

        let slice = volume.slice(Plane::Axial, 1).unwrap();
        assert_eq!(slice.pixels, vec![1000.0, 1001.0, 1010.0, 1011.0]);
    }

    #[test]
    fn fewer_than_two_slices_is_an_error() {
        let sources = [phantom_slice(0)];
        assert!(matches!(
            VolumeBuilder::build(&sources),
            Err(VolumeBuildError::InsufficientSlices(1))
        ));
    }

    #[test]
    fn inconsistent_dimensions_abort_the_build() {
        let mut tall = phantom_slice(1);
        tall.rows = Some(3);
        tall.frame = Some(Array2::zeros((3, 2)));
        let sources = [phantom_slice(0), tall];
        assert!(matches!(
            VolumeBuilder::build(&sources),
            Err(VolumeBuildError::InconsistentDimensions)
        ));
    }

    #[test]
    fn missing_dimensions_abort_the_build() {
        let mut blank = phantom_slice(1);
        blank.rows = None;
        let sources = [phantom_slice(0), blank];
        assert!(matches!(
            VolumeBuilder::build(&sources),
            Err(VolumeBuildError::MissingDimensions)
        ));
    }

    #[test]
    fn failed_decode_leaves_no_partial_volume() {
        let mut broken = phantom_slice(1);
        broken.frame = None;
        let sources = [phantom_slice(0), broken, phantom_slice(2)];
        assert!(matches!(
            VolumeBuilder::build(&sources),
            Err(VolumeBuildError::MissingPixelData(1))
        ));
    }

    #[test]
    fn rescale_from_first_slice_applies_volume_wide() {
        let mut first = phantom_slice(0);
        first.slope = Some(2.0);
        first.intercept = Some(-1024.0);
        let mut second = phantom_slice(1);
        // A differing slope on a later slice is ignored.
        second.slope = Some(3.0);

        let volume = VolumeBuilder::build(&[first, second]).unwrap();
        assert!(float_eq(volume.voxel(0, 0, 0), -1024.0));
        assert!(float_eq(volume.voxel(1, 1, 1), 1011.0 * 2.0 - 1024.0));
        assert_eq!(volume.rescale_slope, 2.0);
        assert_eq!(volume.rescale_intercept, -1024.0);
    }

    #[test]
    fn metadata_comes_from_the_first_sorted_slice() {
        let mut first = phantom_slice(0);
        first.position = Some([-100.0, -80.0, 0.0]);
        first.spacing = Some((0.5, 0.75));
        first.center = Some(40.0);
        first.window_width = Some(400.0);

        let volume = VolumeBuilder::build(&[phantom_slice(1), first]).unwrap();
        assert_eq!(volume.origin, [-100.0, -80.0, 0.0]);
        // Column spacing maps to x, row spacing to y.
        assert!(float_eq(volume.spacing.0, 0.75));
        assert!(float_eq(volume.spacing.1, 0.5));
        let window = volume.default_window.unwrap();
        assert_eq!(window.center, 40.0);
        assert_eq!(window.width, 400.0);
    }

    #[test]
    fn missing_window_leaves_no_default() {
        let volume = VolumeBuilder::build(&[phantom_slice(0), phantom_slice(1)]).unwrap();
        assert!(volume.default_window.is_none());
    }

    #[test]
    fn slice_location_orders_when_position_is_absent() {
        let mut low = phantom_slice(0);
        low.position = None;
        low.location = Some(-12.0);
        let mut high = phantom_slice(1);
        high.position = None;
        high.location = Some(-4.0);

        let volume = VolumeBuilder::build(&[high, low]).unwrap();
        // The slice at -12.0 mm must land at z index 0.
        assert!(float_eq(volume.voxel(0, 0, 0), 0.0));
        assert!(float_eq(volume.voxel(0, 0, 1), 1000.0));
        assert!(float_eq(volume.spacing.2, 8.0));
    }

    #[test]
    fn coincident_positions_clamp_spacing() {
        let mut a = phantom_slice(0);
        a.position = Some([0.0, 0.0, 5.0]);
        let mut b = phantom_slice(1);
        b.position = Some([0.0, 0.0, 5.0]);
        let volume = VolumeBuilder::build(&[a, b]).unwrap();
        assert_eq!(volume.spacing.2, MIN_SPACING_MM);
    }

    #[test]
    fn stack_position_prefers_position_over_location() {
        let mut source = phantom_slice(0);
        source.position = Some([1.0, 2.0, 30.0]);
        source.location = Some(-99.0);
        assert_eq!(stack_position(&source), 30.0);

        source.position = None;
        assert_eq!(stack_position(&source), -99.0);

        source.location = None;
        assert_eq!(stack_position(&source), 0.0);
    }
}
