//! [`SliceSource`] adapter for in-memory DICOM objects.
//!
//! Opening files, walking directories and talking to PACS stay with the
//! import layer; this module only maps an already-open object's
//! attributes and pixel data onto the engine's consumed interface.

use crate::source::SliceSource;

use dicom::{
    object::{FileDicomObject, InMemDicomObject},
    pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder},
};
use dicom_dictionary_std::tags;
use ndarray::{Array2, s};

impl SliceSource for FileDicomObject<InMemDicomObject> {
    fn rows(&self) -> Option<usize> {
        self.element(tags::ROWS)
            .ok()?
            .to_int::<u16>()
            .ok()
            .map(usize::from)
    }

    fn columns(&self) -> Option<usize> {
        self.element(tags::COLUMNS)
            .ok()?
            .to_int::<u16>()
            .ok()
            .map(usize::from)
    }

    fn position(&self) -> Option<[f32; 3]> {
        let position = self
            .element(tags::IMAGE_POSITION_PATIENT)
            .ok()?
            .to_multi_float32()
            .ok()?;
        Some([
            *position.first()?,
            *position.get(1)?,
            *position.get(2)?,
        ])
    }

    fn slice_location(&self) -> Option<f32> {
        self.element(tags::SLICE_LOCATION).ok()?.to_float32().ok()
    }

    fn rescale_slope(&self) -> Option<f32> {
        self.element(tags::RESCALE_SLOPE).ok()?.to_float32().ok()
    }

    fn rescale_intercept(&self) -> Option<f32> {
        self.element(tags::RESCALE_INTERCEPT)
            .ok()?
            .to_float32()
            .ok()
    }

    fn window_center(&self) -> Option<f32> {
        self.element(tags::WINDOW_CENTER)
            .ok()?
            .to_multi_float32()
            .ok()?
            .first()
            .copied()
    }

    fn window_width(&self) -> Option<f32> {
        self.element(tags::WINDOW_WIDTH)
            .ok()?
            .to_multi_float32()
            .ok()?
            .first()
            .copied()
    }

    fn pixel_spacing(&self) -> Option<(f32, f32)> {
        let spacing = self
            .element(tags::PIXEL_SPACING)
            .ok()?
            .to_multi_float32()
            .ok()?;
        Some((*spacing.first()?, *spacing.get(1)?))
    }

    fn pixel_data(&self) -> Option<Array2<f32>> {
        let decoded = self.decode_pixel_data().ok()?;
        // Raw stored values; the builder applies the rescale itself.
        let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
        decoded
            .to_ndarray_with_options::<f32>(&options)
            .ok()
            .map(|frames| frames.slice_move(s![0, .., .., 0]))
    }
}
