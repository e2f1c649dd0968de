use crate::enums::{Plane, ProjectionMode};
use crate::slice::Slice;
use crate::volume::Volume;

use log::debug;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

impl Volume {
    /// Project a slab of voxels onto the given plane.
    ///
    /// The slab runs from voxel 0 along the axis perpendicular to the
    /// plane; `slab_thickness` is a voxel count, clamped to
    /// `1..=extent`, with the full extent used when omitted. The output
    /// slice has the same geometry as an extracted cut in the same plane
    /// and carries index 0.
    pub fn project(
        &self,
        plane: Plane,
        mode: ProjectionMode,
        slab_thickness: Option<usize>,
    ) -> Slice {
        let slab = self.slab_extent(plane, slab_thickness);
        let (width, height, spacing) = self.plane_geometry(plane);
        let pixels: Vec<f32> = (0..height)
            .into_par_iter()
            .flat_map(|row| self.project_row(plane, mode, slab, row, width))
            .collect();
        Slice {
            plane,
            index: 0,
            width,
            height,
            pixels,
            spacing,
        }
    }

    /// Like [`Volume::project`], but abandons the scan when `cancel`
    /// becomes set.
    ///
    /// The scan is chunked per output row and the flag is checked between
    /// chunks, so a superseding request from an interactive control stops
    /// stale work quickly. Returns `None` when cancelled.
    pub fn project_cancellable(
        &self,
        plane: Plane,
        mode: ProjectionMode,
        slab_thickness: Option<usize>,
        cancel: &AtomicBool,
    ) -> Option<Slice> {
        let slab = self.slab_extent(plane, slab_thickness);
        let (width, height, spacing) = self.plane_geometry(plane);
        let mut pixels = Vec::with_capacity(width * height);
        for row in 0..height {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            pixels.extend(self.project_row(plane, mode, slab, row, width));
        }
        Some(Slice {
            plane,
            index: 0,
            width,
            height,
            pixels,
            spacing,
        })
    }

    /// One output row of the slab scan, reading voxels in volume order.
    fn project_row(
        &self,
        plane: Plane,
        mode: ProjectionMode,
        slab: usize,
        row: usize,
        width: usize,
    ) -> Vec<f32> {
        (0..width)
            .map(|col| {
                let samples = (0..slab).map(|i| match plane {
                    Plane::Axial => self.data[[i, row, col]],
                    Plane::Sagittal => self.data[[col, row, i]],
                    Plane::Coronal => self.data[[row, i, col]],
                });
                reduce(mode, samples, slab)
            })
            .collect()
    }

    fn slab_extent(&self, plane: Plane, slab_thickness: Option<usize>) -> usize {
        let extent = self.extent(plane);
        let slab = slab_thickness.unwrap_or(extent).min(extent).max(1);
        if slab_thickness.is_some_and(|requested| requested != slab) {
            debug!("slab thickness {slab_thickness:?} clamped to {slab} voxels");
        }
        slab
    }
}

fn reduce(mode: ProjectionMode, samples: impl Iterator<Item = f32>, count: usize) -> f32 {
    match mode {
        ProjectionMode::Max => samples.fold(f32::NEG_INFINITY, f32::max),
        ProjectionMode::Min => samples.fold(f32::INFINITY, f32::min),
        ProjectionMode::Average => samples.sum::<f32>() / count as f32,
    }
}
