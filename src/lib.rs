//! # DICOM-MPR library
//!
//! This crate turns an ordered stack of 2D cross-sectional DICOM images
//! into a 3D volume and derives axis-aligned views from it.
//!
//! Slice sources are sorted by their spatial position, stacked into an
//! immutable [`volume::Volume`] with calibrated intensities
//! (`raw * RescaleSlope + RescaleIntercept`), and read back out as:
//!  - Axial, coronal and sagittal cross-sections
//!  - Maximum, minimum and average intensity projections over a slab
//!
//! Each produced [`slice::Slice`] carries the physical pixel spacing of
//! its two axes, and [`renderer::render`] maps it through a linear VOI
//! window to an 8-bit grayscale raster. Sources are decoded in parallel
//! using rayon, and a built volume is safe to share read-only across
//! threads, so the three views can be produced concurrently.
//!
//! Any type implementing [`source::SliceSource`] can feed the builder;
//! an implementation for [`FileDicomObject<InMemDicomObject>`] from the
//! dicom-rs ecosystem is provided. DICOM inputs are assumed to be:
//!  - An axial data set from a single series and acquisition
//!  - No multiframe (always the first frame is used)
//!
//! # Roadmap
//!
//!  - Caching of projection slabs for interactive thickness changes
//!  - Oblique (non-axis-aligned) reconstruction
//!
//! # Examples
//!
//! ## Rendering the middle sagittal cut of a stack
//!
//! ```no_run
//! # use dicom_mpr::{enums::Plane, renderer, volume_builder::VolumeBuilder};
//! # use dicom::object::open_file;
//! let slices: Vec<_> = ["ct/0.dcm", "ct/1.dcm", "ct/2.dcm"]
//!     .iter()
//!     .map(|path| open_file(path).expect("should have opened DICOM file"))
//!     .collect();
//! let volume = VolumeBuilder::build(&slices).expect("should have built volume");
//! let slice = volume
//!     .slice(Plane::Sagittal, volume.max_index(Plane::Sagittal) / 2)
//!     .expect("center index is in range");
//! let window = volume
//!     .default_window
//!     .unwrap_or(renderer::VoiWindow::new(40.0, 400.0));
//! let raster = renderer::render(&slice, window).expect("slice is well formed");
//! raster.into_image().expect("buffer matches dimensions").save("sagittal.png");
//! ```
//!
//! [`FileDicomObject<InMemDicomObject>`]: https://docs.rs/dicom-object/latest/dicom_object/struct.FileDicomObject.html

mod dicom_source;
pub mod enums;
mod projection;
pub mod renderer;
pub mod slice;
pub mod source;
pub mod volume;
pub mod volume_builder;
