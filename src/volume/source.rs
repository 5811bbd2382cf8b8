//! Collaborator traits between the factor analysis and the image viewer
//! that owns the data.
//!
//! Purpose
//! -------
//! Decouple the analysis from any particular image container. The analysis
//! reads intensities and frame timing through [`VoxelSource`] and hands its
//! per-factor images back through [`DerivedImageSink`].
//!
//! Invariants & assumptions
//! ------------------------
//! - A `VoxelSource` is read-only for the whole duration of an analysis run
//!   and returns finite intensities for every in-range voxel.
//! - Frame accessors are only called with `frame < dim().t`.
//! - `frame_end(t) >= frame_start(t)` for every frame.
use crate::volume::{
    dims::{Voxel, VoxelDim},
    geometry::VolumeGeometry,
    image::FactorImage,
};

/// Read side of a 4-D data set.
pub trait VoxelSource {
    /// Display name of the data set (used in progress messages and reports).
    fn name(&self) -> &str;
    fn dim(&self) -> VoxelDim;
    /// Intensity at `voxel`; `voxel` must be in range.
    fn value(&self, voxel: Voxel) -> f64;
    fn frame_start(&self, frame: usize) -> f64;
    fn frame_end(&self, frame: usize) -> f64;
    /// Maximum intensity within one frame.
    fn frame_max(&self, frame: usize) -> f64;
    fn global_max(&self) -> f64;
    fn global_min(&self) -> f64;
    fn geometry(&self) -> &VolumeGeometry;

    /// Midpoint of a frame in seconds.
    fn frame_midpoint(&self, frame: usize) -> f64 {
        (self.frame_end(frame) + self.frame_start(frame)) / 2.0
    }
}

/// Write side: receives images derived from the source data set.
pub trait DerivedImageSink {
    /// Attach `image` as a child of this data set, taking ownership.
    fn attach_child(&mut self, image: FactorImage);
}
