//! volume — the data-set side of factor analysis.
//!
//! Purpose
//! -------
//! Describe the 4-D (space + time) volumes that factor analysis consumes and
//! the single-frame images it produces, without committing to any specific
//! viewer. The analysis only sees the [`VoxelSource`] and
//! [`DerivedImageSink`] traits; [`DataSet`] is a ready-made in-memory
//! implementation used by tests, the Python bindings and simple hosts.
//!
//! Key behaviors
//! -------------
//! - [`VoxelDim`] / [`Voxel`] fix the (z, y, x) flattening convention with
//!   `x` fastest.
//! - [`VolumeGeometry`] carries offset, orientation, voxel size and modality,
//!   copied verbatim onto derived images.
//! - [`matrix::frame_matrix`] builds the `M × T` voxel/frame matrix with
//!   checked allocation.
//!
//! Conventions
//! -----------
//! - Frame times are in seconds; midpoints are `(start + end) / 2`.
//! - Fallible constructors return [`VolumeResult`]; nothing here panics on
//!   bad input.

pub mod dataset;
pub mod dims;
pub mod errors;
pub mod geometry;
pub mod image;
pub mod matrix;
pub mod source;

pub use self::dataset::{DataSet, FrameTiming};
pub use self::dims::{Voxel, VoxelDim};
pub use self::errors::{VolumeError, VolumeResult};
pub use self::geometry::{Modality, VolumeGeometry};
pub use self::image::FactorImage;
pub use self::source::{DerivedImageSink, VoxelSource};

pub mod prelude {
    pub use super::dataset::{DataSet, FrameTiming};
    pub use super::dims::{Voxel, VoxelDim};
    pub use super::geometry::{Modality, VolumeGeometry};
    pub use super::image::FactorImage;
    pub use super::source::{DerivedImageSink, VoxelSource};
}
