//! Errors for 4-D voxel volumes (construction, frame access, and working
//! buffer allocation).
//!
//! This module defines [`VolumeError`], the error type used by the in-memory
//! [`DataSet`](crate::volume::dataset::DataSet), the single-frame
//! [`FactorImage`](crate::volume::image::FactorImage), and the voxel×frame
//! matrix builder. It implements `Display`/`Error` and converts into the
//! analysis-level [`FadsError`](crate::fads::errors::FadsError).
//!
//! ## Conventions
//! - **Indices are 0-based**; frame indices run over `0..dim.t`.
//! - Voxel intensities must be finite; frame durations must be finite and
//!   non-negative.
//! - Allocation failures are reported, never aborted on.

/// Result alias for volume operations that may produce [`VolumeError`].
pub type VolumeResult<T> = Result<T, VolumeError>;

#[derive(Debug, Clone, PartialEq)]
pub enum VolumeError {
    // ---- Shape ----
    /// One of the x/y/z/t extents is zero.
    EmptyDimension { axis: char },

    /// The number of frame timings does not match the `t` extent.
    FrameCountMismatch { expected: usize, actual: usize },

    /// A value buffer does not match the expected number of elements.
    DataLengthMismatch { expected: usize, actual: usize },

    // ---- Content ----
    /// A voxel intensity is NaN/±inf.
    NonFiniteIntensity { x: usize, y: usize, z: usize, t: usize, value: f64 },

    /// A frame start or duration is invalid.
    InvalidFrameTiming { frame: usize, start: f64, duration: f64, reason: &'static str },

    /// Voxel sizes must be finite and > 0.
    InvalidVoxelSize { axis: char, value: f64 },

    /// Frame index outside `0..t`.
    FrameOutOfRange { frame: usize, num_frames: usize },

    // ---- Resources ----
    /// A working buffer could not be allocated.
    AllocationFailed { what: &'static str, len: usize },
}

impl std::error::Error for VolumeError {}

impl std::fmt::Display for VolumeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Shape ----
            VolumeError::EmptyDimension { axis } => {
                write!(f, "Volume dimension '{axis}' must be at least 1.")
            }
            VolumeError::FrameCountMismatch { expected, actual } => {
                write!(f, "Frame timing count mismatch: expected {expected}, actual {actual}")
            }
            VolumeError::DataLengthMismatch { expected, actual } => {
                write!(f, "Voxel buffer length mismatch: expected {expected}, actual {actual}")
            }

            // ---- Content ----
            VolumeError::NonFiniteIntensity { x, y, z, t, value } => {
                write!(f, "Voxel ({x}, {y}, {z}, {t}) has non-finite intensity: {value}")
            }
            VolumeError::InvalidFrameTiming { frame, start, duration, reason } => {
                write!(f, "Invalid timing for frame {frame} (start {start}, duration {duration}): {reason}")
            }
            VolumeError::InvalidVoxelSize { axis, value } => {
                write!(f, "Voxel size along '{axis}' must be finite and > 0; got: {value}")
            }
            VolumeError::FrameOutOfRange { frame, num_frames } => {
                write!(f, "Frame {frame} is out of range for a volume with {num_frames} frames")
            }

            // ---- Resources ----
            VolumeError::AllocationFailed { what, len } => {
                write!(f, "Failed to allocate {what} ({len} elements)")
            }
        }
    }
}
