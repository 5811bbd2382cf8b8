//! Errors for factor analysis runs (preconditions, allocation, numerical
//! backends, and report output).
//!
//! This module defines [`FadsError`], the error type returned by the SVD rank
//! estimator and the penalized least-squares driver. It wraps the lower-level
//! [`VolumeError`] and [`OptError`] surfaces and, with the
//! `python-bindings` feature, converts to `PyErr`.
//!
//! ## Conventions
//! - **Indices are 0-based**; frames run over `0..T`, factors over `0..F`.
//! - Precondition violations are detected before any working buffer is
//!   allocated.
//! - Non-convergence and user cancellation are *not* errors; they are
//!   terminal states reported through
//!   [`FadsStatus`](crate::fads::core::status::FadsStatus).
use crate::{optimization::errors::OptError, volume::errors::VolumeError};
use std::path::PathBuf;

/// Result alias for factor-analysis operations that may produce [`FadsError`].
pub type FadsResult<T> = Result<T, FadsError>;

#[derive(Debug, Clone, PartialEq)]
pub enum FadsError {
    // ---- Preconditions ----
    /// Factor analysis needs a dynamic data set (more than one frame).
    StaticVolume { num_frames: usize },

    /// At least one factor must be requested.
    ZeroFactors,

    /// The factor count may not exceed the number of frames.
    TooManyFactors { num_factors: usize, num_frames: usize },

    /// A blood-curve constraint names a frame outside `0..T`.
    BloodFrameOutOfRange { index: usize, frame: usize, num_frames: usize },

    /// A blood-curve target is NaN/±inf.
    NonFiniteBloodTarget { index: usize, value: f64 },

    /// Blood-curve frame and target lists differ in length.
    BloodCurveLengthMismatch { frames: usize, targets: usize },

    /// The end time of the last frame must be finite and > 0.
    InvalidStudyDuration { end_time: f64 },

    /// Penalty weights are scaled by the global maximum, which must be
    /// finite and non-negative.
    InvalidPenaltyScale { global_max: f64 },

    // ---- Resources ----
    /// A working buffer or output image could not be allocated.
    AllocationFailed { what: &'static str, len: usize },

    // ---- Numerical backends ----
    /// The singular value decomposition did not converge.
    SvdFailed { rows: usize, cols: usize },

    /// Minimizer setup or evaluation failed.
    Optimization(OptError),

    /// Invalid data set or derived image.
    Volume(VolumeError),

    // ---- Output ----
    /// The report file could not be created or written.
    ReportIo { path: PathBuf, text: String },
}

impl std::error::Error for FadsError {}

impl std::fmt::Display for FadsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Preconditions ----
            FadsError::StaticVolume { num_frames } => {
                write!(
                    f,
                    "Need a dynamic data set in order to perform factor analysis; got {num_frames} frame(s)."
                )
            }
            FadsError::ZeroFactors => {
                write!(f, "At least one factor must be requested.")
            }
            FadsError::TooManyFactors { num_factors, num_frames } => {
                write!(f, "Requested {num_factors} factors but the data set only has {num_frames} frames.")
            }
            FadsError::BloodFrameOutOfRange { index, frame, num_frames } => {
                write!(
                    f,
                    "Blood-curve constraint {index} refers to frame {frame}, outside 0..{num_frames}."
                )
            }
            FadsError::NonFiniteBloodTarget { index, value } => {
                write!(f, "Blood-curve constraint {index} has a non-finite target: {value}")
            }
            FadsError::BloodCurveLengthMismatch { frames, targets } => {
                write!(f, "Blood-curve frames ({frames}) and targets ({targets}) differ in length.")
            }
            FadsError::InvalidStudyDuration { end_time } => {
                write!(f, "Study end time must be finite and > 0; got: {end_time}")
            }
            FadsError::InvalidPenaltyScale { global_max } => {
                write!(f, "Global maximum must be finite and non-negative; got: {global_max}")
            }

            // ---- Resources ----
            FadsError::AllocationFailed { what, len } => {
                write!(f, "Failed to allocate {what} ({len} elements)")
            }

            // ---- Numerical backends ----
            FadsError::SvdFailed { rows, cols } => {
                write!(f, "Singular value decomposition of the {rows}x{cols} matrix failed.")
            }
            FadsError::Optimization(err) => write!(f, "Minimization failed: {err}"),
            FadsError::Volume(err) => write!(f, "{err}"),

            // ---- Output ----
            FadsError::ReportIo { path, text } => {
                write!(f, "Couldn't write FADS analysis to {}: {text}", path.display())
            }
        }
    }
}

impl From<OptError> for FadsError {
    fn from(err: OptError) -> FadsError {
        FadsError::Optimization(err)
    }
}

impl From<VolumeError> for FadsError {
    fn from(err: VolumeError) -> FadsError {
        match err {
            VolumeError::AllocationFailed { what, len } => FadsError::AllocationFailed { what, len },
            other => FadsError::Volume(other),
        }
    }
}

/// Convert a [`FadsError`] into a Python `ValueError` with the error message.
#[cfg(feature = "python-bindings")]
impl std::convert::From<FadsError> for pyo3::PyErr {
    fn from(err: FadsError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
