//! fads — factor analysis of dynamic structures.
//!
//! Purpose
//! -------
//! Decompose a dynamic (4-D) image volume into a few time–activity curves
//! ("factors") and a per-voxel mixing coefficient for each, such that every
//! voxel's curve is approximately a non-negative blend of the factors. The
//! first factor is the blood curve and may be pinned to known samples.
//!
//! Key behaviors
//! -------------
//! - [`svd_factors`] reports the singular values of the voxel/frame matrix
//!   as a guide for choosing the factor count.
//! - [`fads_pls`] minimizes a penalized least-squares objective
//!   ([`PlsObjective`]) with nonlinear conjugate gradient, adapting the
//!   orthogonality weight between iterations, then attaches one image per
//!   factor to the data set and writes a text report.
//!
//! Invariants & assumptions
//! ------------------------
//! - Runs are single-threaded and synchronous; the progress capability is
//!   the only point where control returns to the caller.
//! - Every run owns its weights and buffers; no state survives a call.
//!
//! Conventions
//! -----------
//! - Factors are `F × T` (row per factor), coefficients `M × F` (row per
//!   voxel, voxels in (z, y, x) order with `x` fastest).
//! - Errors are [`FadsError`]; non-convergence and cancellation are
//!   [`FadsStatus`] values, not errors.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests; `tests/integration_fads_pipeline.rs`
//!   exercises full runs on synthetic mixtures.

pub mod core;
pub mod errors;
pub mod objective;
pub mod output;
pub mod pls;
pub mod report;
pub mod svd;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    BloodCurveConstraint, BloodCurveConstraints, FadsOptions, FadsStatus, NoProgress,
    ParameterLayout, PenaltyTerms, PenaltyWeights, Progress, ReportStatus, PROGRESS_DONE,
};
pub use self::errors::{FadsError, FadsResult};
pub use self::objective::{PlsData, PlsObjective};
pub use self::output::{attach_factor_images, factor_image_name};
pub use self::pls::{fads_pls, FadsOutcome};
pub use self::report::{format_g, render_report, write_report, PROGRAM_NAME};
pub use self::svd::{svd_factors, SvdFactors};

pub mod prelude {
    pub use super::core::prelude::*;
    pub use super::errors::{FadsError, FadsResult};
    pub use super::pls::{fads_pls, FadsOutcome};
    pub use super::svd::{svd_factors, SvdFactors};
}
