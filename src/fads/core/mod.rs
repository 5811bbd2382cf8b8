//! core — building blocks of a penalized least-squares factor analysis run.
//!
//! Purpose
//! -------
//! Collect the small, validated pieces the driver assembles: how the flat
//! parameter vector is partitioned, the penalty weights and their update
//! rule, blood-curve samples, run options, the starting point, the progress
//! capability and the terminal states.
//!
//! Key behaviors
//! -------------
//! - [`ParameterLayout`] maps `θ` onto an `F × T` factor view and an `M × F`
//!   coefficient view without copying.
//! - [`PenaltyWeights`] carries `{a, b, c}`; `b` is re-seeded after the first
//!   evaluation and re-tuned every iteration from the last
//!   [`PenaltyTerms`].
//! - [`initial_parameters`] seeds alternating rising/decaying exponentials
//!   scaled by the frame maxima, and uniform `1/F` coefficients.
//! - [`Progress`] is the single injected capability for progress messages and
//!   cooperative cancellation; any `FnMut(Option<&str>, f64) -> bool` works.
//!
//! Invariants & assumptions
//! ------------------------
//! - A [`ParameterLayout`] always satisfies `1 ≤ F ≤ T`,
//!   `coef_offset = F·T` and `num_variables = F·(T + M)`.
//! - Blood-curve targets are finite; frame indices are checked against the
//!   data set by [`BloodCurveConstraints::validate_frames`] before a run
//!   allocates.
//! - Weights and terms are scoped to one run; nothing here is global.
//!
//! Conventions
//! -----------
//! - Factor 0 is the blood curve.
//! - This module performs no I/O and no logging.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover layout sizes and index agreement, weight
//!   update arithmetic, seeding formulas, constraint validation and the
//!   closure-based progress sink.

pub mod constraints;
pub mod init;
pub mod layout;
pub mod options;
pub mod progress;
pub mod status;
pub mod weights;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::constraints::{BloodCurveConstraint, BloodCurveConstraints};
pub use self::init::{initial_parameters, study_duration};
pub use self::layout::ParameterLayout;
pub use self::options::FadsOptions;
pub use self::progress::{NoProgress, Progress, PROGRESS_DONE};
pub use self::status::{FadsStatus, ReportStatus, EXHAUSTED_REASON};
pub use self::weights::{PenaltyTerms, PenaltyWeights};

pub mod prelude {
    pub use super::constraints::{BloodCurveConstraint, BloodCurveConstraints};
    pub use super::options::FadsOptions;
    pub use super::progress::{NoProgress, Progress};
    pub use super::status::{FadsStatus, ReportStatus};
    pub use super::weights::{PenaltyTerms, PenaltyWeights};
}
