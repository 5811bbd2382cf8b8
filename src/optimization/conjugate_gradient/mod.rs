//! conjugate_gradient — argmin-powered, step-wise nonlinear CG minimizer.
//!
//! Purpose
//! -------
//! Provide an Argmin-backed minimization layer for smooth objectives with
//! analytic gradients. Callers implement a single trait, [`Objective`], pick
//! [`CgOptions`], and drive a [`CgMinimizer`] one iteration at a time so that
//! they can act between iterations.
//!
//! Key behaviors
//! -------------
//! - Bridge user objectives into Argmin via [`adapter::ArgMinAdapter`],
//!   rejecting non-finite values and gradients.
//! - Build Polak–Ribière nonlinear CG with a More–Thuente or Hager–Zhang
//!   line search ([`builders`]), including the initial step length and an
//!   optional restart policy.
//! - Advance the solver step by step ([`run::CgMinimizer`]) with a
//!   gradient-norm stopping test after every iteration.
//! - Verify analytic gradients against central differences
//!   ([`finite_diff::gradient_check`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - [`Objective::value`] and [`Objective::grad`] treat invalid inputs as
//!   recoverable [`OptError`](crate::optimization::errors::OptError) values,
//!   not panics.
//! - Vectors use the canonical aliases [`Theta`] and [`Grad`]; all are
//!   assumed finite whenever minimization proceeds.
//! - The iteration cap in [`Tolerances`] is enforced by the caller driving
//!   [`CgMinimizer::step`]; the minimizer itself never stops on its own.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover option validation, adapter pass-through
//!   and rejection, solver construction, step-wise convergence on convex
//!   quadratics, and the gradient checker itself.

pub mod adapter;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::finite_diff::{gradient_check, GradientCheck};
pub use self::run::{CgMinimizer, StepOutcome};
pub use self::traits::{CgOptions, LineSearcher, Objective, Tolerances};
pub use self::types::{
    Cost, FnEvalMap, Grad, Theta, DEFAULT_INITIAL_STEP, DEFAULT_RESTART_ORTHOGONALITY,
};

pub mod prelude {
    pub use super::run::{CgMinimizer, StepOutcome};
    pub use super::traits::{CgOptions, LineSearcher, Objective, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
