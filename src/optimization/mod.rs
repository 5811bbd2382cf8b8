//! optimization — nonlinear CG stack and unified error surface.
//!
//! Purpose
//! -------
//! Provide a cohesive, domain-free minimization layer: an Argmin-backed
//! nonlinear conjugate-gradient minimizer that can be driven one iteration
//! at a time, plus a single error/result surface. Callers implement an
//! objective with an analytic gradient, choose tolerances, and step the
//! minimizer without touching backend solver details.
//!
//! Conventions
//! -----------
//! - Objectives are costs to be **minimized**.
//! - Parameters and gradients are flat `ndarray` vectors (`Theta`, `Grad`).
//! - Public entrypoints that can fail return `OptResult<T>`; callers never
//!   see raw Argmin errors.
//! - This layer does no I/O and no logging; the only optional output is the
//!   Argmin slog observer behind the `obs_slog` feature.

pub mod conjugate_gradient;
pub mod errors;

pub mod prelude {
    pub use super::conjugate_gradient::prelude::*;
    pub use super::errors::{OptError, OptResult};
}
