//! conjugate_gradient::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the core numeric types and solver aliases used by the
//! conjugate-gradient minimizer. The rest of the optimization code refers to
//! these aliases instead of spelling out `ndarray` and Argmin generics.
//!
//! Conventions
//! -----------
//! - `Theta` and `Grad` are flat parameter/gradient vectors of equal length.
//! - `Cost` is the scalar objective being **minimized**.
//! - Nonlinear CG always uses the Polak–Ribière β update; only the line
//!   search varies.
use argmin::core::IterState;
use argmin::solver::{
    conjugategradient::{beta::PolakRibiere, NonlinearConjugateGradient},
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
};
use ndarray::Array1;
use std::collections::HashMap;

/// Parameter vector `θ` being minimized over.
pub type Theta = Array1<f64>;

/// Gradient vector `∇c(θ)`, same shape as `Theta`.
pub type Grad = Array1<f64>;

/// Scalar objective value.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
///
/// Maps counter names (e.g., `"cost_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// Argmin iteration state for first-order solvers over `Theta`.
pub type CgState = IterState<Theta, Grad, (), (), (), Cost>;

/// Default initial step length handed to the line search.
pub const DEFAULT_INITIAL_STEP: f64 = 0.1;

/// Default Powell restart threshold on `|gₖ·gₖ₊₁| / ‖gₖ₊₁‖²`.
pub const DEFAULT_RESTART_ORTHOGONALITY: f64 = 0.1;

/// More–Thuente line search specialized to this crate’s numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// Hager–Zhang line search specialized to this crate’s numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

/// Polak–Ribière nonlinear CG wired to the More–Thuente line search.
pub type NcgMoreThuente = NonlinearConjugateGradient<Theta, MoreThuenteLS, PolakRibiere, Cost>;

/// Polak–Ribière nonlinear CG wired to the Hager–Zhang line search.
pub type NcgHagerZhang = NonlinearConjugateGradient<Theta, HagerZhangLS, PolakRibiere, Cost>;
