//! conjugate_gradient::finite_diff — analytic-gradient verification.
//!
//! Purpose
//! -------
//! Compare an [`Objective`]'s analytic gradient against a central-difference
//! approximation of its value, so that hand-derived gradients can be checked
//! without depending directly on the `finitediff` API.
//!
//! Conventions
//! -----------
//! - Any error raised by the objective inside the finite-difference closure
//!   is captured in a shared cell and returned after differencing; the
//!   closure itself yields `NaN` for that evaluation.
//! - Relative errors are measured against `max(|analytic|, |numeric|, 1)`,
//!   so entries near zero are compared absolutely.
use crate::optimization::{
    conjugate_gradient::{
        traits::Objective,
        types::{Grad, Theta},
        validation::validate_grad,
    },
    errors::{OptError, OptResult},
};
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Analytic vs. numeric gradient at one point.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientCheck {
    pub analytic: Grad,
    pub numeric: Grad,
    pub max_abs_error: f64,
    pub max_rel_error: f64,
}

/// gradient_check — central-difference check of `f.grad` at `theta`.
///
/// Errors
/// ------
/// - Propagates errors from `f.grad` and the first error raised by
///   `f.value` during differencing.
/// - `OptError::GradientDimMismatch` / `OptError::InvalidGradient` if either
///   gradient has the wrong length or non-finite entries.
pub fn gradient_check<O: Objective>(
    f: &O, data: &O::Data, theta: &Theta,
) -> OptResult<GradientCheck> {
    let dim = theta.len();
    let analytic = f.grad(theta, data)?;
    validate_grad(&analytic, dim)?;

    let closure_err: RefCell<Option<OptError>> = RefCell::new(None);
    let cost_func = |x: &Theta| -> f64 {
        match f.value(x, data) {
            Ok(v) => v,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    };
    let numeric = theta.central_diff(&cost_func);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&numeric, dim)?;

    let (max_abs_error, max_rel_error) =
        analytic.iter().zip(numeric.iter()).fold((0.0_f64, 0.0_f64), |(abs, rel), (&a, &n)| {
            let diff = (a - n).abs();
            let scale = a.abs().max(n.abs()).max(1.0);
            (abs.max(diff), rel.max(diff / scale))
        });

    Ok(GradientCheck { analytic, numeric, max_abs_error, max_rel_error })
}
