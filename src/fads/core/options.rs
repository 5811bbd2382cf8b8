//! FADS options — configuration for one penalized least-squares run.
//!
//! Purpose
//! -------
//! Bundle the factor count, the minimizer configuration (iteration cap,
//! gradient tolerance, line search, restarts) and the blood-curve samples
//! into one validated value that the driver consumes.
//!
//! Invariants & assumptions
//! ------------------------
//! - `num_factors ≥ 1`. The upper bound `num_factors ≤ T` depends on the
//!   data set and is checked by the driver before allocation.
//! - `cg` and `blood_curve` are validated by their own constructors.
use crate::{
    fads::{
        core::constraints::BloodCurveConstraints,
        errors::{FadsError, FadsResult},
    },
    optimization::conjugate_gradient::traits::{CgOptions, Tolerances},
};

/// FadsOptions — run configuration for [`fads_pls`](crate::fads::pls::fads_pls).
///
/// Fields
/// ------
/// - `num_factors`: number of factor curves `F`.
/// - `cg`: nonlinear CG configuration; `cg.tols.max_iter` is the iteration
///   budget and `cg.tols.tol_grad` the gradient-norm stopping tolerance.
/// - `blood_curve`: known samples pinning factor 0.
#[derive(Debug, Clone, PartialEq)]
pub struct FadsOptions {
    pub num_factors: usize,
    pub cg: CgOptions,
    pub blood_curve: BloodCurveConstraints,
}

impl FadsOptions {
    /// Errors
    /// ------
    /// - `FadsError::ZeroFactors` if `num_factors == 0`.
    pub fn new(
        num_factors: usize, cg: CgOptions, blood_curve: BloodCurveConstraints,
    ) -> FadsResult<Self> {
        if num_factors == 0 {
            return Err(FadsError::ZeroFactors);
        }
        Ok(Self { num_factors, cg, blood_curve })
    }

    /// Default minimizer settings with the given iteration cap and
    /// stopping tolerance, no blood-curve samples.
    ///
    /// Errors
    /// ------
    /// - `FadsError::ZeroFactors` if `num_factors == 0`.
    /// - `FadsError::Optimization` for an invalid tolerance or a zero
    ///   iteration cap.
    pub fn with_budget(
        num_factors: usize, num_iterations: usize, tol_grad: f64,
    ) -> FadsResult<Self> {
        let tols = Tolerances::new(tol_grad, num_iterations)?;
        Self::new(num_factors, CgOptions::with_tolerances(tols), BloodCurveConstraints::none())
    }

    /// Replace the blood-curve samples.
    pub fn with_blood_curve(mut self, blood_curve: BloodCurveConstraints) -> Self {
        self.blood_curve = blood_curve;
        self
    }

    pub fn num_iterations(&self) -> usize {
        self.cg.tols.max_iter
    }
}
