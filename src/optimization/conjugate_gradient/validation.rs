//! Validation helpers for conjugate-gradient minimization.
//!
//! This module centralizes common consistency checks used across the
//! minimizer interface:
//!
//! - **Option checks**: [`verify_tol_grad`], [`verify_initial_step`],
//!   [`verify_restart_orthogonality`] ensure numeric settings are finite and
//!   in range.
//! - **Gradient validation**: [`validate_grad`] enforces correct dimension
//!   and finite entries.
//! - **Parameter vectors**: [`validate_param`] checks length and finiteness
//!   of a candidate `θ`.
//! - **Objective values**: [`validate_value`] checks objective outputs for
//!   finiteness.
use crate::optimization::{
    conjugate_gradient::types::{Grad, Theta},
    errors::{OptError, OptResult},
};

/// Validate the gradient‐norm tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_grad(tol: f64) -> OptResult<()> {
    if !tol.is_finite() {
        return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be finite." });
    }
    if tol <= 0.0 {
        return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be positive." });
    }
    Ok(())
}

/// Validate the initial line-search step length.
///
/// # Errors
/// Returns [`OptError::InvalidInitialStep`] if the value is non-finite or ≤ 0.0.
pub fn verify_initial_step(step: f64) -> OptResult<()> {
    if !step.is_finite() || step <= 0.0 {
        return Err(OptError::InvalidInitialStep {
            step,
            reason: "Initial step must be finite and positive.",
        });
    }
    Ok(())
}

/// Validate the optional Powell restart threshold.
///
/// # Errors
/// Returns [`OptError::InvalidRestartOrthogonality`] unless the value lies in
/// the open interval (0, 1).
pub fn verify_restart_orthogonality(value: Option<f64>) -> OptResult<()> {
    if let Some(value) = value {
        if !value.is_finite() || value <= 0.0 || value >= 1.0 {
            return Err(OptError::InvalidRestartOrthogonality {
                value,
                reason: "Threshold must be finite and strictly between 0 and 1.",
            });
        }
    }
    Ok(())
}

/// Validate a gradient vector against dimension and finiteness.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if length does not match `dim`.
/// - [`OptError::InvalidGradient`] with the index/value/reason of the first
///   offending element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate a parameter vector against the expected length and finiteness.
///
/// # Errors
/// - [`OptError::ParamLengthMismatch`] if `theta.len() != dim`.
/// - [`OptError::InvalidParamInput`] for the first non-finite entry.
pub fn validate_param(theta: &Theta, dim: usize) -> OptResult<()> {
    if theta.len() != dim {
        return Err(OptError::ParamLengthMismatch { expected: dim, actual: theta.len() });
    }
    for (index, &value) in theta.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidParamInput { index, value });
        }
    }
    Ok(())
}

/// Validate that a scalar objective value is finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn tol_grad_must_be_positive_and_finite() {
        assert!(verify_tol_grad(1e-3).is_ok());
        assert!(matches!(verify_tol_grad(0.0), Err(OptError::InvalidTolGrad { .. })));
        assert!(matches!(verify_tol_grad(f64::NAN), Err(OptError::InvalidTolGrad { .. })));
    }

    #[test]
    fn restart_orthogonality_is_optional_but_bounded() {
        assert!(verify_restart_orthogonality(None).is_ok());
        assert!(verify_restart_orthogonality(Some(0.1)).is_ok());
        assert!(verify_restart_orthogonality(Some(1.0)).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Confirm `validate_grad` reports the first non-finite entry.
    //
    // Given
    // -----
    // - A length-3 gradient with NaN at index 1 and ∞ at index 2.
    //
    // Expect
    // ------
    // - `InvalidGradient { index: 1, .. }`.
    fn validate_grad_reports_first_non_finite() {
        // Arrange
        let g = array![0.0, f64::NAN, f64::INFINITY];

        // Act
        let err = validate_grad(&g, 3).unwrap_err();

        // Assert
        assert!(matches!(err, OptError::InvalidGradient { index: 1, .. }));
        assert_eq!(
            validate_grad(&g, 2).unwrap_err(),
            OptError::GradientDimMismatch { expected: 2, found: 3 }
        );
    }

    #[test]
    fn validate_param_checks_length_then_values() {
        let theta = array![1.0, 2.0];
        assert!(validate_param(&theta, 2).is_ok());
        assert_eq!(
            validate_param(&theta, 3).unwrap_err(),
            OptError::ParamLengthMismatch { expected: 3, actual: 2 }
        );
        assert!(validate_value(f64::NEG_INFINITY).is_err());
    }
}
