//! Adapter that exposes a user `Objective` as an `argmin` problem.
//!
//! The objective is already a cost, so values and gradients pass through
//! unchanged. Both are validated on the way out: argmin's line searches would
//! otherwise happily bracket on `NaN`.
use crate::optimization::{
    conjugate_gradient::{
        traits::Objective,
        types::{Cost, Grad, Theta},
        validation::{validate_grad, validate_value},
    },
};
use argmin::core::{CostFunction, Error, Gradient};

/// Bridges a user [`Objective`] to `argmin`'s `CostFunction` and `Gradient`.
#[derive(Debug)]
pub struct ArgMinAdapter<'a, O: Objective> {
    pub f: &'a O,
    pub data: &'a O::Data,
}

impl<'a, O: Objective> Clone for ArgMinAdapter<'a, O> {
    fn clone(&self) -> Self {
        Self { f: self.f, data: self.data }
    }
}

impl<'a, O: Objective> CostFunction for ArgMinAdapter<'a, O> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate `c(θ)`.
    ///
    /// # Errors
    /// - Propagates any `OptError` from the user’s `value`.
    /// - `OptError::NonFiniteCost` if the value is not finite.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.value(theta, self.data)?;
        validate_value(output)?;
        Ok(output)
    }
}

impl<'a, O: Objective> Gradient for ArgMinAdapter<'a, O> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate `∇c(θ)` and check its shape and finiteness.
    ///
    /// # Errors
    /// - Propagates user errors from `grad`.
    /// - Returns validation errors for a wrong length or non-finite entries.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let g = self.f.grad(theta, self.data)?;
        validate_grad(&g, theta.len())?;
        Ok(g)
    }
}

impl<'a, O: Objective> ArgMinAdapter<'a, O> {
    /// Construct a new adapter over a user `Objective` and its data.
    pub fn new(f: &'a O, data: &'a O::Data) -> Self {
        Self { f, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::{OptError, OptResult};
    use ndarray::array;

    struct Shifted;

    impl Objective for Shifted {
        type Data = f64;

        fn value(&self, theta: &Theta, shift: &f64) -> OptResult<Cost> {
            Ok(theta.iter().map(|x| (x - shift).powi(2)).sum::<f64>().ln())
        }

        fn grad(&self, theta: &Theta, shift: &f64) -> OptResult<Grad> {
            let s: f64 = theta.iter().map(|x| (x - shift).powi(2)).sum();
            Ok(theta.mapv(|x| 2.0 * (x - shift) / s))
        }

        fn check(&self, _theta: &Theta, _shift: &f64) -> OptResult<()> {
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // The adapter must pass values through unchanged and reject non-finite
    // costs and gradients.
    //
    // Given
    // -----
    // - c(θ) = ln ‖θ − s‖², finite away from θ = s, −∞ and NaN at θ = s.
    //
    // Expect
    // ------
    // - Finite point: cost equals the objective value.
    // - θ = s: both cost and gradient error out.
    fn adapter_passes_values_and_rejects_non_finite() {
        // Arrange
        let shift = 1.0;
        let problem = ArgMinAdapter::new(&Shifted, &shift);

        // Act
        let ok = problem.cost(&array![2.0, 1.0]).unwrap();
        let bad_cost = problem.cost(&array![1.0, 1.0]);
        let bad_grad = problem.gradient(&array![1.0, 1.0]);

        // Assert
        assert_eq!(ok, 0.0);
        assert_eq!(
            OptError::from(bad_cost.unwrap_err()),
            OptError::NonFiniteCost { value: f64::NEG_INFINITY }
        );
        assert!(matches!(
            OptError::from(bad_grad.unwrap_err()),
            OptError::InvalidGradient { index: 0, .. }
        ));
    }
}
