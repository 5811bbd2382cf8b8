use argmin::core::{ArgminError, Error};

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient elements need to be finite
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- CgOptions ----
    /// Gradient tolerance needs to be positive and finite.
    InvalidTolGrad {
        tol: f64,
        reason: &'static str,
    },
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// Invalid line searcher name.
    InvalidLineSearch {
        name: String,
        reason: &'static str,
    },
    /// Initial line-search step needs to be positive and finite.
    InvalidInitialStep {
        step: f64,
        reason: &'static str,
    },
    /// Restart orthogonality threshold needs to be finite and in (0, 1).
    InvalidRestartOrthogonality {
        value: f64,
        reason: &'static str,
    },
    /// Restart period needs to be at least 1.
    InvalidRestartIters {
        iters: u64,
        reason: &'static str,
    },

    // ---- Objective ----
    /// Objective function returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },
    /// Parameter vector length does not match the objective's layout.
    ParamLengthMismatch {
        expected: usize,
        actual: usize,
    },
    /// Parameter vector entries must be finite.
    InvalidParamInput {
        index: usize,
        value: f64,
    },
    /// Parameter vector could not be viewed with the objective's shape.
    ParamShape {
        what: &'static str,
        text: String,
    },

    // ---- Minimizer state ----
    /// The minimizer holds no current parameter vector.
    MissingParam,

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- CgOptions ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Invalid line searcher '{name}': {reason}")
            }
            OptError::InvalidInitialStep { step, reason } => {
                write!(f, "Invalid initial step length {step}: {reason}")
            }
            OptError::InvalidRestartOrthogonality { value, reason } => {
                write!(f, "Invalid restart orthogonality threshold {value}: {reason}")
            }
            OptError::InvalidRestartIters { iters, reason } => {
                write!(f, "Invalid restart period {iters}: {reason}")
            }

            // ---- Objective ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }
            OptError::ParamLengthMismatch { expected, actual } => {
                write!(f, "Parameter length mismatch: expected {expected}, actual {actual}")
            }
            OptError::InvalidParamInput { index, value } => {
                write!(f, "Invalid parameter at index {index}: {value}, must be finite")
            }
            OptError::ParamShape { what, text } => {
                write!(f, "Cannot view parameters as {what}: {text}")
            }

            // ---- Minimizer state ----
            OptError::MissingParam => {
                write!(f, "Minimizer has no current parameter vector")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        match original_err.downcast::<ArgminError>() {
            Ok(opt_err) => match opt_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            // Objective errors travel through argmin's line searches untouched.
            Err(err) => match err.downcast::<OptError>() {
                Ok(own) => own,
                Err(err) => OptError::BackendError { text: err.to_string() },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Ensure errors raised by our own objective survive a round trip
    // through `argmin::core::Error`.
    //
    // Given
    // -----
    // - `OptError::NonFiniteCost` converted into an argmin `Error`.
    //
    // Expect
    // ------
    // - Converting back yields the identical variant.
    fn own_errors_round_trip_through_argmin() {
        // Arrange
        let original = OptError::NonFiniteCost { value: f64::INFINITY };

        // Act
        let back: OptError = Error::from(original.clone()).into();

        // Assert
        assert_eq!(back, original);
    }

    #[test]
    fn argmin_condition_violated_is_mapped() {
        let err: Error = ArgminError::ConditionViolated { text: "not descent".into() }.into();
        assert_eq!(
            OptError::from(err),
            OptError::ConditionViolated { text: "not descent".into() }
        );
    }
}
