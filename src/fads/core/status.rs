//! Terminal states of a penalized least-squares run.
use crate::fads::errors::FadsError;
use std::path::PathBuf;

/// Reason recorded for a run that used up its iteration budget.
pub const EXHAUSTED_REASON: &str = "the iteration has not converged yet";

/// How a run ended. None of these are errors; every variant still produces
/// factor images and a report.
#[derive(Debug, Clone, PartialEq)]
pub enum FadsStatus {
    /// The gradient norm dropped below the stopping tolerance.
    Converged { iterations: usize },
    /// The progress callback asked to stop.
    UserTerminated { iterations: usize },
    /// The iteration budget ran out first.
    Exhausted { iterations: usize },
    /// An iteration failed (e.g. the line search could not make progress);
    /// the last good parameters are kept.
    Stalled { iterations: usize, reason: String },
}

impl FadsStatus {
    pub fn iterations(&self) -> usize {
        match self {
            FadsStatus::Converged { iterations }
            | FadsStatus::UserTerminated { iterations }
            | FadsStatus::Exhausted { iterations }
            | FadsStatus::Stalled { iterations, .. } => *iterations,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, FadsStatus::Converged { .. })
    }

    /// Why the minimizer stopped without converging, if it did.
    pub fn reason(&self) -> Option<&str> {
        match self {
            FadsStatus::Exhausted { .. } => Some(EXHAUSTED_REASON),
            FadsStatus::Stalled { reason, .. } => Some(reason),
            FadsStatus::Converged { .. } | FadsStatus::UserTerminated { .. } => None,
        }
    }
}

impl std::fmt::Display for FadsStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FadsStatus::Converged { iterations } => {
                write!(f, "converged after {iterations} iterations")
            }
            FadsStatus::UserTerminated { iterations } => {
                write!(f, "user terminated after {iterations} iterations")
            }
            FadsStatus::Exhausted { iterations } | FadsStatus::Stalled { iterations, .. } => {
                write!(f, "no minimum after {iterations} iterations")
            }
        }
    }
}

/// Outcome of writing the report file. A failed report does not fail the
/// run; the factor images are already attached by then.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportStatus {
    Written(PathBuf),
    Failed(FadsError),
    /// Output images could not be built, so no report was attempted.
    Skipped,
}
