//! Public API surface for conjugate-gradient minimization.
//!
//! - [`Objective`]: trait users implement for the function being minimized.
//! - [`CgOptions`] and [`Tolerances`]: configuration for the minimizer.
//! - [`LineSearcher`]: choice of line search used inside nonlinear CG.
//!
//! Convention: unlike a likelihood maximizer, the objective here is already a
//! cost. `value` returns `c(θ)` and `grad` returns `∇c(θ)`; no sign flips
//! happen anywhere in the adapter.
use crate::optimization::{
    conjugate_gradient::{
        types::{Cost, Grad, Theta, DEFAULT_INITIAL_STEP, DEFAULT_RESTART_ORTHOGONALITY},
        validation::{verify_initial_step, verify_restart_orthogonality, verify_tol_grad},
    },
    errors::{OptError, OptResult},
};
use std::str::FromStr;

/// User-implemented objective interface.
///
/// - `type Data`: data carried into `value`/`grad`/`check`.
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate `c(θ)`.
/// - `grad(&Theta, &Data) -> OptResult<Grad>`: analytic gradient `∇c(θ)`.
///   Nonlinear CG relies on it on every line-search step, so there is no
///   finite-difference fallback.
/// - `check(&Theta, &Data) -> OptResult<()>`: validation hook to reject
///   obviously invalid `θ`/`data` pairs. Called once before minimization.
///
/// Implementations may keep run-scoped state behind interior mutability
/// (for example penalty weights re-tuned between iterations); the minimizer
/// only ever calls these methods from the thread that drives it.
pub trait Objective {
    type Data;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<Grad>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;
}

/// Choice of line search used inside nonlinear conjugate gradient.
///
/// Parsing:
/// This enum implements `FromStr` and accepts case-insensitive names
/// (`"MoreThuente"`, `"HagerZhang"`). Unknown names return
/// `OptError::InvalidLineSearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineSearcher {
    #[default]
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Stopping rules.
///
/// - `tol_grad`: converged once the gradient's L2 norm drops below this.
/// - `max_iter`: hard cap on the number of iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: f64,
    pub max_iter: usize,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::InvalidTolGrad`] for a non-finite or non-positive tolerance.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(tol_grad: f64, max_iter: usize) -> OptResult<Self> {
        verify_tol_grad(tol_grad)?;
        if max_iter == 0 {
            return Err(OptError::InvalidMaxIter {
                max_iter,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Self { tol_grad, max_iter })
    }
}

/// Minimizer-level configuration.
///
/// Fields:
/// - `tols: Tolerances` — gradient tolerance and iteration cap.
/// - `line_searcher: LineSearcher` — line search used by nonlinear CG.
/// - `initial_step: f64` — first trial step handed to the line search.
/// - `restart_iters: Option<u64>` — reset the search direction to steepest
///   descent every `k` iterations. `None` never restarts on a schedule;
///   callers that know the problem dimension usually pass it here.
/// - `restart_orthogonality: Option<f64>` — Powell restart threshold on
///   `|gₖ·gₖ₊₁| / ‖gₖ₊₁‖²`.
/// - `verbose: bool` — attach the slog observer (feature `obs_slog`).
///
/// Default:
/// - `tols`: `tol_grad = 1e-3`, `max_iter = 1000`
/// - `line_searcher`: `MoreThuente`
/// - `initial_step`: `0.1`
/// - Powell restarts at `0.1`, no periodic restarts, not verbose
#[derive(Debug, Clone, PartialEq)]
pub struct CgOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub initial_step: f64,
    pub restart_iters: Option<u64>,
    pub restart_orthogonality: Option<f64>,
    pub verbose: bool,
}

impl CgOptions {
    /// Create a validated set of minimizer options.
    ///
    /// # Errors
    /// - [`OptError::InvalidInitialStep`] for a non-finite or non-positive step.
    /// - [`OptError::InvalidRestartIters`] if `restart_iters == Some(0)`.
    /// - [`OptError::InvalidRestartOrthogonality`] outside (0, 1).
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, initial_step: f64,
        restart_iters: Option<u64>, restart_orthogonality: Option<f64>, verbose: bool,
    ) -> OptResult<Self> {
        verify_initial_step(initial_step)?;
        if let Some(iters) = restart_iters {
            if iters == 0 {
                return Err(OptError::InvalidRestartIters {
                    iters,
                    reason: "Restart period must be at least one iteration.",
                });
            }
        }
        verify_restart_orthogonality(restart_orthogonality)?;
        Ok(Self { tols, line_searcher, initial_step, restart_iters, restart_orthogonality, verbose })
    }

    /// Default options with a different stopping rule.
    pub fn with_tolerances(tols: Tolerances) -> Self {
        Self { tols, ..Self::default() }
    }
}

impl Default for CgOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: 1e-3, max_iter: 1000 },
            line_searcher: LineSearcher::MoreThuente,
            initial_step: DEFAULT_INITIAL_STEP,
            restart_iters: None,
            restart_orthogonality: Some(DEFAULT_RESTART_ORTHOGONALITY),
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_searcher_parses_case_insensitively() {
        assert_eq!("morethuente".parse::<LineSearcher>().unwrap(), LineSearcher::MoreThuente);
        assert_eq!("HAGERZHANG".parse::<LineSearcher>().unwrap(), LineSearcher::HagerZhang);
        assert!(matches!(
            "bfgs".parse::<LineSearcher>(),
            Err(OptError::InvalidLineSearch { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Verify constructor validation of tolerances and CG options.
    //
    // Given
    // -----
    // - Zero iteration cap, zero restart period, zero initial step.
    //
    // Expect
    // ------
    // - Each is rejected with its dedicated variant; defaults validate.
    fn constructors_reject_degenerate_settings() {
        // Arrange
        let tols = Tolerances::new(1e-4, 50).unwrap();

        // Act / Assert
        assert!(matches!(Tolerances::new(1e-4, 0), Err(OptError::InvalidMaxIter { .. })));
        assert!(matches!(
            CgOptions::new(tols, LineSearcher::MoreThuente, 0.1, Some(0), None, false),
            Err(OptError::InvalidRestartIters { .. })
        ));
        assert!(matches!(
            CgOptions::new(tols, LineSearcher::HagerZhang, 0.0, None, None, false),
            Err(OptError::InvalidInitialStep { .. })
        ));
        let defaults = CgOptions::default();
        assert!(CgOptions::new(
            defaults.tols,
            defaults.line_searcher,
            defaults.initial_step,
            defaults.restart_iters,
            defaults.restart_orthogonality,
            defaults.verbose
        )
        .is_ok());
        assert_eq!(CgOptions::with_tolerances(tols).tols.max_iter, 50);
    }
}
