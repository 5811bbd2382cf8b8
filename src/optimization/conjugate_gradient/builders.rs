//! conjugate_gradient::builders — nonlinear CG solver construction helpers.
//!
//! Purpose
//! -------
//! Provide small, focused builders for Polak–Ribière nonlinear conjugate
//! gradient solvers. These helpers hide Argmin’s generic wiring and apply
//! crate-level options (initial step, restart policy) so that higher-level
//! code can request a configured solver without touching Argmin-specific
//! types.
//!
//! Conventions
//! -----------
//! - The builders do **not** set an initial parameter vector or iteration
//!   cap; those are runtime concerns of the minimizer.
//! - Errors are always reported via [`OptResult`]; the underlying
//!   `argmin::core::Error` values never leak across module boundaries.
//! - `CgOptions::initial_step` is Argmin's initial step length: the first
//!   trial point of every line search is `x + α·p` with the unnormalized
//!   direction `p` (`-g` after a restart). The first trial therefore moves
//!   `α·‖p‖`, not `α`, and scales with the gradient.
use argmin::core::LineSearch;
use argmin::solver::conjugategradient::{beta::PolakRibiere, NonlinearConjugateGradient};

use crate::optimization::{
    conjugate_gradient::{
        traits::CgOptions,
        types::{Cost, HagerZhangLS, MoreThuenteLS, NcgHagerZhang, NcgMoreThuente, Theta},
    },
    errors::OptResult,
};

/// build_ncg_more_thuente — Polak–Ribière CG with More–Thuente line search.
///
/// Errors
/// ------
/// - `OptError` (via `From<argmin::core::Error>`) when Argmin rejects the
///   initial step length.
pub fn build_ncg_more_thuente(opts: &CgOptions) -> OptResult<NcgMoreThuente> {
    let mut more_thuente = MoreThuenteLS::new();
    more_thuente.initial_step_length(opts.initial_step)?;
    Ok(configure_ncg(NonlinearConjugateGradient::new(more_thuente, PolakRibiere::new()), opts))
}

/// build_ncg_hager_zhang — Polak–Ribière CG with Hager–Zhang line search.
///
/// Errors
/// ------
/// - `OptError` (via `From<argmin::core::Error>`) when Argmin rejects the
///   initial step length.
pub fn build_ncg_hager_zhang(opts: &CgOptions) -> OptResult<NcgHagerZhang> {
    let mut hager_zhang = HagerZhangLS::new();
    hager_zhang.initial_step_length(opts.initial_step)?;
    Ok(configure_ncg(NonlinearConjugateGradient::new(hager_zhang, PolakRibiere::new()), opts))
}

/// configure_ncg — apply the optional restart policy.
///
/// When a restart option is `None` Argmin’s default (never restart) stays
/// in effect.
pub fn configure_ncg<L>(
    mut solver: NonlinearConjugateGradient<Theta, L, PolakRibiere, Cost>, opts: &CgOptions,
) -> NonlinearConjugateGradient<Theta, L, PolakRibiere, Cost> {
    if let Some(iters) = opts.restart_iters {
        solver = solver.restart_iters(iters);
    }
    if let Some(v) = opts.restart_orthogonality {
        solver = solver.restart_orthogonality(v);
    }
    solver
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::conjugate_gradient::traits::{LineSearcher, Tolerances};

    #[test]
    fn builders_accept_default_options() {
        let opts = CgOptions::default();
        assert!(build_ncg_more_thuente(&opts).is_ok());
        assert!(build_ncg_hager_zhang(&opts).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Ensure restart settings are accepted by both solver variants.
    //
    // Given
    // -----
    // - Options with a restart every 5 iterations and a 0.2 Powell threshold.
    //
    // Expect
    // ------
    // - Both builders return `Ok(_)`.
    fn builders_accept_restart_policy() {
        // Arrange
        let tols = Tolerances::new(1e-6, 20).unwrap();
        let opts = CgOptions::new(tols, LineSearcher::HagerZhang, 0.5, Some(5), Some(0.2), false)
            .unwrap();

        // Act / Assert
        assert!(build_ncg_hager_zhang(&opts).is_ok());
        assert!(build_ncg_more_thuente(&opts).is_ok());
    }
}
