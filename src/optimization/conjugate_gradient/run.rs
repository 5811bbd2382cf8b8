//! Step-wise execution of an `argmin` solver.
//!
//! `argmin`'s `Executor` owns the iteration loop, which leaves no room for a
//! caller that must act between iterations (re-tune run-scoped objective
//! state, report progress, honor cancellation). [`CgMinimizer`] performs the
//! same bookkeeping as the executor (function counters, best-so-far update,
//! iteration counter, optional observer) but advances exactly one iteration
//! per [`CgMinimizer::step`] call.
//!
//! Argmin's line searches refuse (More–Thuente) or mishandle (Hager–Zhang)
//! a search direction that is not a descent direction, which Polak–Ribière
//! updates can produce. A failed iteration is therefore retried once from
//! steepest descent at the same point before the failure is reported.
use crate::optimization::{
    conjugate_gradient::{
        adapter::ArgMinAdapter,
        traits::{CgOptions, Objective},
        types::{CgState, FnEvalMap, Theta},
    },
    errors::{OptError, OptResult},
};
use argmin::core::{Problem, Solver, State, KV};
use argmin_math::ArgminL2Norm;
use tracing::debug;

/// Result of a single successful iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Gradient norm still at or above the tolerance.
    Continue,
    /// Gradient norm dropped below the tolerance.
    Converged,
}

/// A solver paused between iterations.
///
/// Invariants
/// ----------
/// - After construction the state holds a parameter vector, its cost and
///   its gradient (the solver's `init` computes them).
/// - A failed [`step`](CgMinimizer::step) leaves the previous state intact,
///   so the last good parameter vector is always available.
/// - `pristine` is the solver as configured, before any `init`; cloning it
///   gives a solver whose next direction is steepest descent.
/// - `adapter` refills `problem` when a failed line search dropped it along
///   with the solver's inner executor.
pub struct CgMinimizer<'a, O: Objective, S> {
    problem: Problem<ArgMinAdapter<'a, O>>,
    adapter: ArgMinAdapter<'a, O>,
    solver: S,
    pristine: S,
    state: CgState,
    tol_grad: f64,
    restarts: u64,
    #[cfg(feature = "obs_slog")]
    observer: Option<argmin_observer_slog::SlogLogger>,
}

impl<'a, O, S> CgMinimizer<'a, O, S>
where
    O: Objective,
    S: Solver<ArgMinAdapter<'a, O>, CgState> + Clone,
{
    /// Initialize `solver` at `theta0`.
    ///
    /// Validates `theta0` through [`Objective::check`], then runs the
    /// solver's `init` (one cost and one gradient evaluation for nonlinear
    /// CG).
    ///
    /// # Errors
    /// - Propagates errors from `check`.
    /// - Propagates Argmin/objective errors raised during `init`.
    pub fn new(
        problem: ArgMinAdapter<'a, O>, mut solver: S, theta0: Theta, opts: &CgOptions,
    ) -> OptResult<Self> {
        problem.f.check(&theta0, problem.data)?;
        let adapter = problem.clone();
        let mut problem = Problem::new(problem);
        let pristine = solver.clone();
        let (mut state, kv) = solver.init(&mut problem, CgState::new().param(theta0))?;
        state.func_counts(&problem);
        state.update();

        #[cfg(feature = "obs_slog")]
        let observer = if opts.verbose {
            use argmin::core::observers::Observe;
            let mut logger = argmin_observer_slog::SlogLogger::term_noblock();
            logger.observe_init(S::NAME, &state, &kv.unwrap_or_else(KV::new))?;
            Some(logger)
        } else {
            None
        };
        #[cfg(not(feature = "obs_slog"))]
        let _ = kv;

        Ok(Self {
            problem,
            adapter,
            solver,
            pristine,
            state,
            tol_grad: opts.tols.tol_grad,
            restarts: 0,
            #[cfg(feature = "obs_slog")]
            observer,
        })
    }

    /// Advance one iteration (line search + direction update).
    ///
    /// # Returns
    /// - `StepOutcome::Converged` when the new gradient norm is below the
    ///   tolerance, `StepOutcome::Continue` otherwise.
    ///
    /// If the iteration fails along the conjugate direction, the solver is
    /// re-initialized at the current point (direction `-g`) and the
    /// iteration is attempted once more.
    ///
    /// # Errors
    /// - The Argmin or objective error of the retried iteration, e.g. a line
    ///   search that cannot make progress even along steepest descent. The
    ///   minimizer keeps its previous state in that case.
    pub fn step(&mut self) -> OptResult<StepOutcome> {
        let (mut next, kv) = match self.solver.next_iter(&mut self.problem, self.state.clone()) {
            Ok(result) => result,
            Err(err) => {
                debug!(
                    iteration = self.state.get_iter(),
                    "restarting from steepest descent after failed iteration: {err}"
                );
                self.restart()?;
                let retried = self.solver.next_iter(&mut self.problem, self.state.clone());
                self.reclaim_problem();
                retried?
            }
        };
        next.func_counts(&self.problem);
        next.update();
        next.increment_iter();

        #[cfg(feature = "obs_slog")]
        if let Some(observer) = self.observer.as_mut() {
            use argmin::core::observers::Observe;
            observer.observe_iter(&next, &kv.unwrap_or_else(KV::new))?;
        }
        #[cfg(not(feature = "obs_slog"))]
        let _: Option<KV> = kv;

        self.state = next;
        match self.grad_norm() {
            Some(norm) if norm < self.tol_grad => Ok(StepOutcome::Converged),
            _ => Ok(StepOutcome::Continue),
        }
    }

    /// Replace the solver with a fresh copy initialized at the current
    /// point. Cost, gradient and direction are recomputed there.
    fn restart(&mut self) -> OptResult<()> {
        self.reclaim_problem();
        let mut solver = self.pristine.clone();
        let (mut state, _) = solver.init(&mut self.problem, self.state.clone())?;
        state.func_counts(&self.problem);
        self.solver = solver;
        self.state = state;
        self.restarts += 1;
        Ok(())
    }

    fn reclaim_problem(&mut self) {
        if self.problem.problem.is_none() {
            self.problem.problem = Some(self.adapter.clone());
        }
    }

    /// Current parameter vector.
    pub fn param(&self) -> OptResult<&Theta> {
        self.state.get_param().ok_or(OptError::MissingParam)
    }

    /// Consume the minimizer and return the current parameter vector.
    pub fn into_param(mut self) -> OptResult<Theta> {
        self.state.take_param().ok_or(OptError::MissingParam)
    }

    /// Objective value at the current parameter vector.
    pub fn cost(&self) -> f64 {
        self.state.get_cost()
    }

    /// L2 norm of the gradient at the current parameter vector.
    pub fn grad_norm(&self) -> Option<f64> {
        self.state.get_gradient().map(|g| g.l2_norm())
    }

    /// Completed iterations.
    pub fn iterations(&self) -> u64 {
        self.state.get_iter()
    }

    /// Steepest-descent restarts taken after failed iterations.
    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    /// Function-evaluation counters (cost, gradient).
    pub fn fn_evals(&self) -> FnEvalMap {
        self.state.get_func_counts().clone()
    }
}
