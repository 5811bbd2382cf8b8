//! Penalty weights and the per-evaluation penalty breakdown.
//!
//! Purpose
//! -------
//! Hold the three scalars that weight the penalty terms of the penalized
//! least-squares objective and implement the rule that re-tunes the
//! orthogonality weight `b` between iterations.
//!
//! Key behaviors
//! -------------
//! - `a` (non-negativity/bound) and `c` (blood curve) are fixed at
//!   `global_max · 1e5` for the whole run.
//! - `b` (orthogonality) starts at 100, is re-seeded once from the first
//!   evaluation ([`PenaltyWeights::seed_orthogonality`]) and then follows a
//!   slow moving average ([`PenaltyWeights::rebalance`]).
//! - Both rules fall back to `b = 0.1` when the last orthogonality term is
//!   exactly zero.
//!
//! Conventions
//! -----------
//! - [`PenaltyTerms`] stores `neg`, `uni` and `blood` *after* weighting, so
//!   `total()` is the objective value.
use crate::fads::errors::{FadsError, FadsResult};

/// Scale applied to the global maximum to obtain `a` and `c`.
pub const PENALTY_SCALE: f64 = 1e5;

/// Orthogonality weight before the first evaluation.
pub const INITIAL_ORTHOGONALITY_WEIGHT: f64 = 100.0;

/// Orthogonality weight used when the orthogonality term vanishes; also the
/// fraction of `(ls + neg)` the orthogonality term is steered toward.
pub const ORTHOGONALITY_RESET: f64 = 0.1;

/// Weight of the previous `b` in the moving average (out of 10).
const MOVING_AVERAGE_KEEP: f64 = 9.0;

/// Penalty weights `{a, b, c}` for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyWeights {
    /// Non-negativity and coefficient upper-bound weight.
    pub a: f64,
    /// Orthogonality weight, re-tuned every iteration.
    pub b: f64,
    /// Blood-curve weight.
    pub c: f64,
}

impl PenaltyWeights {
    /// Initial weights for a data set whose largest intensity is
    /// `global_max`.
    ///
    /// Errors
    /// ------
    /// - `FadsError::InvalidPenaltyScale` if `global_max` is negative or not
    ///   finite (the penalties would reward violations).
    pub fn from_global_max(global_max: f64) -> FadsResult<Self> {
        if !global_max.is_finite() || global_max < 0.0 {
            return Err(FadsError::InvalidPenaltyScale { global_max });
        }
        let scale = global_max * PENALTY_SCALE;
        Ok(Self { a: scale, b: INITIAL_ORTHOGONALITY_WEIGHT, c: scale })
    }

    /// Target value for `b` given the latest terms, before averaging.
    fn steered_b(&self, terms: &PenaltyTerms) -> f64 {
        ORTHOGONALITY_RESET * self.b * (terms.ls + terms.neg) / terms.uni
    }

    /// One-off re-seeding of `b` after the evaluation at the starting point.
    pub fn seed_orthogonality(&mut self, terms: &PenaltyTerms) {
        self.b = if terms.uni == 0.0 { ORTHOGONALITY_RESET } else { self.steered_b(terms) };
    }

    /// Per-iteration update: `b ← (9·b + 0.1·b·(ls + neg)/uni) / 10`.
    pub fn rebalance(&mut self, terms: &PenaltyTerms) {
        self.b = if terms.uni == 0.0 {
            ORTHOGONALITY_RESET
        } else {
            (MOVING_AVERAGE_KEEP * self.b + self.steered_b(terms)) / (MOVING_AVERAGE_KEEP + 1.0)
        };
    }
}

/// Breakdown of the last objective evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PenaltyTerms {
    /// Sum of squared reconstruction residuals.
    pub ls: f64,
    /// Weighted non-negativity / upper-bound penalty.
    pub neg: f64,
    /// Weighted orthogonality penalty.
    pub uni: f64,
    /// Weighted blood-curve penalty.
    pub blood: f64,
}

impl PenaltyTerms {
    pub fn total(&self) -> f64 {
        self.ls + self.neg + self.uni + self.blood
    }
}
