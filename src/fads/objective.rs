//! Penalized least-squares objective for factor analysis of dynamic
//! structures.
//!
//! Purpose
//! -------
//! Evaluate the combined cost of a factor/coefficient pair and its analytic
//! gradient. With `Φ` the `F × T` factor block, `C` the `M × F` coefficient
//! block and `A` the observed `M × T` voxel/frame matrix:
//!
//! - `ls    = ‖C·Φ − A‖²`
//! - `neg   = a · (Σ_{θᵢ<0} θᵢ² + Σ_{C[v,f]>1} (C[v,f] − 1)²)`
//! - `uni   = b · Σ_{f<q} (Σ_v C[v,f] + C[v,q]) / (‖C[·,f]‖·‖C[·,q]‖)`
//! - `blood = c · Σ_k (Φ[0, frame_k] − target_k)²`
//!
//! Key behaviors
//! -------------
//! - The least-squares term and its gradient use dense matrix products on
//!   views of `θ` (`∂ls/∂Φ = 2·Cᵀ·R`, `∂ls/∂C = 2·R·Φᵀ` with `R = C·Φ − A`).
//!   The residual buffer is allocated once per run and reused.
//! - The orthogonality term is a sum over pairs divided by the product of
//!   column norms, not a cosine similarity. Its gradient is the closed form
//!   `0.5·b·(Σ_{f≠q} C[v,f]/‖C[·,f]‖)·(1/‖C[·,q]‖ − 0.5·C[v,q]²/‖C[·,q]‖³)`,
//!   which is not the exact derivative of `uni`.
//! - Every value evaluation stores its weighted breakdown in
//!   [`PenaltyTerms`], read back by the driver to re-tune `b`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `θ` has `layout.num_variables()` entries (checked).
//! - Column norms of `C` are not floored; a zero-norm factor yields a
//!   non-finite cost or gradient, which the minimizer adapter rejects.
//! - Weights and terms live in `Cell`s: the objective is driven from a single
//!   thread and mutated only between minimizer iterations.
use crate::{
    fads::{
        core::{
            constraints::BloodCurveConstraints,
            layout::ParameterLayout,
            weights::{PenaltyTerms, PenaltyWeights},
        },
        errors::{FadsError, FadsResult},
    },
    optimization::{
        conjugate_gradient::{
            traits::Objective,
            types::{Cost, Grad, Theta},
            validation::validate_param,
        },
        errors::{OptError, OptResult},
    },
    volume::{
        matrix::{checked_len, frame_matrix, try_zeroed},
        source::VoxelSource,
    },
};
use ndarray::{linalg::general_mat_mul, s, Array1, Array2, ArrayView2, Axis};
use std::cell::{Cell, RefCell};

/// Fixed inputs of one run: the observed matrix, the layout and the
/// blood-curve samples.
#[derive(Debug, Clone, PartialEq)]
pub struct PlsData {
    observed: Array2<f64>,
    layout: ParameterLayout,
    blood_curve: BloodCurveConstraints,
}

impl PlsData {
    /// Errors
    /// ------
    /// - `FadsError::Optimization(OptError::ParamShape)` if `observed` is not
    ///   `M × T` for `layout`.
    /// - `FadsError::BloodFrameOutOfRange` for a constraint frame ≥ T.
    pub fn new(
        observed: Array2<f64>, layout: ParameterLayout, blood_curve: BloodCurveConstraints,
    ) -> FadsResult<Self> {
        if observed.dim() != (layout.num_voxels(), layout.num_frames()) {
            return Err(OptError::ParamShape {
                what: "observed matrix",
                text: format!(
                    "expected {}x{}, got {}x{}",
                    layout.num_voxels(),
                    layout.num_frames(),
                    observed.nrows(),
                    observed.ncols()
                ),
            }
            .into());
        }
        blood_curve.validate_frames(layout.num_frames())?;
        Ok(Self { observed, layout, blood_curve })
    }

    /// Copy `source` into an `M × T` matrix and wrap it.
    ///
    /// Errors
    /// ------
    /// - `FadsError::AllocationFailed` if the matrix cannot be allocated.
    /// - As for [`PlsData::new`].
    pub fn from_source<V: VoxelSource + ?Sized>(
        source: &V, layout: ParameterLayout, blood_curve: BloodCurveConstraints,
    ) -> FadsResult<Self> {
        Self::new(frame_matrix(source)?, layout, blood_curve)
    }

    pub fn observed(&self) -> &Array2<f64> {
        &self.observed
    }

    pub fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    pub fn blood_curve(&self) -> &BloodCurveConstraints {
        &self.blood_curve
    }
}

/// Penalized least-squares objective with run-scoped weights.
#[derive(Debug)]
pub struct PlsObjective {
    weights: Cell<PenaltyWeights>,
    terms: Cell<PenaltyTerms>,
    residual: RefCell<Array2<f64>>,
}

impl PlsObjective {
    /// Errors
    /// ------
    /// - `FadsError::AllocationFailed` if the `M × T` residual buffer cannot
    ///   be allocated.
    pub fn new(weights: PenaltyWeights, layout: &ParameterLayout) -> FadsResult<Self> {
        let shape = (layout.num_voxels(), layout.num_frames());
        let len = checked_len("residual matrix", shape.0, shape.1)?;
        let residual = Array2::from_shape_vec(shape, try_zeroed("residual matrix", len)?)
            .map_err(|_| FadsError::AllocationFailed { what: "residual matrix", len })?;
        Ok(Self {
            weights: Cell::new(weights),
            terms: Cell::new(PenaltyTerms::default()),
            residual: RefCell::new(residual),
        })
    }

    pub fn weights(&self) -> PenaltyWeights {
        self.weights.get()
    }

    pub fn set_weights(&self, weights: PenaltyWeights) {
        self.weights.set(weights);
    }

    /// Breakdown of the most recent value evaluation.
    pub fn terms(&self) -> PenaltyTerms {
        self.terms.get()
    }

    /// Re-seed `b` from the most recent evaluation (used once, at the
    /// starting point).
    pub fn seed_orthogonality(&self) {
        let mut weights = self.weights.get();
        weights.seed_orthogonality(&self.terms.get());
        self.weights.set(weights);
    }

    /// Apply the per-iteration moving-average update of `b`.
    pub fn rebalance(&self) {
        let mut weights = self.weights.get();
        weights.rebalance(&self.terms.get());
        self.weights.set(weights);
    }

    /// Fill the residual buffer with `C·Φ − A`.
    fn fill_residual(
        &self, factors: &ArrayView2<f64>, coefs: &ArrayView2<f64>, data: &PlsData,
        residual: &mut Array2<f64>,
    ) {
        residual.assign(&data.observed);
        general_mat_mul(1.0, coefs, factors, -1.0, residual);
    }
}

/// Column norms `‖C[·,f]‖` of the coefficient block.
fn factor_norms(coefs: &ArrayView2<f64>) -> Array1<f64> {
    coefs.map_axis(Axis(0), |column| column.dot(&column).sqrt())
}

/// Unweighted non-negativity and coefficient upper-bound penalty.
fn bound_penalty(theta: &Theta, coef_offset: usize) -> f64 {
    let negative: f64 = theta.iter().filter(|&&v| v < 0.0).map(|v| v * v).sum();
    let above_one: f64 = theta
        .slice(s![coef_offset..])
        .iter()
        .filter(|&&v| v > 1.0)
        .map(|v| (v - 1.0) * (v - 1.0))
        .sum();
    negative + above_one
}

/// Unweighted orthogonality penalty.
fn orthogonality(coefs: &ArrayView2<f64>, norms: &Array1<f64>) -> f64 {
    let column_sums = coefs.sum_axis(Axis(0));
    let num_factors = norms.len();
    let mut total = 0.0;
    for f in 0..num_factors {
        for q in (f + 1)..num_factors {
            total += (column_sums[f] + column_sums[q]) / (norms[f] * norms[q]);
        }
    }
    total
}

fn blood_sample(factors: &ArrayView2<f64>, frame: usize) -> OptResult<f64> {
    factors.get((0, frame)).copied().ok_or_else(|| OptError::ParamShape {
        what: "blood-curve constraint",
        text: format!("frame {frame} outside 0..{}", factors.ncols()),
    })
}

/// Unweighted blood-curve penalty.
fn blood_penalty(factors: &ArrayView2<f64>, blood_curve: &BloodCurveConstraints) -> OptResult<f64> {
    blood_curve.iter().try_fold(0.0, |acc, c| {
        let diff = blood_sample(factors, c.frame)? - c.target;
        Ok(acc + diff * diff)
    })
}

impl Objective for PlsObjective {
    type Data = PlsData;

    /// Combined objective `ls + neg + uni + blood`; records the breakdown.
    fn value(&self, theta: &Theta, data: &PlsData) -> OptResult<Cost> {
        let layout = &data.layout;
        let factors = layout.factors(theta)?;
        let coefs = layout.coefficients(theta)?;
        let weights = self.weights.get();

        let ls = {
            let mut residual = self.residual.borrow_mut();
            self.fill_residual(&factors, &coefs, data, &mut residual);
            residual.iter().map(|r| r * r).sum::<f64>()
        };
        let neg = weights.a * bound_penalty(theta, layout.coef_offset());
        let uni = weights.b * orthogonality(&coefs, &factor_norms(&coefs));
        let blood = weights.c * blood_penalty(&factors, &data.blood_curve)?;

        let terms = PenaltyTerms { ls, neg, uni, blood };
        self.terms.set(terms);
        Ok(terms.total())
    }

    fn grad(&self, theta: &Theta, data: &PlsData) -> OptResult<Grad> {
        let layout = &data.layout;
        let factors = layout.factors(theta)?;
        let coefs = layout.coefficients(theta)?;
        let weights = self.weights.get();

        let mut grad = Grad::zeros(theta.len());
        {
            let (mut grad_factors, mut grad_coefs) = layout.split_mut(&mut grad)?;
            let residual = {
                let mut residual = self.residual.borrow_mut();
                self.fill_residual(&factors, &coefs, data, &mut residual);
                residual
            };

            // least squares
            general_mat_mul(2.0, &coefs.t(), &*residual, 0.0, &mut grad_factors);
            general_mat_mul(2.0, &*residual, &factors.t(), 0.0, &mut grad_coefs);
            drop(residual);

            // non-negativity on factors (no upper bound)
            grad_factors.zip_mut_with(&factors, |g, &v| {
                if v < 0.0 {
                    *g += 2.0 * weights.a * v;
                }
            });

            for c in data.blood_curve.iter() {
                let value = blood_sample(&factors, c.frame)?;
                grad_factors[[0, c.frame]] += 2.0 * weights.c * (value - c.target);
            }

            // non-negativity and upper bound on coefficients
            grad_coefs.zip_mut_with(&coefs, |g, &v| {
                if v < 0.0 {
                    *g += 2.0 * weights.a * v;
                } else if v > 1.0 {
                    *g += 2.0 * weights.a * (v - 1.0);
                }
            });

            if layout.num_factors() > 1 {
                let norms = factor_norms(&coefs);
                let inv_norms = norms.mapv(f64::recip);
                for (mut g_row, c_row) in grad_coefs.outer_iter_mut().zip(coefs.outer_iter()) {
                    let scaled_sum = c_row.dot(&inv_norms);
                    for q in 0..layout.num_factors() {
                        let others = scaled_sum - c_row[q] * inv_norms[q];
                        let norm = norms[q];
                        let shape = 1.0 / norm - 0.5 * c_row[q] * c_row[q] / (norm * norm * norm);
                        g_row[q] += 0.5 * weights.b * others * shape;
                    }
                }
            }
        }
        Ok(grad)
    }

    /// Validate `θ` (length, finiteness) and the observed matrix shape.
    fn check(&self, theta: &Theta, data: &PlsData) -> OptResult<()> {
        validate_param(theta, data.layout.num_variables())?;
        let expected = (data.layout.num_voxels(), data.layout.num_frames());
        if self.residual.borrow().dim() != expected {
            return Err(OptError::ParamShape {
                what: "residual matrix",
                text: format!("expected {}x{}", expected.0, expected.1),
            });
        }
        Ok(())
    }
}
