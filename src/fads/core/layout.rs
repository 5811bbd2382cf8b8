//! Parameter layout — how factor curves and voxel coefficients share one
//! flat optimizer vector.
//!
//! Purpose
//! -------
//! The minimizer works on a single vector `θ`. [`ParameterLayout`] fixes how
//! that vector is partitioned and hands out zero-copy 2-D views onto it, so
//! the objective and the result emitter never do index arithmetic by hand.
//!
//! Key behaviors
//! -------------
//! - `θ[.. coef_offset]` is the factor block, `F` rows of `T` contiguous
//!   values (`factor[f][t] = θ[f·T + t]`).
//! - `θ[coef_offset ..]` is the coefficient block, `M` rows of `F`
//!   contiguous values (`coef[v][f] = θ[coef_offset + v·F + f]`).
//! - `num_variables = F·(T + M)` and `coef_offset = F·T` always hold.
//!
//! Invariants & assumptions
//! ------------------------
//! - `1 ≤ F ≤ T` and `M ≥ 1` once a layout is constructed.
//! - Views are only taken from vectors of exactly `num_variables` entries;
//!   any other length is reported as `OptError::ParamLengthMismatch`.
use crate::{
    fads::errors::{FadsError, FadsResult},
    optimization::{
        conjugate_gradient::types::{Grad, Theta},
        errors::{OptError, OptResult},
    },
    volume::dims::VoxelDim,
};
use ndarray::{s, ArrayView2, ArrayViewMut2, Axis};

/// Shape of the flat parameter vector for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterLayout {
    num_voxels: usize,
    num_frames: usize,
    num_factors: usize,
}

impl ParameterLayout {
    /// Build the layout for `num_factors` factors over `dim`.
    ///
    /// Errors
    /// ------
    /// - `FadsError::ZeroFactors` if `num_factors == 0`.
    /// - `FadsError::TooManyFactors` if `num_factors > dim.t`.
    /// - `FadsError::AllocationFailed` if `F·(T + M)` overflows `usize`.
    pub fn new(dim: VoxelDim, num_factors: usize) -> FadsResult<Self> {
        if num_factors == 0 {
            return Err(FadsError::ZeroFactors);
        }
        if num_factors > dim.t {
            return Err(FadsError::TooManyFactors { num_factors, num_frames: dim.t });
        }
        let layout = Self { num_voxels: dim.num_voxels(), num_frames: dim.t, num_factors };
        dim.t
            .checked_add(layout.num_voxels)
            .and_then(|per_factor| per_factor.checked_mul(num_factors))
            .ok_or(FadsError::AllocationFailed { what: "parameter vector", len: usize::MAX })?;
        Ok(layout)
    }

    pub fn num_voxels(&self) -> usize {
        self.num_voxels
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn num_factors(&self) -> usize {
        self.num_factors
    }

    /// Index of the first coefficient, `F·T`.
    pub fn coef_offset(&self) -> usize {
        self.num_factors * self.num_frames
    }

    /// Total parameter count, `F·(T + M)`.
    pub fn num_variables(&self) -> usize {
        self.num_factors * (self.num_frames + self.num_voxels)
    }

    /// Position of `factor[f][t]` in `θ`.
    pub fn factor_index(&self, factor: usize, frame: usize) -> usize {
        factor * self.num_frames + frame
    }

    /// Position of `coef[voxel][f]` in `θ`.
    pub fn coef_index(&self, voxel: usize, factor: usize) -> usize {
        self.coef_offset() + voxel * self.num_factors + factor
    }

    fn check_len(&self, len: usize) -> OptResult<()> {
        if len != self.num_variables() {
            return Err(OptError::ParamLengthMismatch {
                expected: self.num_variables(),
                actual: len,
            });
        }
        Ok(())
    }

    /// `F × T` view of the factor block.
    ///
    /// Errors
    /// ------
    /// - `OptError::ParamLengthMismatch` for a vector of the wrong length.
    pub fn factors<'t>(&self, theta: &'t Theta) -> OptResult<ArrayView2<'t, f64>> {
        self.check_len(theta.len())?;
        theta
            .slice(s![..self.coef_offset()])
            .into_shape((self.num_factors, self.num_frames))
            .map_err(|e| OptError::ParamShape { what: "factor block", text: e.to_string() })
    }

    /// `M × F` view of the coefficient block.
    ///
    /// Errors
    /// ------
    /// - `OptError::ParamLengthMismatch` for a vector of the wrong length.
    pub fn coefficients<'t>(&self, theta: &'t Theta) -> OptResult<ArrayView2<'t, f64>> {
        self.check_len(theta.len())?;
        theta
            .slice(s![self.coef_offset()..])
            .into_shape((self.num_voxels, self.num_factors))
            .map_err(|e| OptError::ParamShape { what: "coefficient block", text: e.to_string() })
    }

    /// Mutable `(F × T, M × F)` views of both blocks of a gradient (or any
    /// vector with this layout).
    pub fn split_mut<'g>(
        &self, grad: &'g mut Grad,
    ) -> OptResult<(ArrayViewMut2<'g, f64>, ArrayViewMut2<'g, f64>)> {
        self.check_len(grad.len())?;
        let (factor_block, coef_block) = grad.view_mut().split_at(Axis(0), self.coef_offset());
        let factors = factor_block
            .into_shape((self.num_factors, self.num_frames))
            .map_err(|e| OptError::ParamShape { what: "factor block", text: e.to_string() })?;
        let coefs = coef_block
            .into_shape((self.num_voxels, self.num_factors))
            .map_err(|e| OptError::ParamShape { what: "coefficient block", text: e.to_string() })?;
        Ok((factors, coefs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Size bookkeeping (`num_variables`, `coef_offset`) across shapes.
    // - Factor-count validation.
    // - Index mapping agreement between the 2-D views and the index helpers.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `num_variables = F·(T + M)` and `coef_offset = F·T` for every valid F.
    //
    // Given
    // -----
    // - A 3×2×2 volume with 5 frames, F = 1..=5.
    //
    // Expect
    // ------
    // - Both identities hold, and the sum of block sizes is `num_variables`.
    fn sizes_follow_factor_and_voxel_counts() {
        let dim = VoxelDim::new(3, 2, 2, 5);
        for f in 1..=5 {
            let layout = ParameterLayout::new(dim, f).unwrap();
            assert_eq!(layout.num_variables(), f * (5 + 12));
            assert_eq!(layout.coef_offset(), f * 5);
            assert_eq!(layout.num_variables(), layout.coef_offset() + 12 * f);
        }
    }

    #[test]
    fn factor_count_must_lie_in_one_to_t() {
        let dim = VoxelDim::new(2, 2, 1, 3);
        assert_eq!(ParameterLayout::new(dim, 0), Err(FadsError::ZeroFactors));
        assert_eq!(
            ParameterLayout::new(dim, 4),
            Err(FadsError::TooManyFactors { num_factors: 4, num_frames: 3 })
        );
    }

    #[test]
    // Purpose
    // -------
    // The views must address the same entries as `factor_index` /
    // `coef_index`.
    //
    // Given
    // -----
    // - F = 2, T = 3, M = 4 and θᵢ = i.
    //
    // Expect
    // ------
    // - `factors[[f, t]] == θ[factor_index(f, t)]` and
    //   `coefs[[v, f]] == θ[coef_index(v, f)]`; writes through `split_mut`
    //   land on the same indices.
    fn views_agree_with_index_helpers() {
        // Arrange
        let layout = ParameterLayout::new(VoxelDim::new(2, 2, 1, 3), 2).unwrap();
        let theta = Array1::from_iter((0..layout.num_variables()).map(|i| i as f64));

        // Act
        let factors = layout.factors(&theta).unwrap();
        let coefs = layout.coefficients(&theta).unwrap();

        // Assert
        for f in 0..2 {
            for t in 0..3 {
                assert_eq!(factors[[f, t]], layout.factor_index(f, t) as f64);
            }
            for v in 0..4 {
                assert_eq!(coefs[[v, f]], layout.coef_index(v, f) as f64);
            }
        }

        let mut grad = Array1::zeros(layout.num_variables());
        {
            let (mut gf, mut gc) = layout.split_mut(&mut grad).unwrap();
            gf[[1, 2]] = 7.0;
            gc[[3, 0]] = 9.0;
        }
        assert_eq!(grad[layout.factor_index(1, 2)], 7.0);
        assert_eq!(grad[layout.coef_index(3, 0)], 9.0);
    }

    #[test]
    fn views_reject_wrong_length() {
        let layout = ParameterLayout::new(VoxelDim::new(1, 1, 1, 2), 1).unwrap();
        let theta = Array1::zeros(2);
        assert!(matches!(
            layout.factors(&theta),
            Err(OptError::ParamLengthMismatch { expected: 3, actual: 2 })
        ));
    }
}
