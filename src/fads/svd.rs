//! SVD rank estimator.
//!
//! Purpose
//! -------
//! Give the caller an idea of how many factors a dynamic data set supports
//! before running the (expensive) penalized least-squares analysis: the
//! singular values of the `M × T` voxel/frame matrix show how much of the
//! signal each additional factor can explain.
//!
//! Key behaviors
//! -------------
//! - The voxel/frame matrix comes from [`frame_matrix`] and is copied into
//!   the column-major buffer nalgebra decomposes; allocation failure of
//!   either is reported rather than aborting.
//! - Singular values are returned in the order the decomposition yields
//!   them; no additional sorting happens here.
//! - When the data set has fewer voxels than frames the decomposition only
//!   has `M` singular values; the remaining `T − M` are exactly zero and are
//!   appended as such, so callers always receive `T` values.
use crate::{
    fads::errors::{FadsError, FadsResult},
    volume::{
        errors::VolumeError,
        matrix::{frame_matrix, try_zeroed},
        source::VoxelSource,
    },
};
use nalgebra::DMatrix;
use ndarray::Array1;
use tracing::warn;

/// Singular values of a data set and the largest factor count it admits.
#[derive(Debug, Clone, PartialEq)]
pub struct SvdFactors {
    /// One value per frame.
    pub singular_values: Array1<f64>,
    /// Upper bound on the factor count, `T`.
    pub num_factors: usize,
}

/// svd_factors — singular values of the voxel/frame matrix of `source`.
///
/// Errors
/// ------
/// - `FadsError::StaticVolume` if the data set has a single frame.
/// - `FadsError::AllocationFailed` if the `M × T` working matrix cannot be
///   allocated (including size overflow).
/// - `FadsError::SvdFailed` if the decomposition does not converge.
///
/// Each error is also emitted as a `tracing` warning.
pub fn svd_factors<V: VoxelSource + ?Sized>(source: &V) -> FadsResult<SvdFactors> {
    let dim = source.dim();
    if !dim.is_dynamic() {
        let err = FadsError::StaticVolume { num_frames: dim.t };
        warn!(data_set = source.name(), "{err}");
        return Err(err);
    }

    let (rows, cols) = (dim.num_voxels(), dim.t);
    let report = |e: VolumeError| {
        let err = FadsError::from(e);
        warn!(data_set = source.name(), rows, cols, "{err}");
        err
    };
    let a = frame_matrix(source).map_err(report)?;
    let mut buffer = try_zeroed("SVD working matrix", a.len()).map_err(report)?;

    // The transpose iterates A column by column.
    for (slot, &value) in buffer.iter_mut().zip(a.t().iter()) {
        *slot = value;
    }
    drop(a);
    let matrix = DMatrix::from_vec(rows, cols, buffer);

    let svd = matrix.try_svd(false, false, f64::EPSILON, 0).ok_or_else(|| {
        let err = FadsError::SvdFailed { rows, cols };
        warn!(data_set = source.name(), "{err}");
        err
    })?;

    let mut singular_values = Array1::zeros(cols);
    for (slot, &s) in singular_values.iter_mut().zip(svd.singular_values.iter()) {
        *slot = s;
    }
    Ok(SvdFactors { singular_values, num_factors: cols })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::{
        dataset::{DataSet, FrameTiming},
        geometry::VolumeGeometry,
    };
    use approx::assert_relative_eq;
    use ndarray::Array4;

    fn data_set(data: Array4<f64>) -> DataSet {
        let t = data.dim().0;
        DataSet::new("svd", data, FrameTiming::contiguous(t, 1.0), VolumeGeometry::default())
            .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // A rank-one volume has exactly one non-zero singular value.
    //
    // Given
    // -----
    // - 4 voxels with values u = (1, 2, 3, 4) scaled by v = (1, 0.5, 0.25)
    //   per frame.
    //
    // Expect
    // ------
    // - 3 singular values; the largest is ‖u‖·‖v‖, the others ≈ 0.
    // - `num_factors == 3`.
    fn rank_one_volume_has_one_significant_value() {
        // Arrange
        let v = [1.0, 0.5, 0.25];
        let data =
            Array4::from_shape_fn((3, 1, 2, 2), |(t, _, y, x)| (1 + 2 * y + x) as f64 * v[t]);
        let ds = data_set(data);

        // Act
        let result = svd_factors(&ds).unwrap();

        // Assert
        assert_eq!(result.num_factors, 3);
        assert_eq!(result.singular_values.len(), 3);
        let expected = 30.0_f64.sqrt() * (1.0_f64 + 0.25 + 0.0625).sqrt();
        let largest = result.singular_values.iter().copied().fold(0.0, f64::max);
        assert_relative_eq!(largest, expected, epsilon = 1e-10);
        let rest: f64 = result.singular_values.iter().map(|s| s.abs()).sum::<f64>() - largest;
        assert!(rest < 1e-10);
    }

    #[test]
    // Purpose
    // -------
    // The decomposed matrix has one row per voxel and one column per frame,
    // exactly as `frame_matrix` lays it out.
    //
    // Given
    // -----
    // - 3 voxels, 2 frames: voxel rows (1, 0), (0, 1), (1, 1), so
    //   AᵀA = [[2, 1], [1, 2]].
    //
    // Expect
    // ------
    // - Singular values {√3, 1}. A column-major misreading of the same
    //   numbers would give √(2 ± √2) instead.
    fn decomposes_voxel_rows_of_frame_matrix() {
        // Arrange
        let rows = [[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let data = Array4::from_shape_fn((2, 1, 1, 3), |(t, _, _, x)| rows[x][t]);

        // Act
        let result = svd_factors(&data_set(data)).unwrap();

        // Assert
        let mut values = result.singular_values.to_vec();
        values.sort_by(|a, b| b.total_cmp(a));
        assert_relative_eq!(values[0], 3.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(values[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn static_volume_is_rejected() {
        let ds = data_set(Array4::from_elem((1, 1, 2, 2), 1.0));
        assert_eq!(svd_factors(&ds), Err(FadsError::StaticVolume { num_frames: 1 }));
    }

    #[test]
    fn fewer_voxels_than_frames_pads_with_zeros() {
        let data = Array4::from_shape_fn((4, 1, 1, 2), |(t, _, _, x)| (t + x) as f64);
        let result = svd_factors(&data_set(data)).unwrap();
        assert_eq!(result.singular_values.len(), 4);
        assert_eq!(result.singular_values[2], 0.0);
        assert_eq!(result.singular_values[3], 0.0);
    }
}
