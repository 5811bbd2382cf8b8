//! Voxel×frame matrix view of a dynamic volume.
//!
//! Both the SVD rank estimator and the penalized least-squares objective
//! work on the `M × T` matrix `A[i, t]` where `i` runs over the `M = x·y·z`
//! spatial voxels in (z, y, x) order with `x` fastest and `t` over frames.
use crate::volume::{
    errors::{VolumeError, VolumeResult},
    source::VoxelSource,
};
use ndarray::Array2;

/// Reserve a zero-initialised `len`-element buffer without aborting on
/// allocation failure.
pub(crate) fn try_zeroed(what: &'static str, len: usize) -> VolumeResult<Vec<f64>> {
    let mut buffer: Vec<f64> = Vec::new();
    buffer.try_reserve_exact(len).map_err(|_| VolumeError::AllocationFailed { what, len })?;
    buffer.resize(len, 0.0);
    Ok(buffer)
}

/// Number of elements in an `rows × cols` matrix, with overflow reported as
/// an allocation failure.
pub(crate) fn checked_len(what: &'static str, rows: usize, cols: usize) -> VolumeResult<usize> {
    rows.checked_mul(cols).ok_or(VolumeError::AllocationFailed { what, len: usize::MAX })
}

/// frame_matrix — copy a volume into an `M × T` row-major matrix.
///
/// Returns
/// -------
/// `VolumeResult<Array2<f64>>` with `A[[i, t]]` the intensity of the `i`-th
/// spatial voxel in frame `t`.
///
/// Errors
/// ------
/// - [`VolumeError::AllocationFailed`] if the `M × T` buffer cannot be
///   reserved (including size overflow).
pub fn frame_matrix<V: VoxelSource + ?Sized>(source: &V) -> VolumeResult<Array2<f64>> {
    let dim = source.dim();
    let m = dim.num_voxels();
    let len = checked_len("voxel/frame matrix", m, dim.t)?;
    let buffer = try_zeroed("voxel/frame matrix", len)?;
    let mut matrix = Array2::from_shape_vec((m, dim.t), buffer)
        .map_err(|_| VolumeError::DataLengthMismatch { expected: len, actual: len })?;

    for t in 0..dim.t {
        for (i, voxel) in dim.voxels_in_frame(t).enumerate() {
            matrix[[i, t]] = source.value(voxel);
        }
    }
    Ok(matrix)
}
