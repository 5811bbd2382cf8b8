//! Single-frame derived images.
//!
//! A [`FactorImage`] holds one scalar per spatial voxel (for example the
//! mixing coefficient of one factor), the geometry copied from its source
//! data set, and display thresholds initialised to its value range.
use crate::volume::{
    dims::VoxelDim,
    errors::{VolumeError, VolumeResult},
    geometry::VolumeGeometry,
};
use ndarray::Array3;

/// `FactorImage` — a named single-frame volume.
///
/// Fields
/// ------
/// - `name`: display name (e.g. `"factor 1"`).
/// - `dim`: spatial extents of the source with `t == 1`.
/// - `data`: values indexed `[z, y, x]`.
/// - `geometry`: placement copied from the source data set.
/// - `global_max` / `global_min`: value range of `data`.
/// - `threshold_min` / `threshold_max`: display window, `[min, max]` on
///   construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorImage {
    pub name: String,
    pub dim: VoxelDim,
    pub data: Array3<f64>,
    pub geometry: VolumeGeometry,
    pub global_max: f64,
    pub global_min: f64,
    pub threshold_min: f64,
    pub threshold_max: f64,
}

impl FactorImage {
    /// Build an image from values listed in flattened (z, y, x) order.
    ///
    /// # Errors
    /// - [`VolumeError::DataLengthMismatch`] if `values` does not hold
    ///   exactly `dim.num_voxels()` entries.
    /// - [`VolumeError::AllocationFailed`] if the voxel buffer cannot be
    ///   reserved.
    pub fn from_values<I>(
        name: impl Into<String>, dim: VoxelDim, geometry: VolumeGeometry, values: I,
    ) -> VolumeResult<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let len = dim.num_voxels();
        let mut buffer: Vec<f64> = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|_| VolumeError::AllocationFailed { what: "factor image", len })?;
        buffer.extend(values);
        if buffer.len() != len {
            return Err(VolumeError::DataLengthMismatch { expected: len, actual: buffer.len() });
        }
        let data = Array3::from_shape_vec((dim.z, dim.y, dim.x), buffer)
            .map_err(|_| VolumeError::DataLengthMismatch { expected: len, actual: len })?;

        let (global_min, global_max) = data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        Ok(Self {
            name: name.into(),
            dim: dim.single_frame(),
            data,
            geometry,
            global_max,
            global_min,
            threshold_min: global_min,
            threshold_max: global_max,
        })
    }

    /// World-space far corner of the image.
    pub fn far_corner(&self) -> [f64; 3] {
        self.geometry.far_corner([self.dim.x, self.dim.y, self.dim.z])
    }
}
