//! Spatial placement of a volume: offset, orientation axes, voxel size and
//! acquisition modality.
//!
//! Derived images (one per extracted factor) copy this wholesale from their
//! source data set so that they overlay it exactly in the viewer.
use crate::volume::errors::{VolumeError, VolumeResult};
use std::fmt;

/// Imaging modality of a data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modality {
    #[default]
    Pet,
    Spect,
    Ct,
    Mri,
    Other,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Modality::Pet => "PET",
            Modality::Spect => "SPECT",
            Modality::Ct => "CT",
            Modality::Mri => "MRI",
            Modality::Other => "Other",
        };
        f.write_str(name)
    }
}

/// `VolumeGeometry` — placement of a volume in world space.
///
/// Fields
/// ------
/// - `offset`: world coordinates (mm) of the volume origin.
/// - `axes`: orthonormal orientation axes, one row per spatial axis.
/// - `voxel_size`: edge lengths (mm) along x, y, z; finite and > 0.
/// - `modality`: acquisition modality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeGeometry {
    pub offset: [f64; 3],
    pub axes: [[f64; 3]; 3],
    pub voxel_size: [f64; 3],
    pub modality: Modality,
}

impl VolumeGeometry {
    /// Construct a validated geometry.
    ///
    /// # Errors
    /// - [`VolumeError::InvalidVoxelSize`] if any voxel edge is non-finite or
    ///   not strictly positive.
    pub fn new(
        offset: [f64; 3], axes: [[f64; 3]; 3], voxel_size: [f64; 3], modality: Modality,
    ) -> VolumeResult<Self> {
        for (axis, &value) in ['x', 'y', 'z'].iter().zip(voxel_size.iter()) {
            if !value.is_finite() || value <= 0.0 {
                return Err(VolumeError::InvalidVoxelSize { axis: *axis, value });
            }
        }
        Ok(Self { offset, axes, voxel_size, modality })
    }

    /// World-space position of the far corner of a volume with the given
    /// spatial extents.
    pub fn far_corner(&self, extents: [usize; 3]) -> [f64; 3] {
        let mut corner = self.offset;
        for (axis, row) in self.axes.iter().enumerate() {
            let length = extents[axis] as f64 * self.voxel_size[axis];
            for (c, &component) in corner.iter_mut().zip(row.iter()) {
                *c += component * length;
            }
        }
        corner
    }
}

impl Default for VolumeGeometry {
    fn default() -> Self {
        Self {
            offset: [0.0; 3],
            axes: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            voxel_size: [1.0; 3],
            modality: Modality::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_voxel_size() {
        let err = VolumeGeometry::new([0.0; 3], VolumeGeometry::default().axes, [1.0, 0.0, 1.0], Modality::Ct)
            .unwrap_err();
        assert_eq!(err, VolumeError::InvalidVoxelSize { axis: 'y', value: 0.0 });
    }

    #[test]
    fn far_corner_scales_extents_by_voxel_size() {
        let geometry = VolumeGeometry::new(
            [10.0, 0.0, -5.0],
            VolumeGeometry::default().axes,
            [2.0, 1.5, 3.0],
            Modality::Pet,
        )
        .unwrap();
        assert_eq!(geometry.far_corner([4, 2, 1]), [18.0, 3.0, -2.0]);
    }
}
