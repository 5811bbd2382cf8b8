//! Per-factor output images.
//!
//! One single-frame image per factor, holding that factor's coefficient in
//! every voxel, named `"factor N"` (1-based), carrying the source geometry
//! and thresholds set to its own value range. Images are attached to the
//! source as they are built; a failure part-way leaves the earlier ones
//! attached.
use crate::{
    fads::errors::FadsResult,
    volume::{
        image::FactorImage,
        source::{DerivedImageSink, VoxelSource},
    },
};
use ndarray::ArrayView2;

/// Display name of the image for 0-based factor `factor`.
pub fn factor_image_name(factor: usize) -> String {
    format!("factor {}", factor + 1)
}

/// Build and attach one image per column of `coefficients` (`M × F`).
///
/// Returns the number of images attached.
///
/// Errors
/// ------
/// - `FadsError::AllocationFailed` if an image buffer cannot be allocated.
/// - `FadsError::Volume` if `coefficients` does not have one row per voxel.
pub fn attach_factor_images<D>(
    data_set: &mut D, coefficients: &ArrayView2<f64>,
) -> FadsResult<usize>
where
    D: VoxelSource + DerivedImageSink + ?Sized,
{
    let dim = data_set.dim();
    let geometry = *data_set.geometry();
    for (f, column) in coefficients.columns().into_iter().enumerate() {
        let image =
            FactorImage::from_values(factor_image_name(f), dim, geometry, column.iter().copied())?;
        data_set.attach_child(image);
    }
    Ok(coefficients.ncols())
}
