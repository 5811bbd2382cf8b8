//! Starting point for the penalized least-squares minimization.
//!
//! Factor curves are seeded with quasi-exponentials: even-numbered factors
//! decay, odd-numbered factors rise, both measured from the midpoint of the
//! first frame. The time constant starts at one hundredth of the study
//! duration and doubles after every rising factor. Each value is scaled by
//! the maximum of its frame. Every coefficient starts at `1/F`.
use crate::{
    fads::{
        core::layout::ParameterLayout,
        errors::{FadsError, FadsResult},
    },
    optimization::conjugate_gradient::types::Theta,
    volume::{matrix::try_zeroed, source::VoxelSource},
};

/// Fraction of the study duration used as the first time constant.
pub const TIME_CONSTANT_DIVISOR: f64 = 100.0;

/// End time of the last frame, which must be finite and > 0.
///
/// Errors
/// ------
/// - `FadsError::InvalidStudyDuration` otherwise (the time constant would
///   be zero or undefined).
pub fn study_duration<V: VoxelSource + ?Sized>(source: &V) -> FadsResult<f64> {
    let num_frames = source.dim().t;
    let end_time = match num_frames {
        0 => 0.0,
        t => source.frame_end(t - 1),
    };
    if !end_time.is_finite() || end_time <= 0.0 {
        return Err(FadsError::InvalidStudyDuration { end_time });
    }
    Ok(end_time)
}

/// Build the initial parameter vector for `layout`.
///
/// Errors
/// ------
/// - `FadsError::InvalidStudyDuration` (see [`study_duration`]).
/// - `FadsError::AllocationFailed` if the vector cannot be reserved.
pub fn initial_parameters<V: VoxelSource + ?Sized>(
    source: &V, layout: &ParameterLayout,
) -> FadsResult<Theta> {
    let mut time_constant = study_duration(source)? / TIME_CONSTANT_DIVISOR;
    let time_start = source.frame_midpoint(0);

    let mut theta = Theta::from(try_zeroed("parameter vector", layout.num_variables())?);

    for f in 0..layout.num_factors() {
        let rising = f % 2 == 1;
        for t in 0..layout.num_frames() {
            let decay = (-(source.frame_midpoint(t) - time_start) / time_constant).exp();
            let shape = if rising { 1.0 - decay } else { decay };
            theta[layout.factor_index(f, t)] = shape * source.frame_max(t);
        }
        if rising {
            time_constant *= 2.0;
        }
    }

    let init_value = 1.0 / layout.num_factors() as f64;
    theta.slice_mut(ndarray::s![layout.coef_offset()..]).fill(init_value);
    Ok(theta)
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

    fn ramp(frames: Vec<FrameTiming>) -> DataSet {
        let t = frames.len();
        let data =
            Array4::from_shape_fn((t, 1, 1, 2), |(t, _, _, x)| (t + 1) as f64 * (x + 1) as f64);
        DataSet::new("ramp", data, frames, VolumeGeometry::default()).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Check the seeding formulas on a small volume.
    //
    // Given
    // -----
    // - 3 contiguous 10 s frames (midpoints 5, 15, 25; study end 30 s).
    // - 2 voxels, frame maxima 2, 4, 6; F = 3.
    //
    // Expect
    // ------
    // - factor 0: e^{-(mid−5)/0.3}·max, factor 1: (1 − e^{-(mid−5)/0.3})·max,
    //   factor 2: e^{-(mid−5)/0.6}·max.
    // - Every coefficient equals 1/3.
    fn seeds_alternating_exponentials_and_uniform_coefficients() {
        // Arrange
        let ds = ramp(FrameTiming::contiguous(3, 10.0));
        let layout = ParameterLayout::new(ds.dim(), 3).unwrap();

        // Act
        let theta = initial_parameters(&ds, &layout).unwrap();

        // Assert
        let mids = [5.0, 15.0, 25.0];
        let maxes = [2.0, 4.0, 6.0];
        for t in 0..3 {
            let d1 = (-(mids[t] - 5.0) / 0.3_f64).exp();
            let d2 = (-(mids[t] - 5.0) / 0.6_f64).exp();
            assert_relative_eq!(theta[layout.factor_index(0, t)], d1 * maxes[t], epsilon = 1e-12);
            assert_relative_eq!(
                theta[layout.factor_index(1, t)],
                (1.0 - d1) * maxes[t],
                epsilon = 1e-12
            );
            assert_relative_eq!(theta[layout.factor_index(2, t)], d2 * maxes[t], epsilon = 1e-12);
        }
        for v in 0..2 {
            for f in 0..3 {
                assert_relative_eq!(theta[layout.coef_index(v, f)], 1.0 / 3.0);
            }
        }
    }

    #[test]
    fn zero_length_study_is_rejected() {
        let ds = ramp(vec![FrameTiming::new(0.0, 0.0), FrameTiming::new(0.0, 0.0)]);
        let layout = ParameterLayout::new(ds.dim(), 1).unwrap();
        assert_eq!(
            initial_parameters(&ds, &layout),
            Err(FadsError::InvalidStudyDuration { end_time: 0.0 })
        );
    }
}
