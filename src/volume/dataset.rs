//! In-memory dynamic data set.
//!
//! Purpose
//! -------
//! Provide a validated, owned 4-D volume that implements both collaborator
//! traits ([`VoxelSource`] and [`DerivedImageSink`]). Hosts that already
//! own their voxel storage can implement the traits directly instead.
//!
//! Key behaviors
//! -------------
//! - [`DataSet::new`] validates extents, frame timing and intensities, and
//!   caches per-frame maxima plus the global max/min.
//! - Derived images attached through [`DerivedImageSink`] are kept in
//!   insertion order and exposed through [`DataSet::children`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `data` is indexed `[t, z, y, x]` and every extent is ≥ 1.
//! - `frames.len() == dim.t`; starts are finite, durations finite and ≥ 0.
//! - All intensities are finite.
use crate::volume::{
    dims::{Voxel, VoxelDim},
    errors::{VolumeError, VolumeResult},
    geometry::VolumeGeometry,
    image::FactorImage,
    source::{DerivedImageSink, VoxelSource},
};
use ndarray::{Array4, Axis};

/// Acquisition window of a single frame, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    pub start: f64,
    pub duration: f64,
}

impl FrameTiming {
    pub fn new(start: f64, duration: f64) -> Self {
        Self { start, duration }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Back-to-back frames of equal duration starting at 0.
    pub fn contiguous(num_frames: usize, duration: f64) -> Vec<Self> {
        (0..num_frames).map(|t| Self::new(t as f64 * duration, duration)).collect()
    }
}

/// `DataSet` — owned 4-D volume with frame timing and derived children.
///
/// Fields
/// ------
/// - `name`: display name.
/// - `data`: intensities indexed `[t, z, y, x]`.
/// - `frames`: one [`FrameTiming`] per frame.
/// - `geometry`: spatial placement and modality.
/// - `frame_max`, `global_max`, `global_min`: cached on construction.
/// - `children`: derived images attached after analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    name: String,
    data: Array4<f64>,
    frames: Vec<FrameTiming>,
    geometry: VolumeGeometry,
    frame_max: Vec<f64>,
    global_max: f64,
    global_min: f64,
    children: Vec<FactorImage>,
}

impl DataSet {
    /// Construct a validated data set.
    ///
    /// Errors
    /// ------
    /// - `VolumeError::EmptyDimension` when any extent of `data` is zero.
    /// - `VolumeError::FrameCountMismatch` when `frames.len()` differs from
    ///   the number of frames in `data`.
    /// - `VolumeError::InvalidFrameTiming` for a non-finite start or a
    ///   non-finite/negative duration.
    /// - `VolumeError::NonFiniteIntensity` for the first NaN/±inf voxel.
    pub fn new(
        name: impl Into<String>, data: Array4<f64>, frames: Vec<FrameTiming>,
        geometry: VolumeGeometry,
    ) -> VolumeResult<Self> {
        let (t, z, y, x) = data.dim();
        for (axis, extent) in [('t', t), ('z', z), ('y', y), ('x', x)] {
            if extent == 0 {
                return Err(VolumeError::EmptyDimension { axis });
            }
        }
        if frames.len() != t {
            return Err(VolumeError::FrameCountMismatch { expected: t, actual: frames.len() });
        }
        for (frame, timing) in frames.iter().enumerate() {
            if !timing.start.is_finite() {
                return Err(VolumeError::InvalidFrameTiming {
                    frame,
                    start: timing.start,
                    duration: timing.duration,
                    reason: "Frame start must be finite.",
                });
            }
            if !timing.duration.is_finite() || timing.duration < 0.0 {
                return Err(VolumeError::InvalidFrameTiming {
                    frame,
                    start: timing.start,
                    duration: timing.duration,
                    reason: "Frame duration must be finite and non-negative.",
                });
            }
        }
        if let Some(((t, z, y, x), &value)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(VolumeError::NonFiniteIntensity { x, y, z, t, value });
        }

        let frame_max: Vec<f64> = data
            .axis_iter(Axis(0))
            .map(|frame| frame.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            .collect();
        let global_max = frame_max.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let global_min = data.iter().copied().fold(f64::INFINITY, f64::min);

        Ok(Self {
            name: name.into(),
            data,
            frames,
            geometry,
            frame_max,
            global_max,
            global_min,
            children: Vec::new(),
        })
    }

    /// Intensities indexed `[t, z, y, x]`.
    pub fn data(&self) -> &Array4<f64> {
        &self.data
    }

    pub fn frames(&self) -> &[FrameTiming] {
        &self.frames
    }

    /// Images attached by analyses, in attachment order.
    pub fn children(&self) -> &[FactorImage] {
        &self.children
    }
}

impl VoxelSource for DataSet {
    fn name(&self) -> &str {
        &self.name
    }

    fn dim(&self) -> VoxelDim {
        let (t, z, y, x) = self.data.dim();
        VoxelDim { x, y, z, t }
    }

    fn value(&self, voxel: Voxel) -> f64 {
        self.data[[voxel.t, voxel.z, voxel.y, voxel.x]]
    }

    fn frame_start(&self, frame: usize) -> f64 {
        self.frames[frame].start
    }

    fn frame_end(&self, frame: usize) -> f64 {
        self.frames[frame].end()
    }

    fn frame_max(&self, frame: usize) -> f64 {
        self.frame_max[frame]
    }

    fn global_max(&self) -> f64 {
        self.global_max
    }

    fn global_min(&self) -> f64 {
        self.global_min
    }

    fn geometry(&self) -> &VolumeGeometry {
        &self.geometry
    }
}

impl DerivedImageSink for DataSet {
    fn attach_child(&mut self, image: FactorImage) {
        self.children.push(image);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Validation in `DataSet::new` (extents, frame count, timing, values).
    // - Cached frame and global extrema.
    // - `VoxelSource` indexing and frame midpoints.
    // -------------------------------------------------------------------------

    fn ramp(t: usize, z: usize, y: usize, x: usize) -> Array4<f64> {
        Array4::from_shape_fn((t, z, y, x), |(t, z, y, x)| {
            (t * 1000 + z * 100 + y * 10 + x) as f64
        })
    }

    #[test]
    // Purpose
    // -------
    // Verify cached extrema and voxel indexing on a valid data set.
    //
    // Given
    // -----
    // - A 3×2×1 volume with 2 frames holding a ramp.
    //
    // Expect
    // ------
    // - Frame maxima are the last voxel of each frame; global range spans
    //   the first voxel of frame 0 to the last voxel of frame 1.
    fn new_caches_extrema_and_indexes_tzyx() {
        // Arrange
        let frames = FrameTiming::contiguous(2, 10.0);

        // Act
        let ds = DataSet::new("ramp", ramp(2, 1, 2, 3), frames, VolumeGeometry::default())
            .unwrap();

        // Assert
        assert_eq!(ds.dim(), VoxelDim::new(3, 2, 1, 2));
        assert_eq!(ds.value(Voxel::new(2, 1, 0, 1)), 1012.0);
        assert_eq!(ds.frame_max(0), 12.0);
        assert_eq!(ds.frame_max(1), 1012.0);
        assert_eq!(ds.global_min(), 0.0);
        assert_eq!(ds.global_max(), 1012.0);
        assert_eq!(ds.frame_midpoint(1), 15.0);
    }

    #[test]
    fn new_rejects_frame_count_mismatch() {
        let frames = FrameTiming::contiguous(3, 1.0);
        let err = DataSet::new("bad", ramp(2, 1, 1, 1), frames, VolumeGeometry::default())
            .unwrap_err();
        assert_eq!(err, VolumeError::FrameCountMismatch { expected: 2, actual: 3 });
    }

    #[test]
    fn new_rejects_negative_duration() {
        let frames = vec![FrameTiming::new(0.0, 1.0), FrameTiming::new(1.0, -1.0)];
        let err = DataSet::new("bad", ramp(2, 1, 1, 1), frames, VolumeGeometry::default())
            .unwrap_err();
        assert!(matches!(err, VolumeError::InvalidFrameTiming { frame: 1, .. }));
    }

    #[test]
    fn new_rejects_non_finite_intensity() {
        let mut data = ramp(2, 1, 1, 2);
        data[[1, 0, 0, 1]] = f64::NAN;
        let err = DataSet::new("bad", data, FrameTiming::contiguous(2, 1.0), VolumeGeometry::default())
            .unwrap_err();
        assert!(matches!(err, VolumeError::NonFiniteIntensity { x: 1, y: 0, z: 0, t: 1, .. }));
    }

    #[test]
    fn attached_children_keep_order() {
        let mut ds = DataSet::new(
            "ramp",
            ramp(2, 1, 1, 2),
            FrameTiming::contiguous(2, 1.0),
            VolumeGeometry::default(),
        )
        .unwrap();
        let dim = ds.dim();
        for name in ["factor 1", "factor 2"] {
            let image =
                FactorImage::from_values(name, dim, *ds.geometry(), vec![0.0, 1.0]).unwrap();
            ds.attach_child(image);
        }
        let names: Vec<&str> = ds.children().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["factor 1", "factor 2"]);
    }
}
