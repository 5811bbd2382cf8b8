//! Blood-curve constraints.
//!
//! Factor 0 is the blood (input) curve by convention. Known blood samples
//! can be supplied as `(frame, target)` pairs; each pair adds
//! `c · (factor[0][frame] − target)²` to the objective.
use crate::fads::errors::{FadsError, FadsResult};

/// One known sample of the blood curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloodCurveConstraint {
    pub frame: usize,
    pub target: f64,
}

/// Validated list of blood-curve samples.
///
/// Targets are checked for finiteness on construction. Frame indices can
/// only be checked against a concrete data set, which
/// [`validate_frames`](BloodCurveConstraints::validate_frames) does before a
/// run allocates anything. Duplicate frames are allowed; each one adds its
/// own penalty term.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BloodCurveConstraints {
    constraints: Vec<BloodCurveConstraint>,
}

impl BloodCurveConstraints {
    /// Errors
    /// ------
    /// - `FadsError::NonFiniteBloodTarget` for the first NaN/±inf target.
    pub fn new(constraints: Vec<BloodCurveConstraint>) -> FadsResult<Self> {
        let bad = constraints.iter().enumerate().find(|(_, c)| !c.target.is_finite());
        if let Some((index, c)) = bad {
            return Err(FadsError::NonFiniteBloodTarget { index, value: c.target });
        }
        Ok(Self { constraints })
    }

    /// Build from parallel frame/target slices.
    ///
    /// Errors
    /// ------
    /// - `FadsError::BloodCurveLengthMismatch` if the slices differ in length.
    /// - `FadsError::NonFiniteBloodTarget` as for [`new`](Self::new).
    pub fn from_pairs(frames: &[usize], targets: &[f64]) -> FadsResult<Self> {
        if frames.len() != targets.len() {
            return Err(FadsError::BloodCurveLengthMismatch {
                frames: frames.len(),
                targets: targets.len(),
            });
        }
        Self::new(
            frames
                .iter()
                .zip(targets)
                .map(|(&frame, &target)| BloodCurveConstraint { frame, target })
                .collect(),
        )
    }

    /// No constraints.
    pub fn none() -> Self {
        Self::default()
    }

    /// Check every frame index against a data set with `num_frames` frames.
    ///
    /// Errors
    /// ------
    /// - `FadsError::BloodFrameOutOfRange` for the first out-of-range frame.
    pub fn validate_frames(&self, num_frames: usize) -> FadsResult<()> {
        match self.constraints.iter().enumerate().find(|(_, c)| c.frame >= num_frames) {
            Some((index, c)) => {
                Err(FadsError::BloodFrameOutOfRange { index, frame: c.frame, num_frames })
            }
            None => Ok(()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &BloodCurveConstraint> + '_ {
        self.constraints.iter()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}
