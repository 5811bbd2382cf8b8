//! utils — conversions from Python inputs to validated Rust values.
//!
//! Only compiled with the `python-bindings` feature. Every helper validates
//! through the same constructors native callers use, so the invariants of
//! [`DataSet`] and [`FadsOptions`] hold once conversion succeeds.
#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArrayMethods, PyReadonlyArray1, PyReadonlyArray4};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    fads::{
        core::{BloodCurveConstraints, FadsOptions},
        errors::FadsError,
    },
    optimization::conjugate_gradient::traits::LineSearcher,
    volume::{
        dataset::{DataSet, FrameTiming},
        geometry::{Modality, VolumeGeometry},
    },
};

/// Accept a contiguous float64 ndarray, anything with `to_numpy()`, or a
/// sequence of floats.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

#[cfg(feature = "python-bindings")]
fn extract_f64_vec<'py>(
    py: Python<'py>, raw: &Bound<'py, PyAny>, what: &str,
) -> PyResult<Vec<f64>> {
    let arr = extract_f64_array(py, raw)?;
    let slice = arr
        .as_slice()
        .map_err(|_| PyValueError::new_err(format!("{what} must be a contiguous 1-D array")))?;
    Ok(slice.to_vec())
}

/// Build a [`DataSet`] from a `[t, z, y, x]` float64 array.
///
/// Frame timing defaults to contiguous 1 s frames starting at 0 when neither
/// `frame_starts` nor `frame_durations` is given; otherwise both are
/// required. `voxel_size` is `(x, y, z)` in mm and defaults to 1 mm.
#[cfg(feature = "python-bindings")]
pub fn build_data_set<'py>(
    py: Python<'py>, name: &str, data: PyReadonlyArray4<'py, f64>,
    frame_starts: Option<&Bound<'py, PyAny>>, frame_durations: Option<&Bound<'py, PyAny>>,
    voxel_size: Option<(f64, f64, f64)>,
) -> PyResult<DataSet> {
    let data = data.as_array().to_owned();
    let num_frames = data.dim().0;

    let frames = match (frame_starts, frame_durations) {
        (None, None) => FrameTiming::contiguous(num_frames, 1.0),
        (Some(starts), Some(durations)) => {
            let starts = extract_f64_vec(py, starts, "frame_starts")?;
            let durations = extract_f64_vec(py, durations, "frame_durations")?;
            if starts.len() != durations.len() {
                return Err(PyValueError::new_err(format!(
                    "frame_starts has {} entries but frame_durations has {}",
                    starts.len(),
                    durations.len()
                )));
            }
            starts.iter().zip(&durations).map(|(&s, &d)| FrameTiming::new(s, d)).collect()
        }
        _ => {
            return Err(PyValueError::new_err(
                "frame_starts and frame_durations must be given together",
            ));
        }
    };

    let geometry = match voxel_size {
        Some((x, y, z)) => VolumeGeometry::new(
            [0.0; 3],
            VolumeGeometry::default().axes,
            [x, y, z],
            Modality::default(),
        )
        .map_err(FadsError::from)?,
        None => VolumeGeometry::default(),
    };

    Ok(DataSet::new(name, data, frames, geometry).map_err(FadsError::from)?)
}

/// Assemble validated [`FadsOptions`] from keyword arguments.
#[cfg(feature = "python-bindings")]
pub fn extract_fads_options(
    num_factors: usize, num_iterations: usize, tol_grad: f64, line_searcher: Option<&str>,
    blood_frames: Option<Vec<usize>>, blood_targets: Option<Vec<f64>>,
) -> PyResult<FadsOptions> {
    let mut opts = FadsOptions::with_budget(num_factors, num_iterations, tol_grad)?;
    if let Some(name) = line_searcher {
        opts.cg.line_searcher = name.parse::<LineSearcher>().map_err(FadsError::from)?;
    }
    let frames = blood_frames.unwrap_or_default();
    let targets = blood_targets.unwrap_or_default();
    Ok(opts.with_blood_curve(BloodCurveConstraints::from_pairs(&frames, &targets)?))
}
