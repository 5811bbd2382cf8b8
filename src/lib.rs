//! rust_fads — factor analysis of dynamic structures for 4-D image volumes.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the factor analysis to Python via the `_rust_fads` extension
//! module. When the `python-bindings` feature is enabled, this module defines
//! the Python-facing functions and result class.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules: `volume` (data-set collaborator
//!   surface), `optimization` (step-wise nonlinear conjugate gradient) and
//!   `fads` (SVD rank estimator and penalized least-squares analysis).
//! - Define `svd_factors` and `fads_pls` `#[pyfunction]`s plus the
//!   `FadsAnalysis` `#[pyclass]` holding a run's outcome.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work happens in the inner Rust modules; this file only
//!   performs FFI glue, input conversion and error mapping.
//! - Python inputs are validated through the same constructors native
//!   callers use (`DataSet::new`, `FadsOptions::with_budget`, ...).
//!
//! Conventions
//! -----------
//! - Volumes cross the boundary as float64 arrays indexed `[t, z, y, x]`.
//! - Errors from core Rust code are converted to `ValueError` at the PyO3
//!   boundary; an exception raised by a Python progress callback cancels the
//!   run and is re-raised once the run has finished.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and by the
//!   integration tests under `tests/`.

pub mod fads;
pub mod optimization;
pub mod utils;
pub mod volume;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1, PyArray2, PyArray3, PyReadonlyArray4};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use std::path::Path;

#[cfg(feature = "python-bindings")]
use crate::{
    fads::{core::ReportStatus, pls::FadsOutcome},
    utils::{build_data_set, extract_fads_options},
    volume::image::FactorImage,
};

/// FadsAnalysis — Python-facing result of a penalized least-squares run.
///
/// Fields
/// ------
/// - `inner`: [`FadsOutcome`] returned by [`fads::pls::fads_pls`].
/// - `images`: the factor images attached to the (temporary) data set.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_fads")]
pub struct FadsAnalysis {
    inner: FadsOutcome,
    images: Vec<FactorImage>,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl FadsAnalysis {
    /// Human-readable terminal state, e.g. `"converged after 12 iterations"`.
    #[getter]
    pub fn status(&self) -> String {
        self.inner.status.to_string()
    }

    /// Why the run stopped without converging, if it did.
    #[getter]
    pub fn reason(&self) -> Option<String> {
        self.inner.status.reason().map(str::to_owned)
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.status.iterations()
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.status.is_converged()
    }

    /// `F × T` factor curves.
    #[getter]
    pub fn factors<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.factors.clone().into_pyarray(py)
    }

    /// `M × F` voxel coefficients.
    #[getter]
    pub fn coefficients<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.coefficients.clone().into_pyarray(py)
    }

    /// One `[z, y, x]` array per factor, in factor order.
    #[getter]
    pub fn factor_images<'py>(
        &self, py: Python<'py>,
    ) -> Vec<(String, Bound<'py, PyArray3<f64>>)> {
        self.images
            .iter()
            .map(|image| (image.name.clone(), image.data.clone().into_pyarray(py)))
            .collect()
    }

    /// Final penalty weights `(a, b, c)`.
    #[getter]
    pub fn weights(&self) -> (f64, f64, f64) {
        let w = self.inner.weights;
        (w.a, w.b, w.c)
    }

    /// Penalty breakdown `(ls, neg, uni, blood)` at the returned parameters.
    #[getter]
    pub fn terms(&self) -> (f64, f64, f64, f64) {
        let t = self.inner.terms;
        (t.ls, t.neg, t.uni, t.blood)
    }

    /// Path of the written report, or `None` if it was not written.
    #[getter]
    pub fn report_path(&self) -> Option<String> {
        match &self.inner.report {
            ReportStatus::Written(path) => Some(path.display().to_string()),
            ReportStatus::Failed(_) | ReportStatus::Skipped => None,
        }
    }

    /// Why the report was not written, if it was not.
    #[getter]
    pub fn report_error(&self) -> Option<String> {
        match &self.inner.report {
            ReportStatus::Written(_) => None,
            ReportStatus::Failed(err) => Some(err.to_string()),
            ReportStatus::Skipped => Some("factor images could not be built".to_owned()),
        }
    }
}

/// svd_factors(data, /, frame_starts=None, frame_durations=None)
///
/// Singular values of the voxel/frame matrix of a `[t, z, y, x]` volume and
/// the factor-count upper bound `T`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (data, frame_starts = None, frame_durations = None))]
fn svd_factors<'py>(
    py: Python<'py>, data: PyReadonlyArray4<'py, f64>, frame_starts: Option<&Bound<'py, PyAny>>,
    frame_durations: Option<&Bound<'py, PyAny>>,
) -> PyResult<(Bound<'py, PyArray1<f64>>, usize)> {
    let data_set = build_data_set(py, "data", data, frame_starts, frame_durations, None)?;
    let result = fads::svd::svd_factors(&data_set)?;
    Ok((result.singular_values.into_pyarray(py), result.num_factors))
}

/// fads_pls(data, num_factors, output, /, ...)
///
/// Penalized least-squares factor analysis of a `[t, z, y, x]` volume.
/// `progress`, if given, is called as `progress(message, fraction)` and
/// must return a truthy value to keep going.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (
    data,
    num_factors,
    output,
    frame_starts = None,
    frame_durations = None,
    num_iterations = 1000,
    tol_grad = 1e-2,
    line_searcher = None,
    blood_frames = None,
    blood_targets = None,
    voxel_size = None,
    name = "data",
    progress = None,
))]
fn fads_pls<'py>(
    py: Python<'py>, data: PyReadonlyArray4<'py, f64>, num_factors: usize, output: &str,
    frame_starts: Option<&Bound<'py, PyAny>>, frame_durations: Option<&Bound<'py, PyAny>>,
    num_iterations: usize, tol_grad: f64, line_searcher: Option<&str>,
    blood_frames: Option<Vec<usize>>, blood_targets: Option<Vec<f64>>,
    voxel_size: Option<(f64, f64, f64)>, name: &str, progress: Option<&Bound<'py, PyAny>>,
) -> PyResult<FadsAnalysis> {
    let mut data_set =
        build_data_set(py, name, data, frame_starts, frame_durations, voxel_size)?;
    let opts = extract_fads_options(
        num_factors,
        num_iterations,
        tol_grad,
        line_searcher,
        blood_frames,
        blood_targets,
    )?;

    let mut callback_error: Option<PyErr> = None;
    let mut report = |message: Option<&str>, fraction: f64| -> bool {
        let Some(callback) = progress else {
            return true;
        };
        if callback_error.is_some() {
            return false;
        }
        match callback.call1((message, fraction)).and_then(|keep| keep.is_truthy()) {
            Ok(keep_going) => keep_going,
            Err(err) => {
                callback_error = Some(err);
                false
            }
        }
    };
    let inner = fads::pls::fads_pls(&mut data_set, &opts, Path::new(output), &mut report)?;
    if let Some(err) = callback_error {
        return Err(err);
    }

    Ok(FadsAnalysis { inner, images: data_set.children().to_vec() })
}

/// _rust_fads — PyO3 module initializer for the Python extension.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_fads<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_class::<FadsAnalysis>()?;
    m.add_function(wrap_pyfunction!(svd_factors, m)?)?;
    m.add_function(wrap_pyfunction!(fads_pls, m)?)?;
    Ok(())
}
