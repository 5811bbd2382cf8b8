//! pls — penalized least-squares factor analysis driver.
//!
//! Purpose
//! -------
//! Run one complete factor analysis of a dynamic data set: validate the
//! request, seed the parameters, minimize the penalized objective with
//! Polak–Ribière conjugate gradient while re-tuning the orthogonality
//! weight between iterations, then attach one image per factor to the data
//! set and write the text report.
//!
//! Key behaviors
//! -------------
//! - Every precondition (T > 1, 1 ≤ F ≤ T, blood-curve frames < T, a
//!   positive study duration, a usable penalty scale) is checked before any
//!   working buffer is allocated. A rejected request touches neither the
//!   data set nor the report path.
//! - After the evaluation at the starting point `b` is re-seeded from the
//!   penalty breakdown; after every iteration it moves one tenth of the way
//!   toward `0.1·b·(ls + neg)/uni`.
//! - The progress capability is called once with a message and fraction
//!   `0.0`, once per iteration with `iteration / num_iterations`, and once
//!   with [`PROGRESS_DONE`]. A `false` return stops the run after the
//!   current iteration. The first iteration always runs, so a `false` on
//!   the start message ends the run after one iteration.
//! - Unless the options choose a period, the conjugate direction is reset
//!   to steepest descent every `F·(T + M)` iterations, one full sweep of
//!   the parameter space.
//! - Non-convergence, cancellation and a failed iteration are terminal
//!   states, not errors: images and the report are still produced from the
//!   last good parameters.
//!
//! Invariants & assumptions
//! ------------------------
//! - Weights, penalty terms and buffers are scoped to one call; nothing
//!   outlives it except the attached images and the report file.
//! - The source is read-only until the output stage.
//!
//! Conventions
//! -----------
//! - Rejections and failures are logged with `tracing::warn!` before they
//!   are returned; iteration details go to `debug!`, run start/end to
//!   `info!`.
//!
//! Testing notes
//! -------------
//! - Unit tests below cover precondition rejection, the progress protocol,
//!   cancellation and report failure. End-to-end numerical behavior lives
//!   in `tests/integration_fads_pipeline.rs`.
use crate::{
    fads::{
        core::{
            initial_parameters, study_duration, FadsOptions, FadsStatus, ParameterLayout,
            PenaltyTerms, PenaltyWeights, Progress, ReportStatus, PROGRESS_DONE,
        },
        errors::{FadsError, FadsResult},
        objective::{PlsData, PlsObjective},
        output::attach_factor_images,
        report::write_report,
    },
    optimization::conjugate_gradient::{
        adapter::ArgMinAdapter,
        builders::{build_ncg_hager_zhang, build_ncg_more_thuente},
        run::{CgMinimizer, StepOutcome},
        traits::{CgOptions, LineSearcher, Objective},
        types::{CgState, Theta},
    },
    volume::source::{DerivedImageSink, VoxelSource},
};
use argmin::core::Solver;
use ndarray::Array2;
use std::path::Path;
use tracing::{debug, info, warn};

/// Result of a completed factor analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct FadsOutcome {
    pub status: FadsStatus,
    /// `F × T` factor curves; row 0 is the blood curve.
    pub factors: Array2<f64>,
    /// `M × F` per-voxel factor coefficients.
    pub coefficients: Array2<f64>,
    /// Penalty weights at the end of the run.
    pub weights: PenaltyWeights,
    /// Penalty breakdown at the returned parameters.
    pub terms: PenaltyTerms,
    pub report: ReportStatus,
}

/// Minimization result before the output stage.
struct Fit {
    status: FadsStatus,
    factors: Array2<f64>,
    coefficients: Array2<f64>,
    weights: PenaltyWeights,
    terms: PenaltyTerms,
}

/// fads_pls — penalized least-squares factor analysis of `data_set`.
///
/// Parameters
/// ----------
/// - `data_set`: dynamic volume to analyse; receives one child image per
///   factor.
/// - `opts`: factor count, minimizer configuration (iteration budget,
///   gradient tolerance, line search) and blood-curve samples.
/// - `output`: path of the text report.
/// - `progress`: progress sink and cancellation source.
///
/// Returns
/// -------
/// The terminal status, factor curves, coefficients, final weights and
/// penalty breakdown, and the outcome of writing the report.
///
/// Errors
/// ------
/// - `FadsError::StaticVolume`, `ZeroFactors`, `TooManyFactors`,
///   `BloodFrameOutOfRange`, `InvalidStudyDuration`, `InvalidPenaltyScale`
///   for rejected requests (nothing allocated, nothing written).
/// - `FadsError::AllocationFailed` if a working buffer cannot be allocated.
/// - `FadsError::Optimization` if the minimizer cannot be initialized.
pub fn fads_pls<D, P>(
    data_set: &mut D, opts: &FadsOptions, output: &Path, progress: &mut P,
) -> FadsResult<FadsOutcome>
where
    D: VoxelSource + DerivedImageSink + ?Sized,
    P: Progress + ?Sized,
{
    let name = data_set.name().to_owned();
    let fit = analyse(&*data_set, opts, progress).map_err(|err| {
        warn!(data_set = %name, "factor analysis aborted: {err}");
        err
    })?;

    let report = emit(data_set, &name, &fit, output);
    info!(data_set = %name, status = %fit.status, "factor analysis finished");

    let Fit { status, factors, coefficients, weights, terms } = fit;
    Ok(FadsOutcome { status, factors, coefficients, weights, terms, report })
}

/// Checks that need no allocation; returns the layout and initial weights.
fn preflight<V: VoxelSource + ?Sized>(
    source: &V, opts: &FadsOptions,
) -> FadsResult<(ParameterLayout, PenaltyWeights)> {
    let dim = source.dim();
    if !dim.is_dynamic() {
        return Err(FadsError::StaticVolume { num_frames: dim.t });
    }
    let layout = ParameterLayout::new(dim, opts.num_factors)?;
    opts.blood_curve.validate_frames(dim.t)?;
    study_duration(source)?;
    let weights = PenaltyWeights::from_global_max(source.global_max())?;
    Ok((layout, weights))
}

fn analyse<V, P>(source: &V, opts: &FadsOptions, progress: &mut P) -> FadsResult<Fit>
where
    V: VoxelSource + ?Sized,
    P: Progress + ?Sized,
{
    let (layout, weights) = preflight(source, opts)?;
    info!(
        data_set = source.name(),
        num_voxels = layout.num_voxels(),
        num_frames = layout.num_frames(),
        num_factors = layout.num_factors(),
        num_iterations = opts.num_iterations(),
        "starting penalized least-squares factor analysis"
    );

    let theta0 = initial_parameters(source, &layout)?;
    let data = PlsData::from_source(source, layout, opts.blood_curve.clone())?;
    let objective = PlsObjective::new(weights, &layout)?;
    objective.value(&theta0, &data)?;
    objective.seed_orthogonality();

    let cg = cg_options(&opts.cg, &layout);
    let message =
        format!("Calculating Penalized Least Squares Factor Analysis:\n   {}", source.name());
    let keep_going = progress.report(Some(&message), 0.0);
    let (status, theta) = match cg.line_searcher {
        LineSearcher::MoreThuente => minimize(
            build_ncg_more_thuente(&cg)?,
            &objective,
            &data,
            theta0,
            &cg,
            keep_going,
            progress,
        )?,
        LineSearcher::HagerZhang => minimize(
            build_ncg_hager_zhang(&cg)?,
            &objective,
            &data,
            theta0,
            &cg,
            keep_going,
            progress,
        )?,
    };
    progress.report(None, PROGRESS_DONE);

    // Line-search trials overwrite the breakdown; describe the kept point.
    objective.value(&theta, &data)?;
    let factors = layout.factors(&theta)?.to_owned();
    let coefficients = layout.coefficients(&theta)?.to_owned();
    Ok(Fit {
        status,
        factors,
        coefficients,
        weights: objective.weights(),
        terms: objective.terms(),
    })
}

/// Minimizer options for one run; the restart period defaults to the
/// number of parameters.
fn cg_options(cg: &CgOptions, layout: &ParameterLayout) -> CgOptions {
    let mut cg = cg.clone();
    cg.restart_iters.get_or_insert(layout.num_variables() as u64);
    cg
}

/// Iterate `solver` until convergence, cancellation, failure or the
/// iteration budget; returns the terminal status and the last good point.
///
/// At least one iteration runs; `continue_work` is the answer to the start
/// message and is honored after it.
fn minimize<'a, S, P>(
    solver: S, objective: &'a PlsObjective, data: &'a PlsData, theta0: Theta, cg: &CgOptions,
    mut continue_work: bool, progress: &mut P,
) -> FadsResult<(FadsStatus, Theta)>
where
    S: Solver<ArgMinAdapter<'a, PlsObjective>, CgState> + Clone,
    P: Progress + ?Sized,
{
    let num_iterations = cg.tols.max_iter;
    let mut minimizer = CgMinimizer::new(ArgMinAdapter::new(objective, data), solver, theta0, cg)?;

    let mut iterations = 0;
    let mut converged = false;
    let mut failure = None;
    loop {
        iterations += 1;
        match minimizer.step() {
            Ok(outcome) => converged = outcome == StepOutcome::Converged,
            Err(err) => failure = Some(err),
        }
        let answer = progress.report(None, iterations as f64 / num_iterations as f64);
        continue_work = continue_work && answer;

        let terms = objective.terms();
        debug!(
            iteration = iterations,
            b = objective.weights().b,
            cost = minimizer.cost(),
            ls = terms.ls,
            neg = terms.neg,
            uni = terms.uni,
            blood = terms.blood,
            "penalized least-squares iteration"
        );
        objective.rebalance();

        if converged || failure.is_some() || !continue_work || iterations >= num_iterations {
            break;
        }
    }

    let status = if converged {
        FadsStatus::Converged { iterations }
    } else if !continue_work {
        FadsStatus::UserTerminated { iterations }
    } else if let Some(err) = failure {
        warn!(iteration = iterations, "minimizer could not make progress: {err}");
        FadsStatus::Stalled { iterations, reason: err.to_string() }
    } else {
        FadsStatus::Exhausted { iterations }
    };
    Ok((status, minimizer.into_param()?))
}

/// Attach the factor images, then write the report.
fn emit<D>(data_set: &mut D, name: &str, fit: &Fit, output: &Path) -> ReportStatus
where
    D: VoxelSource + DerivedImageSink + ?Sized,
{
    if let Err(err) = attach_factor_images(data_set, &fit.coefficients.view()) {
        warn!(data_set = name, "factor images not built, report skipped: {err}");
        return ReportStatus::Skipped;
    }

    let midpoints: Vec<f64> =
        (0..data_set.dim().t).map(|frame| data_set.frame_midpoint(frame)).collect();
    match write_report(output, name, &fit.status, &midpoints, &fit.factors.view()) {
        Ok(()) => ReportStatus::Written(output.to_path_buf()),
        Err(err) => {
            warn!(data_set = name, "{err}");
            ReportStatus::Failed(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fads::core::{BloodCurveConstraints, NoProgress},
        volume::{
            dataset::{DataSet, FrameTiming},
            geometry::VolumeGeometry,
        },
    };
    use ndarray::Array4;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Rejection of invalid requests before any side effect.
    // - The progress protocol (start message, per-iteration fractions, end
    //   marker) and cancellation at both check points.
    // - Report failure leaving the factor images attached.
    //
    // They intentionally DO NOT cover:
    // - Quality of the recovered factors; see the integration tests.
    // -------------------------------------------------------------------------

    /// Two-compartment mixture: a decaying blood curve and a rising tissue
    /// curve, mixed per voxel with weight (1 + 2y + x)/4.
    fn mixture(num_frames: usize) -> DataSet {
        let data = Array4::from_shape_fn((num_frames, 1, 2, 2), |(t, _, y, x)| {
            let w = (1 + 2 * y + x) as f64 / 4.0;
            let blood = 10.0 * (-(t as f64) / 2.0).exp();
            let tissue = 5.0 * (1.0 - (-(t as f64) / 2.0).exp());
            w * blood + (1.0 - w) * tissue
        });
        DataSet::new(
            "mixture",
            data,
            FrameTiming::contiguous(num_frames, 10.0),
            VolumeGeometry::default(),
        )
        .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Invalid requests fail before the progress sink, the data set or the
    // report path are touched.
    //
    // Given
    // -----
    // - A static volume, too many factors, and a blood-curve frame past the
    //   last frame.
    //
    // Expect
    // ------
    // - The matching error, no progress call, no child image, no file.
    fn invalid_requests_have_no_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fads.txt");
        let mut calls = 0;
        let mut progress = |_: Option<&str>, _: f64| {
            calls += 1;
            true
        };

        let mut single = mixture(1);
        let opts = FadsOptions::with_budget(1, 10, 1e-6).unwrap();
        assert_eq!(
            fads_pls(&mut single, &opts, &path, &mut progress),
            Err(FadsError::StaticVolume { num_frames: 1 })
        );
        assert!(single.children().is_empty());

        let mut ds = mixture(4);
        let opts = FadsOptions::with_budget(5, 10, 1e-6).unwrap();
        assert_eq!(
            fads_pls(&mut ds, &opts, &path, &mut progress),
            Err(FadsError::TooManyFactors { num_factors: 5, num_frames: 4 })
        );

        let opts = FadsOptions::with_budget(2, 10, 1e-6)
            .unwrap()
            .with_blood_curve(BloodCurveConstraints::from_pairs(&[4], &[1.0]).unwrap());
        assert_eq!(
            fads_pls(&mut ds, &opts, &path, &mut progress),
            Err(FadsError::BloodFrameOutOfRange { index: 0, frame: 4, num_frames: 4 })
        );

        assert!(ds.children().is_empty());
        assert!(!path.exists());
        assert_eq!(calls, 0);
    }

    #[test]
    // Purpose
    // -------
    // Cancelling on the start message is honored after the first iteration,
    // which always runs, and the result is still emitted.
    //
    // Given
    // -----
    // - 4 frames, 4 voxels, F = 2, a sink that always answers `false`.
    //
    // Expect
    // ------
    // - Status `UserTerminated { iterations: 1 }`.
    // - Exactly three progress calls: the start message at 0.0, the first
    //   iteration at 0.1 and the end marker.
    // - Coefficients moved away from the 1/F seed; two child images; report
    //   written.
    fn cancel_on_start_message_runs_first_iteration() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fads.txt");
        let mut ds = mixture(4);
        let opts = FadsOptions::with_budget(2, 10, 1e-12).unwrap();
        let mut calls: Vec<(Option<String>, f64)> = Vec::new();
        let mut progress = |message: Option<&str>, fraction: f64| {
            calls.push((message.map(str::to_owned), fraction));
            false
        };

        // Act
        let out = fads_pls(&mut ds, &opts, &path, &mut progress).unwrap();

        // Assert
        assert_eq!(out.status, FadsStatus::UserTerminated { iterations: 1 });
        assert_eq!(
            calls,
            vec![
                (
                    Some("Calculating Penalized Least Squares Factor Analysis:\n   mixture".into()),
                    0.0
                ),
                (None, 0.1),
                (None, PROGRESS_DONE),
            ]
        );
        assert_eq!(out.factors.dim(), (2, 4));
        assert_eq!(out.coefficients.dim(), (4, 2));
        assert!(out.coefficients.iter().any(|&c| c != 0.5));
        assert_eq!(ds.children().len(), 2);
        assert_eq!(out.report, ReportStatus::Written(path.clone()));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("# user terminated minization after 1 iterations.\n"));
    }

    #[test]
    // Purpose
    // -------
    // A `false` answer during iteration stops the run after that iteration.
    //
    // Given
    // -----
    // - A sink that continues on the start message and cancels on the first
    //   iteration report; a budget of 10 iterations.
    //
    // Expect
    // ------
    // - Status `UserTerminated { iterations: 1 }`.
    // - Fractions reported: 0.0, 0.1, then the end marker.
    fn cancel_during_iteration() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fads.txt");
        let mut ds = mixture(4);
        let opts = FadsOptions::with_budget(2, 10, 1e-12).unwrap();
        let mut fractions = Vec::new();
        let mut progress = |_: Option<&str>, fraction: f64| {
            fractions.push(fraction);
            fraction == 0.0
        };

        // Act
        let out = fads_pls(&mut ds, &opts, &path, &mut progress).unwrap();

        // Assert
        assert_eq!(out.status, FadsStatus::UserTerminated { iterations: 1 });
        assert_eq!(fractions, vec![0.0, 0.1, PROGRESS_DONE]);
        assert_eq!(ds.children().len(), 2);
    }

    #[test]
    // Purpose
    // -------
    // An unwritable report path is reported in the outcome without undoing
    // the attached images.
    //
    // Given
    // -----
    // - A report path inside a directory that does not exist.
    //
    // Expect
    // ------
    // - `Ok` outcome with `ReportStatus::Failed(ReportIo { .. })`.
    // - Both factor images attached.
    fn report_failure_keeps_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("fads.txt");
        let mut ds = mixture(4);
        let opts = FadsOptions::with_budget(2, 10, 1e-12).unwrap();
        let mut progress = |_: Option<&str>, _: f64| false;

        let out = fads_pls(&mut ds, &opts, &path, &mut progress).unwrap();

        assert!(matches!(out.report, ReportStatus::Failed(FadsError::ReportIo { .. })));
        assert_eq!(ds.children().len(), 2);
        assert_eq!(ds.children()[1].name, "factor 2");
    }

    #[test]
    // Purpose
    // -------
    // A short uninterrupted run respects its budget and keeps the
    // non-adaptive weights fixed.
    //
    // Given
    // -----
    // - A budget of 3 iterations and the Hager–Zhang line search.
    //
    // Expect
    // ------
    // - At most 3 iterations; `a` and `c` equal `global_max · 1e5`.
    // - A finite penalty breakdown.
    fn short_run_respects_budget() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fads.txt");
        let mut ds = mixture(4);
        let mut opts = FadsOptions::with_budget(2, 3, 1e-12).unwrap();
        opts.cg.line_searcher = LineSearcher::HagerZhang;

        let out = fads_pls(&mut ds, &opts, &path, &mut NoProgress).unwrap();

        assert!(out.status.iterations() <= 3);
        let scale = ds.global_max() * 1e5;
        assert_eq!(out.weights.a, scale);
        assert_eq!(out.weights.c, scale);
        assert!(out.terms.total().is_finite());
        assert!(path.exists());
    }

    #[test]
    // Purpose
    // -------
    // The periodic restart defaults to one sweep of the parameter space and
    // an explicit period is kept.
    //
    // Given
    // -----
    // - 4 voxels, 4 frames, F = 2 (16 parameters).
    //
    // Expect
    // ------
    // - `restart_iters == Some(16)` by default, `Some(5)` when chosen.
    fn restart_period_defaults_to_parameter_count() {
        let layout = ParameterLayout::new(mixture(4).dim(), 2).unwrap();
        let mut opts = FadsOptions::with_budget(2, 10, 1e-6).unwrap();

        assert_eq!(cg_options(&opts.cg, &layout).restart_iters, Some(16));

        opts.cg.restart_iters = Some(5);
        assert_eq!(cg_options(&opts.cg, &layout).restart_iters, Some(5));
    }
}
