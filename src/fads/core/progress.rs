//! Progress reporting and cooperative cancellation.
//!
//! The driver calls [`Progress::report`] synchronously from the iteration
//! loop: once with a descriptive message and fraction `0.0`, once per
//! iteration with `iteration / num_iterations` and no message, and a final
//! time with [`PROGRESS_DONE`] to signal the end of progress. Returning
//! `false` asks the driver to stop after the current iteration.

/// Fraction passed on the last call of a run.
pub const PROGRESS_DONE: f64 = 2.0;

pub trait Progress {
    /// Report progress; return `true` to keep going.
    fn report(&mut self, message: Option<&str>, fraction: f64) -> bool;
}

impl<F> Progress for F
where
    F: FnMut(Option<&str>, f64) -> bool,
{
    fn report(&mut self, message: Option<&str>, fraction: f64) -> bool {
        self(message, fraction)
    }
}

/// Progress sink that ignores every report and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&mut self, _message: Option<&str>, _fraction: f64) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_act_as_progress_sinks() {
        let mut seen = Vec::new();
        let mut sink = |message: Option<&str>, fraction: f64| {
            seen.push((message.map(str::to_owned), fraction));
            fraction < 0.5
        };
        assert!(sink.report(Some("start"), 0.0));
        assert!(!sink.report(None, 0.75));
        assert_eq!(seen, vec![(Some("start".to_owned()), 0.0), (None, 0.75)]);
        assert!(NoProgress.report(None, PROGRESS_DONE));
    }
}
