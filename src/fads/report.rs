//! FADS analysis report — plain-text table of factor curves.
//!
//! Purpose
//! -------
//! Write the factor curves of a finished run to a text file whose layout is
//! fixed for compatibility with existing tools:
//!
//! ```text
//! # <program>: FADS Analysis File for <data set>
//! # generated on <ctime timestamp>
//! #
//! # <status line(s)>
//! #
//! # frame\ttime midpt (s)\tfactor:
//! #\t\t\t1\t\t2 ...
//!   <t>\t<midpoint>\t\t<factor 1>\t<factor 2> ...
//! ```
//!
//! Conventions
//! -----------
//! - Numbers are rendered like C's `%g` (six significant digits, trailing
//!   zeros removed, exponent form outside `1e-4 ..= 1e6`), see [`format_g`].
//! - The timestamp uses the `ctime` layout, e.g. `Thu Oct 16 09:05:01 2026`.
//! - Rendering ([`render_report`]) is separated from file output
//!   ([`write_report`]) so the exact text can be checked without touching
//!   the filesystem.
use crate::fads::{
    core::status::FadsStatus,
    errors::{FadsError, FadsResult},
};
use chrono::{DateTime, Local};
use ndarray::ArrayView2;
use std::{
    fmt::Write as _,
    fs::File,
    io::{BufWriter, Write as _},
    path::Path,
};

/// Program name written in the first header line.
pub const PROGRAM_NAME: &str = env!("CARGO_PKG_NAME");

/// `ctime`-style timestamp layout.
const CTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Significant digits of `%g`.
const G_PRECISION: i32 = 6;

/// format_g — render `value` the way C's `printf("%g", value)` does.
pub fn format_g(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf".to_owned() } else { "-inf".to_owned() };
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0".to_owned() } else { "0".to_owned() };
    }

    // Rounding to the target precision first decides the exponent.
    let sci = format!("{:.*e}", (G_PRECISION - 1) as usize, value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if (-4..G_PRECISION).contains(&exponent) {
        let decimals = (G_PRECISION - 1 - exponent) as usize;
        strip_fraction_zeros(format!("{value:.decimals$}"))
    } else {
        let mantissa = strip_fraction_zeros(mantissa.to_owned());
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    }
}

fn strip_fraction_zeros(mut text: String) -> String {
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    text
}

/// Status line(s) of the report, each terminated by a newline.
fn status_lines(status: &FadsStatus) -> String {
    match status {
        FadsStatus::Converged { iterations } => {
            format!("# found minimal after {iterations} iterations\n")
        }
        FadsStatus::UserTerminated { iterations } => {
            format!("# user terminated minization after {iterations} iterations.\n")
        }
        FadsStatus::Exhausted { iterations } | FadsStatus::Stalled { iterations, .. } => {
            format!(
                "# No minimum after {iterations} iterations, exited with:\n#    {}\n",
                status.reason().unwrap_or_default()
            )
        }
    }
}

/// render_report — full report text.
///
/// Parameters
/// ----------
/// - `data_set_name`: name of the analysed data set.
/// - `generated`: timestamp written in the header.
/// - `status`: terminal state of the run.
/// - `midpoints`: time midpoint of every frame (length `T`).
/// - `factors`: `F × T` factor curves.
pub fn render_report(
    data_set_name: &str, generated: &DateTime<Local>, status: &FadsStatus, midpoints: &[f64],
    factors: &ArrayView2<f64>,
) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "# {PROGRAM_NAME}: FADS Analysis File for {data_set_name}");
    let _ = writeln!(out, "# generated on {}", generated.format(CTIME_FORMAT));
    out.push_str("#\n");
    out.push_str(&status_lines(status));
    out.push_str("#\n");

    out.push_str("# frame\ttime midpt (s)\tfactor:\n");
    out.push_str("#\t");
    for f in 0..factors.nrows() {
        let _ = write!(out, "\t\t{}", f + 1);
    }
    out.push('\n');

    for (t, &midpoint) in midpoints.iter().enumerate() {
        let _ = write!(out, "  {t}\t{}\t", format_g(midpoint));
        for value in factors.column(t) {
            let _ = write!(out, "\t{}", format_g(*value));
        }
        out.push('\n');
    }
    out
}

/// write_report — render the report and write it to `path`.
///
/// Errors
/// ------
/// - `FadsError::ReportIo` if the file cannot be created or written.
pub fn write_report(
    path: &Path, data_set_name: &str, status: &FadsStatus, midpoints: &[f64],
    factors: &ArrayView2<f64>,
) -> FadsResult<()> {
    let text = render_report(data_set_name, &Local::now(), status, midpoints, factors);
    let io_err =
        |e: std::io::Error| FadsError::ReportIo { path: path.to_path_buf(), text: e.to_string() };
    let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
    writer.write_all(text.as_bytes()).map_err(io_err)?;
    writer.flush().map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fads::core::status::EXHAUSTED_REASON;
    use chrono::TimeZone;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // `format_g` must match C's `%g` on representative magnitudes.
    //
    // Given
    // -----
    // - Integers, fractions, very small/large values and signs.
    //
    // Expect
    // ------
    // - The strings `printf("%g")` prints for the same values.
    fn format_g_matches_printf() {
        let cases = [
            (0.0, "0"),
            (15.0, "15"),
            (0.5, "0.5"),
            (-2.25, "-2.25"),
            (1.0 / 3.0, "0.333333"),
            (100000.0, "100000"),
            (1e6, "1e+06"),
            (1234567.0, "1.23457e+06"),
            (0.0001, "0.0001"),
            (0.00001234, "1.234e-05"),
            (999999.5, "1e+06"),
            (2.5e-300, "2.5e-300"),
        ];
        for (value, expected) in cases {
            assert_eq!(format_g(value), expected, "value {value}");
        }
    }

    #[test]
    // Purpose
    // -------
    // Pin the exact text of a report for a run that used up its budget.
    //
    // Given
    // -----
    // - Data set "dyn", F = 2, T = 4 contiguous 10 s frames, status
    //   Exhausted after 10 iterations, fixed timestamp.
    //
    // Expect
    // ------
    // - Header, two-line status, column header and 4 rows with 2 factor
    //   columns each, byte for byte.
    fn exhausted_report_layout() {
        // Arrange
        let generated = Local.with_ymd_and_hms(2026, 3, 5, 9, 7, 1).unwrap();
        let factors = array![[1.0, 2.5, 3.0, 4.0], [0.5, 0.25, 0.125, 1e-5]];
        let midpoints = [5.0, 15.0, 25.0, 35.0];

        // Act
        let text = render_report(
            "dyn",
            &generated,
            &FadsStatus::Exhausted { iterations: 10 },
            &midpoints,
            &factors.view(),
        );

        // Assert
        let expected = format!(
            "# {PROGRAM_NAME}: FADS Analysis File for dyn\n\
             # generated on Thu Mar  5 09:07:01 2026\n\
             #\n\
             # No minimum after 10 iterations, exited with:\n\
             #    {EXHAUSTED_REASON}\n\
             #\n\
             # frame\ttime midpt (s)\tfactor:\n\
             #\t\t\t1\t\t2\n  \
             0\t5\t\t1\t0.5\n  \
             1\t15\t\t2.5\t0.25\n  \
             2\t25\t\t3\t0.125\n  \
             3\t35\t\t4\t1e-05\n"
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn status_lines_for_other_terminal_states() {
        assert_eq!(
            status_lines(&FadsStatus::Converged { iterations: 7 }),
            "# found minimal after 7 iterations\n"
        );
        assert_eq!(
            status_lines(&FadsStatus::UserTerminated { iterations: 0 }),
            "# user terminated minization after 0 iterations.\n"
        );
        assert_eq!(
            status_lines(&FadsStatus::Stalled { iterations: 3, reason: "no progress".into() }),
            "# No minimum after 3 iterations, exited with:\n#    no progress\n"
        );
    }

    #[test]
    fn unwritable_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.tsv");
        let factors = array![[1.0, 2.0]];
        let err = write_report(
            &path,
            "dyn",
            &FadsStatus::Converged { iterations: 1 },
            &[0.5, 1.5],
            &factors.view(),
        )
        .unwrap_err();
        assert!(matches!(err, FadsError::ReportIo { path: p, .. } if p == path));
    }
}
