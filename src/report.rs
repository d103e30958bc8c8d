//! Rendering of benchmark runs.

use crate::errors::BenchResult;
use crate::harness::{BenchmarkRun, TimingResult};
use serde::Serialize;
use std::fmt::Write;

const SIGNIFICANT_DIGITS: i32 = 6;

/// Human-readable rendering of a run: label (when present), wall and CPU time.
pub fn report<T>(run: &BenchmarkRun<T>) -> String {
    let timing = run.timing();
    let mut out = String::new();
    let iterations = match run.iterations() {
        1 => "1 iteration".to_string(),
        n => format!("{} iterations", n),
    };
    if let Some(label) = run.label() {
        let _ = writeln!(out, "{} ({})", label, iterations);
    } else {
        let _ = writeln!(out, "({})", iterations);
    }
    let _ = writeln!(out, "  wall time: {} s", format_seconds(timing.wall_time()));
    let _ = write!(out, "  cpu time:  {} s", format_seconds(timing.cpu_time()));
    out
}

#[derive(Debug, Serialize)]
struct RunJson<'a> {
    label: Option<&'a str>,
    iterations: u64,
    wall_time_s: f64,
    cpu_time_s: f64,
}

impl<'a> RunJson<'a> {
    fn new(label: Option<&'a str>, iterations: u64, timing: TimingResult) -> Self {
        Self {
            label,
            iterations,
            wall_time_s: round_significant(timing.wall_time()),
            cpu_time_s: round_significant(timing.cpu_time()),
        }
    }
}

/// JSON rendering of a run, with timings rounded the same way as [`report`].
pub fn report_json<T>(run: &BenchmarkRun<T>) -> BenchResult<String> {
    let json = RunJson::new(run.label(), run.iterations(), run.timing());
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Format a non-negative number of seconds with six significant digits.
pub fn format_seconds(seconds: f64) -> String {
    let rounded = round_significant(seconds);
    format!("{:.*}", decimals_for(rounded).max(0) as usize, rounded)
}

/// Decimal places that leave six significant digits; negative past 1e6.
fn decimals_for(value: f64) -> i32 {
    if value == 0.0 {
        return SIGNIFICANT_DIGITS - 1;
    }
    let abs = value.abs();
    let mut magnitude = abs.log10().floor() as i32;
    // log10 can land one off right at powers of ten.
    if 10f64.powi(magnitude + 1) <= abs {
        magnitude += 1;
    } else if 10f64.powi(magnitude) > abs {
        magnitude -= 1;
    }
    SIGNIFICANT_DIGITS - 1 - magnitude
}

fn round_significant(value: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let decimals = decimals_for(value);
    if decimals >= 0 {
        let factor = 10f64.powi(decimals);
        (value * factor).round() / factor
    } else {
        let scale = 10f64.powi(-decimals);
        (value / scale).round() * scale
    }
}
