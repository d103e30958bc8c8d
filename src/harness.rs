//! Repeated, timed invocation of a caller-supplied operation.
//!
//! [`measure`] runs an operation `repeat_count` times back to back and reports
//! the wall and CPU time spent across the whole sequence. Only the value from
//! the final invocation is kept; it is handed back so callers can spot-check it.

use crate::clock::{Clock, ClockReading, SystemClock};
use crate::errors::{BenchError, BenchResult};
use serde::Serialize;
use tracing::debug;

/// Wall and CPU seconds spent across one measured sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingResult {
    wall_time: f64,
    cpu_time: f64,
}

impl TimingResult {
    pub fn new(wall_time: f64, cpu_time: f64) -> BenchResult<Self> {
        for (name, value) in [("wall", wall_time), ("cpu", cpu_time)] {
            if !value.is_finite() || value < 0.0 {
                return Err(BenchError::ClockError(format!(
                    "{} time must be a finite, non-negative number of seconds, got {}",
                    name, value
                )));
            }
        }
        Ok(Self {
            wall_time,
            cpu_time,
        })
    }

    /// Elapsed time between two readings of the same clock.
    ///
    /// Either counter going backwards is a clock fault and is reported as such.
    pub fn between(start: &ClockReading, end: &ClockReading) -> BenchResult<Self> {
        let wall = end.wall.checked_sub(start.wall).ok_or_else(|| {
            BenchError::ClockError(format!(
                "wall clock went backwards: {:?} -> {:?}",
                start.wall, end.wall
            ))
        })?;
        let cpu = end.cpu.checked_sub(start.cpu).ok_or_else(|| {
            BenchError::ClockError(format!(
                "CPU clock went backwards: {:?} -> {:?}",
                start.cpu, end.cpu
            ))
        })?;
        Self::new(wall.as_secs_f64(), cpu.as_secs_f64())
    }

    /// Elapsed real time, in seconds.
    pub fn wall_time(&self) -> f64 {
        self.wall_time
    }

    /// CPU time consumed, in seconds.
    pub fn cpu_time(&self) -> f64 {
        self.cpu_time
    }
}

/// The final result of a measured sequence together with its timing.
#[derive(Debug, Clone)]
pub struct BenchmarkRun<T> {
    label: Option<String>,
    iterations: u64,
    result: T,
    timing: TimingResult,
}

impl<T> BenchmarkRun<T> {
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Number of invocations the timing covers.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn result(&self) -> &T {
        &self.result
    }

    pub fn timing(&self) -> TimingResult {
        self.timing
    }

    pub fn into_result(self) -> T {
        self.result
    }
}

/// What to measure and how often.
pub struct BenchmarkSpec<F> {
    operation: F,
    repeat_count: i64,
    label: Option<String>,
}

impl<F> BenchmarkSpec<F> {
    /// A spec running `operation` once, without a label.
    pub fn new(operation: F) -> Self {
        Self {
            operation,
            repeat_count: 1,
            label: None,
        }
    }

    pub fn repeat_count(mut self, repeat_count: i64) -> Self {
        self.repeat_count = repeat_count;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn maybe_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }
}

/// Measure `spec` against the process CPU clock.
pub fn measure<T, E, F>(spec: BenchmarkSpec<F>) -> BenchResult<BenchmarkRun<T>>
where
    F: FnMut() -> Result<T, E>,
    E: Into<anyhow::Error>,
{
    measure_with_clock(spec, &SystemClock::process())
}

pub fn measure_with_clock<T, E, F, C>(
    spec: BenchmarkSpec<F>,
    clock: &C,
) -> BenchResult<BenchmarkRun<T>>
where
    F: FnMut() -> Result<T, E>,
    E: Into<anyhow::Error>,
    C: Clock + ?Sized,
{
    let BenchmarkSpec {
        mut operation,
        repeat_count,
        label,
    } = spec;

    let iterations = validate_repeat_count(repeat_count)?;
    debug!(
        label = label.as_deref().unwrap_or("<unlabelled>"),
        iterations, "Starting measurement"
    );

    let mut invoke = |iteration: u64| {
        operation().map_err(|e| BenchError::OperationFailed {
            iteration,
            source: e.into(),
        })
    };

    let start = clock.read()?;
    let mut result = invoke(1)?;
    for iteration in 2..=iterations {
        result = invoke(iteration)?;
    }
    let end = clock.read()?;

    let timing = TimingResult::between(&start, &end)?;
    debug!(
        wall_s = timing.wall_time(),
        cpu_s = timing.cpu_time(),
        "Measurement finished"
    );

    Ok(BenchmarkRun {
        label,
        iterations,
        result,
        timing,
    })
}

fn validate_repeat_count(repeat_count: i64) -> BenchResult<u64> {
    if repeat_count < 1 {
        return Err(BenchError::InvalidConfiguration(format!(
            "repeat_count must be at least 1, got {}",
            repeat_count
        )));
    }
    Ok(repeat_count as u64)
}
