//! Wall and CPU time sources used by the harness.

use crate::errors::{BenchError, BenchResult};
use cpu_time::{ProcessTime, ThreadTime};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// A simultaneous reading of the wall clock and a CPU clock.
///
/// Both values are offsets from an arbitrary origin fixed by the clock, so only
/// differences between two readings of the same clock are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    pub wall: Duration,
    pub cpu: Duration,
}

pub trait Clock {
    fn read(&self) -> BenchResult<ClockReading>;
}

/// Which CPU-time counter to sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CpuClock {
    /// CPU time of every thread in the process.
    #[default]
    Process,
    /// CPU time of the calling thread only.
    Thread,
}

/// Monotonic wall clock paired with the OS CPU-time clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
    cpu_clock: CpuClock,
}

impl SystemClock {
    pub fn new(cpu_clock: CpuClock) -> Self {
        Self {
            origin: Instant::now(),
            cpu_clock,
        }
    }

    pub fn process() -> Self {
        Self::new(CpuClock::Process)
    }
}

impl Clock for SystemClock {
    fn read(&self) -> BenchResult<ClockReading> {
        let cpu = cpu_time(self.cpu_clock)?;
        let wall = self.origin.elapsed();
        Ok(ClockReading { wall, cpu })
    }
}

fn cpu_time(which: CpuClock) -> BenchResult<Duration> {
    let reading = match which {
        CpuClock::Process => ProcessTime::try_now().map(|t| t.as_duration()),
        CpuClock::Thread => ThreadTime::try_now().map(|t| t.as_duration()),
    };
    reading.map_err(|e| {
        BenchError::ClockError(format!("cannot read {:?} CPU clock: {}", which, e))
    })
}
