use crate::clock::CpuClock;
use crate::dataset::DatasetSpec;
use crate::errors::{BenchError, BenchResult};
use crate::workloads::Workload;
use serde::de::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A benchmark suite: one dataset and the workloads measured on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suite {
    pub dataset: DatasetSpec,
    #[serde(default = "default_repeat_count")]
    pub repeat_count: i64,
    #[serde(default)]
    pub cpu_clock: CpuClock,
    pub benchmarks: Vec<Benchmark>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    #[serde(default)]
    pub label: Option<String>,
    /// Overrides the suite-wide repeat count.
    #[serde(default)]
    pub repeat_count: Option<i64>,
    #[serde(flatten)]
    pub workload: Workload,
}

impl Benchmark {
    pub fn label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.workload.describe())
    }
}

fn default_repeat_count() -> i64 {
    1
}

impl Suite {
    pub fn from_path<P: AsRef<Path>>(path: P) -> BenchResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> BenchResult<Self> {
        let suite: Suite = serde_yaml::from_str(content).map_err(BenchError::ConfigError)?;
        if suite.benchmarks.is_empty() {
            return Err(BenchError::ConfigError(serde_yaml::Error::custom(
                "No benchmarks specified in suite",
            )));
        }
        Ok(suite)
    }
}
