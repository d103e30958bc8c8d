use crate::errors::{BenchError, BenchResult};
use crate::io;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which polars reader ingests the CSV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsvEngine {
    #[default]
    Lazy,
    Eager,
}

/// A dataframe operation to be measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Workload {
    ReadCsv {
        #[serde(default)]
        engine: CsvEngine,
    },
    Mean {
        column: String,
    },
    Filter {
        condition: String,
    },
    RollingMean {
        column: String,
        window: usize,
    },
}

/// Data every workload may draw on: the CSV on disk and the same table in memory.
#[derive(Debug, Clone)]
pub struct WorkloadInput {
    pub csv_path: PathBuf,
    pub frame: DataFrame,
}

impl Workload {
    pub fn name(&self) -> &'static str {
        match self {
            Workload::ReadCsv { .. } => "read_csv",
            Workload::Mean { .. } => "mean",
            Workload::Filter { .. } => "filter",
            Workload::RollingMean { .. } => "rolling_mean",
        }
    }

    /// Default label, e.g. `mean(value)`.
    pub fn describe(&self) -> String {
        match self {
            Workload::ReadCsv { engine } => format!("read_csv[{:?}]", engine).to_lowercase(),
            Workload::Mean { column } => format!("mean({})", column),
            Workload::Filter { condition } => format!("filter({})", condition),
            Workload::RollingMean { column, window } => {
                format!("rolling_mean({}, window={})", column, window)
            }
        }
    }

    /// Reject definitions that can never run, before anything is measured.
    pub fn validate(&self) -> BenchResult<()> {
        match self {
            Workload::RollingMean { window: 0, .. } => Err(BenchError::InvalidConfiguration(
                "rolling_mean window must be at least 1".to_string(),
            )),
            Workload::Filter { condition } if condition.trim().is_empty() => Err(
                BenchError::InvalidConfiguration("filter condition is empty".to_string()),
            ),
            _ => Ok(()),
        }
    }

    pub fn run(&self, input: &WorkloadInput) -> BenchResult<DataFrame> {
        match self {
            Workload::ReadCsv { engine } => read(*engine, input),
            Workload::Mean { column } => mean(input.frame.clone().lazy(), column),
            Workload::Filter { condition } => filter(input.frame.clone().lazy(), condition),
            Workload::RollingMean { column, window } => {
                rolling_mean(input.frame.clone().lazy(), column, *window)
            }
        }
    }
}

fn read(engine: CsvEngine, input: &WorkloadInput) -> BenchResult<DataFrame> {
    match engine {
        CsvEngine::Lazy => Ok(io::read_csv(&input.csv_path)?.collect()?),
        CsvEngine::Eager => io::read_csv_eager(&input.csv_path),
    }
}

fn mean(lf: LazyFrame, column: &str) -> BenchResult<DataFrame> {
    Ok(lf.select([col(column).mean()]).collect()?)
}

fn filter(lf: LazyFrame, condition: &str) -> BenchResult<DataFrame> {
    let mut ctx = polars::sql::SQLContext::new();
    ctx.register("df", lf);
    let sql = format!("SELECT * FROM df WHERE {}", condition);
    Ok(ctx.execute(&sql)?.collect()?)
}

fn rolling_mean(lf: LazyFrame, column: &str, window: usize) -> BenchResult<DataFrame> {
    if window == 0 {
        return Err(BenchError::InvalidConfiguration(
            "rolling_mean window must be at least 1".to_string(),
        ));
    }
    let options = RollingOptionsFixedWindow {
        window_size: window,
        ..Default::default()
    };
    let alias = format!("{}_rolling_mean", column);
    let expr = col(column)
        .cast(DataType::Float64)
        .rolling_mean(options)
        .alias(alias.as_str());
    Ok(lf.with_columns([expr]).collect()?)
}
