use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum BenchError {
    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code("FRAMEBENCH-001"),
        help("Fix the benchmark definition before retrying (repeat_count must be >= 1).")
    )]
    InvalidConfiguration(String),

    #[error("Clock error: {0}")]
    #[diagnostic(
        code("FRAMEBENCH-002"),
        help("The time source went backwards or could not be read; the measurement was discarded.")
    )]
    ClockError(String),

    #[error("Operation failed on iteration {iteration}: {source}")]
    #[diagnostic(
        code("FRAMEBENCH-003"),
        help("The measured operation returned an error; no further iterations were run.")
    )]
    OperationFailed {
        iteration: u64,
        #[source]
        source: anyhow::Error,
    },

    #[error("Suite configuration error: {0}")]
    #[diagnostic(
        code("FRAMEBENCH-004"),
        help("Please check your suite YAML syntax and structure.")
    )]
    ConfigError(#[source] serde_yaml::Error),

    #[error("I/O error: {0}")]
    #[diagnostic(code("FRAMEBENCH-005"), help("Check file paths and permissions."))]
    IoError(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    #[diagnostic(
        code("FRAMEBENCH-006"),
        help("An error occurred within the data processing engine.")
    )]
    PolarsError(#[from] polars::error::PolarsError),

    #[error("Serialization error: {0}")]
    #[diagnostic(code("FRAMEBENCH-007"))]
    SerializationError(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code("FRAMEBENCH-000"))]
    Unknown(#[from] anyhow::Error),
}

impl BenchError {
    /// Iteration at which the measured operation failed, if that is what happened.
    pub fn failed_iteration(&self) -> Option<u64> {
        match self {
            BenchError::OperationFailed { iteration, .. } => Some(*iteration),
            _ => None,
        }
    }
}

pub type BenchResult<T> = Result<T, BenchError>;
