use crate::clock::SystemClock;
use crate::dataset;
use crate::errors::{BenchError, BenchResult};
use crate::harness::{measure_with_clock, BenchmarkSpec};
use crate::io;
use crate::observability::{BenchmarkRecord, DatasetStats, SuiteRecord};
use crate::report::report;
use crate::suite::{Benchmark, Suite};
use crate::workloads::WorkloadInput;
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use std::fmt::Write;
use std::path::Path;
use tempfile::{Builder, TempPath};
use tracing::info;
use uuid::Uuid;

/// Command-line adjustments to a suite run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Only run benchmarks whose label matches this regex.
    pub filter: Option<String>,
    /// Repeat count for benchmarks that do not set their own.
    pub repeat_count: Option<i64>,
    pub show_progress: bool,
}

pub fn execute_suite(path: &Path, options: &RunOptions) -> BenchResult<SuiteRecord> {
    info!("Loading suite from {:?}", path);
    let suite = Suite::from_path(path)?;
    run_suite(&suite, options)
}

pub fn run_suite(suite: &Suite, options: &RunOptions) -> BenchResult<SuiteRecord> {
    let run_id = Uuid::new_v4();
    let selected = select_benchmarks(suite, options.filter.as_deref())?;
    for benchmark in &selected {
        benchmark.workload.validate()?;
        let repeat_count = effective_repeat_count(suite, benchmark, options);
        if repeat_count < 1 {
            return Err(BenchError::InvalidConfiguration(format!(
                "benchmark {:?}: repeat_count must be at least 1, got {}",
                benchmark.label(),
                repeat_count
            )));
        }
    }

    let mut frame = dataset::generate(&suite.dataset)?;
    // Removed on drop, including when a workload panics.
    let temp_path: TempPath;
    let csv_path: &Path = match &suite.dataset.path {
        Some(path) => Path::new(path),
        None => {
            temp_path = Builder::new()
                .prefix("framebench-")
                .suffix(".csv")
                .tempfile()?
                .into_temp_path();
            &temp_path
        }
    };
    info!("Writing dataset to {:?}", csv_path);
    io::write_csv(&mut frame, csv_path)?;

    let dataset = DatasetStats::collect(csv_path, frame.height(), frame.width())?;
    let input = WorkloadInput {
        csv_path: csv_path.to_path_buf(),
        frame,
    };
    let results = measure_benchmarks(suite, &selected, &input, options)?;

    info!("Suite completed: {} benchmarks measured.", results.len());
    Ok(SuiteRecord {
        run_id: run_id.to_string(),
        timestamp: Utc::now(),
        dataset,
        results,
    })
}

fn select_benchmarks<'a>(
    suite: &'a Suite,
    filter: Option<&str>,
) -> BenchResult<Vec<&'a Benchmark>> {
    let Some(pattern) = filter else {
        return Ok(suite.benchmarks.iter().collect());
    };
    let re = Regex::new(pattern).map_err(|e| {
        BenchError::InvalidConfiguration(format!("invalid filter {:?}: {}", pattern, e))
    })?;
    let selected: Vec<&Benchmark> = suite
        .benchmarks
        .iter()
        .filter(|b| re.is_match(&b.label()))
        .collect();
    if selected.is_empty() {
        return Err(BenchError::InvalidConfiguration(format!(
            "no benchmark label matches filter {:?}",
            pattern
        )));
    }
    Ok(selected)
}

/// Per-benchmark value, then the command line, then the suite default.
fn effective_repeat_count(suite: &Suite, benchmark: &Benchmark, options: &RunOptions) -> i64 {
    benchmark
        .repeat_count
        .or(options.repeat_count)
        .unwrap_or(suite.repeat_count)
}

fn measure_benchmarks(
    suite: &Suite,
    selected: &[&Benchmark],
    input: &WorkloadInput,
    options: &RunOptions,
) -> BenchResult<Vec<BenchmarkRecord>> {
    let pb = if options.show_progress {
        let pb = ProgressBar::new(selected.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:30}] {pos}/{len} {msg}")
                .map_err(|e| BenchError::Unknown(e.into()))?
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let clock = SystemClock::new(suite.cpu_clock);
    let mut records = Vec::with_capacity(selected.len());

    for benchmark in selected {
        let label = benchmark.label();
        let repeat_count = effective_repeat_count(suite, benchmark, options);
        pb.set_message(label.clone());

        let spec = BenchmarkSpec::new(|| benchmark.workload.run(input))
            .repeat_count(repeat_count)
            .label(label.clone());
        let run = measure_with_clock(spec, &clock)?;

        let timing = run.timing();
        info!(
            label = %label,
            iterations = run.iterations(),
            wall_s = timing.wall_time(),
            cpu_s = timing.cpu_time(),
            "Benchmark finished"
        );

        records.push(BenchmarkRecord {
            report: report(&run),
            label,
            workload: benchmark.workload.name().to_string(),
            iterations: run.iterations(),
            timing,
            output_shape: run.result().shape(),
        });
        pb.inc(1);
    }

    pb.finish_with_message("All benchmarks measured.");
    Ok(records)
}

/// Plain-text rendering of a whole suite run.
pub fn render_text(record: &SuiteRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "run {} at {}",
        record.run_id,
        record.timestamp.to_rfc3339()
    );
    let _ = writeln!(
        out,
        "dataset: {} rows x {} columns, {} bytes, sha256 {}",
        record.dataset.rows,
        record.dataset.columns,
        record.dataset.size_bytes,
        record.dataset.hash
    );
    for result in &record.results {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", result.report);
        let (rows, cols) = result.output_shape;
        let _ = writeln!(out, "  output:    {} x {}", rows, cols);
    }
    out
}

pub fn render_json(record: &SuiteRecord) -> BenchResult<String> {
    Ok(serde_json::to_string_pretty(record)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SUITE: &str = r#"
dataset:
  rows: 200
  seed: 11
repeat_count: 2
benchmarks:
  - label: lazy ingest
    type: read_csv
  - label: eager ingest
    type: read_csv
    engine: eager
  - type: mean
    column: value
  - type: filter
    condition: "quantity >= 500"
  - type: rolling_mean
    column: value
    window: 5
    repeat_count: 3
"#;

    #[test]
    fn test_run_suite_measures_everything() -> BenchResult<()> {
        let suite = Suite::from_yaml_str(SUITE)?;
        let record = run_suite(&suite, &RunOptions::default())?;

        assert_eq!(record.results.len(), 5);
        assert_eq!(record.dataset.rows, 200);
        assert_eq!(record.dataset.hash.len(), 64);

        let ingest = &record.results[0];
        assert_eq!(ingest.label, "lazy ingest");
        assert_eq!(ingest.iterations, 2);
        assert_eq!(ingest.output_shape, (200, 3));

        let mean = &record.results[2];
        assert_eq!(mean.label, "mean(value)");
        assert_eq!(mean.output_shape, (1, 1));

        let rolling = &record.results[4];
        assert_eq!(rolling.iterations, 3);
        assert_eq!(rolling.output_shape, (200, 4));

        for r in &record.results {
            assert!(r.timing.wall_time() >= 0.0);
            assert!(r.timing.cpu_time() >= 0.0);
        }
        Ok(())
    }

    #[test]
    fn test_filter_and_repeat_override() -> BenchResult<()> {
        let suite = Suite::from_yaml_str(SUITE)?;
        let options = RunOptions {
            filter: Some("ingest$".into()),
            repeat_count: Some(4),
            show_progress: false,
        };
        let record = run_suite(&suite, &options)?;

        let labels: Vec<&str> = record.results.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["lazy ingest", "eager ingest"]);
        // The suite default is replaced, not the per-benchmark value.
        assert!(record.results.iter().all(|r| r.iterations == 4));
        Ok(())
    }

    #[test]
    fn test_filter_matching_nothing() {
        let suite = Suite::from_yaml_str(SUITE).unwrap();
        let options = RunOptions {
            filter: Some("^nothing$".into()),
            ..Default::default()
        };
        assert!(matches!(
            run_suite(&suite, &options),
            Err(BenchError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_bad_regex() {
        let suite = Suite::from_yaml_str(SUITE).unwrap();
        let options = RunOptions {
            filter: Some("(".into()),
            ..Default::default()
        };
        assert!(matches!(
            run_suite(&suite, &options),
            Err(BenchError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_zero_repeat_count_is_rejected() {
        let dir = tempdir().unwrap();
        let data_path = dir.path().join("data.csv");
        let yaml = format!(
            r#"
dataset:
  rows: 10
  path: "{}"
repeat_count: 0
benchmarks:
  - type: mean
    column: value
"#,
            data_path.to_str().unwrap()
        );
        let suite = Suite::from_yaml_str(&yaml).unwrap();
        let err = run_suite(&suite, &RunOptions::default()).unwrap_err();

        assert!(matches!(err, BenchError::InvalidConfiguration(_)));
        assert!(!data_path.exists());
    }

    #[test]
    fn test_late_zero_repeat_count_fails_before_any_work() {
        let dir = tempdir().unwrap();
        let data_path = dir.path().join("data.csv");
        let yaml = format!(
            r#"
dataset:
  rows: 10
  path: "{}"
benchmarks:
  - type: mean
    column: value
  - label: broken
    type: read_csv
    repeat_count: 0
"#,
            data_path.to_str().unwrap()
        );
        let suite = Suite::from_yaml_str(&yaml).unwrap();
        let err = run_suite(&suite, &RunOptions::default()).unwrap_err();

        assert!(matches!(err, BenchError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("broken"));
        assert!(!data_path.exists());
    }

    #[test]
    fn test_command_line_repeat_count_is_validated() {
        let suite = Suite::from_yaml_str(SUITE).unwrap();
        let options = RunOptions {
            filter: Some("^mean".into()),
            repeat_count: Some(-1),
            show_progress: false,
        };
        assert!(matches!(
            run_suite(&suite, &options),
            Err(BenchError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_temporary_dataset_is_removed() -> BenchResult<()> {
        let suite = Suite::from_yaml_str(SUITE)?;
        let options = RunOptions {
            filter: Some("^mean".into()),
            ..Default::default()
        };
        let record = run_suite(&suite, &options)?;

        let written = Path::new(&record.dataset.path);
        assert!(written.file_name().unwrap().to_string_lossy().starts_with("framebench-"));
        assert!(!written.exists());
        Ok(())
    }

    #[test]
    fn test_operation_failure_reports_iteration() {
        let yaml = r#"
dataset:
  rows: 10
benchmarks:
  - type: mean
    column: does_not_exist
"#;
        let suite = Suite::from_yaml_str(yaml).unwrap();
        let err = run_suite(&suite, &RunOptions::default()).unwrap_err();
        assert_eq!(err.failed_iteration(), Some(1));
    }

    #[test]
    fn test_explicit_dataset_path_is_kept() -> BenchResult<()> {
        let dir = tempdir()?;
        let data_path = dir.path().join("kept.csv");
        let yaml = format!(
            r#"
dataset:
  rows: 25
  path: "{}"
benchmarks:
  - type: read_csv
"#,
            data_path.to_str().unwrap()
        );
        let suite = Suite::from_yaml_str(&yaml)?;
        let record = run_suite(&suite, &RunOptions::default())?;

        assert!(data_path.exists());
        assert_eq!(record.dataset.path, data_path.display().to_string());

        let text = render_text(&record);
        assert!(text.contains("read_csv[lazy] (1 iteration)"));
        assert!(text.contains("output:    25 x 3"));

        let json: serde_json::Value = serde_json::from_str(&render_json(&record)?)?;
        assert_eq!(json["results"][0]["workload"], "read_csv");
        assert_eq!(json["dataset"]["rows"], 25);
        Ok(())
    }
}
