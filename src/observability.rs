use crate::harness::TimingResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Everything a suite run produced, in the shape written as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteRecord {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub dataset: DatasetStats,
    pub results: Vec<BenchmarkRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetStats {
    pub path: String,
    pub hash: String, // SHA256 hex
    pub size_bytes: u64,
    pub rows: usize,
    pub columns: usize,
}

impl DatasetStats {
    pub fn collect<P: AsRef<Path>>(path: P, rows: usize, columns: usize) -> io::Result<Self> {
        let path = path.as_ref();
        Ok(Self {
            path: path.display().to_string(),
            hash: compute_file_hash(path)?,
            size_bytes: std::fs::metadata(path)?.len(),
            rows,
            columns,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkRecord {
    pub label: String,
    pub workload: String,
    pub iterations: u64,
    pub timing: TimingResult,
    /// (rows, columns) of the final iteration's output.
    pub output_shape: (usize, usize),
    /// Text rendering of the run, as produced by `report::report`.
    #[serde(skip)]
    pub report: String,
}

pub fn compute_file_hash<P: AsRef<Path>>(path: P) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0; 8192];

    loop {
        let count = file.read(&mut buffer)?;
        if count == 0 {
            break;
        }
        hasher.update(&buffer[..count]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
