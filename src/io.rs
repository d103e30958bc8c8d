use crate::errors::{BenchError, BenchResult};
use polars::prelude::*;
use std::path::Path;

/// Lazily scan a CSV file.
pub fn read_csv<P: AsRef<Path>>(path: P) -> BenchResult<LazyFrame> {
    LazyCsvReader::new(path)
        .with_has_header(true)
        .finish()
        .map_err(BenchError::PolarsError)
}

/// Read a CSV file straight into memory with the eager reader.
pub fn read_csv_eager<P: AsRef<Path>>(path: P) -> BenchResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()
        .map_err(BenchError::PolarsError)
}

pub fn write_csv<P: AsRef<Path>>(df: &mut DataFrame, path: P) -> BenchResult<()> {
    let mut file = std::fs::File::create(path).map_err(BenchError::IoError)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(BenchError::PolarsError)
}
