use crate::errors::{BenchError, BenchResult};
use polars::prelude::*;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

const TEXT_LEN: usize = 8;

/// Kind of values a generated column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    #[serde(alias = "float")]
    FloatNumeric,
    #[serde(alias = "integer", alias = "int")]
    IntegerNumeric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Shape and seed of a generated table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub rows: usize,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_columns")]
    pub columns: Vec<ColumnSpec>,
    /// Where the runner writes the CSV; a temporary file when absent.
    #[serde(default)]
    pub path: Option<String>,
}

impl DatasetSpec {
    pub fn new(rows: usize, seed: u64) -> Self {
        Self {
            rows,
            seed,
            columns: default_columns(),
            path: None,
        }
    }
}

/// One text, one float and one integer column.
pub fn default_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("name", ColumnKind::Text),
        ColumnSpec::new("value", ColumnKind::FloatNumeric),
        ColumnSpec::new("quantity", ColumnKind::IntegerNumeric),
    ]
}

/// Build a random table. The same spec always yields the same table.
pub fn generate(spec: &DatasetSpec) -> BenchResult<DataFrame> {
    if spec.columns.is_empty() {
        return Err(BenchError::InvalidConfiguration(
            "dataset needs at least one column".to_string(),
        ));
    }

    info!(
        "Generating dataset: {} rows x {} columns (seed {})",
        spec.rows,
        spec.columns.len(),
        spec.seed
    );

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let columns: Vec<Column> = spec
        .columns
        .iter()
        .map(|c| generate_column(&mut rng, c, spec.rows).into())
        .collect();

    Ok(DataFrame::new(columns)?)
}

fn generate_column(rng: &mut StdRng, column: &ColumnSpec, rows: usize) -> Series {
    let name = PlSmallStr::from(column.name.as_str());
    match column.kind {
        ColumnKind::Text => {
            let values: Vec<String> = (0..rows).map(|_| random_text(rng)).collect();
            Series::new(name, values)
        }
        ColumnKind::FloatNumeric => {
            let values: Vec<f64> = (0..rows).map(|_| rng.gen_range(0.0..100.0)).collect();
            Series::new(name, values)
        }
        ColumnKind::IntegerNumeric => {
            let values: Vec<i64> = (0..rows).map(|_| rng.gen_range(0..1000)).collect();
            Series::new(name, values)
        }
    }
}

fn random_text(rng: &mut StdRng) -> String {
    (0..TEXT_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}
