use framebench::dataset::{self, DatasetSpec};
use framebench::harness::{measure, BenchmarkSpec};
use framebench::io;
use framebench::report::report;
use std::path::Path;

const ROWS: usize = 1_000_000;
const REPEAT: i64 = 5;

/// Compare the lazy and eager CSV readers on the same generated file.
fn main() -> anyhow::Result<()> {
    let path = Path::new("bench_data.csv");
    if !path.exists() {
        println!("Generating {} rows into {}...", ROWS, path.display());
        let mut df = dataset::generate(&DatasetSpec::new(ROWS, 42))?;
        io::write_csv(&mut df, path)?;
    }

    let lazy = measure(
        BenchmarkSpec::new(|| io::read_csv(path)?.collect().map_err(anyhow::Error::from))
            .repeat_count(REPEAT)
            .label("read_csv (lazy)"),
    )?;
    let eager = measure(
        BenchmarkSpec::new(|| io::read_csv_eager(path))
            .repeat_count(REPEAT)
            .label("read_csv (eager)"),
    )?;

    for run in [&lazy, &eager] {
        println!("{}", report(run));
        println!("  rows:      {}", run.result().height());
    }
    Ok(())
}
