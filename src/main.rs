use clap::{Parser, Subcommand, ValueEnum};
use framebench::dataset::{self, DatasetSpec};
use framebench::runner::{self, RunOptions};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Clone, ValueEnum, Debug)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum, Debug)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "framebench")]
#[command(version)]
#[command(about = "Time dataframe operations and compare alternative implementations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase logging verbosity (Info -> Debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Silence all logs
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format (text or json)
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every benchmark of a suite YAML file
    Run {
        /// Path to the suite YAML file
        #[arg(value_name = "SUITE_FILE")]
        suite: PathBuf,

        /// Only run benchmarks whose label matches this regex
        #[arg(long, value_name = "REGEX")]
        filter: Option<String>,

        /// Repeat count for benchmarks that do not set their own
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        repeat: Option<i64>,

        /// Report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,

        /// Write the report here instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Write a random dataset to CSV
    Generate {
        /// Number of rows
        #[arg(long)]
        rows: usize,

        /// RNG seed
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Destination CSV file
        #[arg(long, value_name = "PATH")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    // FRAMEBENCH_LOG wins over the CLI flags
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var("FRAMEBENCH_LOG")
        .from_env_lossy();

    match cli.log_format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .json()
                .with_span_list(false)
                .with_current_span(false)
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    let session = Uuid::new_v4();
    let _span = tracing::info_span!("root", session = %session).entered();

    match cli.command {
        Commands::Run {
            suite,
            filter,
            repeat,
            format,
            output,
        } => {
            let options = RunOptions {
                filter,
                repeat_count: repeat,
                show_progress: !cli.quiet,
            };
            let record = runner::execute_suite(&suite, &options)?;
            let rendered = match format {
                ReportFormat::Text => runner::render_text(&record),
                ReportFormat::Json => runner::render_json(&record)?,
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered).into_diagnostic()?;
                    info!("Report written to {:?}", path);
                }
                None => println!("{}", rendered),
            }
        }
        Commands::Generate { rows, seed, out } => {
            let mut df = dataset::generate(&DatasetSpec::new(rows, seed))?;
            framebench::io::write_csv(&mut df, &out)?;
            info!("Wrote {} rows to {:?}", df.height(), out);
        }
    }

    Ok(())
}
