use std::{num::NonZero, path::PathBuf};

use access_stats::{
    AnalysisConfig, ByteUnit, DateCodec, Diagnostics, Report, pipeline::DEFAULT_CHUNK_LINES,
    run_sources,
};
use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Summarize web-server access logs", long_about = None)]
struct Args {
    /// Log files or directories of log files; `-` reads stdin
    #[arg(default_value = "resources")]
    sources: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t = ByteUnit::GiB)]
    unit: ByteUnit,

    /// Parser tasks; defaults to the available parallelism
    #[arg(long)]
    workers: Option<NonZero<usize>>,

    #[arg(long, default_value_t = DEFAULT_CHUNK_LINES)]
    chunk_lines: NonZero<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log every rejected line at debug level
    #[arg(long)]
    verbose_diagnostics: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Args {
    fn analysis_config(&self) -> AnalysisConfig {
        let defaults = AnalysisConfig::default();
        AnalysisConfig {
            unit: self.unit,
            diagnostics: if self.verbose_diagnostics {
                Diagnostics::Verbose
            } else {
                Diagnostics::Silent
            },
            workers: self.workers.map_or(defaults.workers, NonZero::get),
            chunk_lines: self.chunk_lines.get(),
        }
    }
}

fn init_logging(verbose: u8, diagnostics: bool) {
    let default_level = if verbose > 0 || diagnostics {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.verbose_diagnostics);

    let config = args.analysis_config();
    let summary = run_sources(&args.sources, &config)
        .await
        .context("access log analysis failed")?;

    let report = Report::new(&summary, &DateCodec::default());
    match args.format {
        OutputFormat::Text => print!("{report}"),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use asserting::prelude::*;

    #[test]
    fn defaults_map_to_the_library_config() {
        let args = Args::try_parse_from(["access-stats"]).unwrap();
        let config = args.analysis_config();
        assert_that!(args.sources).is_equal_to(vec![PathBuf::from("resources")]);
        assert_that!(config.chunk_lines).is_equal_to(10_000);
        assert_that!(config.unit).is_equal_to(ByteUnit::GiB);
        assert_that!(config.diagnostics).is_equal_to(Diagnostics::Silent);
    }

    #[test]
    fn zero_chunk_lines_is_refused() {
        assert!(Args::try_parse_from(["access-stats", "--chunk-lines", "0"]).is_err());
    }
}
