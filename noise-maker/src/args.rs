use std::path::PathBuf;

use clap::Parser;
use derive_getters::Getters;

#[derive(Parser, Debug, Getters)]
#[command(name = "noise-maker")]
#[command(about = "Generate synthetic web-server access logs for testing", long_about = None)]
pub struct CliArgs {
    #[arg(long, default_value_t = 10_000)]
    lines: u64,

    /// Fixed seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Share of lines (0.0..=1.0) deliberately broken
    #[arg(long, default_value_t = 0.0)]
    malformed_ratio: f64,

    #[arg(long, default_value = "01/Jul/1995")]
    start_date: String,

    #[arg(long, default_value_t = 28)]
    days: u32,

    /// Defaults to stdout
    #[arg(long)]
    output: Option<PathBuf>,
}
