//! Batch statistics over web-server access logs: distinct clients, 404
//! rankings and their daily distribution, and total bytes served.

pub mod analytics;
pub mod date_codec;
pub mod ingest;
pub mod invariants;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod url;

pub use analytics::{ByteUnit, Summary, Tally, summarize};
pub use date_codec::DateCodec;
pub use models::{LogRecord, ParseOutcome};
pub use parser::{Diagnostics, LineParser};
pub use pipeline::{AnalysisConfig, run_lines, run_sources};
pub use report::Report;
pub use url::extract_url;
