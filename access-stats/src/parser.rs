use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::{
    date_codec::{DateCodec, DateCodecError},
    models::{LogRecord, ParseOutcome},
};

// Access log line: 199.72.81.55 - - [01/Jul/1995:00:00:01 -0400] "GET /history/apollo/ HTTP/1.0" 200 6245
// Only the day/month/year part of the timestamp is kept; the time fields are matched loosely.
static LINE_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(\S.*?) - - \[([^:\]]+):([^:\]]*):([^:\]]*):([^\]]*)\] "(.*)" (\d+) (\d+|-)\s*$"#,
    )
    .expect("line grammar compiles")
});

/// Whether rejected lines are reported through `tracing`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Diagnostics {
    #[default]
    Silent,
    Verbose,
}

#[derive(Debug, Error)]
enum Rejection {
    #[error("line does not match the access log grammar")]
    Grammar,
    #[error(transparent)]
    Date(#[from] DateCodecError),
    #[error("status code {0:?} does not fit an integer")]
    Status(String),
}

#[derive(Debug, Clone, Default)]
pub struct LineParser {
    codec: DateCodec,
    diagnostics: Diagnostics,
}

impl LineParser {
    pub fn new(diagnostics: Diagnostics) -> Self {
        Self {
            codec: DateCodec::default(),
            diagnostics,
        }
    }

    /// Total: every line yields a record, the invalid sentinel when it cannot be read.
    pub fn parse(&self, line: &str) -> LogRecord {
        self.parse_outcome(line).into_record()
    }

    pub fn parse_outcome(&self, line: &str) -> ParseOutcome {
        match self.try_parse(line) {
            Ok(record) => ParseOutcome::Valid(record),
            Err(reason) => {
                if self.diagnostics == Diagnostics::Verbose {
                    debug!(%reason, line, "rejected access log line");
                }
                ParseOutcome::Invalid
            }
        }
    }

    fn try_parse(&self, line: &str) -> Result<LogRecord, Rejection> {
        let caps = LINE_GRAMMAR.captures(line).ok_or(Rejection::Grammar)?;
        let date_ordinal = self.codec.encode(&caps[2])?;
        let status = caps[7]
            .parse()
            .map_err(|_| Rejection::Status(caps[7].to_string()))?;
        // `-` means no body was sent; a digit run too long for i64 is treated the same way.
        let bytes_sent = match &caps[8] {
            "-" => 0,
            digits => digits.parse().unwrap_or(0),
        };
        Ok(LogRecord {
            host: caps[1].to_string(),
            date_ordinal,
            request: caps[6].to_string(),
            status,
            bytes_sent,
        })
    }
}
