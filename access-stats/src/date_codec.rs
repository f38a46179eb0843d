use std::fmt::Write;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

pub const DEFAULT_FORMAT: &str = "%d/%b/%Y";
/// Rendered in place of dates that cannot be decoded. Existing reports depend on it.
pub const FALLBACK_DATE: &str = "01/01/1900";

/// Ordinal of 9999-12-31, the last day that encodes and decodes.
pub const MAX_ORDINAL: i32 = 3_652_059;

#[derive(Debug, Error)]
pub enum DateCodecError {
    #[error("{input:?} is not a date in the format {format:?}: {source}")]
    Unparseable {
        input: String,
        format: String,
        source: chrono::ParseError,
    },
    #[error("{input:?} lies outside 0001-01-01..=9999-12-31")]
    OutOfRange { input: String },
}

/// Converts `dd/Mon/yyyy` dates to day ordinals and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateCodec {
    format: String,
}

impl Default for DateCodec {
    fn default() -> Self {
        Self::with_format(DEFAULT_FORMAT)
    }
}

impl DateCodec {
    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn encode(&self, date: &str) -> Result<i32, DateCodecError> {
        let parsed = NaiveDate::parse_from_str(date, &self.format).map_err(|source| {
            DateCodecError::Unparseable {
                input: date.to_string(),
                format: self.format.clone(),
                source,
            }
        })?;
        let ordinal = parsed.num_days_from_ce();
        if (1..=MAX_ORDINAL).contains(&ordinal) {
            Ok(ordinal)
        } else {
            Err(DateCodecError::OutOfRange {
                input: date.to_string(),
            })
        }
    }

    /// Never fails: anything that is not a calendar day renders as [`FALLBACK_DATE`].
    pub fn decode(&self, ordinal: i32) -> String {
        if !(1..=MAX_ORDINAL).contains(&ordinal) {
            return FALLBACK_DATE.to_string();
        }
        let Some(date) = NaiveDate::from_num_days_from_ce_opt(ordinal) else {
            return FALLBACK_DATE.to_string();
        };
        let mut rendered = String::new();
        match write!(rendered, "{}", date.format(&self.format)) {
            Ok(()) => rendered,
            Err(_) => FALLBACK_DATE.to_string(),
        }
    }
}
