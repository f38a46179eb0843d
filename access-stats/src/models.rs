/// Value carried by every numeric field of the invalid record.
pub const INVALID: i32 = -1;

/// One access log line after parsing.
///
/// A record is valid iff `date_ordinal >= 0`. Invalid records are always the
/// exact value returned by [`LogRecord::invalid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub host: String,
    pub date_ordinal: i32,
    pub request: String,
    pub status: i32,
    pub bytes_sent: i64,
}

impl LogRecord {
    pub fn invalid() -> Self {
        Self {
            host: String::new(),
            date_ordinal: INVALID,
            request: String::new(),
            status: INVALID,
            bytes_sent: i64::from(INVALID),
        }
    }

    pub const fn is_valid(&self) -> bool {
        self.date_ordinal >= 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Valid(LogRecord),
    Invalid,
}

impl ParseOutcome {
    pub fn into_record(self) -> LogRecord {
        match self {
            Self::Valid(record) => record,
            Self::Invalid => LogRecord::invalid(),
        }
    }

    pub fn valid(self) -> Option<LogRecord> {
        match self {
            Self::Valid(record) => Some(record),
            Self::Invalid => None,
        }
    }
}

impl From<ParseOutcome> for LogRecord {
    fn from(outcome: ParseOutcome) -> Self {
        outcome.into_record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asserting::prelude::*;

    #[test]
    fn invalid_outcome_becomes_the_sentinel() {
        let record: LogRecord = ParseOutcome::Invalid.into();
        assert_that!(record.is_valid()).is_false();
        assert_that!(record).is_equal_to(LogRecord {
            host: String::new(),
            date_ordinal: -1,
            request: String::new(),
            status: -1,
            bytes_sent: -1,
        });
    }

    #[test]
    fn day_one_is_valid() {
        let record = LogRecord {
            host: "h".into(),
            date_ordinal: 1,
            request: "GET / HTTP/1.0".into(),
            status: 200,
            bytes_sent: 0,
        };
        assert_that!(ParseOutcome::Valid(record.clone()).valid()).is_equal_to(Some(record));
    }
}
