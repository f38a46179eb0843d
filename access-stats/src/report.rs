use std::fmt;

use num_format::{Locale, ToFormattedString};
use serde::Serialize;

use crate::{
    analytics::{ByteUnit, Summary},
    date_codec::DateCodec,
};

const RULE: &str = "============================================";
const DAYS_PER_ROW: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayEntry {
    pub date: String,
    pub ordinal: i32,
    pub count: u64,
}

/// Printable form of a [`Summary`], with day ordinals rendered as dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub unique_hosts: usize,
    pub not_found_total: u64,
    pub top_not_found_urls: Vec<String>,
    pub mean_not_found_per_day: Option<f64>,
    pub std_dev_not_found_per_day: Option<f64>,
    pub not_found_by_day: Vec<DayEntry>,
    pub bytes_transferred: f64,
    pub unit: ByteUnit,
    pub lines_read: u64,
    pub lines_rejected: u64,
}

impl Report {
    pub fn new(summary: &Summary, codec: &DateCodec) -> Self {
        Self {
            unique_hosts: summary.unique_hosts,
            not_found_total: summary.not_found_total,
            top_not_found_urls: summary.top_not_found_urls.clone(),
            mean_not_found_per_day: summary.daily_spread.map(|s| s.mean),
            std_dev_not_found_per_day: summary.daily_spread.map(|s| s.std_dev),
            not_found_by_day: summary
                .not_found_by_day
                .iter()
                .map(|d| DayEntry {
                    date: codec.decode(d.day.get()),
                    ordinal: d.day.get(),
                    count: d.count,
                })
                .collect(),
            bytes_transferred: summary.bytes_transferred,
            unit: summary.unit,
            lines_read: summary.lines_read,
            lines_rejected: summary.lines_rejected,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn thousands<N: ToFormattedString>(n: N) -> String {
    n.to_formatted_string(&Locale::en)
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "1. Number of unique hosts : {}", thousands(self.unique_hosts))?;
        writeln!(f, "2. Total of 404 errors: {}", thousands(self.not_found_total))?;
        writeln!(f, "3. Top 5 URLs with 404 errors:")?;
        for url in &self.top_not_found_urls {
            writeln!(f, "     {url}")?;
        }
        writeln!(f)?;
        writeln!(f, "4. 404 errors by day:")?;
        match (self.mean_not_found_per_day, self.std_dev_not_found_per_day) {
            (Some(mean), Some(std_dev)) => {
                writeln!(f, "     Mean and Std.: {mean:.2} +- {std_dev:.2}")?;
            }
            _ => writeln!(f, "     Mean and Std.: undefined")?,
        }
        writeln!(f)?;
        writeln!(f, "     Total of 404 errors by day:")?;
        for row in self.not_found_by_day.chunks(DAYS_PER_ROW) {
            let cells: Vec<_> = row
                .iter()
                .map(|d| format!("{}: {}", d.date, thousands(d.count)))
                .collect();
            writeln!(f, "          {}", cells.join("     "))?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "5. Total of bytes returned: {:.2} {}",
            self.bytes_transferred,
            self.unit.label()
        )?;
        writeln!(
            f,
            "   ({} lines read, {} rejected)",
            thousands(self.lines_read),
            thousands(self.lines_rejected)
        )
    }
}
