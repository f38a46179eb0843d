use std::collections::{BTreeMap, HashMap, HashSet};

use clap::ValueEnum;
use serde::Serialize;

use crate::{
    invariants::{DayOrdinal, Hostname, UrlKey},
    models::LogRecord,
    url::extract_url,
};

pub const NOT_FOUND: i32 = 404;
pub const TOP_URLS: usize = 5;

const BYTES_PER_GIB: f64 = 1_073_741_824.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ValueEnum)]
pub enum ByteUnit {
    #[default]
    #[value(name = "gib")]
    GiB,
    #[value(name = "tib")]
    TiB,
}

impl ByteUnit {
    pub const fn divisor(self) -> f64 {
        match self {
            Self::GiB => BYTES_PER_GIB,
            Self::TiB => BYTES_PER_GIB * 1024.0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::GiB => "GB",
            Self::TiB => "TB",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UrlTally {
    hits: u64,
    first_seen: u64,
}

/// Partial aggregate over some slice of the input.
///
/// Every field merges with an associative, commutative reducer, so tallies built
/// over any partition of the input combine into the same result. Positions are
/// global line indices and only matter for ordering equally ranked URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    lines: u64,
    rejected: u64,
    hosts: HashSet<Hostname>,
    bytes: u128,
    not_found: u64,
    not_found_urls: HashMap<UrlKey, UrlTally>,
    not_found_by_day: BTreeMap<DayOrdinal, u64>,
}

impl Tally {
    pub fn record(&mut self, position: u64, record: LogRecord) {
        self.lines += 1;
        if !record.is_valid() {
            self.rejected += 1;
            return;
        }
        self.bytes += u128::try_from(record.bytes_sent).unwrap_or(0);
        if record.status == NOT_FOUND {
            self.not_found += 1;
            let key = UrlKey::from(extract_url(&record.host, &record.request));
            let url = self.not_found_urls.entry(key).or_insert(UrlTally {
                hits: 0,
                first_seen: position,
            });
            url.hits += 1;
            url.first_seen = url.first_seen.min(position);
            *self
                .not_found_by_day
                .entry(DayOrdinal::from(record.date_ordinal))
                .or_default() += 1;
        }
        self.hosts.insert(Hostname::from(record.host));
    }

    pub fn merge(&mut self, other: Self) {
        self.lines += other.lines;
        self.rejected += other.rejected;
        self.hosts.extend(other.hosts);
        self.bytes += other.bytes;
        self.not_found += other.not_found;
        for (key, theirs) in other.not_found_urls {
            self.not_found_urls
                .entry(key)
                .and_modify(|ours| {
                    ours.hits += theirs.hits;
                    ours.first_seen = ours.first_seen.min(theirs.first_seen);
                })
                .or_insert(theirs);
        }
        for (day, count) in other.not_found_by_day {
            *self.not_found_by_day.entry(day).or_default() += count;
        }
    }

    pub const fn lines(&self) -> u64 {
        self.lines
    }

    /// Most frequent non-empty 404 URL keys; equal counts keep input order.
    pub fn top_not_found_urls(&self, n: usize) -> Vec<String> {
        let mut ranked: Vec<_> = self
            .not_found_urls
            .iter()
            .filter(|(key, _)| !key.is_empty())
            .collect();
        ranked.sort_unstable_by(|(a_key, a), (b_key, b)| {
            b.hits
                .cmp(&a.hits)
                .then(a.first_seen.cmp(&b.first_seen))
                .then_with(|| a_key.cmp(b_key))
        });
        ranked
            .into_iter()
            .take(n)
            .map(|(key, _)| key.to_string())
            .collect()
    }

    pub fn summarize(&self, unit: ByteUnit) -> Summary {
        let not_found_by_day: Vec<_> = self
            .not_found_by_day
            .iter()
            .map(|(day, count)| DayCount {
                day: *day,
                count: *count,
            })
            .collect();
        let daily: Vec<_> = not_found_by_day.iter().map(|d| d.count).collect();
        Summary {
            unique_hosts: self.hosts.len(),
            not_found_total: self.not_found,
            top_not_found_urls: self.top_not_found_urls(TOP_URLS),
            daily_spread: Spread::population(&daily),
            not_found_by_day,
            bytes_transferred: self.bytes as f64 / unit.divisor(),
            unit,
            lines_read: self.lines,
            lines_rejected: self.rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub day: DayOrdinal,
    pub count: u64,
}

/// Mean and population standard deviation (divisor N).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spread {
    pub mean: f64,
    pub std_dev: f64,
}

impl Spread {
    /// `None` when there is nothing to average.
    pub fn population(values: &[u64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().map(|v| *v as f64).sum::<f64>() / n;
        let variance = values
            .iter()
            .map(|v| (*v as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        Some(Self {
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub unique_hosts: usize,
    pub not_found_total: u64,
    pub top_not_found_urls: Vec<String>,
    pub not_found_by_day: Vec<DayCount>,
    pub daily_spread: Option<Spread>,
    pub bytes_transferred: f64,
    pub unit: ByteUnit,
    pub lines_read: u64,
    pub lines_rejected: u64,
}

/// Single-threaded fold over records in input order.
pub fn summarize<I>(records: I, unit: ByteUnit) -> Summary
where
    I: IntoIterator<Item = LogRecord>,
{
    let mut tally = Tally::default();
    for (position, record) in (0u64..).zip(records) {
        tally.record(position, record);
    }
    tally.summarize(unit)
}
