use access_stats::{DateCodec, date_codec::MAX_ORDINAL};
use rand::{Rng, seq::IndexedRandom};

const HOSTS: [(&str, u8); 8] = [
    ("199.72.81.55", 8),
    ("unicomp6.unicomp.net", 5),
    ("burger.letters.com", 6),
    ("205.212.115.106", 2),
    ("d104.aa.net", 4),
    ("129.94.144.152", 3),
    ("piweba3y.prodigy.com", 9),
    ("slppp6.intermind.net", 1),
];
const METHODS: [(&str, u8); 3] = [("GET", 90), ("HEAD", 6), ("POST", 4)];
const PATHS: [(&str, u8); 7] = [
    ("/", 10),
    ("/history/apollo/", 20),
    ("/shuttle/countdown/", 30),
    ("/images/NASA-logosmall.gif", 40),
    ("/pub/winvn/readme.txt", 5),
    ("/shuttle/missions/sts-71/images/missing.jpg", 5),
    ("/cgi-bin/imagemap/countdown", 5),
];
const STATUS: [(u16, u8); 5] = [(200, 80), (304, 8), (302, 4), (404, 6), (500, 1)];
const MALFORMED: [&str; 5] = ["quote", "status", "date", "truncated", "empty"];

fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, table: &'a [(T, u8)]) -> &'a T {
    let fallback = &table[0].0;
    table
        .choose_weighted(rng, |(_, w)| *w)
        .map_or(fallback, |(value, _)| value)
}

/// Days from `first_day` through 31/Dec/9999, both included.
pub fn days_left(first_day: i32) -> u32 {
    u32::try_from(MAX_ORDINAL.saturating_sub(first_day).saturating_add(1)).unwrap_or(0)
}

/// Produces access log lines for days `first_day..first_day + days`.
pub struct Generator<R> {
    rng: R,
    codec: DateCodec,
    first_day: i32,
    days: u32,
    malformed_ratio: f64,
}

impl<R: Rng> Generator<R> {
    pub fn new(rng: R, first_day: i32, days: u32, malformed_ratio: f64) -> Self {
        Self {
            rng,
            codec: DateCodec::default(),
            first_day,
            days: days.clamp(1, days_left(first_day).max(1)),
            malformed_ratio: if malformed_ratio.is_nan() {
                0.0
            } else {
                malformed_ratio.clamp(0.0, 1.0)
            },
        }
    }

    pub fn next_line(&mut self) -> String {
        let offset = self.rng.random_range(0..self.days);
        let day = i32::try_from(offset)
            .ok()
            .and_then(|offset| self.first_day.checked_add(offset))
            .unwrap_or(self.first_day);
        let day = self.codec.decode(day);
        if self.rng.random_bool(self.malformed_ratio) {
            malformed_log(&mut self.rng, &day)
        } else {
            access_log(&mut self.rng, &day)
        }
    }
}

pub fn access_log<R: Rng + ?Sized>(rng: &mut R, day: &str) -> String {
    let host = pick(rng, &HOSTS);
    let method = pick(rng, &METHODS);
    let path = pick(rng, &PATHS);
    let status = pick(rng, &STATUS);
    let time = timestamp(rng, day);
    let bytes = if *status == 304 || rng.random_bool(0.05) {
        "-".to_string()
    } else {
        rng.random_range(0..50_000u32).to_string()
    };

    format!("{host} - - [{time}] \"{method} {path} HTTP/1.0\" {status} {bytes}")
}

pub fn malformed_log<R: Rng + ?Sized>(rng: &mut R, day: &str) -> String {
    let host = pick(rng, &HOSTS);
    let time = timestamp(rng, day);
    match MALFORMED.choose(rng).copied().unwrap_or("empty") {
        "quote" => format!("{host} - - [{time}] \"GET /index.html HTTP/1.0 200 512"),
        "status" => format!("{host} - - [{time}] \"GET /index.html HTTP/1.0\" OK 512"),
        "date" => format!("{host} - - [1995-07-01:00:00:01 -0400] \"GET / HTTP/1.0\" 200 512"),
        "truncated" => format!("{host} - - [{time}"),
        _ => String::new(),
    }
}

fn timestamp<R: Rng + ?Sized>(rng: &mut R, day: &str) -> String {
    format!(
        "{day}:{:02}:{:02}:{:02} -0400",
        rng.random_range(0..24),
        rng.random_range(0..60),
        rng.random_range(0..60)
    )
}
