use derive_more::{AsRef, Display, From};
use serde::Serialize;

#[derive(Debug, Display, AsRef, From, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Hostname(String);

impl Hostname {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Host and request path glued together with no separator, e.g. `127.0.0.1/a.html`.
///
/// An empty key means the request line could not be read.
#[derive(Debug, Display, AsRef, From, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UrlKey(String);

impl UrlKey {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Proleptic Gregorian day number, 0001-01-01 being day 1.
#[derive(Debug, Display, From, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DayOrdinal(i32);

impl DayOrdinal {
    pub const fn get(self) -> i32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asserting::prelude::*;

    #[test]
    fn url_key_is_empty_only_for_unreadable_requests() {
        assert_that!(UrlKey::from(String::new()).is_empty()).is_true();
        assert_that!(UrlKey::from("host/a".to_string()).is_empty()).is_false();
    }

    #[test]
    fn day_ordinals_sort_by_calendar_order() {
        let mut days = vec![DayOrdinal::from(728_476), DayOrdinal::from(728_475)];
        days.sort();
        assert_that!(days.iter().map(|d| d.get()).collect::<Vec<_>>())
            .is_equal_to(vec![728_475, 728_476]);
    }
}
