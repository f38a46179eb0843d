use std::sync::LazyLock;

use regex::Regex;

static REQUEST_GRAMMAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:GET|HEAD|POST) (.*)").expect("request grammar compiles"));

/// Host followed directly by the requested path, or an empty string when the
/// request line is not `GET|HEAD|POST <path> ...`.
///
/// Status codes are not looked at; callers pick which records to feed in.
pub fn extract_url(host: &str, request: &str) -> String {
    REQUEST_GRAMMAR
        .captures(request)
        .and_then(|caps| caps.get(1))
        .and_then(|rest| rest.as_str().split_whitespace().next())
        .map(|path| format!("{host}{path}"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use asserting::prelude::*;

    #[test]
    fn joins_host_and_path() {
        assert_that!(extract_url("127.0.0.1", "GET /a.html HTTP/1.0"))
            .is_equal_to("127.0.0.1/a.html".to_string());
        assert_that!(extract_url("h", "HEAD /b HTTP/1.0")).is_equal_to("h/b".to_string());
        assert_that!(extract_url("h", "POST /cgi-bin/c")).is_equal_to("h/cgi-bin/c".to_string());
    }

    #[test]
    fn tolerates_extra_whitespace_before_the_path() {
        assert_that!(extract_url("h", "GET   /spaced HTTP/1.0")).is_equal_to("h/spaced".to_string());
    }

    #[test]
    fn unknown_or_broken_requests_yield_nothing() {
        for request in ["", "GET", "GET ", "GET    ", "PUT /a HTTP/1.0", "get /a", "GETX /a", "/a"] {
            assert_eq!(extract_url("h", request), "", "{request:?}");
        }
    }
}
