use std::{fs, path::Path, process::Output};

use asserting::prelude::*;
use tokio::process::Command;

const LOG: &str = r#"199.72.81.55 - - [01/Jul/1995:00:00:01 -0400] "GET /history/apollo/ HTTP/1.0" 200 6245
unicomp6.unicomp.net - - [01/Jul/1995:00:00:06 -0400] "GET /shuttle/countdown/ HTTP/1.0" 200 3985
burger.letters.com - - [01/Jul/1995:00:00:12 -0400] "GET /images/NASA-logosmall.gif HTTP/1.0" 304 0
burger.letters.com - - [01/Jul/1995:00:00:12 -0400] "GET /shuttle/missing.gif HTTP/1.0" 404 -
199.72.81.55 - - [01/Jul/1995:00:00:13 -0400] "GET /pub/winvn/readme.txt HTTP/1.0" 404 -
199.72.81.55 - - [02/Jul/1995:00:00:13 -0400] "GET /pub/winvn/readme.txt HTTP/1.0" 404 -
this line is garbage
d104.aa.net - - [03/Jul/1995:00:00:15 -0400] "GET /shuttle/missing.gif HTTP/1.0" 404 -
"#;

async fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_access-stats"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .await
        .expect("Failed to start access-stats")
}

fn write_log(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn json_report_for_a_single_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(dir.path(), "access.log", LOG);

    let output = run(&[&path, "--format", "json", "--workers", "2", "--chunk-lines", "3"]).await;
    assert!(output.status.success(), "{output:?}");

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_that!(report["unique_hosts"].as_u64()).is_equal_to(Some(4));
    assert_that!(report["not_found_total"].as_u64()).is_equal_to(Some(4));
    assert_that!(report["top_not_found_urls"].clone()).is_equal_to(serde_json::json!([
        "199.72.81.55/pub/winvn/readme.txt",
        "burger.letters.com/shuttle/missing.gif",
        "d104.aa.net/shuttle/missing.gif",
    ]));
    assert_that!(report["lines_read"].as_u64()).is_equal_to(Some(8));
    assert_that!(report["lines_rejected"].as_u64()).is_equal_to(Some(1));

    let days: Vec<_> = report["not_found_by_day"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| (d["date"].as_str().unwrap().to_string(), d["count"].as_u64().unwrap()))
        .collect();
    assert_that!(days).is_equal_to(vec![
        ("01/Jul/1995".to_string(), 2),
        ("02/Jul/1995".to_string(), 1),
        ("03/Jul/1995".to_string(), 1),
    ]);
}

#[tokio::test]
async fn text_report_for_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    let (head, tail) = LOG.split_at(LOG.find("this line").unwrap());
    write_log(dir.path(), "part-00000", head);
    write_log(dir.path(), "part-00001", tail);
    write_log(dir.path(), "_SUCCESS", "");

    let output = run(&[dir.path().to_str().unwrap(), "--unit", "tib"]).await;
    assert!(output.status.success(), "{output:?}");

    let text = String::from_utf8(output.stdout).unwrap();
    assert_that!(text.clone()).contains("1. Number of unique hosts : 4");
    assert_that!(text.clone()).contains("2. Total of 404 errors: 4");
    assert_that!(text.clone()).contains("Mean and Std.: 1.33 +- 0.47");
    assert_that!(text.clone()).contains("01/Jul/1995: 2     02/Jul/1995: 1     03/Jul/1995: 1");
    assert_that!(text).contains("5. Total of bytes returned: 0.00 TB");
}

#[tokio::test]
async fn empty_input_reports_undefined_spread() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(dir.path(), "empty.log", "");

    let output = run(&[&path]).await;
    assert!(output.status.success(), "{output:?}");

    let text = String::from_utf8(output.stdout).unwrap();
    assert_that!(text.clone()).contains("1. Number of unique hosts : 0");
    assert_that!(text.clone()).contains("Mean and Std.: undefined");
    assert_that!(text).contains("5. Total of bytes returned: 0.00 GB");
}

#[tokio::test]
async fn missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.log");

    let output = run(&[missing.to_str().unwrap()]).await;
    assert_that!(output.status.success()).is_false();
    assert_that!(String::from_utf8_lossy(&output.stderr).into_owned()).contains("nope.log");
}
