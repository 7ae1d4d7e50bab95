//! End-to-end tests for the vitrine binary
//!
//! Runs use the bundled fixture storefront inside a temporary working
//! directory, so screenshots, reports and the last-failed cache stay
//! isolated.

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn vitrine() -> Command {
    Command::cargo_bin("vitrine").expect("vitrine binary should exist")
}

/// Command running in `dir` against the fixture storefront, colors off
fn fixture(dir: &TempDir) -> Command {
    let mut cmd = vitrine();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .args(["--backend", "fixture", "--color", "never"]);
    cmd
}

/// Settings file that points the home page at a route the storefront lacks
fn broken_home_config(dir: &TempDir) -> String {
    let path = dir.path().join("settings.yaml");
    fs::write(&path, "urls:\n  home: no-such-page\n").unwrap();
    path.to_string_lossy().to_string()
}

// ============================================================================
// Basic CLI
// ============================================================================

#[test]
fn test_version_flag() {
    vitrine()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.3.0"));
}

#[test]
fn test_help_lists_selection_flags() {
    vitrine()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--smoke"))
        .stdout(predicate::str::contains("--wishlist"))
        .stdout(predicate::str::contains("--backend"))
        .stdout(predicate::str::contains("--tb"));
}

#[test]
fn test_no_args_prints_help() {
    vitrine()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_selection_flags_conflict() {
    vitrine().args(["--smoke", "--cart"]).assert().code(2);
}

#[test]
fn test_unknown_browser_is_usage_error() {
    vitrine().args(["--browser", "safari"]).assert().code(2);
}

// ============================================================================
// Listing
// ============================================================================

#[test]
fn test_list_login_scenarios() {
    let dir = TempDir::new().unwrap();
    fixture(&dir)
        .args(["--login", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("login::test_valid_login"))
        .stdout(predicate::str::contains("cart::").not());
}

#[test]
fn test_list_by_generic_marker() {
    let dir = TempDir::new().unwrap();
    fixture(&dir)
        .args(["--marker", "shop", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shop::test_shop_page_loads"));
}

#[test]
fn test_list_error_handling_scenarios() {
    let dir = TempDir::new().unwrap();
    fixture(&dir)
        .args(["--marker", "error_handling", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("error_handling::test_invalid_url_handling"))
        .stdout(predicate::str::contains("navigation::test_404_error_handling"))
        .stdout(predicate::str::contains("home::").not());
}

#[test]
fn test_unmatched_file_fails() {
    let dir = TempDir::new().unwrap();
    fixture(&dir)
        .args(["--file", "checkout"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no scenarios match"));
}

// ============================================================================
// Runs against the fixture storefront
// ============================================================================

#[test]
fn test_login_suite_passes() {
    let dir = TempDir::new().unwrap();
    fixture(&dir)
        .args(["--login", "--parallel", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PASSED"))
        .stdout(predicate::str::contains("0 failed"));
    let cache = fs::read_to_string(dir.path().join(".vitrine_cache/lastfailed.json")).unwrap();
    assert_eq!(cache.trim(), "{}");
}

#[test]
fn test_skips_do_not_fail_the_run() {
    let dir = TempDir::new().unwrap();
    fixture(&dir)
        .args(["--test", "cart::test_shipping_calculator"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SKIPPED cart::test_shipping_calculator"))
        .stdout(predicate::str::contains("1 skipped"));
}

#[test]
fn test_reports_are_written() {
    let dir = TempDir::new().unwrap();
    fixture(&dir)
        .args(["--smoke", "--html-report", "--allure", "-n", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HTML report:"));

    let names: Vec<String> = fs::read_dir(dir.path().join("reports"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert!(names.iter().any(|n| n.starts_with("test_report_") && n.ends_with(".html")));
    let allure = names.iter().find(|n| n.starts_with("allure_")).unwrap();
    let results = fs::read_dir(dir.path().join("reports").join(allure)).unwrap().count();
    assert!(results > 0);
}

#[test]
fn test_failure_exit_code_and_summary() {
    let dir = TempDir::new().unwrap();
    let config = broken_home_config(&dir);
    fixture(&dir)
        .args(["--config", &config, "--test", "home::test_logo_is_visible", "--tb", "line"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAILED 1 scenarios"))
        .stdout(predicate::str::contains("home::test_logo_is_visible:"))
        .stdout(predicate::str::contains("Failure screenshots: screenshots/"));
}

#[test]
fn test_last_failed_reruns_failures() {
    let dir = TempDir::new().unwrap();
    let config = broken_home_config(&dir);
    fixture(&dir)
        .args(["--config", &config, "--file", "home"])
        .assert()
        .failure();

    let cache = fs::read_to_string(dir.path().join(".vitrine_cache/lastfailed.json")).unwrap();
    assert!(cache.contains("home::test_logo_is_visible"));

    fixture(&dir)
        .args(["--lf", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("home::test_logo_is_visible"))
        .stdout(predicate::str::contains("login::").not());

    // the home page is reachable again, so the failures clear
    fixture(&dir).arg("--lf").assert().success();
    let cache = fs::read_to_string(dir.path().join(".vitrine_cache/lastfailed.json")).unwrap();
    assert_eq!(cache.trim(), "{}");
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    fixture(&dir)
        .args(["--config", "absent.yaml", "--smoke"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.yaml"));
}

#[cfg(not(feature = "browser"))]
#[test]
fn test_cdp_backend_needs_browser_feature() {
    let dir = TempDir::new().unwrap();
    vitrine()
        .current_dir(dir.path())
        .args(["--smoke", "--headless"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--features browser"));
}
