//! End-to-end CLI tests for the epub-downloader binary.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;

/// Binary command isolated to `home`: XDG variables are cleared so every
/// path resolves under the temporary HOME.
fn isolated_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("epub-downloader").unwrap();
    cmd.env("HOME", home)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("XDG_DATA_HOME")
        .env_remove("XDG_CACHE_HOME")
        .env_remove("RUST_LOG");
    cmd
}

fn profile_body() -> serde_json::Value {
    json!({
        "id": "u-7",
        "first_name": "Grace",
        "last_name": "Hopper",
        "subscription": {"active": true, "type": "premium"}
    })
}

#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("epub-downloader").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Download subscription books as EPUB"))
        .stdout(predicate::str::contains("auth"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("epub-downloader").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("epub-downloader"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("epub-downloader").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_config_show_writes_defaults_on_first_run() {
    let home = TempDir::new().unwrap();

    isolated_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("concurrent_downloads = 5"))
        .stdout(predicate::str::contains("rate_limit_rps = 10"))
        .stdout(predicate::str::contains("theme = dark"))
        .stdout(predicate::str::contains("Books/OReilly"));

    let config_file = home.path().join(".config/epub-downloader/config.yaml");
    assert!(config_file.is_file(), "default config should be written");
}

#[test]
fn test_config_show_reads_custom_file() {
    let home = TempDir::new().unwrap();
    let config_file = home.path().join("custom.yaml");
    std::fs::write(
        &config_file,
        "# tuned\nrate_limit_rps: 4\ntheme: \"light\"\nlog_path: \"\"\n",
    )
    .unwrap();

    isolated_cmd(home.path())
        .args(["config", "show", "--config"])
        .arg(&config_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("rate_limit_rps = 4"))
        .stdout(predicate::str::contains("theme = light"))
        .stdout(predicate::str::contains("log_path = <stderr>"));
}

#[test]
fn test_out_of_range_config_fails_naming_field() {
    let home = TempDir::new().unwrap();
    let config_file = home.path().join("bad.yaml");
    std::fs::write(&config_file, "concurrent_downloads: 50\n").unwrap();

    isolated_cmd(home.path())
        .args(["config", "show", "--config"])
        .arg(&config_file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("concurrent_downloads"))
        .stderr(predicate::str::contains("VAL_001"));
}

#[test]
fn test_auth_clear_without_saved_cookies_succeeds() {
    let home = TempDir::new().unwrap();

    isolated_cmd(home.path())
        .args(["auth", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved cookies found"));
}

#[test]
fn test_auth_status_without_saved_cookies_fails() {
    let home = TempDir::new().unwrap();

    isolated_cmd(home.path())
        .args(["auth", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No saved session"));
}

#[test]
fn test_auth_import_rejects_invalid_json_from_stdin() {
    let home = TempDir::new().unwrap();

    isolated_cmd(home.path())
        .args(["auth", "import", "-"])
        .write_stdin("definitely not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("AUTH_004"));

    let cookies = home.path().join(".config/epub-downloader/cookies.json");
    assert!(!cookies.exists());
}

#[tokio::test]
async fn test_auth_import_status_and_clear_round_trip() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/api/v1/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let export = home.path().join("export.json");
    std::fs::write(
        &export,
        r#"[{"name": "orm-jwt", "value": "token"}, {"name": "empty"}]"#,
    )
    .unwrap();
    let base_url = server.uri();
    let home_path = home.path().to_path_buf();

    tokio::task::spawn_blocking(move || {
        isolated_cmd(&home_path)
            .args(["auth", "import", "--base-url", &base_url])
            .arg(&export)
            .assert()
            .success()
            .stdout(predicate::str::contains("Signed in as Grace Hopper"));
        assert!(
            home_path
                .join(".config/epub-downloader/cookies.json")
                .is_file()
        );

        isolated_cmd(&home_path)
            .args(["auth", "status", "--base-url", &base_url])
            .assert()
            .success()
            .stdout(predicate::str::contains("subscription = premium"));

        isolated_cmd(&home_path)
            .args(["auth", "clear"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed saved cookies"));
    })
    .await
    .unwrap();
}
