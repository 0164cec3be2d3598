//! Smoke tests for the headsong binary
//!
//! None of these reach a real upstream: credentials are removed from the
//! environment or endpoints point at a closed local port.

use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const KEY_VARS: [&str; 3] = ["NEWS_API_KEY", "ANTHROPIC_API_KEY", "SUNO_API_KEY"];

/// Binary isolated from the caller's environment and config files
fn headsong_in(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("headsong"));
    cmd.current_dir(dir.path());
    cmd.env("HEADSONG_HOME", dir.path());
    cmd.env_remove("RUST_LOG");
    for var in KEY_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn write_config(dir: &TempDir, contents: &str) {
    let config_dir = dir.path().join(".headsong");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), contents).unwrap();
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    headsong_in(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("headlines"))
        .stdout(predicate::str::contains("lyrics"))
        .stdout(predicate::str::contains("doctor"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    headsong_in(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("headsong"));
}

#[test]
fn missing_select_is_usage_error() {
    let dir = TempDir::new().unwrap();
    headsong_in(&dir).arg("lyrics").assert().code(2);
}

#[test]
fn doctor_json_without_credentials() {
    let dir = TempDir::new().unwrap();
    headsong_in(&dir)
        .args(["doctor", "--json"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains(r#""ok":false"#))
        .stdout(predicate::str::contains(r#""name":"news_credential""#))
        .stdout(predicate::str::contains("ANTHROPIC_API_KEY"));
}

#[test]
fn doctor_with_credentials_never_prints_keys() {
    let dir = TempDir::new().unwrap();
    headsong_in(&dir)
        .args(["doctor"])
        .env("NEWS_API_KEY", "news-secret-value")
        .env("ANTHROPIC_API_KEY", "lyrics-secret-value")
        .env("SUNO_API_KEY", "song-secret-value")
        .assert()
        .success()
        .stdout(predicate::str::contains("4 passed"))
        .stdout(predicate::str::contains("secret-value").not());
}

#[test]
fn headlines_without_key_reports_not_configured() {
    let dir = TempDir::new().unwrap();
    headsong_in(&dir)
        .arg("headlines")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("NewsAPI service not configured"))
        .stderr(predicate::str::contains("NEWS_API_KEY"));
}

#[test]
fn explicit_missing_config_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    headsong_in(&dir)
        .args(["--config", "does-not-exist.toml", "doctor"])
        .assert()
        .code(2);
}

#[test]
fn out_of_range_max_is_config_error() {
    let dir = TempDir::new().unwrap();
    headsong_in(&dir)
        .args(["headlines", "--max", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("max_headlines"));
}

#[test]
fn unreachable_news_service_is_upstream_failure() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        r#"
[news]
base_url = "http://127.0.0.1:1/v2/top-headlines"

[http]
timeout_secs = 5
connect_timeout_secs = 2
"#,
    );

    headsong_in(&dir)
        .args(["headlines", "--json"])
        .env("NEWS_API_KEY", "news-secret-value")
        .assert()
        .code(5)
        .stdout(predicate::str::contains(r#""stage":"error""#))
        .stderr(predicate::str::contains("Could not fetch headlines"))
        .stderr(predicate::str::contains("news-secret-value").not());
}
