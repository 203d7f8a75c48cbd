//! Error scenario integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn wavscribe_bin(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("wavscribe").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.path())
        .env("HOME", home.path())
        .env_remove("WAVSCRIBE_ENDPOINT");
    cmd
}

fn write_silence(home: &TempDir) -> std::path::PathBuf {
    let input = home.path().join("clip.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&input, spec).unwrap();
    writer.write_sample(0i16).unwrap();
    writer.finalize().unwrap();
    input
}

#[test]
fn config_get_unknown_key() {
    let home = TempDir::new().unwrap();
    wavscribe_bin(&home)
        .args(["config", "get", "unknown_key"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown key").and(predicate::str::contains("endpoint")));
}

#[test]
fn config_set_rejects_bad_number() {
    let home = TempDir::new().unwrap();
    wavscribe_bin(&home)
        .args(["config", "set", "max_duration", "forever"])
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("max_duration")
                .and(predicate::str::contains("positive whole number")),
        );
    assert!(!home.path().join("wavscribe").join("config.toml").exists());
}

#[test]
fn config_set_rejects_non_http_endpoint() {
    let home = TempDir::new().unwrap();
    wavscribe_bin(&home)
        .args(["config", "set", "endpoint", "file:///tmp/x"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unsupported scheme"));
}

#[test]
fn malformed_config_file_falls_back_to_defaults() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("wavscribe");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "timeout = [not toml").unwrap();
    let input = write_silence(&home);
    let output = home.path().join("out.wav");

    wavscribe_bin(&home)
        .args(["convert", input.to_str().unwrap(), output.to_str().unwrap()])
        .assert()
        .success();
    assert!(output.exists());
}

#[test]
fn unknown_subcommand_is_usage_error() {
    let home = TempDir::new().unwrap();
    wavscribe_bin(&home)
        .arg("transcribe-everything")
        .assert()
        .code(2);
}

#[test]
fn send_to_unreachable_endpoint_fails() {
    let home = TempDir::new().unwrap();
    let input = write_silence(&home);

    wavscribe_bin(&home)
        .args([
            "send",
            input.to_str().unwrap(),
            "--endpoint",
            "http://127.0.0.1:1/transcribe",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Error sending recording"));
}

#[test]
fn send_missing_file_fails() {
    let home = TempDir::new().unwrap();
    wavscribe_bin(&home)
        .args(["send", "/nonexistent/clip.wav"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read"));
}
