//! CLI integration tests

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn wavscribe_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_wavscribe"))
}

/// Run with a private config directory so the user's config is never touched
fn run_isolated(config_home: &Path, args: &[&str]) -> Output {
    wavscribe_bin()
        .env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env_remove("WAVSCRIBE_ENDPOINT")
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn write_pcm16(path: &Path, channels: u16, sample_rate: u32, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &sample in samples {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn help_output() {
    let output = wavscribe_bin()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("transcription"));
    assert!(stdout.contains("--endpoint"));
    assert!(stdout.contains("--max-duration"));
    assert!(stdout.contains("--output"));
    assert!(stdout.contains("--no-upload"));
    assert!(stdout.contains("convert"));
    assert!(stdout.contains("send"));
}

#[test]
fn version_output() {
    let output = wavscribe_bin()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("wavscribe"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn config_path_command() {
    let home = TempDir::new().unwrap();
    let output = run_isolated(home.path(), &["config", "path"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("wavscribe"));
    assert!(stdout.trim_end().ends_with("config.toml"));
}

#[test]
fn config_set_then_get() {
    let home = TempDir::new().unwrap();

    let set = run_isolated(home.path(), &["config", "set", "timeout", "15"]);
    assert!(set.status.success(), "{}", String::from_utf8_lossy(&set.stderr));

    let get = run_isolated(home.path(), &["config", "get", "timeout"]);
    assert!(get.status.success());
    assert_eq!(String::from_utf8_lossy(&get.stdout).trim(), "15");
}

#[test]
fn config_list_shows_every_key() {
    let home = TempDir::new().unwrap();
    let output = run_isolated(home.path(), &["config", "list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for key in ["endpoint", "max_duration", "queue_capacity", "timeout"] {
        assert!(stdout.contains(key), "missing {} in {}", key, stdout);
    }
}

#[test]
fn config_init_twice_fails() {
    let home = TempDir::new().unwrap();

    assert!(run_isolated(home.path(), &["config", "init"]).status.success());
    let again = run_isolated(home.path(), &["config", "init"]);
    assert_eq!(again.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&again.stderr).contains("already exists"));
}

#[test]
fn no_upload_without_output_is_usage_error() {
    let output = wavscribe_bin()
        .arg("--no-upload")
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn invalid_endpoint_is_usage_error() {
    let home = TempDir::new().unwrap();
    let output = run_isolated(home.path(), &["--endpoint", "not a url", "send", "x.wav"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid endpoint"));
}

#[test]
fn convert_writes_pcm16_wav() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.wav");
    let output_path = dir.path().join("output.wav");
    let samples: Vec<i16> = vec![0, 1000, -1000, 16000, -16000, 32767, -32768, 5];
    write_pcm16(&input, 2, 22_050, &samples);

    let output = run_isolated(
        dir.path(),
        &[
            "convert",
            input.to_str().unwrap(),
            output_path.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let bytes = std::fs::read(&output_path).unwrap();
    assert_eq!(bytes.len(), 44 + samples.len() * 2);

    let mut reader = hound::WavReader::open(&output_path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 22_050);
    assert_eq!(spec.bits_per_sample, 16);

    let converted: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
    for (got, want) in converted.iter().zip(&samples) {
        assert!((i32::from(*got) - i32::from(*want)).abs() <= 1, "{} vs {}", got, want);
    }
}

#[test]
fn convert_rejects_non_audio() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, b"this is plain text, not audio").unwrap();
    let output_path = dir.path().join("out.wav");

    let output = run_isolated(
        dir.path(),
        &[
            "convert",
            input.to_str().unwrap(),
            output_path.to_str().unwrap(),
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error converting audio"));
    assert!(!output_path.exists());
}

#[test]
fn convert_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_isolated(
        dir.path(),
        &["convert", "/nonexistent/input.wav", "/nonexistent/out.wav"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read"));
}

#[tokio::test]
async fn send_uploads_and_prints_json() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/transcribe"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "text": "hello there" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let input = dir.path().join("clip.wav");
    write_pcm16(&input, 1, 16_000, &[0, 100, -100, 200]);

    let endpoint = format!("{}/transcribe", server.uri());
    let home = dir.path().to_path_buf();
    let output = tokio::task::spawn_blocking(move || {
        run_isolated(
            &home,
            &["send", input.to_str().unwrap(), "--endpoint", &endpoint],
        )
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stdout["text"], "hello there");
}

#[tokio::test]
async fn send_reports_http_error() {
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let input = dir.path().join("clip.wav");
    write_pcm16(&input, 1, 8_000, &[1, 2, 3]);

    let home = dir.path().to_path_buf();
    let endpoint = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        wavscribe_bin()
            .env("XDG_CONFIG_HOME", &home)
            .env("HOME", &home)
            .env("WAVSCRIBE_ENDPOINT", &endpoint)
            .args(["send", input.to_str().unwrap()])
            .output()
            .expect("Failed to execute command")
    })
    .await
    .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Transcription service returned an error"));
    assert!(stderr.contains("HTTP 503: model loading"));
    assert!(output.stdout.is_empty());
}
