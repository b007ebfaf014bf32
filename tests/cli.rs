// this_file: tests/cli.rs
//! CLI integration tests for the snapline binary

use assert_cmd::prelude::*;
use assert_cmd::Command;
use base64::Engine as _;
use predicates::prelude::*;
use std::path::Path;

/// Helper to run the `snapline` binary
fn bin() -> Command {
    let mut cmd = Command::cargo_bin("snapline").expect("binary exists");
    cmd.env_remove("RUST_LOG");
    cmd
}

const SYSTEM_MONO: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf";

#[test]
fn test_cli_version_prints() {
    bin()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("snapline version"));
}

#[test]
fn test_cli_render_without_font_fails() {
    bin()
        .args(["render", "--text", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No active font"));
}

#[test]
fn test_cli_missing_font_fails() {
    bin()
        .args(["render", "--text", "hi", "--font", "/nonexistent/font.ttf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn test_cli_rejects_bad_color() {
    bin()
        .args(["render", "--text", "hi", "--fg", "teal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("#rrggbb"));
}

#[test]
fn test_cli_rejects_unknown_role() {
    bin()
        .args(["render", "--text", "hi", "--font", "a.ttf=heavy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown font role"));
}

#[test]
fn test_cli_bad_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.json");
    std::fs::write(&config, r#"{"line_height": 0}"#).unwrap();
    bin()
        .args(["render", "--text", "hi", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line_height"));
}

#[test]
fn test_cli_missing_config_names_path() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("absent.json");
    bin()
        .args(["render", "--text", "hi", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading config"))
        .stderr(predicate::str::contains("absent.json"))
        .stderr(predicate::str::contains("IO error"));
}

#[test]
fn test_cli_renders_png_to_stdout() {
    if !Path::new(SYSTEM_MONO).exists() {
        eprintln!("skipping: {} not installed", SYSTEM_MONO);
        return;
    }
    let output = bin()
        .args(["render", "--text", "hi", "--font", SYSTEM_MONO])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    let png = base64::engine::general_purpose::STANDARD
        .decode(text.trim())
        .unwrap();
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!((img.width(), img.height()), (32, 32));
}

#[test]
fn test_cli_renders_ppm_to_file() {
    if !Path::new(SYSTEM_MONO).exists() {
        eprintln!("skipping: {} not installed", SYSTEM_MONO);
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.ppm");
    let font = format!("{}=bold", SYSTEM_MONO);
    bin()
        .args([
            "render",
            "--text",
            "ab\ncd",
            "--font",
            font.as_str(),
            "--line-height",
            "20",
            "--format",
            "ppm",
            "--output",
        ])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"P6"));
    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!((img.width(), img.height()), (20, 40));
}
