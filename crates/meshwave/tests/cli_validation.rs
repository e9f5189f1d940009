use std::io::Write;
use std::process::Command;

use tempfile::NamedTempFile;

fn meshwave() -> Command {
    Command::new(env!("CARGO_BIN_EXE_meshwave"))
}

fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

#[test]
fn help_lists_the_gradient_flags() {
    let output = meshwave()
        .arg("--help")
        .output()
        .expect("failed to run meshwave --help");

    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for flag in [
        "--size",
        "--colors",
        "--palette",
        "--profile",
        "--density",
        "--fps",
        "--speed",
        "--amplitude",
        "--seed",
        "--wireframe",
    ] {
        assert!(help.contains(flag), "help must mention {flag}");
    }
}

#[test]
fn malformed_size_is_rejected_at_parse_time() {
    let output = meshwave()
        .args(["--size", "1280"])
        .output()
        .expect("failed to run meshwave");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("WIDTHxHEIGHT"), "stderr was: {stderr}");
}

#[test]
fn malformed_density_is_rejected_at_parse_time() {
    let output = meshwave()
        .args(["--density", "0.06"])
        .output()
        .expect("failed to run meshwave");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("DXxDZ"), "stderr was: {stderr}");
}

#[test]
fn unknown_profile_key_fails_before_any_window_opens() {
    let profile = temp_file("refresh_rate = 60\n");
    let output = meshwave()
        .args(["--profile", profile.path().to_str().unwrap()])
        .output()
        .expect("failed to run meshwave");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid profile"), "stderr was: {stderr}");
}

#[test]
fn invalid_palette_entry_is_a_configuration_error() {
    let palette = temp_file(r##"["#ef008f", "chartreuse-ish"]"##);
    let output = meshwave()
        .args(["--palette", palette.path().to_str().unwrap()])
        .output()
        .expect("failed to run meshwave");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("not a valid color string"),
        "stderr was: {stderr}"
    );
}

#[test]
fn oversized_palette_is_rejected() {
    let colors = vec!["#ffffff"; 11].join(",");
    let output = meshwave()
        .args(["--colors", &colors])
        .output()
        .expect("failed to run meshwave");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("10"), "stderr was: {stderr}");
}
