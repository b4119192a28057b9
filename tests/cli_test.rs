//! Integration tests for the macboot binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Config that points every tool at `sh`, which exists on any Unix host,
/// so the bootstrap steps all find their tool and install nothing.
const PRESENT_TOOLS_CONFIG: &str = r#"
package_manager:
  binary: sh
runtime:
  binary: sh
installer:
  binary: sh
"#;

fn setup_project(config: Option<&str>, manifest: bool) -> TempDir {
    let temp = TempDir::new().unwrap();
    if let Some(config) = config {
        fs::write(temp.path().join(".macboot.yml"), config).unwrap();
    }
    if manifest {
        fs::write(temp.path().join("requirements.txt"), "requests\n").unwrap();
    }
    temp
}

fn macboot(temp: &TempDir, platform: &str) -> Command {
    let mut cmd = Command::new(cargo_bin("macboot"));
    cmd.current_dir(temp.path())
        .env("HOME", temp.path())
        .env("MACBOOT_PLATFORM", platform)
        .env("NO_COLOR", "1")
        .env_remove("MACBOOT_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("macboot"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Bootstrap a macOS Python"))
        .stdout(predicate::str::contains("status"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("macboot"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn run_help_lists_flags() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("macboot"));
    cmd.args(["run", "--help"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--keep-going"))
        .stdout(predicate::str::contains("--timeout"));
    Ok(())
}

#[test]
fn unsupported_platform_fails_without_installing() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(None, true);
    let mut cmd = macboot(&temp, "linux");
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Unsupported platform 'linux'"));

    assert!(!temp.path().join(".zshrc").exists());
    Ok(())
}

#[test]
fn missing_manifest_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(Some(PRESENT_TOOLS_CONFIG), false);
    let mut cmd = macboot(&temp, "macos");
    cmd.arg("run");
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Dependency manifest not found"));
    Ok(())
}

#[test]
fn dry_run_plans_dependency_install() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(Some(PRESENT_TOOLS_CONFIG), true);
    let mut cmd = macboot(&temp, "macos");
    cmd.args(["run", "--dry-run"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("pip install -r 'requirements.txt'"))
        .stdout(predicate::str::contains("pypi.tuna.tsinghua.edu.cn"));
    Ok(())
}

#[test]
fn invalid_config_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(Some("unknown_key: true\n"), true);
    let mut cmd = macboot(&temp, "macos");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
    Ok(())
}

#[test]
fn explicit_config_from_env_must_exist() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(None, true);
    let mut cmd = macboot(&temp, "macos");
    cmd.env("MACBOOT_CONFIG", temp.path().join("missing.yml"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Configuration not found"));
    Ok(())
}

#[test]
fn status_json_reports_facts() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(Some(PRESENT_TOOLS_CONFIG), true);
    let mut cmd = macboot(&temp, "macos");
    cmd.args(["status", "--json"]);
    let output = cmd.output()?;

    assert!(output.status.success());
    let facts: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(facts["platform"], "macos");
    assert_eq!(facts["platform_supported"], true);
    assert_eq!(facts["runtime"]["status"]["state"], "present");
    assert_eq!(facts["manifest_present"], true);
    Ok(())
}

#[test]
fn status_on_wrong_platform_is_not_ready() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(Some(PRESENT_TOOLS_CONFIG), true);
    let mut cmd = macboot(&temp, "linux");
    cmd.arg("status");
    cmd.assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("linux"));
    Ok(())
}
