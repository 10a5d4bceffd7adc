//! CLI smoke tests for nmodule.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the nmodule binary, isolated from the caller's installation.
fn nmodule_cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("nmodule");
    cmd.env_remove("niagara_home").env_remove("RUST_LOG");
    cmd
}

/// Scaffold `demo` inside a temp directory and add one compiled class.
fn demo_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    nmodule_cmd()
        .arg("-C")
        .arg(temp.path())
        .args(["init", "demo", "-g", "acme", "--version", "1.0.0"])
        .assert()
        .success();

    let classes = temp.path().join("demo/build/classes/com/acme");
    std::fs::create_dir_all(&classes).unwrap();
    std::fs::write(classes.join("Demo.class"), b"\xca\xfe\xba\xbe").unwrap();
    temp
}

// =============================================================================
// Help
// =============================================================================

#[test]
fn help_flag_works() {
    nmodule_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn run_help_lists_examples() {
    nmodule_cmd()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nmodule run jar"));
}

// =============================================================================
// Build
// =============================================================================

#[test]
fn missing_build_file_fails() {
    let temp = TempDir::new().unwrap();
    nmodule_cmd()
        .arg("-C")
        .arg(temp.path())
        .arg("tasks")
        .assert()
        .failure()
        .stdout(predicate::str::contains("nmodule.toml not found"));
}

#[test]
fn run_jar_builds_unversioned_archive() {
    let temp = demo_project();
    let project = temp.path().join("demo");

    nmodule_cmd()
        .arg("-C")
        .arg(&project)
        .args(["run", "jar"])
        .assert()
        .success()
        .stdout(predicate::str::contains("generateModuleXml"));

    assert!(project.join("build/libs/demo.jar").is_file());
    assert!(project.join("build/resources/main/META-INF/module.xml").is_file());
}

#[test]
fn unknown_task_fails() {
    let temp = demo_project();
    nmodule_cmd()
        .arg("-C")
        .arg(temp.path().join("demo"))
        .args(["run", "deploy"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Task not found"));
}

#[test]
fn deps_json_is_valid() {
    let temp = demo_project();
    let output = nmodule_cmd()
        .arg("-C")
        .arg(temp.path().join("demo"))
        .args(["deps", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["module"], "demo");
}

// =============================================================================
// Install
// =============================================================================

#[test]
fn install_without_niagara_home_fails_after_packaging() {
    let temp = demo_project();
    let project = temp.path().join("demo");

    nmodule_cmd()
        .arg("-C")
        .arg(&project)
        .arg("install")
        .assert()
        .failure()
        .stdout(predicate::str::contains("install"))
        .stderr(predicate::str::contains("niagara_home env variable not defined"));

    assert!(project.join("build/libs/demo.jar").is_file());
}

#[test]
fn install_copies_into_modules() {
    let temp = demo_project();
    let home = TempDir::new().unwrap();

    nmodule_cmd()
        .arg("-C")
        .arg(temp.path().join("demo"))
        .env("niagara_home", home.path())
        .args(["install", "--install-sources"])
        .assert()
        .success();

    assert!(home.path().join("modules/demo.jar").is_file());
    assert!(home.path().join("modules/demo-sources.jar").is_file());
}
