// ABOUTME: CLI smoke tests using assert_cmd.
// ABOUTME: Covers help output, init, and config discovery failures.

use assert_cmd::Command;
use predicates::prelude::*;

fn polepole() -> Command {
    Command::cargo_bin("polepole").expect("binary builds")
}

#[test]
fn help_lists_subcommands() {
    polepole()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("deploy")
                .and(predicate::str::contains("promote"))
                .and(predicate::str::contains("revisions"))
                .and(predicate::str::contains("cleanup")),
        );
}

#[test]
fn version_flag_works() {
    polepole()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("polepole"));
}

#[test]
fn init_writes_config_template() {
    let dir = tempfile::tempdir().unwrap();

    polepole()
        .current_dir(dir.path())
        .args([
            "init",
            "--app",
            "content-api",
            "--image",
            "registry/content:v2",
        ])
        .assert()
        .success();

    let written = std::fs::read_to_string(dir.path().join("polepole.yml")).unwrap();
    assert!(written.contains("app: content-api"));
    assert!(written.contains("image: registry/content:v2"));
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();

    polepole()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    polepole()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn commands_fail_cleanly_without_config() {
    let dir = tempfile::tempdir().unwrap();

    polepole()
        .current_dir(dir.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn rejects_conflicting_output_flags() {
    polepole()
        .args(["--quiet", "--json", "status"])
        .assert()
        .failure();
}
