use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_the_subcommands() {
    Command::cargo_bin("annot")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("create")
                .and(predicate::str::contains("fetch"))
                .and(predicate::str::contains("contexts")),
        );
}

#[test]
fn fetch_rejects_from_without_to() {
    Command::cargo_bin("annot")
        .unwrap()
        .args(["fetch", "--from", "2025-01-27T00:00:00Z"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--to"));
}

#[test]
fn unknown_subcommands_fail() {
    Command::cargo_bin("annot")
        .unwrap()
        .arg("frobnicate")
        .assert()
        .failure();
}
