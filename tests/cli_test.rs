use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

#[test]
fn test_check_summarizes_valid_seed() {
    let mut cmd = Command::new(cargo_bin!("teller"));
    cmd.args(["check", "--seed", "tests/fixtures/seed.json"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("seed OK"))
        .stdout(predicate::str::contains("users        : 4"))
        .stdout(predicate::str::contains("accounts     : 2"))
        .stdout(predicate::str::contains("3 (2 pending)"));
}

#[test]
fn test_check_rejects_malformed_json() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{{ this is not json").unwrap();

    let mut cmd = Command::new(cargo_bin!("teller"));
    cmd.args(["check", "--seed"]).arg(file.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("seed"));
}

#[test]
fn test_check_rejects_dangling_references() {
    let mut file = NamedTempFile::new().unwrap();
    // Transaction 1 points at user 42, which does not exist.
    writeln!(
        file,
        r#"{{
            "users": [],
            "transactions": [
                {{
                    "id": 1,
                    "user_id": 42,
                    "amount": "10.00",
                    "transaction_type": "DEPOSIT_TO_WALLET",
                    "status": "PENDING",
                    "created_at": "2026-01-15T09:00:00Z"
                }}
            ]
        }}"#
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("teller"));
    cmd.args(["check", "--seed"]).arg(file.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown user"));
}

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::new(cargo_bin!("teller"));
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("check"));
}
