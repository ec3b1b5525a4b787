use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn bin() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("pv"))
}

fn create(vault: &Path) {
    bin()
        .arg("create")
        .arg(vault)
        .args(["--argon-mem", "1024", "--argon-time", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vault created"));
}

fn store(vault: &Path, key: &str, value: &str, password: &str) -> assert_cmd::assert::Assert {
    bin()
        .env("PV_PASSWORD", password)
        .arg("store")
        .arg(key)
        .arg(vault)
        .write_stdin(format!("{value}\n"))
        .assert()
}

fn read(vault: &Path, key: &str, password: &str) -> assert_cmd::assert::Assert {
    bin()
        .env("PV_PASSWORD", password)
        .arg("read")
        .arg(key)
        .arg(vault)
        .assert()
}

#[test]
fn create_writes_vault_file() {
    let dir = tempdir().unwrap();
    let vault = dir.path().join("v.dat");

    create(&vault);

    assert!(vault.exists());
}

#[test]
fn create_refuses_existing_path() {
    let dir = tempdir().unwrap();
    let vault = dir.path().join("v.dat");
    create(&vault);

    bin()
        .arg("create")
        .arg(&vault)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn create_rejects_weak_kdf_parameters() {
    let dir = tempdir().unwrap();
    let vault = dir.path().join("v.dat");

    bin()
        .arg("create")
        .arg(&vault)
        .args(["--argon-time", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid KDF parameters"));

    assert!(!vault.exists());
}

#[test]
fn store_and_read_roundtrip() {
    let dir = tempdir().unwrap();
    let vault = dir.path().join("v.dat");
    create(&vault);

    store(&vault, "api", "sk-123", "correct horse")
        .success()
        .stdout(predicate::str::contains("stored secret 'api'"));

    read(&vault, "api", "correct horse")
        .success()
        .stdout(predicate::eq("sk-123\n"));
}

#[test]
fn secret_and_password_can_both_come_from_stdin() {
    let dir = tempdir().unwrap();
    let vault = dir.path().join("v.dat");
    create(&vault);

    bin()
        .env_remove("PV_PASSWORD")
        .arg("store")
        .arg("api")
        .arg(&vault)
        .write_stdin("sk-123\ncorrect horse\n")
        .assert()
        .success();

    read(&vault, "api", "correct horse")
        .success()
        .stdout(predicate::eq("sk-123\n"));
}

#[test]
fn read_with_wrong_password_fails() {
    let dir = tempdir().unwrap();
    let vault = dir.path().join("v.dat");
    create(&vault);
    store(&vault, "api", "sk-123", "correct horse").success();

    read(&vault, "api", "wrong")
        .failure()
        .stderr(predicate::str::contains("authentication failed"))
        .stdout(predicate::str::contains("sk-123").not());
}

#[test]
fn read_missing_secret_fails() {
    let dir = tempdir().unwrap();
    let vault = dir.path().join("v.dat");
    create(&vault);

    read(&vault, "nope", "pw")
        .failure()
        .stderr(predicate::str::contains("secret 'nope' not found"));
}

#[test]
fn store_with_different_password_is_refused() {
    let dir = tempdir().unwrap();
    let vault = dir.path().join("v.dat");
    create(&vault);
    store(&vault, "first", "1", "pw-one").success();

    store(&vault, "second", "2", "pw-two")
        .failure()
        .stderr(predicate::str::contains("does not match"));

    bin()
        .arg("list")
        .arg(&vault)
        .assert()
        .success()
        .stdout(predicate::eq("first\n"));
}

#[test]
fn store_requires_existing_vault() {
    let dir = tempdir().unwrap();
    let vault = dir.path().join("missing.dat");

    store(&vault, "api", "x", "pw")
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn read_requires_existing_vault() {
    let dir = tempdir().unwrap();
    let vault = dir.path().join("missing.dat");

    bin()
        .env_remove("PV_PASSWORD")
        .arg("read")
        .arg("api")
        .arg(&vault)
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("vault does not exist"))
        .stderr(predicate::str::contains("no master password").not());
}

#[test]
fn list_prints_names_in_insertion_order() {
    let dir = tempdir().unwrap();
    let vault = dir.path().join("v.dat");
    create(&vault);

    for name in ["zulu", "alpha", "mike"] {
        store(&vault, name, "x", "pw").success();
    }

    bin()
        .arg("list")
        .arg(&vault)
        .assert()
        .success()
        .stdout(predicate::eq("zulu\nalpha\nmike\n"));
}

#[test]
fn delete_removes_secret() {
    let dir = tempdir().unwrap();
    let vault = dir.path().join("v.dat");
    create(&vault);
    store(&vault, "api", "sk-123", "pw").success();

    bin()
        .arg("delete")
        .arg("api")
        .arg(&vault)
        .assert()
        .success()
        .stdout(predicate::str::contains("secret 'api' deleted"));

    bin()
        .arg("list")
        .arg(&vault)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn delete_missing_secret_fails() {
    let dir = tempdir().unwrap();
    let vault = dir.path().join("v.dat");
    create(&vault);

    bin()
        .arg("delete")
        .arg("api")
        .arg(&vault)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn corrupted_vault_is_reported() {
    let dir = tempdir().unwrap();
    let vault = dir.path().join("v.dat");
    std::fs::write(&vault, b"garbage").unwrap();

    bin()
        .arg("list")
        .arg(&vault)
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed vault"));
}
