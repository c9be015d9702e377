//! Smoke tests to verify command module wiring

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command running inside an empty directory with its own SQLite file.
fn relations(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("relations").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("DATABASE_URL")
        .env_remove("RELATIONS_CONFIG")
        .env_remove("RELATIONS_BIND")
        .arg("--database-url")
        .arg(format!(
            "sqlite://{}",
            dir.path().join("db.sqlite3").display()
        ));
    cmd
}

// === Help Output ===

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("relations").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Address to bind to"));
}

#[test]
fn test_migrate_help() {
    let mut cmd = Command::cargo_bin("relations").unwrap();
    cmd.arg("migrate").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("history"));
}

#[test]
fn test_demo_help() {
    let mut cmd = Command::cargo_bin("relations").unwrap();
    cmd.arg("demo").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("m2m"));
}

// === Migrations ===

#[test]
fn test_migrate_history_lists_products_revision() {
    let dir = TempDir::new().unwrap();
    relations(&dir)
        .args(["migrate", "history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("6b4b3268d773"));
}

#[test]
fn test_migrate_up_then_current_is_head() {
    let dir = TempDir::new().unwrap();
    relations(&dir)
        .args(["migrate", "up"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied 6b4b3268d773"));

    relations(&dir)
        .args(["migrate", "current"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(head)"));
}

#[test]
fn test_migrate_down_steps_back_one() {
    let dir = TempDir::new().unwrap();
    relations(&dir).args(["migrate", "up"]).assert().success();

    relations(&dir)
        .args(["migrate", "down"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reverted c3e5b8a7d2f1"));

    relations(&dir)
        .args(["migrate", "current"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a1f0c2d9e4b7"));
}

#[test]
fn test_migrate_unknown_revision_fails() {
    let dir = TempDir::new().unwrap();
    relations(&dir)
        .args(["migrate", "up", "deadbeef"])
        .assert()
        .failure();
}

// === Demos ===

#[test]
fn test_demo_m2m_in_memory() {
    let dir = TempDir::new().unwrap();
    relations(&dir)
        .args(["demo", "m2m", "--in-memory"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mouse"))
        .stdout(predicate::str::contains("promocode='promo'"));
}

#[test]
fn test_demo_relations_in_memory() {
    let dir = TempDir::new().unwrap();
    relations(&dir)
        .args(["demo", "relations", "--in-memory"])
        .assert()
        .success()
        .stdout(predicate::str::contains("username='john'"))
        .stdout(predicate::str::contains("SQLA Joins"));
}

#[test]
fn test_demo_relations_twice_on_same_database_fails() {
    let dir = TempDir::new().unwrap();
    relations(&dir).args(["demo", "relations"]).assert().success();

    relations(&dir)
        .args(["demo", "relations"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("conflict"));
}
