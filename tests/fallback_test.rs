mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use common::{FARM_NEAR, write_farms_csv};
use predicates::prelude::*;
use std::process::Command;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();
    let farms = dir.path().join("farms.csv");
    write_farms_csv(&farms).unwrap();

    let mut cmd = Command::new(cargo_bin!("dairy-payments"));
    cmd.arg("--farms")
        .arg(&farms)
        .arg("--db-path")
        .arg(dir.path().join("some_db"))
        .args(["price-month", "--farm", FARM_NEAR, "--year", "2024", "--month", "1"]);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Falling back to In-Memory storage."))
        .stdout(predicate::str::contains("No payment data for this period"));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();
    let farms = dir.path().join("farms.csv");
    write_farms_csv(&farms).unwrap();

    let mut cmd = Command::new(cargo_bin!("dairy-payments"));
    cmd.arg("--farms")
        .arg(&farms)
        .arg("--db-path")
        .arg(dir.path().join("test_db"))
        .args(["price-month", "--farm", FARM_NEAR, "--year", "2024", "--month", "1"]);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Falling back").not());
}
