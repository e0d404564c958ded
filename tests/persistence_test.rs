#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::io::Write;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: register participants and accept two fines
    let mut csv1 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv1, "type, fine, driver, issuer, points").unwrap();
    writeln!(csv1, "driver, , driver1, , ").unwrap();
    writeln!(csv1, "enforcer, , , police1, ").unwrap();
    writeln!(csv1, "issue, f1, driver1, police1, 10").unwrap();
    writeln!(csv1, "issue, f2, driver1, police1, 7").unwrap();
    writeln!(csv1, "issue, f3, driver1, police1, 5").unwrap();
    writeln!(csv1, "accept, f1, , , ").unwrap();
    writeln!(csv1, "accept, f2, , , ").unwrap();

    let mut cmd1 = Command::new(cargo_bin!("drivernet"));
    cmd1.arg(csv1.path()).arg("--db-path").arg(&db_path);

    let output1 = cmd1.output().expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("driver1,,,17,true"));

    // 2. Second run: accept the fine issued in the first run
    let mut csv2 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv2, "type, fine, driver, issuer, points").unwrap();
    writeln!(csv2, "accept, f3, , , ").unwrap();
    writeln!(csv2, "reject, f1, , , ").unwrap(); // Already accepted last run

    let mut cmd2 = Command::new(cargo_bin!("drivernet"));
    cmd2.arg(csv2.path()).arg("--db-path").arg(&db_path);

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);
    let stderr2 = String::from_utf8_lossy(&output2.stderr);

    // Recovered 17 points and added 5
    assert!(stdout2.contains("driver1,,,22,false"));
    assert!(stderr2.contains("ACCEPTED"));
}
