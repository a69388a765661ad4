#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::process::Command;
use tempfile::tempdir;

mod common;

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");
    let input = dir.path().join("requests.json");
    let request = common::request();
    let uuid = request.transaction_uuid;
    common::write_requests(&input, &[request]).unwrap();

    // 1. First run: create the transaction
    let output1 = Command::new(cargo_bin!("permit-service"))
        .arg("create")
        .arg(&input)
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains(r#""responseStatus":"SUCCESS""#));

    // 2. Second run: the record survives the restart
    let output2 = Command::new(cargo_bin!("permit-service"))
        .arg("get")
        .arg(uuid.to_string())
        .arg("--customer-id")
        .arg("2")
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);
    assert!(stdout2.contains(r#""httpStatus":200"#));
    assert!(stdout2.contains(&uuid.to_string()));

    // 3. Third run: resubmitting the same request is a conflict
    let output3 = Command::new(cargo_bin!("permit-service"))
        .arg("create")
        .arg(&input)
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("Failed to execute command");
    let stdout3 = String::from_utf8_lossy(&output3.stdout);
    assert!(stdout3.contains("transaction already exists for customer 2"));
}
