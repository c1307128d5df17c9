//! End-to-end tests for the invex binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const TEMPLATE: &str = r#"{
    "issuer": "Sai Khushi Foods",
    "keywords": ["Sai Khushi"],
    "options": {
        "tid": ["28551694"],
        "currency": "INR",
        "date_formats": ["%d/%m/%Y"],
        "decimal": {"qty": 2, "rate": 2, "total": 2, "totalqty": 2},
        "correction_priority": "qty"
    },
    "fields": {
        "invoice_number": "Invoice No: (\\S+)",
        "date": "Date: (\\S+)",
        "amount": "Grand Total: ([\\d.]+)",
        "noofitem": "Items: (\\d+)",
        "totalqty": "Total Qty: (\\S+)"
    },
    "lines": {
        "start": "--- items ---",
        "end": "--- end ---",
        "line": "(?P<description>.+?) (?P<qty>\\S+) (?P<rate>\\S+) (?P<total>\\S+) (?P<gst>\\S+)$"
    }
}"#;

const RECEIPT: &str = "\
Sai Khushi Foods
Invoice No: 2021/0412
Date: 03/04/2021
Items: 2
Total Qty: 300
--- items ---
rice bag 200 35000 70000 000
oil tin 100 12000 12000 000
--- end ---
Grand Total: 820.00
";

fn write_fixtures(dir: &Path) -> std::path::PathBuf {
    fs::write(dir.join("vendor.json"), TEMPLATE).unwrap();
    let invoice = dir.join("invoice.txt");
    fs::write(&invoice, RECEIPT).unwrap();
    invoice
}

#[test]
fn process_extracts_and_reconciles_a_text_invoice() {
    let dir = tempfile::tempdir().unwrap();
    let invoice = write_fixtures(dir.path());

    Command::cargo_bin("invex")
        .unwrap()
        .arg("process")
        .arg(&invoice)
        .args(["--backend", "txt", "--templates"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"issuer\": \"Sai Khushi Foods\""))
        .stdout(predicate::str::contains("\"invoice_number\": \"2021/0412\""))
        // Decimal points restored during reconciliation.
        .stdout(predicate::str::contains("\"qty\": \"2.00\""))
        .stdout(predicate::str::contains("missed: 0"));
}

#[test]
fn explicit_tid_selects_the_template() {
    let dir = tempfile::tempdir().unwrap();
    let invoice = write_fixtures(dir.path());

    Command::cargo_bin("invex")
        .unwrap()
        .arg("process")
        .arg(&invoice)
        .args(["--backend", "txt", "--tid", "28551694", "--templates"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"issuer\": \"Sai Khushi Foods\""));
}

#[test]
fn unmatched_invoice_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    let other = dir.path().join("other.txt");
    fs::write(&other, "a receipt from somewhere else entirely").unwrap();

    Command::cargo_bin("invex")
        .unwrap()
        .arg("process")
        .arg(&other)
        .args(["--backend", "txt", "--templates"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No template matched"));
}

#[test]
fn csv_output_is_written_to_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let invoice = write_fixtures(dir.path());
    let out = dir.path().join("result.csv");

    Command::cargo_bin("invex")
        .unwrap()
        .arg("process")
        .arg(&invoice)
        .args(["--backend", "txt", "--format", "csv", "--templates"])
        .arg(dir.path())
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let rendered = fs::read_to_string(&out).unwrap();
    assert!(rendered.starts_with("issuer,invoice_number,date"));
    assert!(rendered.contains("Sai Khushi Foods"));
}
