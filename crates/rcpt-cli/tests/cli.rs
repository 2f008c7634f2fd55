use std::fs;
use std::path::Path;

use assert_cmd::Command;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use predicates::prelude::*;

fn rcpt() -> Command {
    Command::cargo_bin("rcpt").unwrap()
}

/// One-page PDF showing `lines` in Courier.
fn text_pdf(lines: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 14.into()]),
        Operation::new("TL", vec![20.into()]),
        Operation::new("Td", vec![72.into(), 720.into()]),
    ];
    for line in lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Folder with one readable receipt and one corrupt PDF.
fn receipts_dir(dir: &Path) {
    fs::write(
        dir.join("acme.pdf"),
        text_pdf(&["Acme Hardware", "Date: 03/03/2023", "Total: $12.50"]),
    )
    .unwrap();
    fs::write(dir.join("corrupt.pdf"), b"%PDF-1.4 truncated").unwrap();
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

#[test]
fn test_help_lists_subcommands() {
    rcpt()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_batch_empty_folder() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "Total 1.00").unwrap();

    rcpt()
        .arg("batch")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No PDF files found in the specified folder.",
        ));
}

#[test]
fn test_batch_unreadable_pdfs_report_no_data() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.pdf"), b"not really a pdf").unwrap();
    fs::write(dir.path().join("b.PDF"), b"").unwrap();

    rcpt()
        .arg("batch")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No data extracted from receipts."));
}

#[test]
fn test_batch_table_skips_corrupt_pdf() {
    let dir = tempfile::tempdir().unwrap();
    receipts_dir(dir.path());

    let stdout = stdout_of(rcpt().arg("batch").arg(dir.path()));
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(lines[0], "Date        Vendor         Total");
    assert_eq!(lines[1], "2023-03-03  Acme Hardware  12.50");
    assert_eq!(lines.len(), 2);
}

#[test]
fn test_batch_json() {
    let dir = tempfile::tempdir().unwrap();
    receipts_dir(dir.path());

    let stdout = stdout_of(rcpt().args(["batch", "-f", "json"]).arg(dir.path()));
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(
        value,
        serde_json::json!([{ "Date": "2023-03-03", "Vendor": "Acme Hardware", "Total": "12.50" }])
    );
}

#[test]
fn test_batch_csv() {
    let dir = tempfile::tempdir().unwrap();
    receipts_dir(dir.path());

    let stdout = stdout_of(rcpt().args(["batch", "-f", "csv"]).arg(dir.path()));
    assert_eq!(
        stdout.trim_end(),
        "Date,Vendor,Total\n2023-03-03,Acme Hardware,12.50"
    );
}

#[test]
fn test_batch_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    receipts_dir(dir.path());
    let out = tempfile::tempdir().unwrap();
    let csv_path = out.path().join("receipts.csv");

    rcpt()
        .args(["batch", "-f", "csv", "-o"])
        .arg(&csv_path)
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Output written to"));

    assert_eq!(
        fs::read_to_string(&csv_path).unwrap(),
        "Date,Vendor,Total\n2023-03-03,Acme Hardware,12.50\n"
    );
}

#[test]
fn test_process_single_receipt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("receipt.pdf");
    fs::write(
        &path,
        text_pdf(&["Night Market", "2023-03-03T10:00:00", "TOTAL 7.05"]),
    )
    .unwrap();

    let stdout = stdout_of(rcpt().args(["process", "-f", "csv"]).arg(&path));
    assert_eq!(
        stdout.trim_end(),
        "Date,Vendor,Total\n2023-03-03,Night Market,7.05"
    );
}

#[test]
fn test_process_corrupt_pdf_reports_no_data() {
    let dir = tempfile::tempdir().unwrap();
    receipts_dir(dir.path());

    rcpt()
        .arg("process")
        .arg(dir.path().join("corrupt.pdf"))
        .assert()
        .success()
        .stdout(predicate::str::contains("No data extracted from receipts."));
}

#[test]
fn test_process_missing_file() {
    rcpt()
        .args(["process", "/definitely/not/here.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_process_rejects_non_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("receipt.txt");
    fs::write(&path, "Total 1.00").unwrap();

    rcpt()
        .arg("process")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn test_config_init_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("rcpt.json");
    let config = config.to_str().unwrap();

    rcpt()
        .args(["config", "path", "-c", config])
        .assert()
        .success()
        .stdout(predicate::str::contains("not created"));

    rcpt()
        .args(["config", "init", "-c", config])
        .assert()
        .success();

    rcpt()
        .args(["config", "init", "-c", config])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    rcpt()
        .args(["config", "get", "pdf.max_pages", "-c", config])
        .assert()
        .success()
        .stdout(predicate::str::diff("10\n"));

    rcpt()
        .args(["config", "set", "extraction.two_digit_year_pivot", "30", "-c", config])
        .assert()
        .success();

    rcpt()
        .args(["config", "get", "extraction.two_digit_year_pivot", "-c", config])
        .assert()
        .success()
        .stdout(predicate::str::diff("30\n"));

    rcpt()
        .args(["config", "set", "extraction.nope", "1", "-c", config])
        .assert()
        .failure();
}

#[test]
fn test_bad_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("broken.json");
    fs::write(&config, "{ not json").unwrap();

    rcpt()
        .arg("-c")
        .arg(&config)
        .arg("batch")
        .arg(dir.path())
        .assert()
        .failure();
}
