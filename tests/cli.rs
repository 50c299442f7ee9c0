use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::tempdir;

#[test]
fn compile_cli_happy_flow_writes_pdf_into_folder() {
    let project = tempdir().expect("Creating temp project failed");
    write(project.path().join("main.go"), "package main\n\nfunc main() {}\n").unwrap();
    write(project.path().join("notes.txt"), "remember the milk").unwrap();

    let mut cmd = Command::cargo_bin("tree-to-pdf").expect("Binary exists");
    cmd.arg("compile").arg(project.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("PDF successfully generated"));

    let pdf = std::fs::read(project.path().join("PDF Compiled Project.pdf")).unwrap();
    assert_eq!(&pdf[0..4], b"%PDF");
}

#[test]
fn compile_cli_honours_output_flag_and_config_file() {
    let project = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(project.path().join("index.html"), "<p>hi</p>").unwrap();
    let config = project.path().join("tree-to-pdf.yaml");
    write(&config, "output_name: ignored.pdf\nlayout:\n  font_size: 9\n").unwrap();
    let target = out.path().join("bundle.pdf");

    Command::cargo_bin("tree-to-pdf")
        .unwrap()
        .arg("compile")
        .arg(project.path())
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("bundle.pdf"));

    assert!(target.exists());
    assert!(!project.path().join("ignored.pdf").exists());
}

#[test]
fn compile_cli_reports_a_single_failure() {
    let project = tempdir().unwrap();
    let missing = project.path().join("does-not-exist");

    Command::cargo_bin("tree-to-pdf")
        .unwrap()
        .arg("compile")
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("[ERROR] Failed to generate PDF"));
}

#[test]
fn compile_cli_rejects_missing_config_file() {
    let project = tempdir().unwrap();

    Command::cargo_bin("tree-to-pdf")
        .unwrap()
        .arg("compile")
        .arg(project.path())
        .arg("--config")
        .arg(project.path().join("nope.yaml"))
        .assert()
        .failure();
}
