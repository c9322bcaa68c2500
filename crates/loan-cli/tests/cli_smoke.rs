//! CLI binary smoke tests using assert_cmd.
//!
//! These tests exercise the compiled `loan` binary end-to-end: argument
//! parsing, training into a scratch directory and JSON decisions.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("loan").unwrap()
}

/// Label follows credit history; every fourth applicant has defaulted.
fn write_dataset(dir: &Path) -> PathBuf {
    let mut csv = String::from("Loan_ID,Self_Employed,ApplicantIncome,LoanAmount,Credit_History,Loan_Status\n");
    for i in 0..40 {
        let defaulted = i % 4 == 3;
        writeln!(
            csv,
            "LP{:04},{},{},{},{},{}",
            i,
            if i % 5 == 0 { "Yes" } else { "No" },
            2000 + (i * 331) % 10000,
            40 + (i * 23) % 160,
            if defaulted { 0 } else { 1 },
            if defaulted { "N" } else { "Y" },
        )
        .unwrap();
    }
    let path = dir.join("loans.csv");
    std::fs::write(&path, csv).unwrap();
    path
}

fn train_into(dir: &Path) -> PathBuf {
    let dataset = write_dataset(dir);
    let models = dir.join("models");
    cmd()
        .args(["train", "--no-report", "-d"])
        .arg(&dataset)
        .arg("-o")
        .arg(&models)
        .assert()
        .success();
    models
}

// ---------------------------------------------------------------------------
// Top-level
// ---------------------------------------------------------------------------

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("train"))
        .stdout(predicate::str::contains("decide"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("loan"));
}

// ---------------------------------------------------------------------------
// Train subcommand
// ---------------------------------------------------------------------------

#[test]
fn train_writes_artifacts_and_prints_report() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path());
    let models = dir.path().join("models");

    cmd()
        .args(["train", "-d"])
        .arg(&dataset)
        .arg("-o")
        .arg(&models)
        .assert()
        .success()
        .stdout(predicate::str::contains("precision"))
        .stderr(predicate::str::contains("No config provided"));

    assert!(models.join("svm_model.bin").is_file());
    assert!(models.join("scaler.bin").is_file());
    assert!(models.join("le_self_emp.bin").is_file());
    assert!(models.join("training_report.html").is_file());
}

#[test]
fn train_missing_dataset_fails() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .args(["train", "-d"])
        .arg(dir.path().join("absent.csv"))
        .arg("-o")
        .arg(dir.path().join("models"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Dataset not found"));
    assert!(!dir.path().join("models").exists());
}

#[test]
fn train_rejects_unknown_policy() {
    cmd()
        .args(["train", "--policy", "random"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("random"));
}

#[test]
fn train_nonexistent_config_errors() {
    cmd()
        .args(["train", "/nonexistent/config.json"])
        .assert()
        .failure();
}

// ---------------------------------------------------------------------------
// Decide subcommand
// ---------------------------------------------------------------------------

#[test]
fn decide_prior_default_is_rule_rejection() {
    let dir = tempfile::tempdir().unwrap();
    let models = train_into(dir.path());

    cmd()
        .args([
            "decide",
            "--income",
            "5000",
            "--loan-amount",
            "120",
            "--credit-history",
            "default",
            "--employment",
            "salaried",
            "--artifacts",
        ])
        .arg(&models)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"Rejected\""))
        .stdout(predicate::str::contains("\"source\": \"Rule\""));
}

#[test]
fn decide_healthy_applicant_uses_model() {
    let dir = tempfile::tempdir().unwrap();
    let models = train_into(dir.path());

    cmd()
        .args([
            "decide",
            "--income",
            "10000",
            "--loan-amount",
            "50",
            "--credit-history",
            "clean",
            "--employment",
            "salaried",
            "--artifacts",
        ])
        .arg(&models)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"source\": \"Model\""))
        .stdout(predicate::str::contains("\"confidence\""));
}

#[test]
fn decide_without_artifacts_fails() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .args([
            "decide",
            "--income",
            "10000",
            "--loan-amount",
            "50",
            "--credit-history",
            "clean",
            "--employment",
            "salaried",
            "--artifacts",
        ])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Decision failed"));
}

#[test]
fn decide_rejects_nan_ceiling() {
    cmd()
        .args([
            "decide",
            "--income",
            "10000",
            "--loan-amount",
            "50",
            "--credit-history",
            "clean",
            "--employment",
            "salaried",
            "--dti-ceiling",
            "nan",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("debt_to_income_ceiling"));
}

#[test]
fn decide_rejects_unknown_employment() {
    cmd()
        .args([
            "decide",
            "--income",
            "10000",
            "--loan-amount",
            "50",
            "--credit-history",
            "clean",
            "--employment",
            "Maybe",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Maybe"));
}

#[test]
fn decide_rejects_negative_income() {
    cmd()
        .args([
            "decide",
            "--income=-5",
            "--loan-amount",
            "50",
            "--credit-history",
            "clean",
            "--employment",
            "salaried",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ApplicantIncome"));
}
