//! Shared fixtures: a small synthetic loan dataset written to a temp dir.
#![allow(dead_code)]

use std::fmt::Write as _;
use std::path::PathBuf;

use loan_classifiers::config::{ArtifactPaths, TrainingConfig};

pub const ROWS: usize = 48;

/// Rows where one feature cell is left blank.
pub const MISSING_CREDIT_ROW: usize = 6;
pub const MISSING_SELF_EMP_ROW: usize = 10;
pub const MISSING_LOAN_ROW: usize = 13;

/// CSV text where the label follows `Credit_History`: every fourth applicant
/// has a prior default and is rejected, everyone else is approved.
pub fn synthetic_csv(target_header: &str) -> String {
    let mut out = format!(
        "Loan_ID,Gender,Self_Employed,ApplicantIncome,LoanAmount,Credit_History,{}\n",
        target_header
    );
    for i in 0..ROWS {
        let defaulted = i % 4 == 3;
        let income = 2000 + (i * 331) % 10000;
        let loan = 40 + (i * 23) % 160;
        let self_emp = if i % 5 == 0 { "Yes" } else { "No" };

        let credit = match (i, defaulted) {
            (MISSING_CREDIT_ROW, _) => String::new(),
            (_, true) => "0".to_string(),
            _ => "1".to_string(),
        };
        let self_emp = if i == MISSING_SELF_EMP_ROW { "" } else { self_emp };
        let loan = if i == MISSING_LOAN_ROW {
            String::new()
        } else {
            loan.to_string()
        };
        let status = if defaulted { "N" } else { "Y" };

        writeln!(
            out,
            "LP{:04},Male,{},{},{},{},{}",
            i, self_emp, income, loan, credit, status
        )
        .unwrap();
    }
    out
}

pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub dataset: PathBuf,
    pub artifacts: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_target("Loan_Status")
    }

    pub fn with_target(target_header: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("loan_approval.csv");
        std::fs::write(&dataset, synthetic_csv(target_header)).unwrap();
        let artifacts = dir.path().join("models");
        Self {
            dir,
            dataset,
            artifacts,
        }
    }

    pub fn config(&self) -> TrainingConfig {
        TrainingConfig {
            dataset_path: self.dataset.clone(),
            artifacts: ArtifactPaths::new(&self.artifacts),
            html_report: false,
            ..TrainingConfig::default()
        }
    }

    pub fn paths(&self) -> ArtifactPaths {
        ArtifactPaths::new(&self.artifacts)
    }
}
