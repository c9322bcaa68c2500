//! Applicant inputs at the decision boundary.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LoanError, Result};

/// Repayment history as recorded in the dataset's `Credit_History` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditHistory {
    /// 1.0: no recorded default.
    Clean,
    /// 0.0: the applicant has defaulted before.
    PriorDefault,
}

impl CreditHistory {
    pub fn code(self) -> f64 {
        match self {
            CreditHistory::Clean => 1.0,
            CreditHistory::PriorDefault => 0.0,
        }
    }

    pub fn from_code(code: f64) -> Result<Self> {
        if code == 1.0 {
            Ok(CreditHistory::Clean)
        } else if code == 0.0 {
            Ok(CreditHistory::PriorDefault)
        } else {
            Err(LoanError::invalid_field(
                "Credit_History",
                format!("expected 0 or 1, got {}", code),
            ))
        }
    }
}

impl FromStr for CreditHistory {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "clean" | "1" | "1.0" => Ok(CreditHistory::Clean),
            "default" | "prior_default" | "0" | "0.0" => Ok(CreditHistory::PriorDefault),
            other => Err(LoanError::invalid_field(
                "Credit_History",
                format!("unknown credit history '{}'", other),
            )),
        }
    }
}

/// Employment choice presented to the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    Salaried,
    SelfEmployed,
}

impl EmploymentStatus {
    /// The `Self_Employed` category this choice was trained under.
    pub fn category(self) -> &'static str {
        match self {
            EmploymentStatus::Salaried => "No",
            EmploymentStatus::SelfEmployed => "Yes",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EmploymentStatus::Salaried => "No (Salaried)",
            EmploymentStatus::SelfEmployed => "Yes (Self-Employed)",
        }
    }
}

impl FromStr for EmploymentStatus {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "salaried" => Ok(EmploymentStatus::Salaried),
            "self-employed" | "self_employed" => Ok(EmploymentStatus::SelfEmployed),
            other => Err(LoanError::UnrecognizedCategory {
                field: "Self_Employed".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw, unvalidated applicant values as a form or CLI would collect them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantInput {
    pub income: f64,
    /// Loan amount in thousands.
    pub loan_amount: f64,
    pub credit_history: f64,
    pub self_employed: String,
}

/// A validated applicant. `self_employed` is still a category string; its
/// integer code comes from the fitted encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub income: f64,
    pub loan_amount: f64,
    pub credit_history: CreditHistory,
    pub self_employed: String,
}

impl ApplicantRecord {
    pub fn new(
        income: f64,
        loan_amount: f64,
        credit_history: CreditHistory,
        employment: EmploymentStatus,
    ) -> Result<Self> {
        Self::with_category(income, loan_amount, credit_history, employment.category())
    }

    /// Build a record from a raw category string, as found in the dataset.
    pub fn with_category(
        income: f64,
        loan_amount: f64,
        credit_history: CreditHistory,
        self_employed: &str,
    ) -> Result<Self> {
        let record = Self {
            income,
            loan_amount,
            credit_history,
            self_employed: self_employed.to_string(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Numeric range checks. The category is checked by the encoder.
    pub fn validate(&self) -> Result<()> {
        check_amount("ApplicantIncome", self.income)?;
        check_amount("LoanAmount", self.loan_amount)
    }
}

impl TryFrom<&ApplicantInput> for ApplicantRecord {
    type Error = LoanError;

    fn try_from(input: &ApplicantInput) -> Result<Self> {
        let credit_history = CreditHistory::from_code(input.credit_history)?;
        Self::with_category(
            input.income,
            input.loan_amount,
            credit_history,
            input.self_employed.trim(),
        )
    }
}

fn check_amount(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(LoanError::invalid_field(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(LoanError::invalid_field(
            field,
            format!("must be non-negative, got {}", value),
        ));
    }
    Ok(())
}
