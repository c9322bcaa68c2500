//! The feature layout shared by training and inference.
//!
//! Every matrix handed to the scaler or the classifier has its columns in
//! `FEATURE_SCHEMA` order. Artifacts record the names at training time and
//! are rejected at load time if they disagree.
use ndarray::Array2;

use crate::error::{LoanError, Result};

pub const FEATURE_COUNT: usize = 4;

/// Column names as they appear in the training dataset, in model order.
pub const FEATURE_SCHEMA: [&str; FEATURE_COUNT] = [
    "ApplicantIncome",
    "LoanAmount",
    "Credit_History",
    "Self_Employed",
];

/// Owned copy of the schema names, as stored in artifact headers.
pub fn schema_names() -> Vec<String> {
    FEATURE_SCHEMA.iter().map(|s| s.to_string()).collect()
}

/// Check a stored schema against the compiled one.
pub fn check_schema(found: &[String]) -> Result<()> {
    let matches = found.len() == FEATURE_COUNT
        && found.iter().zip(FEATURE_SCHEMA.iter()).all(|(a, b)| a == b);
    if matches {
        Ok(())
    } else {
        Err(LoanError::SchemaMismatch {
            expected: FEATURE_SCHEMA.join(", "),
            found: found.join(", "),
        })
    }
}

/// Check that a feature matrix has one column per schema entry.
pub fn check_width(ncols: usize) -> Result<()> {
    if ncols == FEATURE_COUNT {
        Ok(())
    } else {
        Err(LoanError::SchemaMismatch {
            expected: format!("{} features", FEATURE_COUNT),
            found: format!("{} features", ncols),
        })
    }
}

/// One applicant's numeric features in schema order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodedFeatureVector {
    pub income: f64,
    pub loan_amount: f64,
    pub credit_history: f64,
    pub self_employed_code: f64,
}

impl EncodedFeatureVector {
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.income,
            self.loan_amount,
            self.credit_history,
            self.self_employed_code,
        ]
    }

    /// Single-row matrix for the scaler and classifier.
    pub fn to_row(&self) -> Array2<f64> {
        let values = self.to_array();
        Array2::from_shape_fn((1, FEATURE_COUNT), |(_, c)| values[c])
    }
}
