//! Categorical encoder for `Self_Employed`.
use serde::{Deserialize, Serialize};

use crate::error::{LoanError, Result};

/// Bijection between category strings and integer codes.
///
/// Classes are sorted at fit time, so codes do not depend on row order.
/// Once fitted the encoder is never refit; inference reuses the persisted one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalEncoder {
    field: String,
    classes: Vec<String>,
}

impl CategoricalEncoder {
    pub fn fit(field: &str, values: &[String]) -> Result<Self> {
        if values.is_empty() {
            return Err(LoanError::EmptyDataset);
        }
        let mut classes: Vec<String> = values.to_vec();
        classes.sort();
        classes.dedup();
        log::debug!("Fitted encoder for '{}': {:?}", field, classes);
        Ok(Self {
            field: field.to_string(),
            classes,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Code for `value`, or `UnrecognizedCategory` if it was never seen.
    pub fn encode(&self, value: &str) -> Result<u32> {
        self.classes
            .iter()
            .position(|c| c == value)
            .map(|idx| idx as u32)
            .ok_or_else(|| LoanError::UnrecognizedCategory {
                field: self.field.clone(),
                value: value.to_string(),
            })
    }

    pub fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn codes_follow_sorted_classes() {
        let enc = CategoricalEncoder::fit("Self_Employed", &values(&["Yes", "No", "No"])).unwrap();
        assert_eq!(enc.encode("No").unwrap(), 0);
        assert_eq!(enc.encode("Yes").unwrap(), 1);
        assert_eq!(enc.decode(1), Some("Yes"));
        assert_eq!(enc.classes().len(), 2);
    }

    #[test]
    fn unknown_category_is_not_defaulted() {
        let enc = CategoricalEncoder::fit("Self_Employed", &values(&["Yes", "No"])).unwrap();
        match enc.encode("Maybe").unwrap_err() {
            LoanError::UnrecognizedCategory { field, value } => {
                assert_eq!(field, "Self_Employed");
                assert_eq!(value, "Maybe");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_fit_fails() {
        assert!(CategoricalEncoder::fit("Self_Employed", &[]).is_err());
    }
}
