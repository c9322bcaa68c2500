//! Missing-value imputation for the raw loan table.
//!
//! Categorical columns take their most frequent value, numeric columns their
//! median. `Credit_History` follows `CreditHistoryImputation`.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{CreditHistoryImputation, ImputationConfig};
use crate::data_handling::{LoanDataset, RawLoanData};
use crate::error::{LoanError, Result};

/// Credit history code used by `CreditHistoryImputation::WorstCase`.
pub const WORST_CASE_CREDIT_HISTORY: f64 = 0.0;

/// Fill values and how many cells each one replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationSummary {
    pub income: FillRecord<f64>,
    pub loan_amount: FillRecord<f64>,
    pub credit_history: FillRecord<f64>,
    pub self_employed: FillRecord<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillRecord<T> {
    pub value: T,
    pub filled: usize,
}

impl ImputationSummary {
    pub fn total_filled(&self) -> usize {
        self.income.filled
            + self.loan_amount.filled
            + self.credit_history.filled
            + self.self_employed.filled
    }
}

/// Impute every missing cell and return the clean table.
pub fn impute(raw: &RawLoanData, config: &ImputationConfig) -> Result<(LoanDataset, ImputationSummary)> {
    if raw.is_empty() {
        return Err(LoanError::EmptyDataset);
    }

    let income_fill = median(&raw.income).ok_or_else(|| all_missing("ApplicantIncome"))?;
    let loan_fill = median(&raw.loan_amount).ok_or_else(|| all_missing("LoanAmount"))?;
    let credit_fill = match config.credit_history {
        CreditHistoryImputation::MostFrequent => {
            most_frequent_numeric(&raw.credit_history).ok_or_else(|| all_missing("Credit_History"))?
        }
        CreditHistoryImputation::WorstCase => WORST_CASE_CREDIT_HISTORY,
    };
    let self_emp_fill = most_frequent(&raw.self_employed).ok_or_else(|| all_missing("Self_Employed"))?;

    let (income, income_n) = fill(&raw.income, income_fill);
    let (loan_amount, loan_n) = fill(&raw.loan_amount, loan_fill);
    let (credit_history, credit_n) = fill(&raw.credit_history, credit_fill);
    let (self_employed, self_emp_n) = fill(&raw.self_employed, self_emp_fill.clone());

    let summary = ImputationSummary {
        income: FillRecord { value: income_fill, filled: income_n },
        loan_amount: FillRecord { value: loan_fill, filled: loan_n },
        credit_history: FillRecord { value: credit_fill, filled: credit_n },
        self_employed: FillRecord { value: self_emp_fill, filled: self_emp_n },
    };

    log::info!(
        "Imputed {} missing cells (credit history policy: {:?})",
        summary.total_filled(),
        config.credit_history
    );
    log::debug!("Imputation summary: {:?}", summary);

    let dataset = LoanDataset {
        income,
        loan_amount,
        credit_history,
        self_employed,
        target: raw.target.clone(),
    };
    Ok((dataset, summary))
}

fn all_missing(field: &str) -> LoanError {
    LoanError::InvalidValue {
        field: field.to_string(),
        row: 0,
        value: "<all missing>".to_string(),
    }
}

fn fill<T: Clone>(column: &[Option<T>], value: T) -> (Vec<T>, usize) {
    let mut filled = 0;
    let out = column
        .iter()
        .map(|cell| match cell {
            Some(v) => v.clone(),
            None => {
                filled += 1;
                value.clone()
            }
        })
        .collect();
    (out, filled)
}

/// Median of the present values; the mean of the two middle values for an
/// even count.
pub fn median(column: &[Option<f64>]) -> Option<f64> {
    let mut values: Vec<f64> = column.iter().flatten().copied().collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();
    if n % 2 == 0 {
        Some((values[n / 2 - 1] + values[n / 2]) / 2.0)
    } else {
        Some(values[n / 2])
    }
}

/// Most frequent present value. Ties resolve to the smallest value.
pub fn most_frequent(column: &[Option<String>]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in column.iter().flatten() {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }
    pick_mode(counts).map(str::to_string)
}

/// Numeric counterpart of [`most_frequent`].
pub fn most_frequent_numeric(column: &[Option<f64>]) -> Option<f64> {
    // Keyed on the ordered bit pattern so BTreeMap iterates in numeric order.
    let mut counts: BTreeMap<OrderedF64, usize> = BTreeMap::new();
    for &value in column.iter().flatten() {
        *counts.entry(OrderedF64(value)).or_insert(0) += 1;
    }
    pick_mode(counts).map(|v| v.0)
}

fn pick_mode<K: Ord>(counts: BTreeMap<K, usize>) -> Option<K> {
    let mut best: Option<(K, usize)> = None;
    for (key, count) in counts {
        match &best {
            Some((_, best_count)) if *best_count >= count => {}
            _ => best = Some((key, count)),
        }
    }
    best.map(|(key, _)| key)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct OrderedF64(f64);

impl Eq for OrderedF64 {}

impl PartialOrd for OrderedF64 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedF64 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}
