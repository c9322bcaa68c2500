//! Column-oriented loan application tables.
//!
//! `RawLoanData` is what the reader produces: feature cells may be missing,
//! the target is already encoded. `LoanDataset` is the imputed table the
//! encoder, scaler and classifier are fitted on.
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{LoanError, Result};
use crate::preprocessing::encoding::CategoricalEncoder;
use crate::schema::{FEATURE_COUNT, FEATURE_SCHEMA};

#[derive(Debug, Clone, Default)]
pub struct RawLoanData {
    pub income: Vec<Option<f64>>,
    pub loan_amount: Vec<Option<f64>>,
    pub credit_history: Vec<Option<f64>>,
    pub self_employed: Vec<Option<String>>,
    /// 1 for approved (`Y`), 0 for rejected (`N`).
    pub target: Vec<u8>,
    /// The header the target was read from.
    pub target_column: String,
}

impl RawLoanData {
    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoanDataset {
    pub income: Vec<f64>,
    pub loan_amount: Vec<f64>,
    pub credit_history: Vec<f64>,
    pub self_employed: Vec<String>,
    pub target: Vec<u8>,
}

impl LoanDataset {
    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    pub fn log_input_data_summary(&self) {
        let (rejected, approved) = self.class_counts();
        log::info!("----- Input Data Summary -----");
        log::info!("{} applications: {} approved, {} rejected", self.len(), approved, rejected);
        log::info!("Features (in order): {}", FEATURE_SCHEMA.join(", "));
        log::info!("-------------------------------");
    }

    /// `(rejected, approved)` row counts.
    pub fn class_counts(&self) -> (usize, usize) {
        let approved = self.target.iter().filter(|&&t| t == 1).count();
        (self.len() - approved, approved)
    }

    /// Build the unscaled feature matrix in schema order.
    pub fn feature_matrix(&self, encoder: &CategoricalEncoder) -> Result<Array2<f64>> {
        let n = self.len();
        let mut data = Vec::with_capacity(n * FEATURE_COUNT);
        for i in 0..n {
            data.push(self.income[i]);
            data.push(self.loan_amount[i]);
            data.push(self.credit_history[i]);
            data.push(encoder.encode(&self.self_employed[i])? as f64);
        }
        Array2::from_shape_vec((n, FEATURE_COUNT), data)
            .map_err(|e| LoanError::Training(format!("failed to build feature matrix: {}", e)))
    }

    pub fn targets(&self) -> Array1<bool> {
        self.target.iter().map(|&t| t == 1).collect()
    }

    pub fn select_rows(&self, indices: &[usize]) -> LoanDataset {
        LoanDataset {
            income: indices.iter().map(|&i| self.income[i]).collect(),
            loan_amount: indices.iter().map(|&i| self.loan_amount[i]).collect(),
            credit_history: indices.iter().map(|&i| self.credit_history[i]).collect(),
            self_employed: indices.iter().map(|&i| self.self_employed[i].clone()).collect(),
            target: indices.iter().map(|&i| self.target[i]).collect(),
        }
    }

    /// Shuffle with a fixed seed and split off `fraction` of the rows.
    ///
    /// Returns `(train, holdout)`. At least one row stays on each side.
    pub fn train_holdout_split(&self, fraction: f64, seed: u64) -> Result<(LoanDataset, LoanDataset)> {
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(LoanError::invalid_field(
                "holdout_fraction",
                format!("must be in (0, 1), got {}", fraction),
            ));
        }
        if self.len() < 2 {
            return Err(LoanError::EmptyDataset);
        }

        let mut indices: Vec<usize> = (0..self.len()).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let n_holdout = ((self.len() as f64 * fraction).round() as usize).clamp(1, self.len() - 1);
        let (holdout_idx, train_idx) = indices.split_at(n_holdout);

        Ok((self.select_rows(train_idx), self.select_rows(holdout_idx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> LoanDataset {
        LoanDataset {
            income: vec![1000.0, 2000.0, 3000.0, 4000.0],
            loan_amount: vec![10.0, 20.0, 30.0, 40.0],
            credit_history: vec![1.0, 0.0, 1.0, 1.0],
            self_employed: vec!["No".into(), "Yes".into(), "No".into(), "No".into()],
            target: vec![1, 0, 1, 0],
        }
    }

    #[test]
    fn feature_matrix_uses_schema_order() {
        let ds = tiny();
        let enc = CategoricalEncoder::fit("Self_Employed", &ds.self_employed).unwrap();
        let x = ds.feature_matrix(&enc).unwrap();
        assert_eq!(x.shape(), &[4, 4]);
        assert_eq!(x.row(1).to_vec(), vec![2000.0, 20.0, 0.0, 1.0]);
    }

    #[test]
    fn split_is_seeded_and_disjoint() {
        let ds = tiny();
        let (a_train, a_hold) = ds.train_holdout_split(0.25, 7).unwrap();
        let (b_train, b_hold) = ds.train_holdout_split(0.25, 7).unwrap();
        assert_eq!(a_train, b_train);
        assert_eq!(a_hold, b_hold);
        assert_eq!(a_train.len() + a_hold.len(), 4);
        assert_eq!(a_hold.len(), 1);
    }

    #[test]
    fn split_rejects_bad_fraction() {
        assert!(tiny().train_holdout_split(1.0, 1).is_err());
        assert!(tiny().train_holdout_split(0.0, 1).is_err());
    }

    #[test]
    fn class_counts() {
        assert_eq!(tiny().class_counts(), (2, 2));
    }
}
