use ndarray::Array2;

use crate::error::Result;

/// Probability pair `[p_reject, p_approve]` for one sample.
pub type ClassProbabilities = [f64; 2];

/// Contract between the decision engine and a fitted binary classifier.
///
/// Inputs are already scaled and laid out in `FEATURE_SCHEMA` order.
/// Implementations must not mutate themselves when predicting.
pub trait ClassifierModel {
    /// Probability of each class, one pair per row.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<ClassProbabilities>>;

    /// Predicted label (1 = approve) per row. By default this is the class
    /// with the larger probability, ties going to approve.
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>> {
        Ok(self
            .predict_proba(x)?
            .iter()
            .map(|p| predicted_label(p))
            .collect())
    }

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}

pub fn predicted_label(p: &ClassProbabilities) -> u8 {
    if p[1] >= p[0] {
        1
    } else {
        0
    }
}
