use std::fmt;

use linfa::dataset::Pr;
use linfa::traits::Predict;
use linfa::Dataset;
use linfa_svm::{Svm, SvmParams};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::config::{KernelWidth, SvmConfig, TrainingPolicy};
use crate::error::{LoanError, Result};
use crate::models::classifier_trait::{ClassProbabilities, ClassifierModel};
use crate::schema::check_width;

/// RBF support-vector classifier with Platt-scaled probabilities.
#[derive(Serialize, Deserialize)]
pub struct SvmClassifier {
    model: Svm<f64, Pr>,
    /// Gaussian kernel width the model was fitted with.
    kernel_eps: f64,
    /// `(C_approve, C_reject)` used at fit time.
    class_c: (f64, f64),
}

impl SvmClassifier {
    /// Fit on scaled features. `y` is true for approved applications.
    pub fn fit(
        x: &Array2<f64>,
        y: &Array1<bool>,
        config: &SvmConfig,
        policy: &TrainingPolicy,
    ) -> Result<Self> {
        check_width(x.ncols())?;
        if x.nrows() != y.len() {
            return Err(LoanError::Training(format!(
                "{} feature rows but {} targets",
                x.nrows(),
                y.len()
            )));
        }

        let (c_pos, c_neg) = class_weights(y, config.c, policy)?;
        let kernel_eps = match config.kernel_width {
            KernelWidth::Fixed(eps) => eps,
            KernelWidth::Scale => scale_kernel_width(x),
        };

        log::debug!(
            "Fitting SVM: policy={}, C=({:.4}, {:.4}), kernel eps={:.4}",
            policy.name(),
            c_pos,
            c_neg,
            kernel_eps
        );

        let params: SvmParams<f64, Pr> = Svm::<f64, Pr>::params()
            .eps(config.eps)
            .pos_neg_weights(c_pos, c_neg)
            .gaussian_kernel(kernel_eps);

        let dataset = Dataset::new(x.to_owned(), y.to_owned());
        let model = <SvmParams<f64, Pr> as linfa::traits::Fit<_, _, _>>::fit(&params, &dataset)
            .map_err(|e| LoanError::Training(e.to_string()))?;

        Ok(Self {
            model,
            kernel_eps,
            class_c: (c_pos, c_neg),
        })
    }

    pub fn kernel_eps(&self) -> f64 {
        self.kernel_eps
    }

    pub fn class_c(&self) -> (f64, f64) {
        self.class_c
    }
}

impl fmt::Debug for SvmClassifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SvmClassifier")
            .field("kernel_eps", &self.kernel_eps)
            .field("class_c", &self.class_c)
            .finish_non_exhaustive()
    }
}

impl ClassifierModel for SvmClassifier {
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<ClassProbabilities>> {
        check_width(x.ncols())?;
        let predictions: Array1<Pr> = self.model.predict(x);
        Ok(predictions
            .iter()
            .map(|&p| {
                let approve = f64::from(*p).clamp(0.0, 1.0);
                [1.0 - approve, approve]
            })
            .collect())
    }

    fn name(&self) -> &str {
        "svm-rbf"
    }
}

/// Per-class regularization `(C_approve, C_reject)`.
///
/// `Balanced` uses inverse-frequency weights `n / (2 * n_class)`, the same
/// rule as sklearn's `class_weight="balanced"`.
pub fn class_weights(y: &Array1<bool>, c: f64, policy: &TrainingPolicy) -> Result<(f64, f64)> {
    let n = y.len();
    let n_pos = y.iter().filter(|&&v| v).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(LoanError::Training(format!(
            "both classes are required to fit (approved: {}, rejected: {})",
            n_pos, n_neg
        )));
    }

    Ok(match policy {
        TrainingPolicy::Standard => (c, c),
        TrainingPolicy::Balanced { c } => {
            let w_pos = n as f64 / (2.0 * n_pos as f64);
            let w_neg = n as f64 / (2.0 * n_neg as f64);
            (c * w_pos, c * w_neg)
        }
    })
}

/// Kernel width matching sklearn's `gamma="scale"`: with
/// `k(a, b) = exp(-|a - b|^2 / eps)`, `eps = n_features * var(X)`.
pub fn scale_kernel_width(x: &Array2<f64>) -> f64 {
    let n = x.len() as f64;
    if n == 0.0 {
        return 1.0;
    }
    let mean = x.sum() / n;
    let var = x.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>() / n;
    if var > 0.0 {
        x.ncols() as f64 * var
    } else {
        1.0
    }
}
