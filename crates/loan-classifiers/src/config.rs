use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::LoanError;

pub const DEFAULT_DATASET_PATH: &str = "data/loan_approval.csv";
pub const DEFAULT_ARTIFACT_DIR: &str = "models";
pub const MODEL_FILE: &str = "svm_model.bin";
pub const SCALER_FILE: &str = "scaler.bin";
pub const ENCODER_FILE: &str = "le_self_emp.bin";
pub const REPORT_FILE: &str = "training_report.html";

/// How missing `Credit_History` cells are filled.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CreditHistoryImputation {
    /// Fill with the column mode, like every other categorical column.
    #[default]
    MostFrequent,
    /// Treat unknown history as a prior default (0.0).
    WorstCase,
}

impl FromStr for CreditHistoryImputation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "most-frequent" | "most_frequent" | "mode" => Ok(CreditHistoryImputation::MostFrequent),
            "worst-case" | "worst_case" => Ok(CreditHistoryImputation::WorstCase),
            _ => Err(format!(
                "Unknown credit history imputation: {}. Valid options are: most-frequent, worst-case",
                s
            )),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ImputationConfig {
    pub credit_history: CreditHistoryImputation,
}

/// Class weighting applied when fitting the SVM.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TrainingPolicy {
    /// C = `SvmConfig::c` for both classes.
    Standard,
    /// Inverse-frequency class weights scaled by a reduced `c`.
    Balanced { c: f64 },
}

impl TrainingPolicy {
    pub const BALANCED_C: f64 = 0.5;

    pub fn name(&self) -> &'static str {
        match self {
            TrainingPolicy::Standard => "standard",
            TrainingPolicy::Balanced { .. } => "balanced",
        }
    }
}

impl Default for TrainingPolicy {
    fn default() -> Self {
        TrainingPolicy::Standard
    }
}

impl FromStr for TrainingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(TrainingPolicy::Standard),
            "balanced" => Ok(TrainingPolicy::Balanced {
                c: TrainingPolicy::BALANCED_C,
            }),
            _ => Err(format!(
                "Unknown training policy: {}. Valid options are: standard, balanced",
                s
            )),
        }
    }
}

/// RBF kernel width. `Scale` mirrors sklearn's `gamma="scale"`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum KernelWidth {
    #[default]
    Scale,
    Fixed(f64),
}

/// Hyper-parameters of the support-vector classifier.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SvmConfig {
    /// Solver tolerance.
    pub eps: f64,
    /// Regularization strength under `TrainingPolicy::Standard`.
    pub c: f64,
    pub kernel_width: KernelWidth,
}

impl Default for SvmConfig {
    fn default() -> Self {
        Self {
            eps: 1e-3,
            c: 1.0,
            kernel_width: KernelWidth::Scale,
        }
    }
}

/// Fixed locations of the three artifacts.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
}

impl ArtifactPaths {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn model(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    pub fn scaler(&self) -> PathBuf {
        self.dir.join(SCALER_FILE)
    }

    pub fn encoder(&self) -> PathBuf {
        self.dir.join(ENCODER_FILE)
    }

    pub fn report(&self) -> PathBuf {
        self.dir.join(REPORT_FILE)
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::new(DEFAULT_ARTIFACT_DIR)
    }
}

/// Everything the training pipeline needs.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    pub dataset_path: PathBuf,
    pub artifacts: ArtifactPaths,
    /// Accepted target column names, tried in order.
    pub target_columns: Vec<String>,
    pub imputation: ImputationConfig,
    pub policy: TrainingPolicy,
    pub svm: SvmConfig,
    /// Fraction of rows held out for evaluation. `None` evaluates on the
    /// training rows only.
    pub holdout_fraction: Option<f64>,
    pub seed: u64,
    pub html_report: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            artifacts: ArtifactPaths::default(),
            target_columns: vec![
                "Loan_Status".to_string(),
                "Loan_Status (Approved)".to_string(),
            ],
            imputation: ImputationConfig::default(),
            policy: TrainingPolicy::default(),
            svm: SvmConfig::default(),
            holdout_fraction: None,
            seed: 42,
            html_report: true,
        }
    }
}

/// Knockout rules evaluated before the model.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RuleConfig {
    pub knockout_rules: bool,
    pub debt_to_income_ceiling: f64,
    /// Converts `loan_amount` into income currency units.
    pub loan_amount_multiplier: f64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            knockout_rules: true,
            debt_to_income_ceiling: 12.0,
            loan_amount_multiplier: 1000.0,
        }
    }
}

impl RuleConfig {
    pub fn model_only() -> Self {
        Self {
            knockout_rules: false,
            ..Self::default()
        }
    }

    /// Both thresholds must be finite and positive. A NaN ceiling would
    /// never trigger and a negative one would reject every applicant.
    pub fn validate(&self) -> crate::error::Result<()> {
        for (field, value) in [
            ("debt_to_income_ceiling", self.debt_to_income_ceiling),
            ("loan_amount_multiplier", self.loan_amount_multiplier),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(LoanError::invalid_field(
                    field,
                    format!("must be a finite positive number, got {}", value),
                ));
            }
        }
        Ok(())
    }
}
