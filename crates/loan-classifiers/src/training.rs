//! Offline training pipeline.
//!
//! dataset → imputation → encoder → feature matrix (schema order) → scaler →
//! SVM → training-set report → three artifacts on disk.
//!
//! Nothing is written unless every stage before persistence succeeds, and
//! persistence itself is all-or-nothing.
use std::fs;

use crate::config::TrainingConfig;
use crate::data_handling::LoanDataset;
use crate::error::Result;
use crate::io::{read_loan_dataset, ArtifactBundle};
use crate::models::{ClassifierModel, SvmClassifier};
use crate::preprocessing::{impute, CategoricalEncoder, FeatureScaler, ImputationSummary};
use crate::report::html::{render_training_report, ReportContext};
use crate::report::{ClassificationReport, EvaluationSet};
use crate::schema::FEATURE_SCHEMA;

/// Column the categorical encoder is fitted on.
pub const SELF_EMPLOYED_COLUMN: &str = FEATURE_SCHEMA[3];

#[derive(Debug)]
pub struct TrainingOutcome {
    pub bundle: ArtifactBundle,
    /// Metrics on the rows the model was fitted on.
    pub report: ClassificationReport,
    pub holdout_report: Option<ClassificationReport>,
    pub imputation: ImputationSummary,
    /// Rows the model was fitted on, after imputation.
    pub training_data: LoanDataset,
    /// Predicted label for each row of `training_data`.
    pub training_predictions: Vec<u8>,
    pub target_column: String,
}

/// Run the full pipeline described by `config` and persist the artifacts.
pub fn run_training(config: &TrainingConfig) -> Result<TrainingOutcome> {
    log::info!("Loading data from {}", config.dataset_path.display());
    let raw = read_loan_dataset(&config.dataset_path, &config.target_columns)?;
    let target_column = raw.target_column.clone();

    let (cleaned, imputation) = impute(&raw, &config.imputation)?;
    cleaned.log_input_data_summary();

    // The encoder is a vocabulary, so it sees every row; the scaler and the
    // model only see training rows.
    let encoder = CategoricalEncoder::fit(SELF_EMPLOYED_COLUMN, &cleaned.self_employed)?;

    let (train, holdout) = match config.holdout_fraction {
        Some(fraction) => {
            let (train, holdout) = cleaned.train_holdout_split(fraction, config.seed)?;
            log::info!(
                "Holding out {} of {} rows for evaluation (seed {})",
                holdout.len(),
                cleaned.len(),
                config.seed
            );
            (train, Some(holdout))
        }
        None => (cleaned, None),
    };

    let trained_at = chrono::Utc::now().to_rfc3339();
    let (bundle, training_predictions) = fit_artifacts(&train, encoder, config, &trained_at)?;

    let report = ClassificationReport::from_predictions(
        &train.target,
        &training_predictions,
        EvaluationSet::TrainingSet,
    );
    log::info!("Classification report:\n{}", report);

    let holdout_report = match &holdout {
        Some(holdout) => {
            let predicted = predict_dataset(&bundle, holdout)?;
            let r = ClassificationReport::from_predictions(&holdout.target, &predicted, EvaluationSet::Holdout);
            log::info!("Hold-out classification report:\n{}", r);
            Some(r)
        }
        None => {
            log::warn!(
                "No held-out split: reported metrics are computed on the training set and overstate model quality"
            );
            None
        }
    };

    log::info!("Saving artifacts to {}", config.artifacts.dir.display());
    bundle.save(&config.artifacts)?;

    if config.html_report {
        let ctx = ReportContext {
            dataset: &config.dataset_path.display().to_string(),
            policy: config.policy.name(),
            credit_history_imputation: &format!("{:?}", config.imputation.credit_history),
            imputed_cells: imputation.total_filled(),
            trained_at: &trained_at,
        };
        let page = render_training_report(&ctx, &report, holdout_report.as_ref());
        let report_path = config.artifacts.report();
        match fs::write(&report_path, page) {
            Ok(()) => log::info!("Wrote training report to {}", report_path.display()),
            Err(e) => log::warn!("Could not write {}: {}", report_path.display(), e),
        }
    }

    log::info!("Training complete");

    Ok(TrainingOutcome {
        bundle,
        report,
        holdout_report,
        imputation,
        training_data: train,
        training_predictions,
        target_column,
    })
}

/// Fit scaler and classifier on `train` and return them with the model's
/// predictions for every training row.
pub fn fit_artifacts(
    train: &LoanDataset,
    encoder: CategoricalEncoder,
    config: &TrainingConfig,
    trained_at: &str,
) -> Result<(ArtifactBundle, Vec<u8>)> {
    let x = train.feature_matrix(&encoder)?;

    log::info!("Scaling features");
    let (scaler, x_scaled) = FeatureScaler::fit_transform(&x)?;

    log::info!(
        "Training SVM (RBF kernel, {} policy) on {} rows",
        config.policy.name(),
        train.len()
    );
    let model = SvmClassifier::fit(&x_scaled, &train.targets(), &config.svm, &config.policy)?;
    let (c_pos, c_neg) = model.class_c();
    log::info!(
        "Fitted SVM with kernel eps {:.4}, C=({:.4}, {:.4})",
        model.kernel_eps(),
        c_pos,
        c_neg
    );
    let predictions = model.predict(&x_scaled)?;

    let bundle = ArtifactBundle {
        encoder,
        scaler,
        model,
        trained_at: trained_at.to_string(),
    };
    Ok((bundle, predictions))
}

/// Predicted labels for every row of an imputed dataset.
pub fn predict_dataset(bundle: &ArtifactBundle, data: &LoanDataset) -> Result<Vec<u8>> {
    let x = data.feature_matrix(&bundle.encoder)?;
    let x_scaled = bundle.scaler.transform(&x)?;
    bundle.model.predict(&x_scaled)
}
