pub mod input;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command, ValueHint};
use serde::Serialize;
use std::path::{Path, PathBuf};

use loan_classifiers::report::ClassificationReport;
use loan_classifiers::training::{run_training, TrainingOutcome};

use input::TrainCliConfig;

pub fn command() -> Command {
    Command::new("train")
        .about("Train the loan eligibility classifier and write its artifacts")
        .arg(
            Arg::new("config")
                .help("Path to a JSON training configuration file")
                .required(false)
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("dataset")
                .short('d')
                .long("dataset")
                .help(
                    "Path to the loan dataset (*.csv or *.tsv). \
                     Overrides the dataset specified in the configuration file.",
                )
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("output_dir")
                .short('o')
                .long("output-dir")
                .help("Directory the model, scaler and encoder artifacts are written to.")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::DirPath),
        )
        .arg(
            Arg::new("policy")
                .long("policy")
                .help("Class weighting used when fitting the SVM.")
                .value_parser(["standard", "balanced"])
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("credit_imputation")
                .long("credit-imputation")
                .help("How missing Credit_History cells are filled.")
                .value_parser(["most-frequent", "worst-case"])
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("holdout")
                .long("holdout")
                .help("Fraction of rows held out for evaluation, e.g. 0.2.")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .help("Seed for the hold-out shuffle.")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("metrics_json")
                .long("metrics-json")
                .help("Also write the classification reports as JSON to this file.")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("no_report")
                .long("no-report")
                .help("Disable HTML report generation.")
                .action(ArgAction::SetTrue),
        )
}

#[derive(Serialize)]
struct MetricsSummary<'a> {
    target_column: &'a str,
    trained_at: &'a str,
    imputed_cells: usize,
    training: &'a ClassificationReport,
    holdout: Option<&'a ClassificationReport>,
}

/// Train, print the classification report(s) and optionally dump metrics.
pub fn run(config: &TrainCliConfig) -> Result<TrainingOutcome> {
    let outcome = run_training(&config.training).with_context(|| {
        format!(
            "Failed to train on {}",
            config.training.dataset_path.display()
        )
    })?;

    println!("{}", outcome.report);
    if let Some(holdout) = &outcome.holdout_report {
        println!("{}", holdout);
    }

    if let Some(path) = &config.metrics_json {
        write_metrics_json(path, &outcome)?;
        log::info!("Wrote metrics to {}", path.display());
    }

    Ok(outcome)
}

fn write_metrics_json(path: &Path, outcome: &TrainingOutcome) -> Result<()> {
    let summary = MetricsSummary {
        target_column: &outcome.target_column,
        trained_at: &outcome.bundle.trained_at,
        imputed_cells: outcome.imputation.total_filled(),
        training: &outcome.report,
        holdout: outcome.holdout_report.as_ref(),
    };
    let json = serde_json::to_string_pretty(&summary)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write metrics: {}", path.display()))?;
    Ok(())
}
