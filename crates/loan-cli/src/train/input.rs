use anyhow::Result;
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use loan_classifiers::config::{ArtifactPaths, CreditHistoryImputation, TrainingConfig, TrainingPolicy};

use crate::util::{load_json_config, validate_tsv_or_csv_extension};

/// `loan train` configuration: the library's `TrainingConfig` plus output
/// options that only make sense on the command line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainCliConfig {
    #[serde(flatten)]
    pub training: TrainingConfig,
    /// Also write the classification reports as JSON to this path.
    pub metrics_json: Option<PathBuf>,
}

impl TrainCliConfig {
    /// Load the JSON config (or defaults) and apply command line overrides.
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config: TrainCliConfig = match config_path {
            Some(path) => load_json_config(path)?,
            None => TrainCliConfig::default(),
        };

        if let Some(dataset) = matches.get_one::<PathBuf>("dataset") {
            config.training.dataset_path = dataset.clone();
        }
        validate_tsv_or_csv_extension(&config.training.dataset_path)?;

        if let Some(dir) = matches.get_one::<PathBuf>("output_dir") {
            config.training.artifacts = ArtifactPaths::new(dir);
        }

        if let Some(policy) = matches.get_one::<String>("policy") {
            config.training.policy = TrainingPolicy::from_str(policy).map_err(anyhow::Error::msg)?;
        }

        if let Some(imputation) = matches.get_one::<String>("credit_imputation") {
            config.training.imputation.credit_history =
                CreditHistoryImputation::from_str(imputation).map_err(anyhow::Error::msg)?;
        }

        if let Some(&fraction) = matches.get_one::<f64>("holdout") {
            if !(fraction > 0.0 && fraction < 1.0) {
                anyhow::bail!("--holdout must be between 0 and 1 (exclusive), got {}", fraction);
            }
            config.training.holdout_fraction = Some(fraction);
        }

        if let Some(&seed) = matches.get_one::<u64>("seed") {
            config.training.seed = seed;
        }

        if matches.get_flag("no_report") {
            config.training.html_report = false;
        }

        if let Some(path) = matches.get_one::<PathBuf>("metrics_json") {
            config.metrics_json = Some(path.clone());
        }

        Ok(config)
    }
}
