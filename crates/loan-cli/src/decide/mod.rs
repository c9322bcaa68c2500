use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use loan_classifiers::applicant::{ApplicantRecord, CreditHistory, EmploymentStatus};
use loan_classifiers::config::{ArtifactPaths, RuleConfig};
use loan_classifiers::decision::{DecisionEngine, DecisionResult};
use loan_classifiers::io::ArtifactCache;

use crate::util::load_json_config;

/// `loan decide` configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecideConfig {
    pub artifacts: ArtifactPaths,
    pub rules: RuleConfig,
}

impl DecideConfig {
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config: DecideConfig = match config_path {
            Some(path) => load_json_config(path)?,
            None => DecideConfig::default(),
        };

        if let Some(dir) = matches.get_one::<PathBuf>("artifacts") {
            config.artifacts = ArtifactPaths::new(dir);
        }

        if matches.get_flag("no_rules") {
            config.rules.knockout_rules = false;
        }

        if let Some(&ceiling) = matches.get_one::<f64>("dti_ceiling") {
            config.rules.debt_to_income_ceiling = ceiling;
        }

        config.rules.validate().context("Invalid knockout rule configuration")?;
        Ok(config)
    }
}

/// Build the applicant from the command line, validating every field.
pub fn applicant_from_matches(matches: &ArgMatches) -> Result<ApplicantRecord> {
    let income = *matches
        .get_one::<f64>("income")
        .context("--income is required")?;
    let loan_amount = *matches
        .get_one::<f64>("loan_amount")
        .context("--loan-amount is required")?;
    let credit = matches
        .get_one::<String>("credit_history")
        .context("--credit-history is required")?;
    let employment = matches
        .get_one::<String>("employment")
        .context("--employment is required")?;

    let employment = EmploymentStatus::from_str(employment)?;
    log::debug!("Applicant employment status: {}", employment.label());

    let record = ApplicantRecord::new(income, loan_amount, CreditHistory::from_str(credit)?, employment)?;
    Ok(record)
}

pub fn command() -> Command {
    Command::new("decide")
        .about("Decide on a single loan application using trained artifacts")
        .arg(
            Arg::new("config")
                .help("Path to a JSON decision configuration file")
                .required(false)
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("income")
                .long("income")
                .help("Applicant income")
                .required(true)
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("loan_amount")
                .long("loan-amount")
                .help("Requested loan amount, in thousands")
                .required(true)
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("credit_history")
                .long("credit-history")
                .help("Repayment history")
                .required(true)
                .value_parser(["clean", "default"]),
        )
        .arg(
            Arg::new("employment")
                .long("employment")
                .help("Employment status")
                .required(true)
                .value_parser(["salaried", "self-employed"]),
        )
        .arg(
            Arg::new("artifacts")
                .short('a')
                .long("artifacts")
                .help("Directory holding the trained artifacts. Defaults to models/.")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::DirPath),
        )
        .arg(
            Arg::new("no_rules")
                .long("no-rules")
                .help("Skip the knockout rules and always consult the model.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dti_ceiling")
                .long("dti-ceiling")
                .help("Debt-to-income ratio above which applications are rejected.")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(f64)),
        )
}

pub fn run(config: &DecideConfig, record: &ApplicantRecord) -> Result<DecisionResult> {
    let engine = DecisionEngine::new(config.rules.clone())?;
    log::debug!("Knockout rules: {:?}", engine.rules());

    let cache = ArtifactCache::new(config.artifacts.clone());
    let artifacts = cache
        .get()
        .with_context(|| format!("Failed to load artifacts from {}", cache.paths().dir.display()))?;

    let result = engine.decide(record, artifacts)?;
    log::info!("{}", result);
    Ok(result)
}
