use anyhow::Result;
use clap::{ArgMatches, Command};
use log::LevelFilter;
use std::path::PathBuf;

use loan_cli::decide::{self, DecideConfig};
use loan_cli::train::{self, input::TrainCliConfig};

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("LOAN_LOG", "error,loan=info"))
        .init();

    let matches = Command::new("loan")
        .version(clap::crate_version!())
        .about("Loan eligibility: train the classifier or decide on an application")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(train::command())
        .subcommand(decide::command())
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("decide", sub_m)) => handle_decide(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    let config = TrainCliConfig::from_arguments(config_path, matches)?;

    match config_path {
        Some(path) => log::info!("[loan::train] Training from config: {:?}", path),
        None => {
            let default_json = serde_json::to_string_pretty(&config).unwrap_or_default();
            eprintln!("[loan::train] No config provided; using defaults:\n{}", default_json);
        }
    }

    match train::run(&config) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_decide(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    let config = DecideConfig::from_arguments(config_path, matches)?;

    let outcome = decide::applicant_from_matches(matches).and_then(|record| decide::run(&config, &record));
    match outcome {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) => {
            log::error!("Decision failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
