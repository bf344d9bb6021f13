//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initialises logging
//! - parses CLI arguments
//! - runs a batch, the verifier, or a status query
//! - prints reports

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::batch::{self, BatchPlan, Outcome};
use crate::cli::{Command, RunArgs, StatusArgs, VerifyArgs, default_export_dir};
use crate::domain::{BatchConfig, DEFAULT_CHECKPOINT_NAME};
use crate::error::AppError;
use crate::io::checkpoint;
use crate::modeler::MeshModeler;
use crate::verify::{self, VerifyConfig};

pub mod progress;

/// Entry point for the `boltgen` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Verify(args) => handle_verify(args),
        Command::Status(args) => handle_status(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = batch_config_from_args(&args);
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut modeler = MeshModeler::new();
    let mut observer = progress::ConsoleObserver::new(!args.no_progress);

    match batch::run_batch(&config, &mut modeler, &mut observer, &mut rng)? {
        Outcome::CampaignComplete(plan) => {
            println!("{}", crate::report::format_campaign_complete(&plan));
            Ok(())
        }
        Outcome::Finished(summary) => {
            println!("{}", crate::report::format_run_summary(&summary, &config));
            match summary.checkpoint_error {
                Some(err) => Err(AppError::new(4, format!("Checkpoint was not saved: {err}"))),
                None => Ok(()),
            }
        }
    }
}

fn handle_verify(args: VerifyArgs) -> Result<(), AppError> {
    let export_dir = args.export_dir.clone().unwrap_or_else(default_export_dir);
    let checkpoint_path = args
        .checkpoint
        .clone()
        .unwrap_or_else(|| export_dir.join(DEFAULT_CHECKPOINT_NAME));

    let mut config = VerifyConfig::new(args.csv.clone(), checkpoint_path, export_dir);
    config.expected = args.expected;
    config.extension = args.extension.trim_start_matches('.').to_string();

    let report = verify::verify(&config)?;
    print!("{}", crate::report::format_verify_report(&report));

    if args.strict && !report.passed() {
        return Err(AppError::new(1, "Verification failed."));
    }
    Ok(())
}

fn handle_status(args: StatusArgs) -> Result<(), AppError> {
    let export_dir = args.export_dir.unwrap_or_else(default_export_dir);
    let checkpoint_path = args
        .checkpoint
        .unwrap_or_else(|| export_dir.join(DEFAULT_CHECKPOINT_NAME));
    if args.batch_size == 0 || args.campaign_size == 0 {
        return Err(AppError::new(2, "Campaign size and batch size must be > 0."));
    }

    let saved = checkpoint::load_or_default(&checkpoint_path);
    let plan = BatchPlan::new(saved.last_bolt_count, args.campaign_size, args.batch_size);
    print!(
        "{}",
        crate::report::format_campaign_status(&plan, saved.used_indices.len())
    );
    Ok(())
}

pub fn batch_config_from_args(args: &RunArgs) -> BatchConfig {
    let export_dir = args.export_dir.clone().unwrap_or_else(default_export_dir);
    let mut config = BatchConfig::new(args.csv.clone(), export_dir);
    if let Some(path) = &args.checkpoint {
        config.checkpoint_path = path.clone();
    }
    config.create_threads = !args.no_threads;
    config.spacing = args.spacing;
    config.campaign_size = args.campaign_size;
    config.batch_size = args.batch_size;
    config.seed = args.seed;
    config
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::cli::Cli;

    #[test]
    fn checkpoint_follows_export_dir_unless_given() {
        let cli = Cli::parse_from(["boltgen", "run", "-f", "d.csv", "-o", "out", "--no-threads"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        let config = batch_config_from_args(&args);
        assert_eq!(config.checkpoint_path, PathBuf::from("out").join("bolt_tracking.json"));
        assert!(!config.create_threads);

        let cli = Cli::parse_from(["boltgen", "run", "-o", "out", "--checkpoint", "t.json", "--seed", "9"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        let config = batch_config_from_args(&args);
        assert_eq!(config.checkpoint_path, PathBuf::from("t.json"));
        assert_eq!(config.seed, Some(9));
    }
}
