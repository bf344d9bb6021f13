//! Command-line parsing for the bolt batch generator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! batch driver. Every operator-facing parameter can also come from the
//! environment (or a `.env` file).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{BATCH_SIZE, CAMPAIGN_CAP, DEFAULT_SPACING_CM};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "boltgen", version, about = "Resumable batch generator for hex-head bolt meshes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build and export the next batch of the campaign.
    Run(RunArgs),
    /// Check an exported campaign for completeness and duplicates.
    Verify(VerifyArgs),
    /// Show campaign progress from the checkpoint without building anything.
    Status(StatusArgs),
}

/// Options for `boltgen run`.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// CSV of bolt dimensions (label, body_diameter, pitch, head_diameter, body_length, head_height).
    #[arg(short = 'f', long, env = "BOLTGEN_CSV", value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// Directory receiving `bolt_<n>.stl` files (default: ~/Desktop/stl_files).
    #[arg(short = 'o', long, env = "BOLTGEN_EXPORT_DIR", value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Checkpoint JSON tracking progress across runs (default: <export-dir>/bolt_tracking.json).
    #[arg(long, env = "BOLTGEN_CHECKPOINT", value_name = "JSON")]
    pub checkpoint: Option<PathBuf>,

    /// Skip thread creation (use when threads keep failing).
    #[arg(long)]
    pub no_threads: bool,

    /// Legacy spacing between bolts (cm). Bolts are exported individually; kept for compatibility.
    #[arg(long, default_value_t = DEFAULT_SPACING_CM)]
    pub spacing: f64,

    /// Random seed for row sampling and jitter (default: from entropy).
    #[arg(long, env = "BOLTGEN_SEED")]
    pub seed: Option<u64>,

    /// Total bolts in the campaign.
    #[arg(long, default_value_t = CAMPAIGN_CAP)]
    pub campaign_size: u32,

    /// Bolts per run.
    #[arg(long, default_value_t = BATCH_SIZE)]
    pub batch_size: u32,

    /// Hide the progress bar.
    #[arg(long)]
    pub no_progress: bool,
}

/// Options for `boltgen verify`.
#[derive(Debug, Args, Clone)]
pub struct VerifyArgs {
    /// CSV the campaign was sampled from.
    #[arg(short = 'f', long, env = "BOLTGEN_CSV", value_name = "CSV")]
    pub csv: PathBuf,

    /// Directory holding the exported files (default: ~/Desktop/stl_files).
    #[arg(short = 'o', long, env = "BOLTGEN_EXPORT_DIR", value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Checkpoint JSON (default: <export-dir>/bolt_tracking.json).
    #[arg(long, env = "BOLTGEN_CHECKPOINT", value_name = "JSON")]
    pub checkpoint: Option<PathBuf>,

    /// Expected campaign size.
    #[arg(long, default_value_t = CAMPAIGN_CAP)]
    pub expected: u32,

    /// Extension of exported files.
    #[arg(long, default_value = "stl")]
    pub extension: String,

    /// Exit with code 1 when any check fails.
    #[arg(long)]
    pub strict: bool,
}

/// Options for `boltgen status`.
#[derive(Debug, Args, Clone)]
pub struct StatusArgs {
    #[arg(short = 'o', long, env = "BOLTGEN_EXPORT_DIR", value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    #[arg(long, env = "BOLTGEN_CHECKPOINT", value_name = "JSON")]
    pub checkpoint: Option<PathBuf>,

    #[arg(long, default_value_t = CAMPAIGN_CAP)]
    pub campaign_size: u32,

    #[arg(long, default_value_t = BATCH_SIZE)]
    pub batch_size: u32,
}

/// `~/Desktop/stl_files`, or `./stl_files` when no home directory is known.
pub fn default_export_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join("Desktop").join("stl_files"))
        .unwrap_or_else(|| PathBuf::from("stl_files"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_defaults() {
        let cli = Cli::parse_from(["boltgen", "run", "-f", "dims.csv", "-o", "out"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.csv, Some(PathBuf::from("dims.csv")));
        assert_eq!(args.batch_size, 250);
        assert_eq!(args.campaign_size, 1000);
        assert!(!args.no_threads);
    }

    #[test]
    fn verify_flags() {
        let cli = Cli::parse_from(["boltgen", "verify", "-f", "dims.csv", "--expected", "10", "--strict"]);
        let Command::Verify(args) = cli.command else {
            panic!("expected verify");
        };
        assert_eq!(args.expected, 10);
        assert!(args.strict);
        assert_eq!(args.extension, "stl");
    }
}
