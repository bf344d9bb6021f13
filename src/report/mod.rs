//! Reporting utilities: formatted terminal output.
//!
//! Formatting lives here so the driver and verifier only produce data and
//! output wording changes stay in one place.

pub mod format;

pub use format::{format_campaign_complete, format_campaign_status, format_run_summary, format_verify_report};
