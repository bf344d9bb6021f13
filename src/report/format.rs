//! Terminal text for run summaries and verifier reports.

use crate::batch::{BatchPlan, RunSummary};
use crate::domain::BatchConfig;
use crate::verify::VerifyReport;

/// Duplicate rows listed before the report collapses to a count.
const MAX_LISTED_DUPLICATES: usize = 5;

/// Message for a run that found the campaign already finished.
pub fn format_campaign_complete(plan: &BatchPlan) -> String {
    format!(
        "All {} bolts have already been generated. No further bolts will be created.",
        plan.campaign_size
    )
}

/// Campaign progress as recorded in the checkpoint.
pub fn format_campaign_status(plan: &BatchPlan, used_indices: usize) -> String {
    let mut out = format!(
        "Campaign: {}/{} bolts built, {} dataset rows used\n",
        plan.last_bolt.min(plan.campaign_size),
        plan.campaign_size,
        used_indices
    );
    if plan.is_complete() {
        out.push_str("Campaign complete.\n");
    } else {
        out.push_str(&format!(
            "Next run: batch {}/{} (bolts {}-{})\n",
            plan.batch_number, plan.total_batches, plan.start_bolt, plan.end_bolt
        ));
    }
    out
}

/// End-of-run summary: totals, problems, checkpoint state, next run.
pub fn format_run_summary(summary: &RunSummary, config: &BatchConfig) -> String {
    let plan = &summary.plan;
    let mut out = String::new();

    out.push_str("=== boltgen - batch summary ===\n");
    out.push_str(&format!(
        "Batch {}/{} | bolts {}-{} | started {}\n",
        plan.batch_number,
        plan.total_batches,
        plan.start_bolt,
        plan.end_bolt,
        summary.started_at.format("%Y-%m-%d %H:%M:%S"),
    ));
    out.push_str(&format!(
        "Created and exported {} bolt(s) to {}\n",
        summary.exported,
        config.export_dir.display()
    ));

    if summary.discarded > 0 {
        out.push_str(&format!(
            "Discarded {} bolt(s) that failed thread creation\n",
            summary.discarded
        ));
    }
    if summary.thread_fallbacks > 0 {
        out.push_str(&format!(
            "{} bolt(s) threaded with a fallback designation\n",
            summary.thread_fallbacks
        ));
    }
    if summary.errors > 0 {
        out.push_str(&format!("{} bolt(s) failed with errors\n", summary.errors));
    }
    out.push_str(&format!(
        "Attempts: {}/{} | elapsed {:.1}s\n",
        summary.attempts,
        plan.max_attempts(),
        (summary.finished_at - summary.started_at).num_milliseconds() as f64 / 1000.0
    ));

    if summary.cancelled {
        out.push_str("Run cancelled by operator.\n");
    }
    if let Some(err) = &summary.exhausted {
        out.push_str(&format!("{err}\n"));
    }

    match &summary.checkpoint_error {
        Some(err) => out.push_str(&format!("WARNING: checkpoint not saved: {err}\n")),
        None => out.push_str(&format!(
            "Checkpoint: last_bolt={} used_indices={} ({})\n",
            summary.checkpoint.last_bolt_count,
            summary.checkpoint.used_indices.len(),
            config.checkpoint_path.display()
        )),
    }

    let next = summary.next_plan();
    if next.is_complete() {
        out.push_str(&format!(
            "All {} bolts have now been generated.\n",
            plan.campaign_size
        ));
    } else {
        out.push_str(&format!(
            "Next run will create batch {} (bolts {}-{}).\n",
            next.batch_number, next.start_bolt, next.end_bolt
        ));
    }

    out
}

/// Verifier report in the order the checks run.
pub fn format_verify_report(report: &VerifyReport) -> String {
    let mut out = String::new();
    let mark = |ok: bool| if ok { "ok" } else { "MISMATCH" };

    out.push_str(&format!(
        "Found {} exported files (should be {}) [{}]\n",
        report.file_count,
        report.expected,
        mark(report.files_ok())
    ));
    out.push_str(&format!(
        "Last bolt number: {} (should be {}) [{}]\n",
        report.last_bolt,
        report.expected,
        mark(report.last_bolt_ok())
    ));
    out.push_str(&format!(
        "Number of used indices: {} (should be {}) [{}]\n",
        report.used_count,
        report.expected,
        mark(report.used_count_ok())
    ));
    if !report.checkpoint_consistent() {
        out.push_str(&format!(
            "NOTE: last bolt ({}) differs from used index count ({}); discarded bolts retire rows too.\n",
            report.last_bolt, report.used_count
        ));
    }

    if report.duplicate_indices.is_empty() {
        out.push_str("No duplicate indices found in tracking file.\n");
    } else {
        out.push_str(&format!(
            "WARNING: {} duplicate indices found in tracking file!\n",
            report.duplicate_indices.len()
        ));
    }

    if !report.out_of_range.is_empty() {
        out.push_str(&format!(
            "WARNING: {} used indices are outside the dimension table.\n",
            report.out_of_range.len()
        ));
    }

    if report.duplicate_dimensions.is_empty() {
        out.push_str("SUCCESS: All bolts have unique dimensions!\n");
    } else {
        out.push_str(&format!(
            "WARNING: Found {} bolts with duplicate dimensions!\n",
            report.duplicate_dimensions.len()
        ));
        for dup in report.duplicate_dimensions.iter().take(MAX_LISTED_DUPLICATES) {
            out.push_str(&format!(
                "  Index {} duplicates index {}: {:?}\n",
                dup.duplicate_index, dup.first_index, dup.dimensions
            ));
        }
        if report.duplicate_dimensions.len() > MAX_LISTED_DUPLICATES {
            out.push_str(&format!(
                "  ... and {} more\n",
                report.duplicate_dimensions.len() - MAX_LISTED_DUPLICATES
            ));
        }
    }

    match report.sizes {
        Some(s) => out.push_str(&format!(
            "File sizes: Min={}, Max={}, Avg={:.2}\n",
            s.min, s.max, s.mean
        )),
        None => out.push_str("File sizes: no exported files\n"),
    }

    out.push_str(if report.passed() {
        "Verification passed.\n"
    } else {
        "Verification found problems.\n"
    });
    out
}
