//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use gpwatch_core::reconcile::{ReconcileReport, SkipReason};
use gpwatch_core::traits::SubmissionResult;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print the reconcile report: proposals, skipped cycles, diagnostics.
pub fn render_report(report: &ReconcileReport) {
    if report.proposals.is_empty() {
        println!("{}", "No updates needed.".dimmed());
    } else {
        for update in &report.proposals {
            let from = update.previous.as_deref().unwrap_or("(unpublished)");
            let cycle = update.cycle.to_string();
            println!(
                "{} {}: {} -> {} ({})",
                "↑".green(),
                cycle.as_str().bold(),
                from,
                update.new_version,
                update.new_date,
            );
        }
    }

    for skip in &report.skipped {
        let reason = match &skip.reason {
            SkipReason::UpToDate { published } => format!("up to date ({published})"),
            SkipReason::PendingRequest => "request already open".to_string(),
            SkipReason::NoCandidates => "no matching records".to_string(),
            SkipReason::Conflict(conflict) => conflict.to_string(),
        };
        eprintln!("{} {}: {}", "-".dimmed(), skip.cycle, reason.as_str().dimmed());
    }

    for parse_error in &report.parse_errors {
        eprintln!("{} {}", "!".yellow(), parse_error);
    }
}

/// Print per-item submission outcomes.
pub fn render_submissions(results: &[SubmissionResult]) {
    for result in results {
        match &result.outcome {
            Ok(created) => success(&format!("{}: {}", result.cycle, created.location)),
            Err(e) => error(&format!("{}: {}", result.cycle, e)),
        }
    }
}
