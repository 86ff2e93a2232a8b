//! Reset handler for expyre.

use std::path::PathBuf;

use tracing::debug;

use expyre_core::JobDirectory;
use expyre_protocols::RemovalReport;

/// Cancel the expiry of `paths`. Returns whether every path was removed.
pub(crate) async fn handle_reset(
    directory: &JobDirectory,
    paths: &[PathBuf],
    format: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let report = directory.remove(paths).await?;
    for failure in report.failures() {
        debug!("{}", failure);
    }

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print!("{}", render_report(&report)),
    }
    Ok(report.is_complete())
}

pub(crate) fn render_report(report: &RemovalReport) -> String {
    let mut out = String::from("Successfully removed these paths from expiry list:\n");
    for path in &report.succeeded {
        out.push_str(&format!("{}\n", path.display()));
    }
    if !report.is_complete() {
        out.push_str("Failed to remove these paths from expiry list:\n");
        for path in &report.failed {
            out.push_str(&format!("{}\n", path.display()));
        }
    }
    out
}
