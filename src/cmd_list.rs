//! Listing handler for expyre.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use expyre_core::JobDirectory;
use expyre_core::path::resolve_dir;
use expyre_protocols::JobRecord;

/// Print the scheduled paths, optionally only those under `under`.
pub(crate) async fn handle_list(
    directory: &JobDirectory,
    under: Option<&Path>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let (jobs, scope) = match under {
        Some(dir) => {
            let dir = resolve_dir(dir)?;
            (directory.list_in(&dir).await?, Some(dir))
        }
        None => (directory.list_all().await?, None),
    };
    let records = sorted_records(jobs);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&records)?),
        _ => print!("{}", render_listing(&records, scope.as_deref())),
    }
    Ok(())
}

/// Records ordered by expiry time, then path.
pub(crate) fn sorted_records(jobs: HashMap<PathBuf, JobRecord>) -> Vec<JobRecord> {
    let mut records: Vec<_> = jobs.into_values().collect();
    records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.path.cmp(&b.path)));
    records
}

pub(crate) fn render_listing(records: &[JobRecord], scope: Option<&Path>) -> String {
    if records.is_empty() {
        return match scope {
            Some(dir) => format!("No paths scheduled for expiry under {}\n", dir.display()),
            None => "No paths scheduled for expiry\n".to_string(),
        };
    }

    let mut out = String::new();
    for job in records {
        out.push_str(&format!(
            "{} scheduled to expire at {} {}\n",
            job.path.display(),
            job.timestamp.format("%F %R"),
            job.conditions
        ));
    }
    out
}
