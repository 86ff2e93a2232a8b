//! Schedule handler for expyre.

use std::path::Path;

use expyre_core::JobDirectory;
use expyre_protocols::{GuardSet, JobRecord};

/// Schedule `path` for deletion and report the job.
pub(crate) async fn handle_schedule(
    directory: &JobDirectory,
    path: &Path,
    timespec: &str,
    guards: GuardSet,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let job = directory.schedule(path, timespec, guards).await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&job)?),
        _ => println!("{}", format_scheduled(&job)),
    }
    Ok(())
}

pub(crate) fn format_scheduled(job: &JobRecord) -> String {
    format!(
        "[{}] {} will expire at {}",
        job.job_id,
        job.path.display(),
        job.timestamp.format("%F %R")
    )
}
