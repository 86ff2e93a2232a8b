//! Path-keyed view of the scheduled expiry jobs.

use std::collections::{HashMap, HashSet};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use tracing::{debug, info, warn};

use expyre_config::SchedulerConfig;
use expyre_protocols::{GuardSet, JobRecord, RemovalReport, SchedulerError, SchedulerTransport, Timespec};

use crate::codec::{self, Action};
use crate::guards::build_conditions;
use crate::parser::{self, TimestampFormat};
use crate::path::{is_within, normalize, resolve_dir};
use crate::transport::AtTransport;

/// Schedules, lists and cancels expiry jobs.
///
/// Nothing is cached: every call re-reads the scheduler.
pub struct JobDirectory {
    transport: Arc<dyn SchedulerTransport>,
    timestamps: TimestampFormat,
}

impl JobDirectory {
    pub fn new(transport: Arc<dyn SchedulerTransport>, timestamps: TimestampFormat) -> Self {
        Self {
            transport,
            timestamps,
        }
    }

    /// Directory backed by the `at` binary described by `config`.
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(
            Arc::new(AtTransport::new(config.clone())),
            TimestampFormat::new(config.timestamp_format.clone()),
        )
    }

    /// All expiry jobs keyed by path. Jobs created by other tools are skipped.
    pub async fn list_all(&self) -> Result<HashMap<PathBuf, JobRecord>, SchedulerError> {
        let lines = self.transport.list().await?;
        let mut jobs = HashMap::new();

        for entry in parser::parse_listing(&lines) {
            let body = match self.transport.fetch_body(&entry.job_id).await {
                Ok(body) => body,
                Err(SchedulerError::SubmissionFailed { output, .. }) => {
                    // Ran or was removed since the listing
                    debug!("Job {} vanished before it could be read: {}", entry.job_id, output);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let Some(script) = codec::parse(&body) else {
                debug!("Job {} was not created by expyre, skipping", entry.job_id);
                continue;
            };

            let timestamp = self.timestamps.parse(&entry.timestamp_text)?;
            jobs.insert(
                script.path.clone(),
                JobRecord::new(entry.job_id, script.path, timestamp, script.conditions),
            );
        }

        Ok(jobs)
    }

    /// Expiry jobs for paths at or below `prefix`.
    pub async fn list_in(&self, prefix: &Path) -> Result<HashMap<PathBuf, JobRecord>, SchedulerError> {
        let prefix = resolve_dir(prefix)?;
        let mut jobs = self.list_all().await?;
        jobs.retain(|path, _| is_within(path, &prefix));
        Ok(jobs)
    }

    /// Schedule `path` for deletion at `timespec`.
    ///
    /// Directories are removed recursively.
    pub async fn schedule(
        &self,
        path: &Path,
        timespec: impl Into<Timespec>,
        guards: GuardSet,
    ) -> Result<JobRecord, SchedulerError> {
        let path = normalize(path)?;
        let timespec = timespec.into();

        let action = Action::for_path(&path);
        if action == Action::RemoveRecursive {
            warn!("Will execute `rm -rf {}` at {}", path.display(), timespec);
        }

        let conditions = build_conditions(&path, guards, Local::now());
        let script = codec::render(&path, action, &conditions)?;

        let output = self.transport.submit(&script, &timespec.to_argument()).await?;
        debug!("output: {}", output.trim_end());

        let receipt = parser::parse_submission(&output, &self.timestamps)?;
        info!("Scheduled {} for expiry as job {}", path.display(), receipt.job_id);

        Ok(JobRecord::new(
            receipt.job_id,
            path,
            receipt.timestamp,
            codec::describe(&conditions),
        ))
    }

    /// Cancel the expiry of each path.
    ///
    /// Paths without a job land in `failed`; repeated paths are handled once.
    /// A cancellation the scheduler rejects aborts the batch, unless the job
    /// has disappeared meanwhile.
    pub async fn remove<P: AsRef<Path>>(&self, paths: &[P]) -> Result<RemovalReport, SchedulerError> {
        let scheduled = self.list_all().await?;
        let mut report = RemovalReport::default();
        let mut seen = HashSet::new();

        for path in paths {
            let path = normalize(path.as_ref())?;
            if !seen.insert(path.clone()) {
                continue;
            }
            let Some(job) = scheduled.get(&path) else {
                debug!("{} was not scheduled for expiry, skipping...", path.display());
                report.record_failure(&path);
                continue;
            };

            debug!("Removing {} with job id {} from expiry schedule", job.path.display(), job.job_id);
            match self.transport.cancel(&job.job_id).await {
                Ok(output) => {
                    debug!("output: {}", output.trim_end());
                    info!("Cancelled job {} for {}", job.job_id, path.display());
                    report.record_success(&path);
                }
                Err(err @ SchedulerError::SubmissionFailed { .. }) => {
                    if self.is_listed(&job.job_id).await? {
                        return Err(err);
                    }
                    warn!("Job {} for {} is already gone: {}", job.job_id, path.display(), err);
                    report.record_failure(&path);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    async fn is_listed(&self, job_id: &str) -> Result<bool, SchedulerError> {
        let lines = self.transport.list().await?;
        Ok(parser::parse_listing(&lines)
            .iter()
            .any(|entry| entry.job_id == job_id))
    }

    /// Open `path`, hand it to `f` and schedule its expiry once `f` succeeds.
    ///
    /// The file is closed before the job is submitted. Nothing is scheduled
    /// when opening the file or `f` fails.
    pub async fn open_expiring<F, R>(
        &self,
        path: &Path,
        timespec: impl Into<Timespec>,
        guards: GuardSet,
        options: &OpenOptions,
        f: F,
    ) -> Result<(R, JobRecord), SchedulerError>
    where
        F: FnOnce(&mut File) -> std::io::Result<R>,
    {
        let value = {
            let mut file = options.open(path)?;
            f(&mut file)?
        };
        let job = self.schedule(path, timespec, guards).await?;
        Ok((value, job))
    }
}

#[cfg(test)]
#[path = "directory_tests.rs"]
mod tests;
