//! Scheduled job records.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

/// A deletion job currently held by the external scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Identifier assigned by the scheduler.
    pub job_id: String,

    /// Normalized absolute path that will be removed.
    pub path: PathBuf,

    /// Local calendar time at which removal will be attempted.
    pub timestamp: NaiveDateTime,

    /// Human-readable guard description, empty when unconditional.
    #[serde(default)]
    pub conditions: String,
}

impl JobRecord {
    pub fn new(
        job_id: impl Into<String>,
        path: impl Into<PathBuf>,
        timestamp: NaiveDateTime,
        conditions: impl Into<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            path: path.into(),
            timestamp,
            conditions: conditions.into(),
        }
    }

    /// Whether the job has any guard conditions.
    pub fn is_conditional(&self) -> bool {
        !self.conditions.is_empty()
    }
}

/// One line of the scheduler's job listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub job_id: String,
    /// Timestamp exactly as printed by the scheduler.
    pub timestamp_text: String,
    pub queue: String,
    pub user: String,
}

/// Job id and resolved time reported by the scheduler after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub job_id: String,
    pub timestamp: NaiveDateTime,
}

/// Outcome of removing a batch of paths from the schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemovalReport {
    /// Paths whose job was cancelled, in input order.
    pub succeeded: Vec<PathBuf>,
    /// Paths that were not scheduled, in input order.
    pub failed: Vec<PathBuf>,
}

impl RemovalReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn record_success(&mut self, path: &Path) {
        self.succeeded.push(path.to_path_buf());
    }

    pub fn record_failure(&mut self, path: &Path) {
        self.failed.push(path.to_path_buf());
    }

    /// Soft errors describing every failed path.
    pub fn failures(&self) -> impl Iterator<Item = SchedulerError> + '_ {
        self.failed
            .iter()
            .cloned()
            .map(SchedulerError::PathNotScheduled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn midnight() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_job_record_new() {
        let job = JobRecord::new("42", "/tmp/foo", midnight(), "");
        assert_eq!(job.job_id, "42");
        assert_eq!(job.path, PathBuf::from("/tmp/foo"));
        assert!(!job.is_conditional());
    }

    #[test]
    fn test_job_record_serialization() {
        let job = JobRecord::new("7", "/tmp/a b", midnight(), "unless accessed after 00:00 2024-01-01");
        let json = serde_json::to_string(&job).unwrap();
        assert!(json.contains("\"job_id\":\"7\""));
        assert!(json.contains("/tmp/a b"));

        let back: JobRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, job);
        assert!(back.is_conditional());
    }

    #[test]
    fn test_removal_report_default_is_complete() {
        let report = RemovalReport::default();
        assert!(report.is_complete());
        assert_eq!(report.failures().count(), 0);
    }

    #[test]
    fn test_removal_report_failures() {
        let mut report = RemovalReport::default();
        report.record_success(Path::new("/a"));
        report.record_failure(Path::new("/b"));

        assert!(!report.is_complete());
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].is_soft());
        assert!(failures[0].to_string().starts_with("/b"));
    }
}
