//! Scheduler interaction errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The scheduler binary could not be resolved on the search path.
    #[error("Could not find `{0}` command")]
    SchedulerUnavailable(String),

    /// The scheduler daemon could not be confirmed running.
    #[error(
        "The {0} daemon doesn't appear to be running. \
         Expiry jobs cannot be scheduled or executed if {0} is not running"
    )]
    SchedulerNotRunning(String),

    /// The scheduler process exited non-zero.
    #[error("Scheduler command failed with exit code {code}: {output}")]
    SubmissionFailed { code: i32, output: String },

    /// The scheduler did not understand the time specification.
    #[error("Timespec not recognized by at command: {0}")]
    UnrecognizedTimespec(String),

    /// The path has no scheduled expiry job.
    #[error("{} was not scheduled for expiry", .0.display())]
    PathNotScheduled(PathBuf),

    /// The path cannot be embedded in a job script.
    #[error("Invalid path {}: {reason}", path.display())]
    InvalidPath { path: PathBuf, reason: String },

    /// A timestamp in scheduler output did not match the expected format.
    #[error("Malformed scheduler timestamp '{text}' (expected format '{format}')")]
    MalformedTimestamp { text: String, format: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchedulerError {
    /// Whether the error only concerns a single path and should not abort a batch.
    pub fn is_soft(&self) -> bool {
        matches!(self, SchedulerError::PathNotScheduled(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_names_binary() {
        let err = SchedulerError::SchedulerUnavailable("at".to_string());
        assert_eq!(err.to_string(), "Could not find `at` command");
    }

    #[test]
    fn test_not_running_names_daemon() {
        let err = SchedulerError::SchedulerNotRunning("atd".to_string());
        let msg = err.to_string();
        assert!(msg.contains("atd daemon"));
        assert!(msg.contains("not running"));
    }

    #[test]
    fn test_submission_failed_carries_output() {
        let err = SchedulerError::SubmissionFailed {
            code: 1,
            output: "Cannot find jobid 7".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("exit code 1"));
        assert!(msg.contains("Cannot find jobid 7"));
    }

    #[test]
    fn test_unrecognized_timespec() {
        let err = SchedulerError::UnrecognizedTimespec("Garbled time".to_string());
        assert!(err.to_string().starts_with("Timespec not recognized"));
        assert!(err.to_string().contains("Garbled time"));
    }

    #[test]
    fn test_path_not_scheduled_is_soft() {
        let err = SchedulerError::PathNotScheduled(PathBuf::from("/tmp/foo"));
        assert!(err.is_soft());
        assert_eq!(err.to_string(), "/tmp/foo was not scheduled for expiry");
    }

    #[test]
    fn test_hard_errors_are_not_soft() {
        assert!(!SchedulerError::SchedulerUnavailable("at".into()).is_soft());
        assert!(!SchedulerError::UnrecognizedTimespec(String::new()).is_soft());
    }

    #[test]
    fn test_invalid_path() {
        let err = SchedulerError::InvalidPath {
            path: PathBuf::from("/tmp/a\nb"),
            reason: "contains a newline".to_string(),
        };
        assert!(err.to_string().contains("contains a newline"));
    }

    #[test]
    fn test_malformed_timestamp() {
        let err = SchedulerError::MalformedTimestamp {
            text: "lundi".to_string(),
            format: "%c".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("lundi"));
        assert!(msg.contains("%c"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: SchedulerError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
        assert!(err.to_string().contains("pipe closed"));
    }
}
