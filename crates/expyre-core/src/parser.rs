//! Parsers for the scheduler's free-text output.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use expyre_config::DEFAULT_TIMESTAMP_FORMAT;
use expyre_protocols::{ListingEntry, SchedulerError, SubmissionReceipt};

/// `job <id> at <timestamp>`, printed by `at` after accepting a job.
static SUBMISSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^job (?P<job_id>\d+) at (?P<timestamp>.+?)\s*$").unwrap());

/// `<id>\t<timestamp> <queue> <user>`, one line of `at -l`.
static LISTING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<job_id>\d+)\s+(?P<timestamp>.+?)\s+(?P<queue>\S)\s+(?P<user>\S+)\s*$").unwrap()
});

/// The calendar format the scheduler prints timestamps in.
///
/// Whitespace runs are collapsed on both sides before parsing, so
/// space-padded fields like `Jan  1` match a single space in the format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampFormat {
    format: String,
}

impl TimestampFormat {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.format
    }

    pub fn parse(&self, text: &str) -> Result<NaiveDateTime, SchedulerError> {
        NaiveDateTime::parse_from_str(&collapse_whitespace(text), &collapse_whitespace(&self.format))
            .map_err(|_| SchedulerError::MalformedTimestamp {
                text: text.to_string(),
                format: self.format.clone(),
            })
    }
}

impl Default for TimestampFormat {
    fn default() -> Self {
        Self::new(DEFAULT_TIMESTAMP_FORMAT)
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract the job id and time from the output of a submission.
///
/// A missing `job N at ...` line means the scheduler did not take the
/// timespec, even if it exited successfully.
pub fn parse_submission(
    output: &str,
    format: &TimestampFormat,
) -> Result<SubmissionReceipt, SchedulerError> {
    let caps = SUBMISSION_RE
        .captures(output)
        .ok_or_else(|| SchedulerError::UnrecognizedTimespec(output.trim().to_string()))?;

    Ok(SubmissionReceipt {
        job_id: caps["job_id"].to_string(),
        timestamp: format.parse(&caps["timestamp"])?,
    })
}

/// Parse one listing line; `None` for headers, blanks and anything else.
pub fn parse_listing_line(line: &str) -> Option<ListingEntry> {
    let caps = LISTING_RE.captures(line)?;
    Some(ListingEntry {
        job_id: caps["job_id"].to_string(),
        timestamp_text: caps["timestamp"].to_string(),
        queue: caps["queue"].to_string(),
        user: caps["user"].to_string(),
    })
}

/// Parse every recognizable line of a listing.
pub fn parse_listing<S: AsRef<str>>(lines: &[S]) -> Vec<ListingEntry> {
    lines
        .iter()
        .filter_map(|line| {
            let line = line.as_ref();
            let entry = parse_listing_line(line);
            if entry.is_none() && !line.trim().is_empty() {
                debug!("Skipping listing line: {}", line);
            }
            entry
        })
        .collect()
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
