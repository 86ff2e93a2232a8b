//! Scheduler transport protocol.
//!
//! A transport is the only thing that talks to the external batch scheduler.
//! Every operation runs the readiness check first; implementations must not
//! spawn anything when the check fails.

use async_trait::async_trait;

use crate::error::SchedulerError;

#[async_trait]
pub trait SchedulerTransport: Send + Sync {
    /// Whether the scheduler binary can be resolved.
    fn is_available(&self) -> bool;

    /// Verify the binary resolves and the daemon is running.
    async fn readiness_check(&self) -> Result<(), SchedulerError>;

    /// Submit a job script for execution at `timespec`.
    ///
    /// Returns the scheduler's combined output.
    async fn submit(&self, script: &str, timespec: &str) -> Result<String, SchedulerError>;

    /// Non-blank lines of the scheduler's job listing.
    async fn list(&self) -> Result<Vec<String>, SchedulerError>;

    /// The stored body of a job.
    async fn fetch_body(&self, job_id: &str) -> Result<String, SchedulerError>;

    /// Cancel a job. Returns whatever the scheduler printed.
    async fn cancel(&self, job_id: &str) -> Result<String, SchedulerError>;
}
