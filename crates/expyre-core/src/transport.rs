//! `at(1)` scheduler transport.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use expyre_config::SchedulerConfig;
use expyre_protocols::{SchedulerError, SchedulerTransport};

use crate::daemon::DaemonProbe;

/// Diagnostic `at` prints when it cannot parse a timespec.
const GARBLED_TIME: &str = "Garbled time";

/// Transport driving the `at` binary.
///
/// The binary is resolved and the daemon probed again before every call.
pub struct AtTransport {
    config: SchedulerConfig,
    probe: DaemonProbe,
}

impl AtTransport {
    pub fn new(config: SchedulerConfig) -> Self {
        let probe = DaemonProbe::from_config(&config);
        Self { config, probe }
    }

    /// Replace the daemon probe built from the configuration.
    pub fn with_probe(mut self, probe: DaemonProbe) -> Self {
        self.probe = probe;
        self
    }

    fn resolve_binary(&self) -> Result<PathBuf, SchedulerError> {
        which::which(&self.config.binary)
            .map_err(|_| SchedulerError::SchedulerUnavailable(self.config.binary.clone()))
    }

    async fn ensure_ready(&self) -> Result<PathBuf, SchedulerError> {
        let binary = self.resolve_binary()?;
        if !self.probe.is_running().await {
            return Err(SchedulerError::SchedulerNotRunning(self.probe.name().to_string()));
        }
        Ok(binary)
    }

    fn command(&self, binary: &Path, with_queue: bool) -> Command {
        let mut cmd = Command::new(binary);
        if with_queue {
            if let Some(ref queue) = self.config.queue {
                cmd.arg("-q").arg(queue);
            }
        }
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        cmd
    }

    async fn run(&self, args: &[&str], with_queue: bool) -> Result<String, SchedulerError> {
        let binary = self.ensure_ready().await?;
        debug!("Running {} {}", binary.display(), args.join(" "));

        let output = self
            .command(&binary, with_queue)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await?;

        check_status(&output)
    }
}

/// stdout followed by stderr.
fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    let mut combined = stdout.into_owned();
    if !stderr.is_empty() {
        if !combined.is_empty() && !combined.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str(&stderr);
    }
    combined
}

fn check_status(output: &Output) -> Result<String, SchedulerError> {
    let text = combined_output(output);
    if output.status.success() {
        Ok(text)
    } else {
        Err(SchedulerError::SubmissionFailed {
            code: output.status.code().unwrap_or(-1),
            output: text.trim().to_string(),
        })
    }
}

#[async_trait]
impl SchedulerTransport for AtTransport {
    fn is_available(&self) -> bool {
        self.resolve_binary().is_ok()
    }

    async fn readiness_check(&self) -> Result<(), SchedulerError> {
        self.ensure_ready().await.map(|_| ())
    }

    async fn submit(&self, script: &str, timespec: &str) -> Result<String, SchedulerError> {
        let binary = self.ensure_ready().await?;
        debug!("Submitting job to {} for '{}'", binary.display(), timespec);

        let mut child = self
            .command(&binary, true)
            .arg(timespec)
            .stdin(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // `at` exits before reading stdin when the timespec is garbled
            match stdin.write_all(script.as_bytes()).await {
                Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e.into()),
                _ => {}
            }
        }

        let output = child.wait_with_output().await?;
        debug!("output: {}", combined_output(&output).trim_end());

        match check_status(&output) {
            Err(SchedulerError::SubmissionFailed { output, .. }) if output.contains(GARBLED_TIME) => {
                Err(SchedulerError::UnrecognizedTimespec(output))
            }
            other => other,
        }
    }

    async fn list(&self) -> Result<Vec<String>, SchedulerError> {
        let output = self.run(&["-l"], true).await?;
        Ok(output
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn fetch_body(&self, job_id: &str) -> Result<String, SchedulerError> {
        self.run(&["-c", job_id], false).await
    }

    async fn cancel(&self, job_id: &str) -> Result<String, SchedulerError> {
        self.run(&["-r", job_id], false).await
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
