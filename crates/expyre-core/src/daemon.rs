//! Detection of the scheduler daemon.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use expyre_config::SchedulerConfig;

/// Checks whether the scheduler daemon is alive.
///
/// PID files are tried first, then the `/proc` process table, then `ps`.
#[derive(Debug, Clone)]
pub struct DaemonProbe {
    name: String,
    pid_files: Vec<PathBuf>,
    proc_root: PathBuf,
}

impl DaemonProbe {
    pub fn new(name: impl Into<String>, pid_files: Vec<PathBuf>) -> Self {
        Self {
            name: name.into(),
            pid_files,
            proc_root: PathBuf::from("/proc"),
        }
    }

    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(config.daemon.clone(), config.daemon_pid_files.clone())
    }

    /// Scan a different process table root.
    pub fn with_proc_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.proc_root = root.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn is_running(&self) -> bool {
        for pid_file in &self.pid_files {
            if let Some(pid) = read_pid(pid_file).await {
                if is_process_running(pid) {
                    debug!("{} running with PID {} ({})", self.name, pid, pid_file.display());
                    return true;
                }
                debug!("Stale PID file {} (PID {})", pid_file.display(), pid);
            }
        }

        match self.scan_proc().await {
            Some(found) => found,
            None => self.scan_ps().await,
        }
    }

    /// `None` when there is no readable process table.
    async fn scan_proc(&self) -> Option<bool> {
        let mut entries = tokio::fs::read_dir(&self.proc_root).await.ok()?;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let is_pid = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.chars().all(|c| c.is_ascii_digit()));
            if !is_pid {
                continue;
            }
            if let Ok(comm) = tokio::fs::read_to_string(entry.path().join("comm")).await {
                if comm.trim() == self.name {
                    debug!("Found {} in {}", self.name, entry.path().display());
                    return Some(true);
                }
            }
        }
        Some(false)
    }

    async fn scan_ps(&self) -> bool {
        let output = match Command::new("ps")
            .args(["-A", "-o", "comm="])
            .stdin(Stdio::null())
            .output()
            .await
        {
            Ok(output) if output.status.success() => output,
            _ => return false,
        };

        String::from_utf8_lossy(&output.stdout).lines().any(|line| {
            Path::new(line.trim())
                .file_name()
                .is_some_and(|name| name == self.name.as_str())
        })
    }
}

async fn read_pid(path: &Path) -> Option<i32> {
    let contents = tokio::fs::read_to_string(path).await.ok()?;
    contents.trim().parse::<i32>().ok().filter(|pid| *pid > 0)
}

/// Check if a process with the given PID exists.
#[cfg(unix)]
fn is_process_running(pid: i32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    // Signal 0 only probes; EPERM means it exists but belongs to someone else
    matches!(kill(Pid::from_raw(pid), None), Ok(()) | Err(Errno::EPERM))
}

#[cfg(not(unix))]
fn is_process_running(_pid: i32) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MISSING_DAEMON: &str = "expyre-no-such-daemon";

    #[tokio::test]
    async fn test_pid_file_of_live_process() {
        let dir = TempDir::new().unwrap();
        let pid_file = dir.path().join("atd.pid");
        std::fs::write(&pid_file, format!("{}\n", std::process::id())).unwrap();

        let probe = DaemonProbe::new(MISSING_DAEMON, vec![pid_file]);
        assert!(probe.is_running().await);
    }

    #[tokio::test]
    async fn test_garbage_pid_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let pid_file = dir.path().join("atd.pid");
        std::fs::write(&pid_file, "not-a-pid").unwrap();

        let probe = DaemonProbe::new(MISSING_DAEMON, vec![pid_file])
            .with_proc_root(dir.path().join("proc"));
        // No proc table under the temp dir, so this falls through to `ps`
        assert!(!probe.is_running().await);
    }

    #[tokio::test]
    async fn test_missing_daemon_not_running() {
        let probe = DaemonProbe::new(MISSING_DAEMON, vec![PathBuf::from("/nonexistent/atd.pid")]);
        assert!(!probe.is_running().await);
    }

    #[tokio::test]
    async fn test_scan_fake_proc_table() {
        let dir = TempDir::new().unwrap();
        let proc_root = dir.path().join("proc");
        for (pid, comm) in [("1", "init\n"), ("311", "atd\n"), ("self", "atd\n")] {
            std::fs::create_dir_all(proc_root.join(pid)).unwrap();
            std::fs::write(proc_root.join(pid).join("comm"), comm).unwrap();
        }

        let probe = DaemonProbe::new("atd", Vec::new()).with_proc_root(&proc_root);
        assert!(probe.is_running().await);

        let probe = DaemonProbe::new("cron", Vec::new()).with_proc_root(&proc_root);
        assert!(!probe.is_running().await);
    }

    #[test]
    fn test_from_config() {
        let probe = DaemonProbe::from_config(&SchedulerConfig::default());
        assert_eq!(probe.name(), "atd");
        assert_eq!(probe.pid_files.len(), 2);
    }
}
