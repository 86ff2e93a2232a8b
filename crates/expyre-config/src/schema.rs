//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// External batch scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Scheduler binary, resolved on `PATH` unless it contains a separator.
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Process name of the scheduler daemon.
    #[serde(default = "default_daemon")]
    pub daemon: String,

    /// PID files checked before falling back to a process table scan.
    #[serde(default = "default_daemon_pid_files")]
    pub daemon_pid_files: Vec<PathBuf>,

    /// chrono format of timestamps printed by the scheduler.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    /// Optional single-letter queue passed as `-q`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            daemon: default_daemon(),
            daemon_pid_files: default_daemon_pid_files(),
            timestamp_format: default_timestamp_format(),
            queue: None,
        }
    }
}

fn default_binary() -> String {
    "at".to_string()
}

fn default_daemon() -> String {
    "atd".to_string()
}

fn default_daemon_pid_files() -> Vec<PathBuf> {
    vec![PathBuf::from("/run/atd.pid"), PathBuf::from("/var/run/atd.pid")]
}

/// The C locale rendering of `%c`, e.g. `Mon Jan  1 00:00:00 2024`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `EXPYRE_LOG`.
    #[serde(default = "default_level")]
    pub level: String,

    /// Directory for daily-rotated log files. Console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            directory: None,
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.binary, "at");
        assert_eq!(config.daemon, "atd");
        assert_eq!(config.daemon_pid_files.len(), 2);
        assert_eq!(config.timestamp_format, DEFAULT_TIMESTAMP_FORMAT);
        assert!(config.queue.is_none());
    }

    #[test]
    fn test_logging_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
        assert!(config.directory.is_none());
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: Config = toml::from_str("[scheduler]\nqueue = \"e\"\n").unwrap();
        assert_eq!(config.scheduler.queue.as_deref(), Some("e"));
        assert_eq!(config.scheduler.binary, "at");
        assert_eq!(config.logging, LoggingConfig::default());
    }
}
