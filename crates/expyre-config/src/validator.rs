//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Collapse the errors into a single [`ConfigError`], if any.
    pub fn into_error(self) -> Option<ConfigError> {
        if self.is_valid() {
            return None;
        }
        let message = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        Some(ConfigError::Invalid(message))
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_scheduler(config, &mut result);
        Self::validate_logging(config, &mut result);

        result
    }

    fn validate_scheduler(config: &Config, result: &mut ValidationResult) {
        let scheduler = &config.scheduler;

        if scheduler.binary.trim().is_empty() {
            result.add_error(ValidationError::new(
                "scheduler.binary",
                "Scheduler binary cannot be empty",
            ));
        } else if scheduler.binary.contains('/') && !scheduler.binary.starts_with('/') {
            result.add_warning(ValidationWarning::new(
                "scheduler.binary",
                "Relative binary path is resolved against the working directory",
            ));
        }

        if scheduler.daemon.trim().is_empty() {
            result.add_error(ValidationError::new(
                "scheduler.daemon",
                "Daemon name cannot be empty",
            ));
        }

        if scheduler.daemon_pid_files.is_empty() {
            result.add_warning(ValidationWarning::new(
                "scheduler.daemon_pid_files",
                "No PID files configured, daemon detection relies on the process table",
            ));
        }

        if scheduler.timestamp_format.trim().is_empty() {
            result.add_error(ValidationError::new(
                "scheduler.timestamp_format",
                "Timestamp format cannot be empty",
            ));
        }

        if let Some(ref queue) = scheduler.queue {
            let mut chars = queue.chars();
            let single_letter = matches!(
                (chars.next(), chars.next()),
                (Some(c), None) if c.is_ascii_alphabetic()
            );
            if !single_letter {
                result.add_error(ValidationError::new(
                    "scheduler.queue",
                    format!("Queue must be a single letter, got '{}'", queue),
                ));
            }
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        if config.logging.level.trim().is_empty() {
            result.add_error(ValidationError::new(
                "logging.level",
                "Log level cannot be empty",
            ));
        }

        if let Some(ref dir) = config.logging.directory {
            if dir.exists() && !dir.is_dir() {
                result.add_error(ValidationError::new(
                    "logging.directory",
                    format!("Log directory is not a directory: {:?}", dir),
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
