//! Scheduling inputs: time specifications and guard conditions.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format used to hand an absolute time to the scheduler (`HH:MM YYYY-MM-DD`).
pub const ABSOLUTE_TIMESPEC_FORMAT: &str = "%H:%M %Y-%m-%d";

/// When a job should run.
///
/// Natural-language specifications are passed to the scheduler untouched; its
/// own grammar decides whether they are valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timespec {
    Natural(String),
    At(NaiveDateTime),
}

impl Timespec {
    /// Text handed to the scheduler.
    pub fn to_argument(&self) -> String {
        match self {
            Timespec::Natural(spec) => spec.clone(),
            Timespec::At(when) => when.format(ABSOLUTE_TIMESPEC_FORMAT).to_string(),
        }
    }
}

impl fmt::Display for Timespec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_argument())
    }
}

impl From<&str> for Timespec {
    fn from(spec: &str) -> Self {
        Timespec::Natural(spec.to_string())
    }
}

impl From<String> for Timespec {
    fn from(spec: String) -> Self {
        Timespec::Natural(spec)
    }
}

impl From<NaiveDateTime> for Timespec {
    fn from(when: NaiveDateTime) -> Self {
        Timespec::At(when)
    }
}

/// A guard embedded in a job script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Human-readable text, e.g. `unless accessed after 18:00 2024-01-01`.
    pub description: String,
    /// Shell test that blocks the deletion when it evaluates true.
    pub expression: String,
}

impl Condition {
    pub fn new(description: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            expression: expression.into(),
        }
    }
}

/// Which guards to attach to a scheduled deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuardSet {
    pub unless_accessed: bool,
    pub unless_modified: bool,
}

impl GuardSet {
    pub fn new(unless_accessed: bool, unless_modified: bool) -> Self {
        Self {
            unless_accessed,
            unless_modified,
        }
    }

    /// Unconditional deletion.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self::new(true, true)
    }

    pub fn is_empty(&self) -> bool {
        !self.unless_accessed && !self.unless_modified
    }
}
