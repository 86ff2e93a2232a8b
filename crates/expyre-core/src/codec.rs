//! Job script codec.
//!
//! A job script is plain `sh` with a fixed header that records the target path
//! and the guard description, so the job can be recognized again when the
//! scheduler hands back its stored body:
//!
//! ```text
//! # expyre path: /tmp/foo
//! # expyre conditions: unless accessed after 18:30 2024-01-01
//! #
//! ! {
//! [ "$(stat -c %X '/tmp/foo')" -gt 1704133800 ] ||
//! false
//! } &&
//!     rm -f -- '/tmp/foo'
//! ```
//!
//! The guard ORs the predicates inside a negated group, so the trailing `&&`
//! only reaches the action when none of them hold. Without predicates the
//! guard is the bare `true &&` line.
//!
//! The `false` fallback and the `! { ... }` group are required. A predicate
//! list ending in `||` followed directly by a line starting with `&&` is not
//! valid `sh`, and dropping the negation would delete exactly the paths the
//! guards are meant to keep.

use std::path::{Path, PathBuf};

use expyre_protocols::{Condition, SchedulerError};

use crate::path::shell_quote;

/// Markers and separators shared by [`render`] and [`parse`].
#[derive(Debug, Clone, Copy)]
pub struct ScriptSchema {
    pub path_marker: &'static str,
    pub conditions_marker: &'static str,
    pub header_end: &'static str,
    pub description_separator: &'static str,
    pub guard_open: &'static str,
    pub predicate_suffix: &'static str,
    pub guard_fallback: &'static str,
    pub guard_close: &'static str,
    pub unconditional_guard: &'static str,
    pub action_indent: &'static str,
}

pub const SCRIPT_SCHEMA: ScriptSchema = ScriptSchema {
    path_marker: "# expyre path:",
    conditions_marker: "# expyre conditions:",
    header_end: "#",
    description_separator: " or ",
    guard_open: "! {",
    predicate_suffix: " ||",
    guard_fallback: "false",
    guard_close: "} &&",
    unconditional_guard: "true &&",
    action_indent: "    ",
};

impl ScriptSchema {
    /// Value of a `<marker> <value>` header line.
    fn header_value<'a>(&self, line: &'a str, marker: &str) -> Option<&'a str> {
        let rest = line.strip_prefix(marker)?;
        Some(rest.strip_prefix(' ').unwrap_or(rest))
    }

    /// Lines the scheduler may append after the script: blanks and the bare
    /// heredoc delimiter `at` wraps stored jobs in.
    fn is_trailer(&self, line: &str) -> bool {
        let line = line.trim();
        line.is_empty() || line.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

/// What the job does once the guard passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Remove,
    RemoveRecursive,
}

impl Action {
    /// Recursive removal for directories, plain removal otherwise.
    pub fn for_path(path: &Path) -> Self {
        if path.is_dir() {
            Action::RemoveRecursive
        } else {
            Action::Remove
        }
    }

    pub fn command(&self, path: &str) -> String {
        let flags = match self {
            Action::Remove => "-f",
            Action::RemoveRecursive => "-rf",
        };
        format!("rm {} -- {}", flags, shell_quote(path))
    }
}

/// A job script recovered from the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScript {
    pub path: PathBuf,
    /// Guard descriptions joined with `" or "`.
    pub conditions: String,
    /// Guard expressions in script order.
    pub guards: Vec<String>,
    pub action: String,
}

/// Join guard descriptions the way they appear in the header.
pub fn describe(conditions: &[Condition]) -> String {
    conditions
        .iter()
        .map(|c| c.description.as_str())
        .collect::<Vec<_>>()
        .join(SCRIPT_SCHEMA.description_separator)
}

/// Render the job script removing `path`.
pub fn render(path: &Path, action: Action, conditions: &[Condition]) -> Result<String, SchedulerError> {
    let schema = &SCRIPT_SCHEMA;
    let path_text = path.to_str().ok_or_else(|| SchedulerError::InvalidPath {
        path: path.to_path_buf(),
        reason: "not valid UTF-8".to_string(),
    })?;
    if path_text.contains('\n') || path_text.contains('\r') {
        return Err(SchedulerError::InvalidPath {
            path: path.to_path_buf(),
            reason: "contains a line break".to_string(),
        });
    }

    let mut lines = vec![
        format!("{} {}", schema.path_marker, path_text),
        format!("{} {}", schema.conditions_marker, describe(conditions)),
        schema.header_end.to_string(),
    ];

    if conditions.is_empty() {
        lines.push(schema.unconditional_guard.to_string());
    } else {
        lines.push(schema.guard_open.to_string());
        for condition in conditions {
            lines.push(format!("{}{}", condition.expression, schema.predicate_suffix));
        }
        lines.push(schema.guard_fallback.to_string());
        lines.push(schema.guard_close.to_string());
    }

    lines.push(format!("{}{}", schema.action_indent, action.command(path_text)));

    let mut script = lines.join("\n");
    script.push('\n');
    Ok(script)
}

/// Recover path and conditions from a stored job body.
///
/// The header may be preceded by anything (the scheduler prepends its own
/// environment setup) but everything from the header on must be exactly what
/// [`render`] produces. Returns `None` for jobs from other tools.
pub fn parse(raw: &str) -> Option<ParsedScript> {
    let schema = &SCRIPT_SCHEMA;
    let lines: Vec<&str> = raw.lines().collect();
    let start = lines
        .iter()
        .position(|line| line.starts_with(schema.path_marker))?;
    let mut rest = lines[start..].iter().copied();

    let path = schema.header_value(rest.next()?, schema.path_marker)?;
    let conditions = schema.header_value(rest.next()?, schema.conditions_marker)?;
    if path.is_empty() || rest.next()? != schema.header_end {
        return None;
    }

    let guards = parse_guard(&mut rest)?;

    let action = rest.next()?.strip_prefix(schema.action_indent)?;
    if !action.starts_with("rm ") {
        return None;
    }
    if !rest.all(|line| schema.is_trailer(line)) {
        return None;
    }

    Some(ParsedScript {
        path: PathBuf::from(path),
        conditions: conditions.to_string(),
        guards,
        action: action.to_string(),
    })
}

fn parse_guard<'a>(lines: &mut impl Iterator<Item = &'a str>) -> Option<Vec<String>> {
    let schema = &SCRIPT_SCHEMA;
    let first = lines.next()?;
    if first == schema.unconditional_guard {
        return Some(Vec::new());
    }
    if first != schema.guard_open {
        return None;
    }

    let mut guards = Vec::new();
    loop {
        let line = lines.next()?;
        if line == schema.guard_fallback {
            break;
        }
        guards.push(line.strip_suffix(schema.predicate_suffix)?.to_string());
    }

    if guards.is_empty() || lines.next()? != schema.guard_close {
        return None;
    }
    Some(guards)
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
