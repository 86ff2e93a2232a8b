//! Guard predicates that keep a recently used path alive.

use std::path::Path;

use chrono::{DateTime, TimeZone};

use expyre_protocols::{Condition, GuardSet};

use crate::path::shell_quote;

/// Display format of the submission time in condition descriptions.
const DESCRIPTION_TIME_FORMAT: &str = "%H:%M %Y-%m-%d";

/// Build the conditions for `guards`, accessed before modified.
///
/// Each expression compares a `stat(1)` epoch field against `now` and is true
/// when the path was touched after submission, which blocks the deletion.
pub fn build_conditions<Tz>(path: &Path, guards: GuardSet, now: DateTime<Tz>) -> Vec<Condition>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let quoted = shell_quote(&path.to_string_lossy());
    let since = now.format(DESCRIPTION_TIME_FORMAT).to_string();
    let epoch = now.timestamp();

    [
        (guards.unless_accessed, "accessed", 'X'),
        (guards.unless_modified, "modified", 'Y'),
    ]
    .into_iter()
    .filter(|(enabled, _, _)| *enabled)
    .map(|(_, what, field)| {
        Condition::new(
            format!("unless {} after {}", what, since),
            format!("[ \"$(stat -c %{} {})\" -gt {} ]", field, quoted, epoch),
        )
    })
    .collect()
}
