//! # expyre Core
//!
//! Scheduling of path deletion through the `at(1)` batch scheduler.
//!
//! - [`codec`] renders and parses the job scripts handed to the scheduler
//! - [`parser`] reads the scheduler's submission and listing output
//! - [`AtTransport`] runs the `at` binary after checking `atd` is alive
//! - [`JobDirectory`] ties them together into path-keyed operations

pub mod codec;
mod daemon;
mod directory;
mod guards;
pub mod parser;
pub mod path;
mod transport;

pub use codec::{Action, ParsedScript, SCRIPT_SCHEMA, ScriptSchema};
pub use daemon::DaemonProbe;
pub use directory::JobDirectory;
pub use guards::build_conditions;
pub use parser::TimestampFormat;
pub use transport::AtTransport;
