//! Common types used across the expyre workspace.

mod job;
mod schedule;

pub use job::*;
pub use schedule::*;
