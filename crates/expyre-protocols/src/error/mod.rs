//! Error types for the expyre protocol layer.

mod scheduler;

pub use scheduler::*;
