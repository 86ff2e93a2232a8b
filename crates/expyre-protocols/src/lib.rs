//! # expyre Protocols
//!
//! Shared definitions for the expyre workspace. Contains only types and
//! interface definitions - no implementations.
//!
//! ## Core Items
//!
//! - [`SchedulerTransport`] - Trait for talking to an external batch scheduler
//! - [`JobRecord`] - A scheduled deletion job
//! - [`SchedulerError`] - Errors surfaced by scheduler interaction

pub mod error;
pub mod transport;
pub mod types;

pub use error::SchedulerError;
pub use transport::SchedulerTransport;
pub use types::*;
