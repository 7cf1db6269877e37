//! Failure event log and its report.
pub mod events;
pub mod reporter;
