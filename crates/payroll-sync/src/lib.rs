//! Waiting-event ingestion and payroll submission.
//!
//! Rows exported by the upstream HR system are folded into one change record per
//! employee record (`workflows::waiting_events`), pay elements are resolved to
//! payroll component codes (`workflows::mapping`), and the mapped records are
//! submitted category by category (`workflows::submission`).

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
