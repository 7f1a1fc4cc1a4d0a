//! Time-bucketed summaries of filtered operation rows.
//!
//! Rows are grouped by vehicle and by month or day, distances summed, trips
//! counted and fuel estimated from distance. [`report::Reports`] wraps this
//! in the validated, request-level reports.

pub mod aggregate;
pub mod report;
pub mod types;
pub mod utility;
