//! Engine errors.
//!
//! Hard-constraint contradictions are detected before search and surfaced
//! with the offending worker and slot, never as a silently empty roster.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::MonthKey;

/// Errors raised by model assembly and solving.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// A single-claimant request forces an assignment the availability
    /// matrix forbids. Requests do not override availability.
    #[error("request by '{worker}' for {date} {shift} conflicts with their availability")]
    RequestUnavailable {
        worker: String,
        date: NaiveDate,
        shift: String,
    },

    /// Single-claimant requests alone already exceed a monthly ceiling.
    #[error("'{worker}' has {forced} forced requests in {month} but a quota of {quota}")]
    QuotaExceededByRequests {
        worker: String,
        month: MonthKey,
        quota: u32,
        forced: u32,
    },
}
