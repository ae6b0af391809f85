//! Constraint-based shift rostering.
//!
//! Assigns named workers to dated shift slots under hard eligibility and
//! monthly-quota rules, minimizing a tiered objective (coverage first,
//! then clustering, same-day overlap, and request satisfaction) within a
//! wall-clock time budget. A solved roster can then be altered
//! incrementally without a full re-solve.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Slot`, `MonthKey`, `RosterState`,
//!   `AssignmentState`
//! - **`engine`**: Model assembly and the bounded-time solve
//!   (`solve_roster`)
//! - **`alterations`**: Structured post-solve edits — quota updates,
//!   availability flips, request updates, assignment edits
//! - **`validation`**: Input integrity checks (duplicate names/slots,
//!   matrix shape, dangling references)
//! - **`error`**: Infeasibility errors raised before search
//!
//! # Architecture
//!
//! The state layer is the single source of truth; the engine consumes it
//! read-only and produces an assignment triple, which the alteration
//! layer then mutates in lock-step with the state. Indices into the
//! worker and slot registries are ephemeral per solve — everything that
//! crosses a solve boundary is keyed by name and (date, shift).
//!
//! # References
//!
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod alterations;
pub mod engine;
pub mod error;
pub mod models;
pub mod validation;
