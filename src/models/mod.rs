//! Rostering domain models.
//!
//! Core data types for the assignment problem and its solutions:
//!
//! | Type | Role |
//! |------|------|
//! | `Slot` | One (date, shift-label) unit of coverage |
//! | `MonthKey` | Canonical `"YYYY-MM"` quota-map key |
//! | `RosterState` | Registry, slots, availability, quotas, requests |
//! | `AssignmentState` | Final sequence + per-worker lists + uncovered |

mod assignment;
mod roster;
mod slot;

pub use assignment::AssignmentState;
pub use roster::RosterState;
pub use slot::{slot_grid, MonthKey, Slot};
