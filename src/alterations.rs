//! Incremental alterations to a solved roster.
//!
//! Four structured record kinds arrive from the (external) intake layer
//! and are applied to the live state: quota updates, availability flips,
//! standing-request updates, and assignment edits. Records are strict
//! tagged types validated at this boundary; unknown worker names or
//! (date, shift) keys are skipped with a collected warning, never fatal.
//!
//! Every single operation re-establishes the assignment-triple invariant
//! before the next one runs, so later operations in a batch may reference
//! intermediate state (e.g. a slot vacated by a `remove` becoming
//! available to a later `add`). Conflicting `add`s within one batch are
//! order-dependent: the slot-already-filled check is authoritative and
//! the second writer loses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::{solve_roster, SolveStatus, SolverConfig};
use crate::error::SolveError;
use crate::models::{AssignmentState, MonthKey, RosterState};

/// Ceiling seeded for a worker's month when an `add` edit touches a month
/// they have no quota entry for.
pub const DEFAULT_EDIT_QUOTA: u32 = 5;

/// Quota-update record: `{name, new_max, month}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaUpdate {
    pub name: String,
    pub new_max: u32,
    pub month: MonthKey,
}

/// One availability flip within an [`AvailabilityChange`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityFlip {
    pub date: NaiveDate,
    pub shift: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// Availability-flip record: `{name, flips: [{date, shift, available}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityChange {
    pub name: String,
    pub flips: Vec<AvailabilityFlip>,
}

/// Direction of a standing-request update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestAction {
    Add,
    Remove,
}

/// A (date, shift) key within a request record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRef {
    pub date: NaiveDate,
    pub shift: String,
}

/// Request record: `{name, action, shifts: [{date, shift}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestUpdate {
    pub name: String,
    pub action: RequestAction,
    pub shifts: Vec<SlotRef>,
}

/// One assignment edit, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum AssignmentEdit {
    /// Fill a slot for a worker and record it as a standing request.
    Add {
        worker: String,
        date: NaiveDate,
        shift: String,
    },
    /// Vacate a slot and revoke the worker's eligibility for it.
    Remove {
        worker: String,
        date: NaiveDate,
        shift: String,
    },
    /// Transfer a slot's occupancy between two workers.
    Swap {
        from: String,
        to: String,
        date: NaiveDate,
        shift: String,
    },
    /// Discard the assignment and re-run the full pipeline.
    Reoptimize,
}

/// Result of one assignment-edit batch.
#[derive(Debug, Clone)]
pub struct EditOutcome {
    /// The assignment triple after the batch.
    pub assignment: AssignmentState,
    /// Skipped sub-operations, in batch order.
    pub warnings: Vec<String>,
    /// Status of the last `Reoptimize` in the batch, if any ran.
    pub reoptimized: Option<SolveStatus>,
}

/// Applies quota updates, registering unknown workers with a
/// fully-available row. Existing entries are overwritten.
pub fn apply_quota_updates(state: &mut RosterState, updates: &[QuotaUpdate]) {
    for update in updates {
        state.ensure_worker(&update.name);
        state.set_quota(&update.name, update.month.clone(), update.new_max);
    }
}

/// Applies availability flips. Unknown worker names and unknown
/// (date, shift) keys are skipped with a warning.
pub fn apply_availability_changes(
    state: &mut RosterState,
    changes: &[AvailabilityChange],
) -> Vec<String> {
    let mut warnings = Vec::new();
    for change in changes {
        let Some(worker) = state.worker_index(&change.name) else {
            skip(&mut warnings, format!("unknown worker '{}'", change.name));
            continue;
        };
        for flip in &change.flips {
            match state.slot_index(flip.date, &flip.shift) {
                Some(slot) => state.set_available(worker, slot, flip.available),
                None => skip(
                    &mut warnings,
                    format!("unknown slot {} {}", flip.date, flip.shift),
                ),
            }
        }
    }
    warnings
}

/// Adds or removes standing requests. Unknown worker names are skipped.
pub fn apply_request_updates(state: &mut RosterState, updates: &[RequestUpdate]) -> Vec<String> {
    let mut warnings = Vec::new();
    for update in updates {
        if state.worker_index(&update.name).is_none() {
            skip(&mut warnings, format!("unknown worker '{}'", update.name));
            continue;
        }
        for shift in &update.shifts {
            match update.action {
                RequestAction::Add => state.add_request(&update.name, shift.date, &shift.shift),
                RequestAction::Remove => {
                    state.remove_request(&update.name, shift.date, &shift.shift)
                }
            }
        }
    }
    warnings
}

/// Applies an ordered batch of assignment edits.
///
/// Consumes the current assignment and returns the new one; a
/// `Reoptimize` edit replaces it wholesale via the full pipeline.
///
/// # Errors
/// Only `Reoptimize` can fail, with the builder's infeasibility errors.
pub fn apply_assignment_edits(
    state: &mut RosterState,
    assignment: AssignmentState,
    edits: &[AssignmentEdit],
    config: &SolverConfig,
) -> Result<EditOutcome, SolveError> {
    let mut assignment = assignment;
    let mut warnings = Vec::new();
    let mut reoptimized = None;

    for edit in edits {
        match edit {
            AssignmentEdit::Add {
                worker,
                date,
                shift,
            } => apply_add(state, &mut assignment, worker, *date, shift, &mut warnings),
            AssignmentEdit::Remove {
                worker,
                date,
                shift,
            } => apply_remove(state, &mut assignment, worker, *date, shift, &mut warnings),
            AssignmentEdit::Swap {
                from,
                to,
                date,
                shift,
            } => apply_swap(state, &mut assignment, from, to, *date, shift, &mut warnings),
            AssignmentEdit::Reoptimize => {
                let outcome = solve_roster(state, config)?;
                assignment = outcome.assignment;
                reoptimized = Some(outcome.status);
            }
        }
        debug_assert!(assignment.is_consistent(&state.slots));
    }

    Ok(EditOutcome {
        assignment,
        warnings,
        reoptimized,
    })
}

fn apply_add(
    state: &mut RosterState,
    assignment: &mut AssignmentState,
    worker: &str,
    date: NaiveDate,
    shift: &str,
    warnings: &mut Vec<String>,
) {
    // Unknown workers are registered, fully available, with a fallback
    // ceiling for the edited month.
    state.ensure_worker(worker);

    let Some(index) = state.slot_index(date, shift) else {
        skip(warnings, format!("unknown slot {date} {shift}"));
        return;
    };
    let slot = state.slots[index].clone();

    if state.quota(worker, &slot.month()).is_none() {
        state.set_quota(worker, slot.month(), DEFAULT_EDIT_QUOTA);
    }

    if assignment.holds(worker, &slot) {
        skip(warnings, format!("'{worker}' already holds {slot}"));
        return;
    }
    if let Some(holder) = assignment.holder(index) {
        skip(warnings, format!("{slot} already filled by '{holder}'"));
        return;
    }

    assignment.fill(index, &slot, worker);
    state.add_request(worker, date, shift);
}

fn apply_remove(
    state: &mut RosterState,
    assignment: &mut AssignmentState,
    worker: &str,
    date: NaiveDate,
    shift: &str,
    warnings: &mut Vec<String>,
) {
    let Some(w) = state.worker_index(worker) else {
        skip(warnings, format!("unknown worker '{worker}'"));
        return;
    };
    let Some(index) = state.slot_index(date, shift) else {
        skip(warnings, format!("unknown slot {date} {shift}"));
        return;
    };
    let slot = state.slots[index].clone();

    if assignment.holder(index) != Some(worker) {
        skip(warnings, format!("'{worker}' does not hold {slot}"));
        return;
    }

    assignment.clear(index, &slot);
    // Removal also revokes future eligibility for this exact slot, so a
    // later full re-optimization cannot immediately re-add it; the
    // standing request is dropped for the same reason.
    state.set_available(w, index, false);
    state.remove_request(worker, date, shift);
}

fn apply_swap(
    state: &mut RosterState,
    assignment: &mut AssignmentState,
    from: &str,
    to: &str,
    date: NaiveDate,
    shift: &str,
    warnings: &mut Vec<String>,
) {
    if state.worker_index(to).is_none() {
        skip(warnings, format!("unknown worker '{to}'"));
        return;
    }
    let Some(index) = state.slot_index(date, shift) else {
        skip(warnings, format!("unknown slot {date} {shift}"));
        return;
    };
    let slot = state.slots[index].clone();

    if assignment.holder(index) != Some(from) {
        skip(warnings, format!("'{from}' does not hold {slot}"));
        return;
    }

    assignment.transfer(index, &slot, from, to);
    state.remove_request(from, date, shift);
    state.add_request(to, date, shift);
}

fn skip(warnings: &mut Vec<String>, message: String) {
    warn!("skipping edit: {message}");
    warnings.push(message);
}
