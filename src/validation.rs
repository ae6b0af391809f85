//! Input validation for roster states.
//!
//! Checks structural integrity of a [`RosterState`] before it reaches
//! the engine or the alteration layer. Detects:
//! - Duplicate worker names
//! - Duplicate (date, shift) slots
//! - Availability matrix shape mismatches
//! - Quota entries for unknown workers
//! - Standing requests naming unknown workers or slots

use crate::models::RosterState;
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two workers share the same name.
    DuplicateWorker,
    /// Two slots share the same (date, shift) key.
    DuplicateSlot,
    /// The availability matrix is not E rows of S cells.
    AvailabilityShape,
    /// A quota entry names a worker that doesn't exist.
    UnknownQuotaWorker,
    /// A standing request names a worker that doesn't exist.
    UnknownRequestWorker,
    /// A standing request names a (date, shift) outside the grid.
    UnknownRequestSlot,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a roster state.
///
/// Checks:
/// 1. No duplicate worker names
/// 2. No duplicate (date, shift) slots
/// 3. Availability matrix has one row per worker, one cell per slot
/// 4. All quota entries reference registered workers
/// 5. All standing requests reference registered workers and grid slots
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_state(state: &RosterState) -> ValidationResult {
    let mut errors = Vec::new();

    let mut workers = HashSet::new();
    for name in &state.workers {
        if !workers.insert(name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateWorker,
                format!("Duplicate worker name: {name}"),
            ));
        }
    }

    let mut slots = HashSet::new();
    for slot in &state.slots {
        if !slots.insert((slot.date, slot.shift.as_str())) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateSlot,
                format!("Duplicate slot: {slot}"),
            ));
        }
    }

    if state.availability.len() != state.worker_count() {
        errors.push(ValidationError::new(
            ValidationErrorKind::AvailabilityShape,
            format!(
                "Availability has {} rows for {} workers",
                state.availability.len(),
                state.worker_count()
            ),
        ));
    }
    for (w, row) in state.availability.iter().enumerate() {
        if row.len() != state.slot_count() {
            errors.push(ValidationError::new(
                ValidationErrorKind::AvailabilityShape,
                format!(
                    "Availability row {} has {} cells for {} slots",
                    w,
                    row.len(),
                    state.slot_count()
                ),
            ));
        }
    }

    for (name, month) in state.quotas.keys() {
        if !workers.contains(name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownQuotaWorker,
                format!("Quota for unknown worker '{name}' in {month}"),
            ));
        }
    }

    for (name, date, shift) in &state.requests {
        if !workers.contains(name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownRequestWorker,
                format!("Request by unknown worker '{name}'"),
            ));
        }
        if !slots.contains(&(*date, shift.as_str())) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownRequestSlot,
                format!("Request for unknown slot {date} {shift}"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{slot_grid, MonthKey, Slot};
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn sample_state() -> RosterState {
        let slots = slot_grid(d(1), d(2), &["L1", "L2"]);
        let mut state = RosterState::new(vec!["Alice".into(), "Bob".into()], slots);
        state.set_quota("Alice", MonthKey::new(2025, 6), 3);
        state.add_request("Bob", d(1), "L2");
        state
    }

    #[test]
    fn test_valid_state() {
        assert!(validate_state(&sample_state()).is_ok());
    }

    #[test]
    fn test_duplicate_worker() {
        let mut state = sample_state();
        state.workers.push("Alice".into());
        state.availability.push(vec![true; state.slot_count()]);

        let errors = validate_state(&state).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateWorker));
    }

    #[test]
    fn test_duplicate_slot() {
        let mut state = sample_state();
        state.slots.push(Slot::new(d(1), "L1"));
        for row in &mut state.availability {
            row.push(true);
        }

        let errors = validate_state(&state).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateSlot));
    }

    #[test]
    fn test_availability_shape() {
        let mut state = sample_state();
        state.availability[1].pop();

        let errors = validate_state(&state).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::AvailabilityShape));
    }

    #[test]
    fn test_unknown_quota_worker() {
        let mut state = sample_state();
        state.quotas.insert(
            ("Nobody".into(), MonthKey::new(2025, 6)),
            2,
        );

        let errors = validate_state(&state).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownQuotaWorker));
    }

    #[test]
    fn test_unknown_request_references() {
        let mut state = sample_state();
        state
            .requests
            .insert(("Nobody".into(), d(1), "L1".into()));
        state
            .requests
            .insert(("Alice".into(), d(9), "L1".into()));

        let errors = validate_state(&state).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownRequestWorker));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownRequestSlot));
    }

    #[test]
    fn test_multiple_errors() {
        let mut state = sample_state();
        state.workers.push("Alice".into());
        state.availability.push(vec![true]);

        let errors = validate_state(&state).unwrap_err();
        assert!(errors.len() >= 2);
    }
}
