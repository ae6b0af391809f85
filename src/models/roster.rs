//! Roster input state.
//!
//! `RosterState` bundles the five input collections the engine reads and
//! the alteration subsystem mutates: the ordered worker registry, the
//! ordered slot list, the availability matrix, the monthly quota map, and
//! the standing-request set.
//!
//! # Identity
//! Worker names are the primary key everywhere. Positional indices are an
//! ephemeral solver-input artifact recomputed at each model build — they
//! shift meaning whenever the registry grows.
//!
//! # Lifecycle
//! The registry and availability matrix grow monotonically: rows are only
//! ever appended (new workers default to fully available), never removed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use super::{MonthKey, Slot};

/// Input state bundle for one rostering problem.
///
/// Owned by one caller per batch; every engine operation takes this by
/// reference (or mutates it in place under documented ownership). No
/// hidden process-wide globals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterState {
    /// Ordered worker registry. Position = availability-matrix row.
    pub workers: Vec<String>,
    /// Ordered slot list. Position = availability-matrix column.
    pub slots: Vec<Slot>,
    /// Eligibility matrix, rows parallel to `workers`, columns to `slots`.
    pub availability: Vec<Vec<bool>>,
    /// Monthly assignment ceilings. Absent key = no ceiling.
    pub quotas: HashMap<(String, MonthKey), u32>,
    /// Standing requests, keyed by (worker name, date, shift label).
    pub requests: BTreeSet<(String, NaiveDate, String)>,
}

impl RosterState {
    /// Creates a state with full availability for every (worker, slot) pair.
    pub fn new(workers: Vec<String>, slots: Vec<Slot>) -> Self {
        let availability = workers
            .iter()
            .map(|_| vec![true; slots.len()])
            .collect();
        Self {
            workers,
            slots,
            availability,
            quotas: HashMap::new(),
            requests: BTreeSet::new(),
        }
    }

    /// Number of registered workers.
    #[inline]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Number of slots.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Position of a worker in the registry, if known.
    pub fn worker_index(&self, name: &str) -> Option<usize> {
        self.workers.iter().position(|w| w == name)
    }

    /// Position of a (date, shift) slot, if present.
    pub fn slot_index(&self, date: NaiveDate, shift: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.date == date && s.shift == shift)
    }

    /// Looks up a worker, registering them with a fully-available row if
    /// unknown. Returns the (possibly fresh) registry position.
    pub fn ensure_worker(&mut self, name: &str) -> usize {
        if let Some(idx) = self.worker_index(name) {
            return idx;
        }
        self.workers.push(name.to_string());
        self.availability.push(vec![true; self.slots.len()]);
        self.workers.len() - 1
    }

    /// Whether a (worker, slot) pair is eligible.
    #[inline]
    pub fn is_available(&self, worker: usize, slot: usize) -> bool {
        self.availability[worker][slot]
    }

    /// Sets one availability cell.
    pub fn set_available(&mut self, worker: usize, slot: usize, available: bool) {
        self.availability[worker][slot] = available;
    }

    /// Sets or overwrites the ceiling for a (worker, month).
    pub fn set_quota(&mut self, name: &str, month: MonthKey, cap: u32) {
        self.quotas.insert((name.to_string(), month), cap);
    }

    /// Ceiling for a (worker, month), if one is imposed.
    pub fn quota(&self, name: &str, month: &MonthKey) -> Option<u32> {
        self.quotas
            .get(&(name.to_string(), month.clone()))
            .copied()
    }

    /// Registers a standing request.
    pub fn add_request(&mut self, name: &str, date: NaiveDate, shift: &str) {
        self.requests
            .insert((name.to_string(), date, shift.to_string()));
    }

    /// Withdraws a standing request. No-op if absent.
    pub fn remove_request(&mut self, name: &str, date: NaiveDate, shift: &str) {
        self.requests
            .remove(&(name.to_string(), date, shift.to_string()));
    }

    /// Names of workers requesting a given slot, in registry order.
    pub fn claimants(&self, slot: &Slot) -> Vec<&str> {
        self.workers
            .iter()
            .filter(|w| {
                self.requests
                    .contains(&(w.to_string(), slot.date, slot.shift.clone()))
            })
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::slot_grid;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn sample_state() -> RosterState {
        let slots = slot_grid(d(1), d(3), &["L1", "L2", "L3"]);
        RosterState::new(vec!["Alice".into(), "Bob".into()], slots)
    }

    #[test]
    fn test_new_is_fully_available() {
        let state = sample_state();
        assert_eq!(state.worker_count(), 2);
        assert_eq!(state.slot_count(), 9);
        for w in 0..state.worker_count() {
            for s in 0..state.slot_count() {
                assert!(state.is_available(w, s));
            }
        }
    }

    #[test]
    fn test_ensure_worker_appends_full_row() {
        let mut state = sample_state();
        let idx = state.ensure_worker("Charlie");
        assert_eq!(idx, 2);
        assert_eq!(state.availability[2], vec![true; 9]);

        // Idempotent for known names.
        assert_eq!(state.ensure_worker("Alice"), 0);
        assert_eq!(state.worker_count(), 3);
    }

    #[test]
    fn test_slot_index_lookup() {
        let state = sample_state();
        assert_eq!(state.slot_index(d(2), "L2"), Some(4));
        assert_eq!(state.slot_index(d(2), "L9"), None);
        assert_eq!(state.slot_index(d(9), "L1"), None);
    }

    #[test]
    fn test_quota_absent_means_no_ceiling() {
        let mut state = sample_state();
        let june = MonthKey::new(2025, 6);
        assert_eq!(state.quota("Alice", &june), None);

        state.set_quota("Alice", june.clone(), 3);
        assert_eq!(state.quota("Alice", &june), Some(3));
        assert_eq!(state.quota("Bob", &june), None);
    }

    #[test]
    fn test_requests_and_claimants() {
        let mut state = sample_state();
        state.add_request("Alice", d(2), "L2");
        state.add_request("Bob", d(2), "L2");
        state.add_request("Bob", d(3), "L1");

        let slot = Slot::new(d(2), "L2");
        assert_eq!(state.claimants(&slot), vec!["Alice", "Bob"]);

        state.remove_request("Alice", d(2), "L2");
        assert_eq!(state.claimants(&slot), vec!["Bob"]);

        // Removing a non-existent request is a no-op.
        state.remove_request("Alice", d(2), "L2");
        assert_eq!(state.claimants(&Slot::new(d(3), "L1")), vec!["Bob"]);
    }

    #[test]
    fn test_availability_flip() {
        let mut state = sample_state();
        state.set_available(0, 4, false);
        assert!(!state.is_available(0, 4));
        assert!(state.is_available(1, 4));
    }
}
