//! Assignment state (solution) model.
//!
//! One logical entity with three co-mutated views:
//! - the final sequence, parallel to the slot order (worker name or unassigned),
//! - the per-worker assignment lists (inverse index of the sequence),
//! - the uncovered-slot list (exactly the unassigned slots).
//!
//! Every mutator re-establishes agreement between the three views before
//! returning, so a batch of edits may safely read intermediate state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Slot;

/// A complete (possibly partial-coverage) roster solution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentState {
    /// Assigned worker per slot, parallel to the slot order.
    pub assigned: Vec<Option<String>>,
    /// Slots held by each worker (inverse of `assigned`).
    pub by_worker: HashMap<String, Vec<Slot>>,
    /// Slots with no assigned worker.
    pub uncovered: Vec<Slot>,
}

impl AssignmentState {
    /// Creates an all-unassigned state over the given slot order.
    pub fn unassigned(slots: &[Slot]) -> Self {
        Self {
            assigned: vec![None; slots.len()],
            by_worker: HashMap::new(),
            uncovered: slots.to_vec(),
        }
    }

    /// Worker holding a slot index, if any.
    pub fn holder(&self, index: usize) -> Option<&str> {
        self.assigned[index].as_deref()
    }

    /// Slots held by a worker (empty if none recorded).
    pub fn worker_slots(&self, name: &str) -> &[Slot] {
        self.by_worker.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether a worker already holds the given slot.
    pub fn holds(&self, name: &str, slot: &Slot) -> bool {
        self.worker_slots(name).contains(slot)
    }

    /// Number of covered slots.
    pub fn covered_count(&self) -> usize {
        self.assigned.iter().filter(|a| a.is_some()).count()
    }

    /// Fills an unassigned slot with a worker, updating all three views.
    ///
    /// Caller must have checked that the slot is currently unassigned.
    pub fn fill(&mut self, index: usize, slot: &Slot, worker: &str) {
        debug_assert!(self.assigned[index].is_none());
        self.assigned[index] = Some(worker.to_string());
        self.by_worker
            .entry(worker.to_string())
            .or_default()
            .push(slot.clone());
        self.uncovered.retain(|s| s != slot);
    }

    /// Clears a slot, returning the previous holder. The slot joins the
    /// uncovered list and leaves the holder's per-worker list.
    pub fn clear(&mut self, index: usize, slot: &Slot) -> Option<String> {
        let holder = self.assigned[index].take()?;
        if let Some(list) = self.by_worker.get_mut(&holder) {
            list.retain(|s| s != slot);
        }
        self.uncovered.push(slot.clone());
        Some(holder)
    }

    /// Transfers a slot's occupancy from one worker to another without the
    /// slot ever appearing uncovered.
    pub fn transfer(&mut self, index: usize, slot: &Slot, from: &str, to: &str) {
        debug_assert_eq!(self.assigned[index].as_deref(), Some(from));
        self.assigned[index] = Some(to.to_string());
        if let Some(list) = self.by_worker.get_mut(from) {
            list.retain(|s| s != slot);
        }
        self.by_worker
            .entry(to.to_string())
            .or_default()
            .push(slot.clone());
    }

    /// Checks agreement of the three views against the slot order.
    ///
    /// Intended for tests and debug assertions; mutators maintain the
    /// invariant operation-by-operation.
    pub fn is_consistent(&self, slots: &[Slot]) -> bool {
        if self.assigned.len() != slots.len() {
            return false;
        }
        // Every sequence entry is mirrored in the inverse index.
        for (i, holder) in self.assigned.iter().enumerate() {
            match holder {
                Some(name) => {
                    if !self.worker_slots(name).contains(&slots[i]) {
                        return false;
                    }
                    if self.uncovered.contains(&slots[i]) {
                        return false;
                    }
                }
                None => {
                    if !self.uncovered.contains(&slots[i]) {
                        return false;
                    }
                }
            }
        }
        // No phantom entries in the inverse index.
        let listed: usize = self.by_worker.values().map(Vec::len).sum();
        if listed != self.covered_count() {
            return false;
        }
        self.uncovered.len() == slots.len() - self.covered_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::slot_grid;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn sample_slots() -> Vec<Slot> {
        slot_grid(d(1), d(2), &["L1", "L2"])
    }

    #[test]
    fn test_unassigned_state() {
        let slots = sample_slots();
        let state = AssignmentState::unassigned(&slots);
        assert_eq!(state.assigned.len(), 4);
        assert_eq!(state.uncovered.len(), 4);
        assert_eq!(state.covered_count(), 0);
        assert!(state.is_consistent(&slots));
    }

    #[test]
    fn test_fill_updates_all_views() {
        let slots = sample_slots();
        let mut state = AssignmentState::unassigned(&slots);

        state.fill(1, &slots[1], "Alice");
        assert_eq!(state.holder(1), Some("Alice"));
        assert_eq!(state.worker_slots("Alice"), &slots[1..2]);
        assert!(!state.uncovered.contains(&slots[1]));
        assert!(state.is_consistent(&slots));
    }

    #[test]
    fn test_clear_returns_holder() {
        let slots = sample_slots();
        let mut state = AssignmentState::unassigned(&slots);
        state.fill(0, &slots[0], "Bob");

        assert_eq!(state.clear(0, &slots[0]), Some("Bob".to_string()));
        assert_eq!(state.holder(0), None);
        assert!(state.worker_slots("Bob").is_empty());
        assert!(state.uncovered.contains(&slots[0]));
        assert!(state.is_consistent(&slots));

        // Clearing an empty slot is a no-op.
        assert_eq!(state.clear(0, &slots[0]), None);
        assert!(state.is_consistent(&slots));
    }

    #[test]
    fn test_transfer_keeps_slot_covered() {
        let slots = sample_slots();
        let mut state = AssignmentState::unassigned(&slots);
        state.fill(2, &slots[2], "Alice");

        state.transfer(2, &slots[2], "Alice", "Bob");
        assert_eq!(state.holder(2), Some("Bob"));
        assert!(state.worker_slots("Alice").is_empty());
        assert!(state.holds("Bob", &slots[2]));
        assert!(!state.uncovered.contains(&slots[2]));
        assert!(state.is_consistent(&slots));
    }

    #[test]
    fn test_consistency_detects_drift() {
        let slots = sample_slots();
        let mut state = AssignmentState::unassigned(&slots);
        state.fill(0, &slots[0], "Alice");

        // Simulate a view falling out of sync.
        state.by_worker.get_mut("Alice").unwrap().clear();
        assert!(!state.is_consistent(&slots));
    }
}
