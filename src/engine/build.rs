//! Model assembly.
//!
//! `RosterModelBuilder` turns a `RosterState` into a `RosterModel`:
//! worker names are resolved to build-time indices, the availability mask
//! becomes hard zero-fixings, single-claimant requests become hard
//! one-fixings, quota-map entries become counting ceilings, and the soft
//! indicator groups (spacing pairs, day overlap, multi-shift, request
//! misses) are derived from the slot calendar.
//!
//! Hard-constraint contradictions are rejected here, before any search:
//! a forced request on a blocked cell, or forced requests alone breaching
//! a monthly ceiling, fail with a `SolveError` naming the offenders.

use std::collections::HashMap;

use tracing::debug;

use crate::error::SolveError;
use crate::models::{MonthKey, RosterState};

use super::model::{
    MultiShiftGroup, ObjectiveWeights, OverlapDay, QuotaCap, RequestMiss, RosterModel, SpacingPair,
};

/// Builds a `RosterModel` from roster input state.
pub struct RosterModelBuilder<'a> {
    state: &'a RosterState,
    weights: ObjectiveWeights,
}

impl<'a> RosterModelBuilder<'a> {
    /// Creates a builder with default objective weights.
    pub fn new(state: &'a RosterState) -> Self {
        Self {
            state,
            weights: ObjectiveWeights::default(),
        }
    }

    /// Overrides the objective weights.
    pub fn with_weights(mut self, weights: ObjectiveWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Assembles the model.
    ///
    /// # Errors
    /// - `RequestUnavailable` if a single-claimant request targets a cell
    ///   the availability matrix blocks.
    /// - `QuotaExceededByRequests` if single-claimant requests alone
    ///   exceed a (worker, month) ceiling.
    pub fn build(&self) -> Result<RosterModel, SolveError> {
        let state = self.state;
        let workers = state.worker_count();
        let slots = state.slot_count();
        let mut model = RosterModel::new(workers, slots, self.weights.clone());

        // Availability mask → hard zero-fixings.
        for w in 0..workers {
            for s in 0..slots {
                if !state.is_available(w, s) {
                    model.block(w, s);
                }
            }
        }

        self.assemble_requests(&mut model)?;
        self.assemble_quotas(&mut model)?;
        self.assemble_spacing(&mut model);
        self.assemble_calendar_groups(&mut model);

        debug!(
            variables = model.variable_count(),
            indicators = model.indicator_count(),
            forced = model.forced.len(),
            caps = model.quota_caps.len(),
            "assembled roster model"
        );
        Ok(model)
    }

    /// Groups request-map entries by slot. Exactly one claimant forces the
    /// assignment hard; two or more become soft miss indicators.
    fn assemble_requests(&self, model: &mut RosterModel) -> Result<(), SolveError> {
        let state = self.state;
        let mut by_slot: HashMap<usize, Vec<usize>> = HashMap::new();
        for (name, date, shift) in &state.requests {
            let (Some(w), Some(s)) = (
                state.worker_index(name),
                state.slot_index(*date, shift),
            ) else {
                debug!(worker = %name, %date, %shift, "request references unknown key; ignored");
                continue;
            };
            by_slot.entry(s).or_default().push(w);
        }

        let mut slot_indices: Vec<usize> = by_slot.keys().copied().collect();
        slot_indices.sort_unstable();

        for s in slot_indices {
            let mut claimants = by_slot.remove(&s).unwrap_or_default();
            claimants.sort_unstable();
            if claimants.len() == 1 {
                let w = claimants[0];
                if model.is_blocked(w, s) {
                    let slot = &state.slots[s];
                    return Err(SolveError::RequestUnavailable {
                        worker: state.workers[w].clone(),
                        date: slot.date,
                        shift: slot.shift.clone(),
                    });
                }
                model.forced.push((w, s));
            } else {
                for w in claimants {
                    model.request_misses.push(RequestMiss { worker: w, slot: s });
                }
            }
        }
        Ok(())
    }

    /// Quota-map entries become counting ceilings over the month's slots.
    /// Keys absent from the map impose no constraint.
    fn assemble_quotas(&self, model: &mut RosterModel) -> Result<(), SolveError> {
        let state = self.state;
        let mut entries: Vec<(&(String, MonthKey), &u32)> = state.quotas.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        for ((name, month), &cap) in entries {
            let Some(worker) = state.worker_index(name) else {
                debug!(worker = %name, %month, "quota entry for unknown worker; ignored");
                continue;
            };
            let month_slots: Vec<usize> = (0..state.slot_count())
                .filter(|&s| month.contains(state.slots[s].date))
                .collect();

            let forced_here = model
                .forced
                .iter()
                .filter(|(w, s)| *w == worker && month_slots.contains(s))
                .count() as u32;
            if forced_here > cap {
                return Err(SolveError::QuotaExceededByRequests {
                    worker: name.clone(),
                    month: month.clone(),
                    quota: cap,
                    forced: forced_here,
                });
            }

            model.quota_caps.push(QuotaCap {
                worker,
                month: month.clone(),
                cap,
                slots: month_slots,
            });
        }
        Ok(())
    }

    /// Spacing-deviation pairs for every (worker, month) with quota > 1:
    /// over the worker's potential (unblocked) slots in the month, pairs
    /// closer than `ideal_gap = span / (quota − 1)` days get an indicator
    /// that fires iff the worker takes both.
    fn assemble_spacing(&self, model: &mut RosterModel) {
        let state = self.state;
        let mut pairs = Vec::new();

        for cap in &model.quota_caps {
            if cap.cap <= 1 {
                continue;
            }
            let potential: Vec<usize> = cap
                .slots
                .iter()
                .copied()
                .filter(|&s| !model.is_blocked(cap.worker, s))
                .collect();
            let (Some(first), Some(last)) = (
                potential.iter().map(|&s| state.slots[s].date).min(),
                potential.iter().map(|&s| state.slots[s].date).max(),
            ) else {
                continue;
            };
            let span = (last - first).num_days() + 1;
            let ideal_gap = span / i64::from(cap.cap - 1);

            for (i, &a) in potential.iter().enumerate() {
                for &b in &potential[i + 1..] {
                    let gap = (state.slots[b].date - state.slots[a].date)
                        .num_days()
                        .abs();
                    if gap < ideal_gap {
                        pairs.push(SpacingPair {
                            worker: cap.worker,
                            first: a,
                            second: b,
                        });
                    }
                }
            }
        }
        model.spacing_pairs = pairs;
    }

    /// Per-date overlap groups and per-(worker, date) multi-shift groups.
    ///
    /// Both are kept deliberately: overlap penalizes any two workers
    /// colliding on a date, multi-shift penalizes one worker double-booked.
    fn assemble_calendar_groups(&self, model: &mut RosterModel) {
        let state = self.state;
        let mut days: Vec<OverlapDay> = Vec::new();
        for (s, slot) in state.slots.iter().enumerate() {
            match days.iter_mut().find(|d| d.date == slot.date) {
                Some(day) => day.slots.push(s),
                None => days.push(OverlapDay {
                    date: slot.date,
                    slots: vec![s],
                }),
            }
        }

        for day in &days {
            if day.slots.len() < 2 {
                continue;
            }
            for w in 0..state.worker_count() {
                model.multi_shift_groups.push(MultiShiftGroup {
                    worker: w,
                    slots: day.slots.clone(),
                });
            }
        }
        model.overlap_days = days;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{slot_grid, RosterState};
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn sample_state() -> RosterState {
        let slots = slot_grid(d(1), d(7), &["L1", "L2", "L3"]);
        RosterState::new(vec!["Alice".into(), "Bob".into()], slots)
    }

    #[test]
    fn test_build_counts() {
        let mut state = sample_state();
        state.set_quota("Alice", MonthKey::new(2025, 6), 3);

        let model = RosterModelBuilder::new(&state).build().unwrap();
        assert_eq!(model.workers, 2);
        assert_eq!(model.slots, 21);
        assert_eq!(model.variable_count(), 42);
        assert_eq!(model.quota_caps.len(), 1);
        assert_eq!(model.quota_caps[0].slots.len(), 21);
        // 7 days × 2 workers double-bookable, 7 overlap days.
        assert_eq!(model.multi_shift_groups.len(), 14);
        assert_eq!(model.overlap_days.len(), 7);
    }

    #[test]
    fn test_availability_blocks_cells() {
        let mut state = sample_state();
        state.set_available(1, 0, false);
        state.set_available(1, 20, false);

        let model = RosterModelBuilder::new(&state).build().unwrap();
        assert!(model.is_blocked(1, 0));
        assert!(model.is_blocked(1, 20));
        assert!(!model.is_blocked(0, 0));
    }

    #[test]
    fn test_single_claimant_is_forced() {
        let mut state = sample_state();
        state.add_request("Alice", d(2), "L2");

        let model = RosterModelBuilder::new(&state).build().unwrap();
        let s = state.slot_index(d(2), "L2").unwrap();
        assert_eq!(model.forced, vec![(0, s)]);
        assert!(model.request_misses.is_empty());
    }

    #[test]
    fn test_multi_claimant_becomes_soft() {
        let mut state = sample_state();
        state.add_request("Alice", d(2), "L2");
        state.add_request("Bob", d(2), "L2");

        let model = RosterModelBuilder::new(&state).build().unwrap();
        let s = state.slot_index(d(2), "L2").unwrap();
        assert!(model.forced.is_empty());
        assert_eq!(model.request_misses.len(), 2);
        assert!(model
            .request_misses
            .iter()
            .all(|m| m.slot == s && m.worker < 2));
    }

    #[test]
    fn test_forced_request_on_blocked_cell_errors() {
        let mut state = sample_state();
        let s = state.slot_index(d(2), "L2").unwrap();
        state.set_available(0, s, false);
        state.add_request("Alice", d(2), "L2");

        let err = RosterModelBuilder::new(&state).build().unwrap_err();
        assert_eq!(
            err,
            SolveError::RequestUnavailable {
                worker: "Alice".into(),
                date: d(2),
                shift: "L2".into(),
            }
        );
    }

    #[test]
    fn test_forced_requests_over_quota_error() {
        let mut state = sample_state();
        state.set_quota("Alice", MonthKey::new(2025, 6), 1);
        state.add_request("Alice", d(2), "L2");
        state.add_request("Alice", d(3), "L1");

        let err = RosterModelBuilder::new(&state).build().unwrap_err();
        assert_eq!(
            err,
            SolveError::QuotaExceededByRequests {
                worker: "Alice".into(),
                month: MonthKey::new(2025, 6),
                quota: 1,
                forced: 2,
            }
        );
    }

    #[test]
    fn test_spacing_pairs_need_quota_above_one() {
        let mut state = sample_state();
        state.set_quota("Alice", MonthKey::new(2025, 6), 1);
        let model = RosterModelBuilder::new(&state).build().unwrap();
        assert!(model.spacing_pairs.is_empty());

        state.set_quota("Alice", MonthKey::new(2025, 6), 3);
        let model = RosterModelBuilder::new(&state).build().unwrap();
        // Span 7 days, quota 3 → ideal gap 3; same-day and 1–2 day pairs fire.
        assert!(!model.spacing_pairs.is_empty());
        assert!(model.spacing_pairs.iter().all(|p| p.worker == 0));
        for p in &model.spacing_pairs {
            let gap = (state.slots[p.second].date - state.slots[p.first].date)
                .num_days()
                .abs();
            assert!(gap < 3);
        }
    }

    #[test]
    fn test_quota_for_unknown_worker_ignored() {
        let mut state = sample_state();
        state.set_quota("Nobody", MonthKey::new(2025, 6), 2);
        let model = RosterModelBuilder::new(&state).build().unwrap();
        assert!(model.quota_caps.is_empty());
    }

    #[test]
    fn test_empty_state_builds_empty_model() {
        let state = RosterState::default();
        let model = RosterModelBuilder::new(&state).build().unwrap();
        assert_eq!(model.variable_count(), 0);
        assert!(model.forced.is_empty());
    }
}
