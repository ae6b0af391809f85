//! Decision model for one solve.
//!
//! The model over E workers and S slots consists of:
//! - E·S boolean assignment indicators, one per (worker, slot) pair,
//!   addressed by their ephemeral build-time indices;
//! - hard fixings: cells blocked by the availability mask, cells forced
//!   by single-claimant requests;
//! - hard counting constraints: at most one worker per slot (implicit in
//!   the search representation), per-(worker, month) quota ceilings;
//! - derived indicator groups tied to the assignment indicators by exact
//!   AND/OR/count linkage: coverage per slot, spacing-deviation pairs,
//!   same-day worker overlap, multi-shift-per-day, and request misses.
//!
//! E = 0 or S = 0 degenerates to an empty model.

use chrono::NaiveDate;

use crate::models::MonthKey;

/// Tiered weights of the single linear minimization objective.
///
/// Strict priority ordering is realized by orders-of-magnitude separation:
/// uncovered ≫ multi-shift > spacing ≈ overlap ≈ request-miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectiveWeights {
    /// Per uncovered slot (1 − coverage).
    pub uncovered: i64,
    /// Per spacing-deviation pair that fires.
    pub spacing: i64,
    /// Per date with more than one distinct worker on duty.
    pub overlap: i64,
    /// Per (worker, date) holding more than one shift.
    pub multi_shift: i64,
    /// Per claimant of a multi-claimant slot who does not receive it.
    pub request_miss: i64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            uncovered: 10_000,
            spacing: 800,
            overlap: 800,
            multi_shift: 1_000,
            request_miss: 800,
        }
    }
}

/// Hard ceiling on one worker's assignments within one month.
#[derive(Debug, Clone)]
pub struct QuotaCap {
    /// Worker index at build time.
    pub worker: usize,
    /// Month the ceiling applies to.
    pub month: MonthKey,
    /// Maximum number of assignments.
    pub cap: u32,
    /// Slot indices whose date falls in `month`.
    pub slots: Vec<usize>,
}

/// Spacing-deviation indicator: fires iff the worker is assigned to
/// **both** slots of a closer-than-ideal pair (tight AND linkage).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpacingPair {
    pub worker: usize,
    pub first: usize,
    pub second: usize,
}

/// One calendar date and the slots it carries. The overlap indicator for
/// the date fires iff more than one distinct worker works any of them,
/// where "works that day" is the OR over that worker's slots on the date.
#[derive(Debug, Clone)]
pub struct OverlapDay {
    pub date: NaiveDate,
    pub slots: Vec<usize>,
}

/// Multi-shift indicator group: a (worker, date) pair with more than one
/// candidate slot. Fires iff the worker's assignment count over `slots`
/// exceeds one.
#[derive(Debug, Clone)]
pub struct MultiShiftGroup {
    pub worker: usize,
    pub slots: Vec<usize>,
}

/// Request-miss indicator for one claimant of a multi-claimant slot:
/// equals 1 − assignment(worker, slot). Summed into the objective as a
/// soft penalty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMiss {
    pub worker: usize,
    pub slot: usize,
}

/// Assembled decision model, ready for the bounded-time search.
#[derive(Debug, Clone, Default)]
pub struct RosterModel {
    /// Worker count E at build time.
    pub workers: usize,
    /// Slot count S at build time.
    pub slots: usize,
    /// Flattened E·S mask; `true` forces the assignment indicator to 0.
    blocked: Vec<bool>,
    /// (worker, slot) cells forced to 1 by single-claimant requests.
    pub forced: Vec<(usize, usize)>,
    /// Monthly quota ceilings for (worker, month) keys present in the map.
    pub quota_caps: Vec<QuotaCap>,
    /// Spacing-deviation pairs.
    pub spacing_pairs: Vec<SpacingPair>,
    /// Per-date overlap groups.
    pub overlap_days: Vec<OverlapDay>,
    /// Per-(worker, date) multi-shift groups.
    pub multi_shift_groups: Vec<MultiShiftGroup>,
    /// Soft request-miss indicators (multi-claimant slots only).
    pub request_misses: Vec<RequestMiss>,
    /// Objective weights.
    pub weights: ObjectiveWeights,
}

impl RosterModel {
    /// Creates an empty model with no fixings or indicator groups.
    pub fn new(workers: usize, slots: usize, weights: ObjectiveWeights) -> Self {
        Self {
            workers,
            slots,
            blocked: vec![false; workers * slots],
            weights,
            ..Default::default()
        }
    }

    #[inline]
    fn cell(&self, worker: usize, slot: usize) -> usize {
        worker * self.slots + slot
    }

    /// Forces an assignment indicator to 0 (ineligible cell).
    pub fn block(&mut self, worker: usize, slot: usize) {
        let cell = self.cell(worker, slot);
        self.blocked[cell] = true;
    }

    /// Whether a cell is forced to 0.
    #[inline]
    pub fn is_blocked(&self, worker: usize, slot: usize) -> bool {
        self.blocked[self.cell(worker, slot)]
    }

    /// Number of boolean assignment indicators (E·S).
    pub fn variable_count(&self) -> usize {
        self.workers * self.slots
    }

    /// Number of derived indicators across all groups, coverage included.
    pub fn indicator_count(&self) -> usize {
        self.slots
            + self.spacing_pairs.len()
            + self.overlap_days.len()
            + self.multi_shift_groups.len()
            + self.request_misses.len()
    }
}
