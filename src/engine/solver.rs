//! Bounded-time solve and extraction.
//!
//! # Algorithm
//!
//! 1. Pin the hard-forced cells (single-claimant requests).
//! 2. Build an incumbent greedily, slot by slot, picking the cheapest
//!    eligible option; a few randomized-tie-break restarts diversify it.
//! 3. Improve by depth-first branch-and-bound over the slots, pruning
//!    with an admissible remaining-cost bound, until the wall-clock
//!    budget runs out.
//!
//! The incumbent found so far is always returned when the budget is
//! exhausted; `SolveStatus` tells the caller whether the search space was
//! exhausted (`Optimal`) or the result may be suboptimal (`Feasible`).
//!
//! Extraction scans workers in index order per slot (ties cannot occur
//! under the at-most-one representation) and builds the assignment triple
//! in single passes.

use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::models::{AssignmentState, RosterState};

use super::model::RosterModel;

/// Interval between wall-clock checks in the search loop.
const DEADLINE_CHECK_NODES: u64 = 1024;

/// Search configuration.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Wall-clock budget for the branch-and-bound improvement phase.
    pub time_budget: Duration,
    /// Randomized greedy restarts for the initial incumbent.
    pub restarts: u32,
    /// RNG seed for the restarts.
    pub seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs(30),
            restarts: 8,
            seed: 0x5eed,
        }
    }
}

/// Whether the returned roster is proven optimal or merely the best
/// solution found within the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Search space exhausted; the roster minimizes the objective.
    Optimal,
    /// Budget exhausted first; the roster is feasible but may be suboptimal.
    Feasible,
}

/// Result of one solve.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// The assignment triple.
    pub assignment: AssignmentState,
    /// Optimality status.
    pub status: SolveStatus,
    /// Objective value of `assignment`.
    pub objective: i64,
}

/// Bounded-time roster solver.
#[derive(Debug, Clone, Default)]
pub struct RosterSolver {
    config: SolverConfig,
}

impl RosterSolver {
    /// Creates a solver with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the full configuration.
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets only the wall-clock budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.config.time_budget = budget;
        self
    }

    /// Solves an assembled model against its originating state.
    ///
    /// Hard-constraint contradictions are rejected at model build; a built
    /// model always admits at least the all-uncovered completion of its
    /// forced cells, so solving cannot fail.
    pub fn solve(&self, model: &RosterModel, state: &RosterState) -> SolveOutcome {
        let start = Instant::now();
        let mut search = Search::new(model);
        let base = search.pin_forced();

        // Incumbent: deterministic greedy, then randomized restarts.
        let mut rng = SmallRng::seed_from_u64(self.config.seed);
        let mut best = search.greedy(base, None);
        for _ in 0..self.config.restarts {
            let candidate = search.greedy(base, Some(&mut rng));
            if candidate.cost < best.cost {
                best = candidate;
            }
        }

        // Branch-and-bound improvement under the wall-clock budget.
        let deadline = start + self.config.time_budget;
        let complete = search.branch_and_bound(base, &mut best, deadline);
        let status = if complete {
            SolveStatus::Optimal
        } else {
            SolveStatus::Feasible
        };

        debug!(
            objective = best.cost,
            ?status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "solve finished"
        );

        SolveOutcome {
            assignment: extract(state, &best.decision),
            status,
            objective: best.cost,
        }
    }
}

/// Best complete decision vector found so far.
#[derive(Debug, Clone)]
struct Incumbent {
    decision: Vec<Option<usize>>,
    cost: i64,
}

/// Flattened search tables plus the mutable counters the exact
/// incremental objective evaluation needs.
struct Search<'a> {
    model: &'a RosterModel,
    /// Eligible workers per slot, registry order.
    cands: Vec<Vec<usize>>,
    /// Hard-forced worker per slot.
    forced: Vec<Option<usize>>,
    /// Free (non-forced) slot indices in slot order.
    free: Vec<usize>,
    /// Quota-cap index per (worker, slot) cell.
    cap_of: Vec<Option<usize>>,
    cap_limit: Vec<u32>,
    /// Spacing partners per cell (both directions).
    partners: Vec<Vec<usize>>,
    /// Multi-shift group per cell.
    group_of: Vec<Option<usize>>,
    /// Day index per slot.
    day_of: Vec<usize>,
    day_count: usize,
    /// Claimants per slot (multi-claimant request slots only).
    claimants: Vec<Vec<usize>>,
    /// Admissible minimum remaining cost from each free-slot position.
    suffix_bound: Vec<i64>,

    // Mutable evaluation state.
    decision: Vec<Option<usize>>,
    cap_used: Vec<u32>,
    group_count: Vec<u32>,
    day_worker_slots: Vec<u32>,
    day_workers: Vec<u32>,
}

impl<'a> Search<'a> {
    fn new(model: &'a RosterModel) -> Self {
        let (e, s) = (model.workers, model.slots);

        let mut cands: Vec<Vec<usize>> = vec![Vec::new(); s];
        for slot in 0..s {
            for w in 0..e {
                if !model.is_blocked(w, slot) {
                    cands[slot].push(w);
                }
            }
        }

        let mut forced = vec![None; s];
        for &(w, slot) in &model.forced {
            forced[slot] = Some(w);
        }
        let free: Vec<usize> = (0..s).filter(|&i| forced[i].is_none()).collect();

        let mut cap_of = vec![None; e * s];
        let mut cap_limit = Vec::with_capacity(model.quota_caps.len());
        for (ci, cap) in model.quota_caps.iter().enumerate() {
            cap_limit.push(cap.cap);
            for &slot in &cap.slots {
                cap_of[cap.worker * s + slot] = Some(ci);
            }
        }

        let mut partners: Vec<Vec<usize>> = vec![Vec::new(); e * s];
        for pair in &model.spacing_pairs {
            partners[pair.worker * s + pair.first].push(pair.second);
            partners[pair.worker * s + pair.second].push(pair.first);
        }

        let mut group_of = vec![None; e * s];
        for (gi, group) in model.multi_shift_groups.iter().enumerate() {
            for &slot in &group.slots {
                group_of[group.worker * s + slot] = Some(gi);
            }
        }

        let mut day_of = vec![0; s];
        for (di, day) in model.overlap_days.iter().enumerate() {
            for &slot in &day.slots {
                day_of[slot] = di;
            }
        }

        let mut claimants: Vec<Vec<usize>> = vec![Vec::new(); s];
        for miss in &model.request_misses {
            claimants[miss.slot].push(miss.worker);
        }

        // Admissible bound: a free slot with candidates can cost as little
        // as (claimants − 1) misses; one with none must go uncovered.
        let w = &model.weights;
        let mut suffix_bound = vec![0i64; free.len() + 1];
        for (pos, &slot) in free.iter().enumerate().rev() {
            let local = if cands[slot].is_empty() {
                w.uncovered + claimants[slot].len() as i64 * w.request_miss
            } else {
                claimants[slot].len().saturating_sub(1) as i64 * w.request_miss
            };
            suffix_bound[pos] = suffix_bound[pos + 1] + local;
        }

        let day_count = model.overlap_days.len();
        Self {
            model,
            cands,
            forced,
            free,
            cap_of,
            cap_limit,
            partners,
            group_of,
            day_of,
            day_count,
            claimants,
            suffix_bound,
            decision: vec![None; s],
            cap_used: vec![0; model.quota_caps.len()],
            group_count: vec![0; model.multi_shift_groups.len()],
            day_worker_slots: vec![0; day_count * e],
            day_workers: vec![0; day_count],
        }
    }

    #[inline]
    fn cell(&self, worker: usize, slot: usize) -> usize {
        worker * self.model.slots + slot
    }

    /// Whether assigning `worker` to `slot` would stay under its quota.
    fn within_quota(&self, worker: usize, slot: usize) -> bool {
        match self.cap_of[self.cell(worker, slot)] {
            Some(ci) => self.cap_used[ci] < self.cap_limit[ci],
            None => true,
        }
    }

    /// Applies one decision and returns its exact objective delta.
    fn apply(&mut self, slot: usize, choice: Option<usize>) -> i64 {
        let w = &self.model.weights;
        let claims = self.claimants[slot].len() as i64;

        let Some(worker) = choice else {
            self.decision[slot] = None;
            return w.uncovered + claims * w.request_miss;
        };

        let cell = self.cell(worker, slot);
        let mut delta = 0;

        // Spacing: pair indicator fires when the second slot of a
        // closer-than-ideal pair is taken by the same worker.
        for i in 0..self.partners[cell].len() {
            let partner = self.partners[cell][i];
            if self.decision[partner] == Some(worker) {
                delta += w.spacing;
            }
        }

        // Multi-shift: indicator fires on the 1 → 2 transition.
        if let Some(gi) = self.group_of[cell] {
            self.group_count[gi] += 1;
            if self.group_count[gi] == 2 {
                delta += w.multi_shift;
            }
        }

        // Same-day overlap: fires when a second distinct worker joins the day.
        let di = self.day_of[slot];
        let dw = di * self.model.workers + worker;
        self.day_worker_slots[dw] += 1;
        if self.day_worker_slots[dw] == 1 {
            self.day_workers[di] += 1;
            if self.day_workers[di] == 2 {
                delta += w.overlap;
            }
        }

        // Request misses: every claimant other than the assignee misses.
        if claims > 0 {
            let hit = self.claimants[slot].contains(&worker) as i64;
            delta += (claims - hit) * w.request_miss;
        }

        if let Some(ci) = self.cap_of[cell] {
            self.cap_used[ci] += 1;
        }
        self.decision[slot] = Some(worker);
        delta
    }

    /// Reverses `apply`.
    fn undo(&mut self, slot: usize, choice: Option<usize>) {
        let Some(worker) = choice else {
            return;
        };
        let cell = self.cell(worker, slot);
        self.decision[slot] = None;

        if let Some(ci) = self.cap_of[cell] {
            self.cap_used[ci] -= 1;
        }
        if let Some(gi) = self.group_of[cell] {
            self.group_count[gi] -= 1;
        }
        let di = self.day_of[slot];
        let dw = di * self.model.workers + worker;
        self.day_worker_slots[dw] -= 1;
        if self.day_worker_slots[dw] == 0 {
            self.day_workers[di] -= 1;
        }
    }

    /// Applies all hard-forced cells; returns their accumulated cost.
    fn pin_forced(&mut self) -> i64 {
        let mut cost = 0;
        for slot in 0..self.model.slots {
            if let Some(worker) = self.forced[slot] {
                cost += self.apply(slot, Some(worker));
            }
        }
        cost
    }

    /// One greedy pass over the free slots. With an RNG, ties between
    /// equally cheap options are broken at random.
    fn greedy(&mut self, base: i64, mut rng: Option<&mut SmallRng>) -> Incumbent {
        let mut cost = base;
        for pos in 0..self.free.len() {
            let slot = self.free[pos];
            let mut ties: Vec<Option<usize>> = Vec::new();
            let mut best_delta = i64::MAX;

            let mut consider = |search: &mut Self, choice: Option<usize>| {
                let delta = search.apply(slot, choice);
                search.undo(slot, choice);
                if delta < best_delta {
                    best_delta = delta;
                    ties.clear();
                }
                if delta == best_delta {
                    ties.push(choice);
                }
            };
            for i in 0..self.cands[slot].len() {
                let w = self.cands[slot][i];
                if self.within_quota(w, slot) {
                    consider(self, Some(w));
                }
            }
            consider(self, None);

            let pick = match rng.as_deref_mut() {
                Some(rng) if ties.len() > 1 => ties[rng.random_range(0..ties.len())],
                _ => ties[0],
            };
            cost += self.apply(slot, pick);
        }

        let incumbent = Incumbent {
            decision: self.decision.clone(),
            cost,
        };
        // Roll back so the search state holds only the forced pins.
        for pos in (0..self.free.len()).rev() {
            let slot = self.free[pos];
            let choice = self.decision[slot];
            self.undo(slot, choice);
        }
        incumbent
    }

    /// Depth-first branch-and-bound over the free slots. Returns `true`
    /// when the search space was exhausted within the deadline.
    fn branch_and_bound(
        &mut self,
        base: i64,
        best: &mut Incumbent,
        deadline: Instant,
    ) -> bool {
        let mut nodes: u64 = 0;
        let mut timed_out = false;
        self.dfs(0, base, best, deadline, &mut nodes, &mut timed_out);
        !timed_out
    }

    fn dfs(
        &mut self,
        pos: usize,
        cost: i64,
        best: &mut Incumbent,
        deadline: Instant,
        nodes: &mut u64,
        timed_out: &mut bool,
    ) {
        if *timed_out {
            return;
        }
        *nodes += 1;
        if *nodes % DEADLINE_CHECK_NODES == 0 && Instant::now() >= deadline {
            *timed_out = true;
            return;
        }
        if cost + self.suffix_bound[pos] >= best.cost {
            return;
        }
        if pos == self.free.len() {
            best.decision = self.decision.clone();
            best.cost = cost;
            return;
        }

        let slot = self.free[pos];
        let mut options: Vec<(i64, Option<usize>)> = Vec::new();
        for i in 0..self.cands[slot].len() {
            let w = self.cands[slot][i];
            if self.within_quota(w, slot) {
                let delta = self.apply(slot, Some(w));
                self.undo(slot, Some(w));
                options.push((delta, Some(w)));
            }
        }
        {
            let delta = self.apply(slot, None);
            self.undo(slot, None);
            options.push((delta, None));
        }
        options.sort_by_key(|(delta, _)| *delta);

        for (delta, choice) in options {
            self.apply(slot, choice);
            self.dfs(pos + 1, cost + delta, best, deadline, nodes, timed_out);
            self.undo(slot, choice);
            if *timed_out {
                return;
            }
        }
    }
}

/// Builds the assignment triple from a complete decision vector.
///
/// Every registered worker appears in the per-worker index, assigned or not.
fn extract(state: &RosterState, decision: &[Option<usize>]) -> AssignmentState {
    let mut assignment = AssignmentState::unassigned(&state.slots);
    for name in &state.workers {
        assignment.by_worker.entry(name.clone()).or_default();
    }
    for (s, choice) in decision.iter().enumerate() {
        if let Some(w) = choice {
            let name = state.workers[*w].clone();
            assignment.fill(s, &state.slots[s], &name);
        }
    }
    assignment
}
