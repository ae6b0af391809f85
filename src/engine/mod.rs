//! Constraint engine: model build, assembly, and bounded-time solve.
//!
//! # Pipeline
//!
//! ```text
//! RosterState ─► RosterModelBuilder ─► RosterModel ─► RosterSolver ─► SolveOutcome
//! ```
//!
//! `solve_roster` runs the whole pipeline; the pieces are public for
//! callers that want to inspect the assembled model or reuse it.
//!
//! # References
//!
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

mod build;
mod model;
mod solver;

pub use build::RosterModelBuilder;
pub use model::{
    MultiShiftGroup, ObjectiveWeights, OverlapDay, QuotaCap, RequestMiss, RosterModel, SpacingPair,
};
pub use solver::{RosterSolver, SolveOutcome, SolveStatus, SolverConfig};

use crate::error::SolveError;
use crate::models::RosterState;

/// Builds the model from the current state and solves it.
///
/// # Errors
/// Propagates the builder's infeasibility errors (a forced request on an
/// unavailable cell, or forced requests breaching a monthly quota).
pub fn solve_roster(state: &RosterState, config: &SolverConfig) -> Result<SolveOutcome, SolveError> {
    let model = RosterModelBuilder::new(state).build()?;
    let solver = RosterSolver::new().with_config(config.clone());
    Ok(solver.solve(&model, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{slot_grid, MonthKey, RosterState};
    use chrono::NaiveDate;
    use std::time::Duration;

    #[test]
    fn test_solve_roster_end_to_end() {
        let d1 = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let d3 = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        let slots = slot_grid(d1, d3, &["L1", "L2", "L3"]);
        let mut state = RosterState::new(vec!["Alice".into(), "Bob".into()], slots);
        state.set_quota("Alice", MonthKey::new(2025, 6), 3);
        state.set_quota("Bob", MonthKey::new(2025, 6), 3);

        let config = SolverConfig {
            time_budget: Duration::from_millis(500),
            ..SolverConfig::default()
        };
        let outcome = solve_roster(&state, &config).unwrap();
        assert!(outcome.assignment.is_consistent(&state.slots));
        assert_eq!(outcome.assignment.covered_count(), 6);
        assert_eq!(outcome.assignment.uncovered.len(), 3);
    }
}
