//! Plans
//!
//! A plan is the ordered list of actions a solver committed to, plus the
//! error type for planning runs and a few diagnostics.

use super::action::Action;
use super::configuration::{Configuration, StateError, StateResult};
use super::symbols::{BlockId, BlockTable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while producing or exporting a plan
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("illegal transition: {0}")]
    Transition(#[from] StateError),

    #[error("start and goal hold different blocks (only in start: {missing_from_goal:?}, only in goal: {missing_from_start:?})")]
    BlockMismatch {
        missing_from_goal: Vec<BlockId>,
        missing_from_start: Vec<BlockId>,
    },

    #[error("no block can be placed or cleared with {remaining} subgoals left")]
    Stalled { remaining: usize },

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for planning operations
pub type PlanResult<T> = Result<T, PlanError>;

/// An ordered sequence of actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub actions: Vec<Action>,
}

impl From<Vec<Action>> for Plan {
    fn from(actions: Vec<Action>) -> Self {
        Self { actions }
    }
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// Execute the plan from `start` and return the final configuration
    pub fn replay(&self, start: &Configuration) -> StateResult<Configuration> {
        let mut state = start.clone();
        for &action in &self.actions {
            state.apply(action)?;
        }
        Ok(state)
    }

    /// Does executing the plan from `start` end in a configuration equal to `goal`?
    pub fn reaches(&self, start: &Configuration, goal: &Configuration) -> StateResult<bool> {
        Ok(self.replay(start)? == *goal)
    }

    /// Actions rendered with block labels, e.g. `["(unstack b2 b1)", "(putdown b2)"]`
    pub fn labeled(&self, table: &BlockTable) -> Vec<String> {
        self.actions
            .iter()
            .map(|a| a.labeled(table).to_string())
            .collect()
    }
}

/// Upper bound on the length of an optimal plan
///
/// Every block can be moved to the table and then onto its goal support;
/// blocks already at the bottom of a start stack skip the first move, blocks
/// at the bottom of a goal stack skip the second.
pub fn upper_length_bound(num_blocks: usize, start_stacks: usize, goal_stacks: usize) -> usize {
    (4 * num_blocks)
        .saturating_sub(2 * start_stacks)
        .saturating_sub(2 * goal_stacks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(id: u32) -> BlockId {
        BlockId(id)
    }

    #[test]
    fn test_replay_reaches_goal() {
        let start = Configuration::new(vec![vec![b(3), b(2), b(1)]]).unwrap();
        let goal = Configuration::new(vec![vec![b(1), b(2), b(3)]]).unwrap();
        let plan = Plan::new(vec![
            Action::unstack(b(1), b(2)),
            Action::putdown(b(1)),
            Action::unstack(b(2), b(3)),
            Action::stack(b(2), b(1)),
            Action::pickup(b(3)),
            Action::stack(b(3), b(2)),
        ]);

        assert_eq!(plan.len(), 6);
        assert!(plan.reaches(&start, &goal).unwrap());
        assert!(!plan.reaches(&start, &start).unwrap());
    }

    #[test]
    fn test_replay_reports_illegal_action() {
        let start = Configuration::new(vec![vec![b(1), b(2)]]).unwrap();
        let plan = Plan::from(vec![Action::pickup(b(1))]);

        assert!(matches!(plan.replay(&start), Err(StateError::NotOnTop { .. })));
    }

    #[test]
    fn test_empty_plan_replays_to_start() {
        let start = Configuration::new(vec![vec![b(1)], vec![b(2)]]).unwrap();
        let plan = Plan::default();

        assert!(plan.is_empty());
        assert_eq!(plan.replay(&start).unwrap(), start);
    }

    #[test]
    fn test_labeled_actions() {
        let mut table = BlockTable::new();
        let x = table.get_or_intern("x");
        let y = table.get_or_intern("y");
        let plan = Plan::new(vec![Action::unstack(y, x), Action::putdown(y)]);

        assert_eq!(plan.labeled(&table), vec!["(unstack y x)", "(putdown y)"]);
    }

    #[test]
    fn test_upper_length_bound() {
        // 6 blocks in two towers, reversed into two towers
        assert_eq!(upper_length_bound(6, 2, 2), 16);
        // a single block on the table needs nothing
        assert_eq!(upper_length_bound(1, 1, 1), 0);
        assert_eq!(upper_length_bound(0, 0, 0), 0);
    }

    #[test]
    fn test_plan_error_wraps_state_error() {
        let err: PlanError = StateError::EmptyStack.into();
        assert!(err.to_string().contains("at least one block"));
    }
}
