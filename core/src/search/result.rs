//! Solver results

use crate::ir::{PlanError, PlanResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How a solver call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    /// The goal was reached
    Solved,

    /// The frontier ran dry without reaching the goal
    Exhausted,

    /// The deadline passed
    TimedOut,

    /// The cancel flag was raised
    Cancelled,

    /// The expansion budget ran out
    BudgetExhausted,
}

/// Outcome of a solver call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult<A> {
    pub status: SearchStatus,

    /// Actions from start to goal; empty unless solved
    pub plan: Vec<A>,

    /// States removed from the frontier and expanded (0 for the constructive planner)
    pub states_expanded: usize,

    /// Successors generated while expanding
    pub successors_generated: usize,

    /// Wall-clock time spent in the solver
    pub elapsed_ms: u64,
}

impl<A> SearchResult<A> {
    pub fn solved(plan: Vec<A>, states_expanded: usize, successors_generated: usize) -> Self {
        Self {
            status: SearchStatus::Solved,
            plan,
            states_expanded,
            successors_generated,
            elapsed_ms: 0,
        }
    }

    /// A result without a plan
    pub fn failed(status: SearchStatus, states_expanded: usize, successors_generated: usize) -> Self {
        Self {
            status,
            plan: Vec::new(),
            states_expanded,
            successors_generated,
            elapsed_ms: 0,
        }
    }

    pub(crate) fn with_elapsed_ms(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    pub fn is_solved(&self) -> bool {
        self.status == SearchStatus::Solved
    }

    pub fn plan_len(&self) -> usize {
        self.plan.len()
    }
}

impl<A: Serialize> SearchResult<A> {
    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> PlanResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON form of this result to `path`
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> PlanResult<()> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(PlanError::from)
    }
}

impl<A: DeserializeOwned> SearchResult<A> {
    pub fn from_json(json: &str) -> PlanResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a result previously written with [`SearchResult::to_json_file`]
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> PlanResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Action, BlockId};

    #[test]
    fn test_solved_and_failed() {
        let ok = SearchResult::solved(vec![Action::pickup(BlockId(1))], 3, 7);
        assert!(ok.is_solved());
        assert_eq!(ok.plan_len(), 1);

        let failed: SearchResult<Action> = SearchResult::failed(SearchStatus::Exhausted, 3, 7);
        assert!(!failed.is_solved());
        assert!(failed.plan.is_empty());
    }

    #[test]
    fn test_json_fields() {
        let result = SearchResult::solved(vec![Action::putdown(BlockId(2))], 1, 2);
        let value: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();

        assert_eq!(value["status"], "solved");
        assert_eq!(value["plan"][0]["action"], "putdown");
        assert_eq!(value["states_expanded"], 1);
        assert_eq!(value["successors_generated"], 2);
    }
}
