//! Problem loaders for JSON and PDDL blocks world problems
//!
//! Both formats are parsed into a [`BlocksProblem`] (labels only) and then
//! validated into a [`ProblemInstance`] whose configurations satisfy every
//! invariant the solvers rely on.

pub mod json;
pub mod pddl;

use crate::ir::{upper_length_bound, BlockTable, Configuration};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A blocks world problem as written in a problem file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlocksProblem {
    /// Problem ID
    pub id: String,

    /// Initial stacks, each listed bottom to top
    pub initial: Vec<Vec<String>>,

    /// Goal stacks, each listed bottom to top; blocks left out stay on the table
    #[serde(default)]
    pub goal: Vec<Vec<String>>,
}

impl BlocksProblem {
    /// Validate the problem and intern its blocks
    pub fn to_instance(&self) -> LoadResult<ProblemInstance> {
        let mut blocks = BlockTable::new();

        let mut initial = Vec::with_capacity(self.initial.len());
        for stack in &self.initial {
            if stack.is_empty() {
                return Err(LoadError::InvalidFormat(
                    "initial state contains an empty stack".to_string(),
                ));
            }
            let mut ids = Vec::with_capacity(stack.len());
            for label in stack {
                if blocks.get(label).is_some() {
                    return Err(LoadError::DuplicateBlock(label.clone()));
                }
                ids.push(blocks.get_or_intern(label));
            }
            initial.push(ids);
        }

        let mut placed = FxHashSet::default();
        let mut goal = Vec::with_capacity(self.goal.len());
        for stack in self.goal.iter().filter(|s| !s.is_empty()) {
            let mut ids = Vec::with_capacity(stack.len());
            for label in stack {
                let id = blocks
                    .get(label)
                    .ok_or_else(|| LoadError::UnknownGoalBlock(label.clone()))?;
                if !placed.insert(id) {
                    return Err(LoadError::DuplicateBlock(label.clone()));
                }
                ids.push(id);
            }
            goal.push(ids);
        }

        // Blocks the goal does not mention stay on their own on the table
        for (id, _) in blocks.iter() {
            if !placed.contains(&id) {
                goal.push(vec![id]);
            }
        }

        let initial = Configuration::new(initial)
            .map_err(|e| LoadError::InvalidFormat(e.to_string()))?;
        let goal =
            Configuration::new(goal).map_err(|e| LoadError::InvalidFormat(e.to_string()))?;

        Ok(ProblemInstance {
            id: self.id.clone(),
            blocks,
            initial,
            goal,
        })
    }
}

/// A validated problem ready for the solvers
#[derive(Debug, Clone)]
pub struct ProblemInstance {
    pub id: String,
    pub blocks: BlockTable,
    pub initial: Configuration,
    pub goal: Configuration,
}

impl ProblemInstance {
    pub fn stats(&self) -> ProblemStats {
        let num_blocks = self.initial.num_blocks();
        let initial_stacks = self.initial.num_stacks();
        let goal_stacks = self.goal.num_stacks();
        ProblemStats {
            num_blocks,
            initial_stacks,
            goal_stacks,
            upper_bound: upper_length_bound(num_blocks, initial_stacks, goal_stacks),
        }
    }
}

/// Size of a problem and the length bound for its optimal plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemStats {
    pub num_blocks: usize,
    pub initial_stacks: usize,
    pub goal_stacks: usize,
    pub upper_bound: usize,
}

/// Load a problem file, choosing the parser from its extension
///
/// `.json` files go through [`json::load_problem`], anything else is read as PDDL.
pub fn load_instance<P: AsRef<Path>>(path: P) -> LoadResult<ProblemInstance> {
    let path = path.as_ref();
    let problem = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => json::load_problem(path)?,
        _ => pddl::load_problem(path)?,
    };
    problem.to_instance()
}

/// Problem loader result
pub type LoadResult<T> = Result<T, LoadError>;

/// Problem loading errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// File not found
    FileNotFound(String),

    /// JSON or PDDL parsing error
    ParseError(String),

    /// Invalid problem format
    InvalidFormat(String),

    /// A block appears twice in the same state
    DuplicateBlock(String),

    /// The goal mentions a block the initial state does not have
    UnknownGoalBlock(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::FileNotFound(path) => write!(f, "File not found: {}", path),
            LoadError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            LoadError::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            LoadError::DuplicateBlock(label) => write!(f, "Duplicate block: {}", label),
            LoadError::UnknownGoalBlock(label) => {
                write!(f, "Goal block not in initial state: {}", label)
            }
        }
    }
}

impl std::error::Error for LoadError {}
