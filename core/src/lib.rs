//! Blocks world planner core
//!
//! Configurations of stacked blocks, an optimal best-first solver and a
//! fast constructive solver

pub mod ir;     // Intermediate representation (blocks, actions, configurations, plans)
pub mod search; // Best-first and constructive solvers
pub mod loader; // Problem loaders (JSON, PDDL)

pub use ir::*;
pub use search::{
    BestFirstSolver, BlocksHeuristic, ConstructiveSolver, PathCycleFilter, SearchLimits,
    SearchResult, SearchStatus,
};
pub use loader::{load_instance, BlocksProblem, LoadError, LoadResult, ProblemInstance, ProblemStats};
