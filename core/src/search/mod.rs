//! Search module - best-first graph search and the constructive planner
//!
//! Both solvers take a start and a goal configuration and return a
//! [`SearchResult`]; only the best-first solver counts expansions.

pub mod astar;
pub mod greedy;
pub mod limits;
pub mod result;
pub mod strategy;

pub use astar::BestFirstSolver;
pub use greedy::{pending_subgoals, ConstructiveSolver, Subgoals};
pub use limits::SearchLimits;
pub use result::{SearchResult, SearchStatus};
pub use strategy::{
    repeats_ancestor, Ancestry, BlocksHeuristic, CycleFilter, EdgeCost, Heuristic, NeverPrune,
    NullHeuristic, PathCycleFilter, SearchState, UnitCost,
};
