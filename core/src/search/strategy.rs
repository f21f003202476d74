//! Pluggable search strategies
//!
//! The best-first solver is parameterized by three strategies: the cost of an
//! edge, a heuristic estimate of the remaining cost, and a filter that can
//! refuse to queue a state that repeats one of its ancestors. Closures work
//! for the first two; named defaults cover the common cases.

use crate::ir::Configuration;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

/// A node of a search graph
///
/// Equality and hashing are used for deduplication; `origin` returns the
/// action that produced the state and drives path reconstruction.
pub trait SearchState: Clone + Eq + Hash {
    type Action: Clone;

    /// States reachable in one step
    fn successors(&self) -> Vec<Self>;

    /// The action that produced this state, `None` for a root
    fn origin(&self) -> Option<&Self::Action>;
}

/// Parent pointers recorded during a search
pub trait Ancestry<S> {
    /// The recorded predecessor of `state`, if any
    fn parent_of(&self, state: &S) -> Option<&S>;
}

impl<S: Eq + Hash, H: BuildHasher> Ancestry<S> for HashMap<S, S, H> {
    fn parent_of(&self, state: &S) -> Option<&S> {
        self.get(state)
    }
}

/// Walk the parent pointers from `candidate` and report whether it shows up
/// again on its own path
pub fn repeats_ancestor<S: Eq, A: Ancestry<S> + ?Sized>(candidate: &S, ancestry: &A) -> bool {
    let mut current = candidate;
    while let Some(parent) = ancestry.parent_of(current) {
        if parent == candidate {
            return true;
        }
        current = parent;
    }
    false
}

/// Cost of moving from one state to a successor
pub trait EdgeCost<S> {
    fn cost(&self, from: &S, to: &S) -> u32;
}

impl<S, F> EdgeCost<S> for F
where
    F: Fn(&S, &S) -> u32,
{
    fn cost(&self, from: &S, to: &S) -> u32 {
        self(from, to)
    }
}

/// Every action costs 1
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitCost;

impl<S> EdgeCost<S> for UnitCost {
    fn cost(&self, _from: &S, _to: &S) -> u32 {
        1
    }
}

/// Estimate of the remaining cost from a state to the goal
pub trait Heuristic<S> {
    fn estimate(&self, state: &S) -> u32;
}

impl<S, F> Heuristic<S> for F
where
    F: Fn(&S) -> u32,
{
    fn estimate(&self, state: &S) -> u32 {
        self(state)
    }
}

/// Always 0; turns best-first search into uniform-cost search
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHeuristic;

impl<S> Heuristic<S> for NullHeuristic {
    fn estimate(&self, _state: &S) -> u32 {
        0
    }
}

/// The blocks world heuristic of [`Configuration::heuristic`] against a fixed goal
#[derive(Debug, Clone, Copy)]
pub struct BlocksHeuristic<'a> {
    goal: &'a Configuration,
}

impl<'a> BlocksHeuristic<'a> {
    pub fn new(goal: &'a Configuration) -> Self {
        Self { goal }
    }
}

impl Heuristic<Configuration> for BlocksHeuristic<'_> {
    fn estimate(&self, state: &Configuration) -> u32 {
        state.heuristic(self.goal)
    }
}

/// Decides whether a freshly improved state should stay out of the frontier
pub trait CycleFilter<S> {
    fn prune(&self, candidate: &S, ancestry: &dyn Ancestry<S>) -> bool;
}

/// Queue everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverPrune;

impl<S> CycleFilter<S> for NeverPrune {
    fn prune(&self, _candidate: &S, _ancestry: &dyn Ancestry<S>) -> bool {
        false
    }
}

/// Drop states that repeat an ancestor on their own path
#[derive(Debug, Clone, Copy, Default)]
pub struct PathCycleFilter;

impl<S: Eq> CycleFilter<S> for PathCycleFilter {
    fn prune(&self, candidate: &S, ancestry: &dyn Ancestry<S>) -> bool {
        repeats_ancestor(candidate, ancestry)
    }
}
