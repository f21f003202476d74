//! Best-first (A*) graph search
//!
//! Domain-agnostic: works on any [`SearchState`] and is parameterized by an
//! edge cost, a heuristic and a cycle filter. With an admissible heuristic
//! the returned plan has minimum cost; improved states are re-opened, so the
//! heuristic does not need to be consistent for that.

use super::limits::SearchLimits;
use super::result::{SearchResult, SearchStatus};
use super::strategy::{
    CycleFilter, EdgeCost, Heuristic, NeverPrune, NullHeuristic, SearchState, UnitCost,
};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;
use tracing::{debug, trace};

/// Frontier entry ordered by priority, then by insertion order
///
/// The state is opaque payload and never compared.
struct FrontierEntry<S> {
    priority: u32,
    seq: u64,
    state: S,
}

impl<S> PartialEq for FrontierEntry<S> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<S> Eq for FrontierEntry<S> {}

impl<S> PartialOrd for FrontierEntry<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S> Ord for FrontierEntry<S> {
    // BinaryHeap is a max-heap: reverse so the lowest priority pops first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Best-first search solver
#[derive(Debug, Clone, Default)]
pub struct BestFirstSolver<C = UnitCost, H = NullHeuristic, P = NeverPrune> {
    cost: C,
    heuristic: H,
    filter: P,
    limits: SearchLimits,
}

impl BestFirstSolver {
    /// Unit edge costs, zero heuristic, no pruning
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C, H, P> BestFirstSolver<C, H, P> {
    pub fn with_cost<C2>(self, cost: C2) -> BestFirstSolver<C2, H, P> {
        BestFirstSolver {
            cost,
            heuristic: self.heuristic,
            filter: self.filter,
            limits: self.limits,
        }
    }

    pub fn with_heuristic<H2>(self, heuristic: H2) -> BestFirstSolver<C, H2, P> {
        BestFirstSolver {
            cost: self.cost,
            heuristic,
            filter: self.filter,
            limits: self.limits,
        }
    }

    pub fn with_cycle_filter<P2>(self, filter: P2) -> BestFirstSolver<C, H, P2> {
        BestFirstSolver {
            cost: self.cost,
            heuristic: self.heuristic,
            filter,
            limits: self.limits,
        }
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Search for a path from `start` to a state equal to `goal`
    pub fn solve<S>(&self, start: S, goal: &S) -> SearchResult<S::Action>
    where
        S: SearchState,
        C: EdgeCost<S>,
        H: Heuristic<S>,
        P: CycleFilter<S>,
    {
        let started = Instant::now();
        let result = self.run(start, goal);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        debug!(
            status = ?result.status,
            plan_length = result.plan.len(),
            expanded = result.states_expanded,
            generated = result.successors_generated,
            elapsed_ms,
            "best-first search finished"
        );
        result.with_elapsed_ms(elapsed_ms)
    }

    fn run<S>(&self, start: S, goal: &S) -> SearchResult<S::Action>
    where
        S: SearchState,
        C: EdgeCost<S>,
        H: Heuristic<S>,
        P: CycleFilter<S>,
    {
        let mut came_from: FxHashMap<S, S> = FxHashMap::default();
        let mut g_score: FxHashMap<S, u32> = FxHashMap::default();
        let mut frontier = BinaryHeap::new();
        let mut seq = 0u64;
        let mut expanded = 0usize;
        let mut generated = 0usize;

        g_score.insert(start.clone(), 0);
        frontier.push(FrontierEntry {
            priority: self.heuristic.estimate(&start),
            seq,
            state: start,
        });

        while let Some(FrontierEntry {
            priority,
            state: current,
            ..
        }) = frontier.pop()
        {
            if let Some(status) = self.limits.check(expanded) {
                return SearchResult::failed(status, expanded, generated);
            }

            if current == *goal {
                let plan = reconstruct_path(&came_from, &current);
                return SearchResult::solved(plan, expanded, generated);
            }

            expanded += 1;
            trace!(expanded, priority, frontier = frontier.len(), "expanding");

            let current_g = g_score.get(&current).copied().unwrap_or(u32::MAX);
            for neighbor in current.successors() {
                generated += 1;
                let tentative = current_g.saturating_add(self.cost.cost(&current, &neighbor));
                let known = g_score.get(&neighbor).copied().unwrap_or(u32::MAX);
                if tentative >= known {
                    continue;
                }

                // Replace the key as well, so the stored state carries the
                // origin that matches its new parent.
                came_from.remove(&neighbor);
                came_from.insert(neighbor.clone(), current.clone());
                g_score.insert(neighbor.clone(), tentative);

                if self.filter.prune(&neighbor, &came_from) {
                    continue;
                }

                seq += 1;
                frontier.push(FrontierEntry {
                    priority: tentative.saturating_add(self.heuristic.estimate(&neighbor)),
                    seq,
                    state: neighbor,
                });
            }
        }

        SearchResult::failed(SearchStatus::Exhausted, expanded, generated)
    }
}

/// Follow parent pointers back from `goal`, collecting each state's origin
fn reconstruct_path<S: SearchState>(came_from: &FxHashMap<S, S>, goal: &S) -> Vec<S::Action> {
    let mut actions = Vec::new();
    let mut cursor = goal;

    for _ in 0..=came_from.len() {
        let Some((state, parent)) = came_from.get_key_value(cursor) else {
            break;
        };
        if let Some(action) = state.origin() {
            actions.push(action.clone());
        }
        cursor = parent;
    }

    actions.reverse();
    actions
}
