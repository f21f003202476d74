//! Both solvers on shared problems
//!
//! The constructive planner must always produce a valid plan, and the
//! best-first solver must never produce a longer one.

use bw_planner_core::*;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

fn config(stacks: Vec<Vec<u32>>) -> Configuration {
    Configuration::new(
        stacks
            .into_iter()
            .map(|s| s.into_iter().map(BlockId).collect())
            .collect(),
    )
    .unwrap()
}

/// Deterministic shuffle of `0..n` split into stacks, driven by `seed`
fn scrambled(n: u32, seed: u64) -> Configuration {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as u32
    };

    let mut blocks: Vec<u32> = (0..n).collect();
    for i in (1..blocks.len()).rev() {
        let j = next() as usize % (i + 1);
        blocks.swap(i, j);
    }

    let mut stacks = vec![Vec::new()];
    for block in blocks {
        if !stacks[stacks.len() - 1].is_empty() && next() % 3 == 0 {
            stacks.push(Vec::new());
        }
        let last = stacks.len() - 1;
        stacks[last].push(block);
    }
    config(stacks)
}

fn optimal(start: &Configuration, goal: &Configuration) -> SearchResult<Action> {
    BestFirstSolver::new()
        .with_heuristic(BlocksHeuristic::new(goal))
        .with_cycle_filter(PathCycleFilter)
        .solve(start.clone(), goal)
}

#[test]
fn test_reversed_towers_both_solvers() {
    let start = config(vec![vec![1, 2, 3], vec![4, 5, 6]]);
    let goal = config(vec![vec![3, 2, 1], vec![6, 5, 4]]);

    let greedy = ConstructiveSolver::new().solve(&start, &goal).unwrap();
    let best = optimal(&start, &goal);

    assert_eq!(greedy.plan_len(), 12);
    assert_eq!(best.plan_len(), 12);
    assert!(Plan::from(greedy.plan).reaches(&start, &goal).unwrap());
    assert!(Plan::from(best.plan).reaches(&start, &goal).unwrap());
}

#[test]
fn test_scrambled_problems() {
    for seed in 0..24u64 {
        let start = scrambled(5, seed);
        let goal = scrambled(5, seed + 1000);

        let greedy = ConstructiveSolver::new().solve(&start, &goal).unwrap();
        let best = optimal(&start, &goal);

        assert!(greedy.is_solved(), "seed {}", seed);
        assert!(best.is_solved(), "seed {}", seed);
        assert!(
            Plan::from(greedy.plan.clone()).reaches(&start, &goal).unwrap(),
            "seed {}: greedy plan invalid",
            seed
        );
        assert!(
            Plan::from(best.plan.clone()).reaches(&start, &goal).unwrap(),
            "seed {}: optimal plan invalid",
            seed
        );
        assert!(best.plan_len() <= greedy.plan_len(), "seed {}: {} -> {}", seed, start, goal);

        let bound = upper_length_bound(5, start.num_stacks(), goal.num_stacks());
        assert!(best.plan_len() <= bound, "seed {}: bound {}", seed, bound);
    }
}

#[test]
fn test_heuristic_matches_uniform_cost_search() {
    for seed in 0..8u64 {
        let start = scrambled(4, seed);
        let goal = scrambled(4, seed + 500);

        let informed = optimal(&start, &goal);
        let blind = BestFirstSolver::new().solve(start.clone(), &goal);

        assert!(blind.is_solved(), "seed {}", seed);
        assert_eq!(informed.plan_len(), blind.plan_len(), "seed {}", seed);
    }
}

#[test]
fn test_raised_cancel_flag_stops_both_solvers() {
    let start = config(vec![vec![1, 2, 3], vec![4, 5, 6]]);
    let goal = config(vec![vec![3, 2, 1], vec![6, 5, 4]]);
    let limits = SearchLimits::unlimited().with_cancel_flag(Arc::new(AtomicBool::new(true)));

    let greedy = ConstructiveSolver::new()
        .with_limits(limits.clone())
        .solve(&start, &goal)
        .unwrap();
    let best = BestFirstSolver::new()
        .with_limits(limits)
        .solve(start.clone(), &goal);

    assert_eq!(greedy.status, SearchStatus::Cancelled);
    assert_eq!(best.status, SearchStatus::Cancelled);
    assert!(best.plan.is_empty());
}
