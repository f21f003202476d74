//! Constructive blocks world planner
//!
//! Builds a plan without graph search: repeatedly moves blocks straight to
//! their goal support when that support is free, and otherwise clears the
//! shortest unfinished stack onto the table. Always terminates on a valid
//! instance, with no optimality bound.

use super::limits::SearchLimits;
use super::result::SearchResult;
use crate::ir::{Action, BlockId, Configuration, PlanError, PlanResult, Support};
use rustc_hash::{FxHashMap, FxHashSet};
use std::time::Instant;
use tracing::{debug, trace};

/// Pending subgoals: block -> the support it has to end up on
pub type Subgoals = FxHashMap<BlockId, Support>;

/// Find the goals that must be achieved first
///
/// For each goal tower, bottom to top, the first block whose current support
/// differs from its goal support. Blocks above it wait until it is settled.
pub fn pending_subgoals(current: &Configuration, goal: &Configuration) -> Subgoals {
    let mut subgoals = Subgoals::default();
    for stack in goal.stacks().values() {
        for &block in stack {
            let target = goal.support_of(block);
            if target != current.support_of(block) {
                if let Some(target) = target {
                    subgoals.insert(block, target);
                }
                break;
            }
        }
    }
    subgoals
}

/// Greedy constructive solver
#[derive(Debug, Clone, Default)]
pub struct ConstructiveSolver {
    limits: SearchLimits,
}

impl ConstructiveSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Plan from `start` to `goal`
    ///
    /// Works on a private copy of `start`; the committed actions are the plan.
    pub fn solve(
        &self,
        start: &Configuration,
        goal: &Configuration,
    ) -> PlanResult<SearchResult<Action>> {
        let started = Instant::now();
        let result = Planner::new(start, goal)?.run(&self.limits)?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        debug!(
            status = ?result.status,
            plan_length = result.plan.len(),
            elapsed_ms,
            "constructive planner finished"
        );
        Ok(result.with_elapsed_ms(elapsed_ms))
    }
}

/// State of one planning run
struct Planner<'a> {
    working: Configuration,
    goal: &'a Configuration,
    actions: Vec<Action>,
    placed: FxHashSet<BlockId>,
}

impl<'a> Planner<'a> {
    fn new(start: &Configuration, goal: &'a Configuration) -> PlanResult<Self> {
        let start_blocks = start.blocks();
        let goal_blocks = goal.blocks();
        if start_blocks != goal_blocks {
            let in_goal: FxHashSet<BlockId> = goal_blocks.iter().copied().collect();
            let in_start: FxHashSet<BlockId> = start_blocks.iter().copied().collect();
            return Err(PlanError::BlockMismatch {
                missing_from_goal: start_blocks
                    .into_iter()
                    .filter(|b| !in_goal.contains(b))
                    .collect(),
                missing_from_start: goal_blocks
                    .into_iter()
                    .filter(|b| !in_start.contains(b))
                    .collect(),
            });
        }

        Ok(Self {
            working: start.clone(),
            goal,
            actions: Vec::new(),
            placed: FxHashSet::default(),
        })
    }

    fn run(mut self, limits: &SearchLimits) -> PlanResult<SearchResult<Action>> {
        if let Some(held) = self.working.held() {
            self.commit(Action::putdown(held))?;
        }

        let mut subgoals = pending_subgoals(&self.working, self.goal);
        let mut steps = 0usize;

        while !subgoals.is_empty() {
            if let Some(status) = limits.check(steps) {
                return Ok(SearchResult::failed(status, 0, 0));
            }
            steps += 1;

            if let Some(block) = self.place_block(&subgoals)? {
                self.placed.insert(block);
            } else {
                self.unblock(subgoals.len())?;
            }
            subgoals = pending_subgoals(&self.working, self.goal);
        }

        Ok(SearchResult::solved(self.actions, 0, 0))
    }

    /// Move one stack top straight onto its goal support, if any can be
    fn place_block(&mut self, subgoals: &Subgoals) -> PlanResult<Option<BlockId>> {
        let candidate = self.working.stacks().iter().find_map(|(&top, stack)| {
            let target = *subgoals.get(&top)?;
            let free = match target {
                Support::Table => true,
                Support::On(below) => self.working.is_top(below),
            };
            free.then(|| (top, detach_action(top, stack), target))
        });

        let Some((block, detach, target)) = candidate else {
            return Ok(None);
        };

        self.commit(detach)?;
        self.commit(match target {
            Support::Table => Action::putdown(block),
            Support::On(below) => Action::stack(block, below),
        })?;
        trace!(block = block.0, ?target, "placed block");
        Ok(Some(block))
    }

    /// Move the top of the shortest stack that is not finished to the table
    fn unblock(&mut self, remaining: usize) -> PlanResult<()> {
        let candidate = self
            .working
            .stacks()
            .iter()
            .filter(|(top, stack)| stack.len() > 1 && !self.placed.contains(*top))
            .min_by_key(|(_, stack)| stack.len())
            .map(|(&top, stack)| (top, stack[stack.len() - 2]));

        let Some((top, below)) = candidate else {
            return Err(PlanError::Stalled { remaining });
        };

        self.commit(Action::unstack(top, below))?;
        self.commit(Action::putdown(top))?;
        trace!(block = top.0, "moved block to the table");
        Ok(())
    }

    fn commit(&mut self, action: Action) -> PlanResult<()> {
        self.working.apply(action)?;
        self.actions.push(action);
        Ok(())
    }
}

/// The action that lifts `top` off the stack it heads
fn detach_action(top: BlockId, stack: &[BlockId]) -> Action {
    if stack.len() == 1 {
        Action::pickup(top)
    } else {
        Action::unstack(top, stack[stack.len() - 2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::result::SearchStatus;
    use crate::search::BestFirstSolver;
    use std::time::Duration;

    fn b(id: u32) -> BlockId {
        BlockId(id)
    }

    fn config(stacks: &[&[u32]]) -> Configuration {
        Configuration::new(
            stacks
                .iter()
                .map(|s| s.iter().copied().map(BlockId).collect())
                .collect(),
        )
        .unwrap()
    }

    fn replay(start: &Configuration, plan: &[Action]) -> Configuration {
        let mut state = start.clone();
        for action in plan {
            state.apply(*action).unwrap();
        }
        state
    }

    #[test]
    fn test_subgoals_stop_at_first_mismatch() {
        let current = config(&[&[1, 2, 3]]);
        let goal = config(&[&[1, 3, 2]]);

        let subgoals = pending_subgoals(&current, &goal);
        assert_eq!(subgoals.len(), 1);
        assert_eq!(subgoals.get(&b(3)), Some(&Support::On(b(1))));
    }

    #[test]
    fn test_no_subgoals_when_done() {
        let state = config(&[&[1, 2], &[3]]);
        assert!(pending_subgoals(&state, &state).is_empty());
    }

    #[test]
    fn test_already_solved() {
        let state = config(&[&[1, 2], &[3]]);
        let result = ConstructiveSolver::new().solve(&state, &state).unwrap();

        assert!(result.is_solved());
        assert!(result.plan.is_empty());
    }

    #[test]
    fn test_reversed_towers_take_twelve_actions() {
        let start = config(&[&[1, 2, 3], &[4, 5, 6]]);
        let goal = config(&[&[3, 2, 1], &[6, 5, 4]]);

        let result = ConstructiveSolver::new().solve(&start, &goal).unwrap();

        assert!(result.is_solved());
        assert_eq!(result.plan.len(), 12);
        assert_eq!(replay(&start, &result.plan), goal);
    }

    #[test]
    fn test_unblocking_uncovers_subgoal() {
        // 1 has to go onto 2 but 3 sits on it, and 3 is not a subgoal yet
        let start = config(&[&[1, 3], &[2]]);
        let goal = config(&[&[2, 1, 3]]);

        let result = ConstructiveSolver::new().solve(&start, &goal).unwrap();
        let plan = &result.plan;

        assert_eq!(plan[0], Action::unstack(b(3), b(1)));
        assert_eq!(plan[1], Action::putdown(b(3)));
        assert_eq!(plan.len(), 6);
        assert_eq!(replay(&start, plan), goal);
    }

    #[test]
    fn test_placement_frees_buried_target() {
        // 1 has to go onto 3, which is buried under 4
        let start = config(&[&[3, 4], &[1]]);
        let goal = config(&[&[3, 1], &[4]]);

        let result = ConstructiveSolver::new().solve(&start, &goal).unwrap();
        let plan = &result.plan;

        assert_eq!(plan[0], Action::unstack(b(4), b(3)));
        assert_eq!(plan[1], Action::putdown(b(4)));
        assert_eq!(replay(&start, plan), goal);
        assert_eq!(plan.len(), 4);
    }

    #[test]
    fn test_does_not_disturb_finished_stacks() {
        // [1, 2] is already right; only 3 and 4 need work
        let start = config(&[&[1, 2], &[4, 3]]);
        let goal = config(&[&[1, 2], &[3, 4]]);

        let result = ConstructiveSolver::new().solve(&start, &goal).unwrap();

        assert_eq!(replay(&start, &result.plan), goal);
        assert_eq!(result.plan.len(), 4);
    }

    #[test]
    fn test_held_block_is_put_down_first() {
        let start = Configuration::with_held(vec![vec![b(1)]], Some(b(2))).unwrap();
        let goal = config(&[&[1, 2]]);

        let result = ConstructiveSolver::new().solve(&start, &goal).unwrap();

        assert_eq!(result.plan[0], Action::putdown(b(2)));
        assert_eq!(replay(&start, &result.plan), goal);
    }

    #[test]
    fn test_block_mismatch_is_rejected() {
        let start = config(&[&[1, 2]]);
        let goal = config(&[&[1, 3]]);

        match ConstructiveSolver::new().solve(&start, &goal) {
            Err(PlanError::BlockMismatch {
                missing_from_goal,
                missing_from_start,
            }) => {
                assert_eq!(missing_from_goal, vec![b(2)]);
                assert_eq!(missing_from_start, vec![b(3)]);
            }
            other => panic!("expected a block mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_deadline_stops_planner() {
        let start = config(&[&[1, 2]]);
        let goal = config(&[&[2, 1]]);

        let result = ConstructiveSolver::new()
            .with_limits(SearchLimits::unlimited().with_timeout(Duration::ZERO))
            .solve(&start, &goal)
            .unwrap();

        assert_eq!(result.status, SearchStatus::TimedOut);
        assert!(result.plan.is_empty());
    }

    #[test]
    fn test_never_shorter_than_best_first() {
        let cases = vec![
            (config(&[&[1, 2, 3]]), config(&[&[3, 1], &[2]])),
            (config(&[&[1], &[2], &[3]]), config(&[&[1, 2, 3]])),
            (config(&[&[4, 1], &[3, 2]]), config(&[&[1, 2, 3, 4]])),
            (config(&[&[1, 2, 3, 4]]), config(&[&[2, 4], &[1, 3]])),
        ];

        for (start, goal) in cases {
            let greedy = ConstructiveSolver::new().solve(&start, &goal).unwrap();
            let optimal = BestFirstSolver::new().solve(start.clone(), &goal);

            assert!(greedy.is_solved());
            assert!(optimal.is_solved());
            assert_eq!(replay(&start, &greedy.plan), goal);
            assert!(optimal.plan.len() <= greedy.plan.len(), "{} -> {}", start, goal);
        }
    }
}
