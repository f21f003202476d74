//! Blocks world configurations
//!
//! A [`Configuration`] is one snapshot of the world: which blocks are stacked
//! on which, and what the arm holds. Transitions either mutate in place
//! ([`Configuration::apply`], used by planners that commit actions) or
//! produce a new value ([`Configuration::successor`], used by graph search).

use super::action::Action;
use super::symbols::{BlockId, BlockTable};
use crate::search::strategy::{repeats_ancestor, Ancestry, SearchState};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors raised by configuration construction and transitions
///
/// Transition errors are contract violations: callers should only submit
/// actions produced by [`Configuration::legal_actions`] or validated
/// elsewhere.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("block {0} appears more than once")]
    DuplicateBlock(BlockId),

    #[error("stacks must contain at least one block")]
    EmptyStack,

    #[error("cannot {action}: the arm already holds block {held}")]
    HandNotEmpty { action: Action, held: BlockId },

    #[error("cannot {action}: the arm is not holding block {expected}")]
    NotHolding { action: Action, expected: BlockId },

    #[error("cannot {action}: block {block} is not alone on the table")]
    NotAlone { action: Action, block: BlockId },

    #[error("cannot {action}: block {block} is not a stack top")]
    NotOnTop { action: Action, block: BlockId },

    #[error("cannot {action}: block {block} is already a stack top")]
    AlreadyOnTop { action: Action, block: BlockId },

    #[error("cannot {action}: block {top} does not rest on block {bottom}")]
    NotOn {
        action: Action,
        top: BlockId,
        bottom: BlockId,
    },
}

/// Result type for configuration operations
pub type StateResult<T> = Result<T, StateError>;

/// What a block rests on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Support {
    Table,
    On(BlockId),
}

/// A full snapshot of the blocks world
///
/// Equality and hashing only look at the stacks. The held block and the
/// originating action are carried along but do not contribute to identity.
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Stack top -> blocks of that stack, bottom first
    stacks: BTreeMap<BlockId, Vec<BlockId>>,

    held: Option<BlockId>,

    /// Block -> what it rests on; held blocks have no entry
    support: FxHashMap<BlockId, Support>,

    origin: Option<Action>,
}

impl Configuration {
    /// Build a configuration from stacks listed bottom to top
    pub fn new(stacks: Vec<Vec<BlockId>>) -> StateResult<Self> {
        Self::with_held(stacks, None)
    }

    /// Build a configuration whose arm already holds `held`
    pub fn with_held(stacks: Vec<Vec<BlockId>>, held: Option<BlockId>) -> StateResult<Self> {
        let mut seen = FxHashSet::default();
        let mut support = FxHashMap::default();
        let mut tops = BTreeMap::new();

        for stack in stacks {
            let Some(&top) = stack.last() else {
                return Err(StateError::EmptyStack);
            };
            let mut below = Support::Table;
            for &block in &stack {
                if !seen.insert(block) {
                    return Err(StateError::DuplicateBlock(block));
                }
                support.insert(block, below);
                below = Support::On(block);
            }
            tops.insert(top, stack);
        }

        if let Some(block) = held {
            if !seen.insert(block) {
                return Err(StateError::DuplicateBlock(block));
            }
        }

        Ok(Self {
            stacks: tops,
            held,
            support,
            origin: None,
        })
    }

    /// Apply an action in place
    ///
    /// All preconditions are checked before anything is touched, so a failed
    /// call leaves the configuration unchanged.
    pub fn apply(&mut self, action: Action) -> StateResult<()> {
        match action {
            Action::Pickup { block } => self.pickup(action, block),
            Action::Putdown { block } => self.putdown(action, block),
            Action::Stack { top, bottom } => self.stack(action, top, bottom),
            Action::Unstack { top, bottom } => self.unstack(action, top, bottom),
        }
    }

    /// Copy of this configuration with `action` applied and recorded as its origin
    pub fn successor(&self, action: Action) -> StateResult<Self> {
        let mut next = self.clone();
        next.apply(action)?;
        next.origin = Some(action);
        Ok(next)
    }

    fn pickup(&mut self, action: Action, block: BlockId) -> StateResult<()> {
        self.ensure_hand_empty(action)?;
        match self.stacks.get(&block) {
            None => return Err(StateError::NotOnTop { action, block }),
            Some(stack) if stack.len() != 1 => return Err(StateError::NotAlone { action, block }),
            Some(_) => {}
        }

        self.stacks.remove(&block);
        self.support.remove(&block);
        self.held = Some(block);
        Ok(())
    }

    fn putdown(&mut self, action: Action, block: BlockId) -> StateResult<()> {
        self.ensure_holding(action, block)?;
        if self.stacks.contains_key(&block) {
            return Err(StateError::AlreadyOnTop { action, block });
        }

        self.held = None;
        self.stacks.insert(block, vec![block]);
        self.support.insert(block, Support::Table);
        Ok(())
    }

    fn stack(&mut self, action: Action, top: BlockId, bottom: BlockId) -> StateResult<()> {
        self.ensure_holding(action, top)?;
        let Some(mut stack) = self.stacks.remove(&bottom) else {
            return Err(StateError::NotOnTop {
                action,
                block: bottom,
            });
        };

        stack.push(top);
        self.stacks.insert(top, stack);
        self.support.insert(top, Support::On(bottom));
        self.held = None;
        Ok(())
    }

    fn unstack(&mut self, action: Action, top: BlockId, bottom: BlockId) -> StateResult<()> {
        self.ensure_hand_empty(action)?;
        let Some(stack) = self.stacks.get(&top) else {
            return Err(StateError::NotOnTop { action, block: top });
        };
        if stack.len() < 2 || stack[stack.len() - 2] != bottom {
            return Err(StateError::NotOn {
                action,
                top,
                bottom,
            });
        }

        if let Some(mut stack) = self.stacks.remove(&top) {
            stack.pop();
            self.stacks.insert(bottom, stack);
        }
        self.support.remove(&top);
        self.held = Some(top);
        Ok(())
    }

    fn ensure_hand_empty(&self, action: Action) -> StateResult<()> {
        match self.held {
            Some(held) => Err(StateError::HandNotEmpty { action, held }),
            None => Ok(()),
        }
    }

    fn ensure_holding(&self, action: Action, expected: BlockId) -> StateResult<()> {
        if self.held == Some(expected) {
            Ok(())
        } else {
            Err(StateError::NotHolding { action, expected })
        }
    }

    /// Every action that is legal from this configuration
    ///
    /// Holding a block: put it down, or stack it on any current top.
    /// Hand empty: pick up each lone block, unstack the top of every taller stack.
    pub fn legal_actions(&self) -> Vec<Action> {
        let mut actions = Vec::with_capacity(self.stacks.len() + 1);
        match self.held {
            Some(held) => {
                actions.push(Action::putdown(held));
                actions.extend(self.stacks.keys().map(|&top| Action::stack(held, top)));
            }
            None => {
                for (&top, stack) in &self.stacks {
                    if stack.len() == 1 {
                        actions.push(Action::pickup(top));
                    } else {
                        actions.push(Action::unstack(top, stack[stack.len() - 2]));
                    }
                }
            }
        }
        actions
    }

    /// Every configuration reachable with one action
    pub fn successors(&self) -> Vec<Self> {
        // legal_actions only yields actions whose preconditions hold here
        self.legal_actions()
            .into_iter()
            .filter_map(|action| self.successor(action).ok())
            .collect()
    }

    /// Estimate of the number of actions needed to reach `goal`
    ///
    /// Walks every tower bottom-up. A block has to move once if it rests on
    /// the wrong support or on a block that has to move; it has to move twice
    /// if it rests on the right support but something beneath it has to move.
    /// Each move costs two actions, so a twice-moved block counts four.
    pub fn heuristic(&self, goal: &Configuration) -> u32 {
        let mut move_once: FxHashSet<BlockId> = FxHashSet::default();
        let mut move_twice = 0u32;

        for stack in self.stacks.values() {
            for &block in stack {
                let current = self.support.get(&block).copied();
                let target = goal.support.get(&block).copied();
                let below_moves =
                    matches!(current, Some(Support::On(below)) if move_once.contains(&below));

                if below_moves || current != target {
                    move_once.insert(block);
                    if current == target {
                        move_twice += 1;
                    }
                }
            }
        }

        2 * move_once.len() as u32 + 2 * move_twice
    }

    /// Does `candidate` reappear among its own ancestors?
    pub fn is_cycle<A: Ancestry<Self>>(candidate: &Self, ancestry: &A) -> bool {
        repeats_ancestor(candidate, ancestry)
    }

    /// Stacks keyed by their top block, bottom first
    pub fn stacks(&self) -> &BTreeMap<BlockId, Vec<BlockId>> {
        &self.stacks
    }

    /// The stack whose top is `top`
    pub fn stack_of(&self, top: BlockId) -> Option<&[BlockId]> {
        self.stacks.get(&top).map(|s| s.as_slice())
    }

    pub fn held(&self) -> Option<BlockId> {
        self.held
    }

    /// What `block` rests on; `None` for the held block or unknown blocks
    pub fn support_of(&self, block: BlockId) -> Option<Support> {
        self.support.get(&block).copied()
    }

    /// The action that produced this configuration
    pub fn origin(&self) -> Option<&Action> {
        self.origin.as_ref()
    }

    pub fn is_top(&self, block: BlockId) -> bool {
        self.stacks.contains_key(&block)
    }

    /// All blocks, including the held one, in id order
    pub fn blocks(&self) -> Vec<BlockId> {
        let mut blocks: Vec<BlockId> = self
            .stacks
            .values()
            .flatten()
            .copied()
            .chain(self.held)
            .collect();
        blocks.sort_unstable();
        blocks
    }

    pub fn num_blocks(&self) -> usize {
        self.support.len() + usize::from(self.held.is_some())
    }

    pub fn num_stacks(&self) -> usize {
        self.stacks.len()
    }

    /// Render with block labels, e.g. `{c}[a, b][d]`
    pub fn render(&self, table: &BlockTable) -> String {
        let held = self.held.map(|b| table.display(b)).unwrap_or_default();
        let mut out = format!("{{{}}}", held);
        for stack in self.stacks.values() {
            let labels: Vec<String> = stack.iter().map(|&b| table.display(b)).collect();
            out.push_str(&format!("[{}]", labels.join(", ")));
        }
        out
    }
}

impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.stacks == other.stacks
    }
}

impl Eq for Configuration {}

impl Hash for Configuration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.stacks.hash(state);
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.held {
            Some(held) => write!(f, "{{{}}}", held.0)?,
            None => write!(f, "{{}}")?,
        }
        for stack in self.stacks.values() {
            let ids: Vec<String> = stack.iter().map(|b| b.0.to_string()).collect();
            write!(f, "[{}]", ids.join(", "))?;
        }
        Ok(())
    }
}

impl SearchState for Configuration {
    type Action = Action;

    fn successors(&self) -> Vec<Self> {
        Configuration::successors(self)
    }

    fn origin(&self) -> Option<&Action> {
        Configuration::origin(self)
    }
}
