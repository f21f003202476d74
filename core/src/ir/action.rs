//! Manipulator actions
//!
//! The four blocks world operators as a closed sum type. Configurations
//! dispatch on the variant in a single `match`.

use super::symbols::{BlockId, BlockTable};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single manipulator action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    /// Lift a block that stands alone on the table
    Pickup { block: BlockId },

    /// Put the held block down on the table as a new stack
    Putdown { block: BlockId },

    /// Put the held block `top` onto the stack topped by `bottom`
    Stack { top: BlockId, bottom: BlockId },

    /// Lift `top` off `bottom`
    Unstack { top: BlockId, bottom: BlockId },
}

impl Action {
    pub fn pickup(block: BlockId) -> Self {
        Action::Pickup { block }
    }

    pub fn putdown(block: BlockId) -> Self {
        Action::Putdown { block }
    }

    pub fn stack(top: BlockId, bottom: BlockId) -> Self {
        Action::Stack { top, bottom }
    }

    pub fn unstack(top: BlockId, bottom: BlockId) -> Self {
        Action::Unstack { top, bottom }
    }

    /// Operator name as used in plans and PDDL
    pub fn name(&self) -> &'static str {
        match self {
            Action::Pickup { .. } => "pickup",
            Action::Putdown { .. } => "putdown",
            Action::Stack { .. } => "stack",
            Action::Unstack { .. } => "unstack",
        }
    }

    /// The block moved by this action
    pub fn block(&self) -> BlockId {
        match *self {
            Action::Pickup { block } | Action::Putdown { block } => block,
            Action::Stack { top, .. } | Action::Unstack { top, .. } => top,
        }
    }

    /// The action that undoes this one
    pub fn inverse(&self) -> Action {
        match *self {
            Action::Pickup { block } => Action::Putdown { block },
            Action::Putdown { block } => Action::Pickup { block },
            Action::Stack { top, bottom } => Action::Unstack { top, bottom },
            Action::Unstack { top, bottom } => Action::Stack { top, bottom },
        }
    }

    /// Render with the labels of a block table
    pub fn labeled<'a>(&self, table: &'a BlockTable) -> LabeledAction<'a> {
        LabeledAction {
            action: *self,
            table,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Pickup { block } | Action::Putdown { block } => {
                write!(f, "({} {})", self.name(), block.0)
            }
            Action::Stack { top, bottom } | Action::Unstack { top, bottom } => {
                write!(f, "({} {} {})", self.name(), top.0, bottom.0)
            }
        }
    }
}

/// An [`Action`] displayed with block labels instead of raw ids
#[derive(Debug, Clone, Copy)]
pub struct LabeledAction<'a> {
    action: Action,
    table: &'a BlockTable,
}

impl fmt::Display for LabeledAction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.action.name();
        match self.action {
            Action::Pickup { block } | Action::Putdown { block } => {
                write!(f, "({} {})", name, self.table.display(block))
            }
            Action::Stack { top, bottom } | Action::Unstack { top, bottom } => write!(
                f,
                "({} {} {})",
                name,
                self.table.display(top),
                self.table.display(bottom)
            ),
        }
    }
}
