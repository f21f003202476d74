//! Intermediate Representation (IR) module for the blocks world planner
//!
//! This module provides the core data structures the solvers work on:
//! - **symbols**: Opaque block identifiers with label interning
//! - **action**: The four manipulator actions
//! - **configuration**: One arrangement of blocks and its transitions
//! - **plan**: Action sequences, replay and planning errors
//!
//! # Example
//!
//! ```rust
//! use bw_planner_core::ir::*;
//!
//! // Intern some block labels
//! let mut blocks = BlockTable::new();
//! let a = blocks.get_or_intern("a");
//! let b = blocks.get_or_intern("b");
//!
//! // b rests on a
//! let mut state = Configuration::new(vec![vec![a, b]]).unwrap();
//! assert_eq!(state.support_of(b), Some(Support::On(a)));
//!
//! // Move b to the table
//! state.apply(Action::unstack(b, a)).unwrap();
//! state.apply(Action::putdown(b)).unwrap();
//! assert_eq!(state.render(&blocks), "{}[a][b]");
//! ```

mod action;
mod configuration;
mod plan;
mod symbols;

// Re-export all public items for convenient access
pub use action::{Action, LabeledAction};
pub use configuration::{Configuration, StateError, StateResult, Support};
pub use plan::{upper_length_bound, Plan, PlanError, PlanResult};
pub use symbols::{BlockId, BlockTable};
