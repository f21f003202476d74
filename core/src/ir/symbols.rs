//! Block symbols
//!
//! Blocks are opaque, totally ordered tokens. External labels (`"b1"`, `"3"`,
//! whatever a problem file uses) are interned once into a [`BlockTable`] and
//! the rest of the planner only ever sees [`BlockId`]s.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Newtype wrapper for block identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Symbol table interning block labels to [`BlockId`]s
///
/// Ids are handed out densely in first-seen order, so the table doubles as
/// the reverse lookup used when printing plans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTable {
    ids: FxHashMap<String, BlockId>,
    labels: Vec<String>,
}

impl BlockTable {
    /// Create a new empty block table
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a block label, returning its ID (creates a new ID if the label was not seen before)
    pub fn get_or_intern(&mut self, label: &str) -> BlockId {
        if let Some(&id) = self.ids.get(label) {
            return id;
        }
        let id = BlockId(self.labels.len() as u32);
        self.ids.insert(label.to_string(), id);
        self.labels.push(label.to_string());
        id
    }

    /// Look up the ID of an already interned label
    pub fn get(&self, label: &str) -> Option<BlockId> {
        self.ids.get(label).copied()
    }

    /// Reverse lookup: the label a block was interned from
    pub fn label(&self, id: BlockId) -> Option<&str> {
        self.labels.get(id.0 as usize).map(|s| s.as_str())
    }

    /// Label of a block, falling back to its numeric form for unknown ids
    pub fn display(&self, id: BlockId) -> String {
        match self.label(id) {
            Some(label) => label.to_string(),
            None => id.to_string(),
        }
    }

    /// Number of interned blocks
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate over `(id, label)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &str)> {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, label)| (BlockId(i as u32), label.as_str()))
    }
}
