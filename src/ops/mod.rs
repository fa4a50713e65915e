// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations for the element store.
//!
//! A batch of ops is applied to a scratch copy of the element list and committed with a single
//! `ElementStore::replace`, so a batch either lands completely or not at all. The result carries
//! a minimal delta that callers use to refresh derived state.

use std::collections::BTreeSet;
use std::fmt;

use crate::icons::IconHandle;
use crate::model::{
    flourish_position, EdgeId, Element, GraphEdge, GraphNode, NodeId, NodeKind, Position,
    UnlockState,
};
use crate::store::ElementStore;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Adds a Skill node together with its Flourish twin.
    AddSkill {
        node_id: NodeId,
        label: String,
        icon: IconHandle,
        initial_state: UnlockState,
        position: Position,
    },
    /// Removes a Skill node, its Flourish twin and every incident edge.
    RemoveSkill {
        node_id: NodeId,
    },
    AddEdge {
        edge_id: EdgeId,
        source_id: NodeId,
        target_id: NodeId,
    },
    RemoveEdge {
        edge_id: EdgeId,
    },
    RenameNode {
        node_id: NodeId,
        label: String,
    },
    SetDescription {
        node_id: NodeId,
        description: String,
    },
    /// Sets `initialState` and `tempState` (Builder authoring) on a Skill and its twin.
    SetInitialState {
        node_id: NodeId,
        state: UnlockState,
    },
    SetIcon {
        node_id: NodeId,
        icon: IconHandle,
    },
    /// Moves a node; a Skill drags its Flourish twin along.
    MoveNode {
        node_id: NodeId,
        position: Position,
    },
    /// Bulk progression assignment used by mode transitions and activation cascades.
    SetProgress {
        node_id: NodeId,
        state: Option<UnlockState>,
        temp_state: Option<UnlockState>,
        locked: bool,
    },
    SpawnActions {
        nodes: Vec<GraphNode>,
    },
    MoveActions {
        moves: Vec<(NodeId, Position)>,
    },
    /// Removes Action nodes; ids that are already gone are ignored.
    RemoveActions {
        node_ids: Vec<NodeId>,
    },
}

impl Op {
    /// False for ops that only touch transient Action nodes.
    pub fn changes_tree(&self) -> bool {
        !matches!(
            self,
            Self::SpawnActions { .. } | Self::MoveActions { .. } | Self::RemoveActions { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementRef {
    Node(NodeId),
    Edge(EdgeId),
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(node_id) => write!(f, "node:{node_id}"),
            Self::Edge(edge_id) => write!(f, "edge:{edge_id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub new_rev: u64,
    pub applied: usize,
    pub delta: Delta,
}

/// Minimal delta describing which elements changed as the result of applying ops.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<ElementRef>,
    pub removed: Vec<ElementRef>,
    pub updated: Vec<ElementRef>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: BTreeSet<ElementRef>,
    removed: BTreeSet<ElementRef>,
    updated: BTreeSet<ElementRef>,
}

impl DeltaBuilder {
    fn record_added(&mut self, element_ref: ElementRef) {
        if self.removed.remove(&element_ref) {
            // Removed and re-added within one batch: the element was replaced.
            self.updated.insert(element_ref);
            return;
        }
        self.updated.remove(&element_ref);
        self.added.insert(element_ref);
    }

    fn record_removed(&mut self, element_ref: ElementRef) {
        self.updated.remove(&element_ref);
        if self.added.remove(&element_ref) {
            return;
        }
        self.removed.insert(element_ref);
    }

    fn record_updated(&mut self, element_ref: ElementRef) {
        if self.added.contains(&element_ref) || self.removed.contains(&element_ref) {
            return;
        }
        self.updated.insert(element_ref);
    }

    fn finish(self) -> Delta {
        Delta {
            added: self.added.into_iter().collect(),
            removed: self.removed.into_iter().collect(),
            updated: self.updated.into_iter().collect(),
        }
    }
}

pub fn apply_ops(store: &mut ElementStore, ops: &[Op]) -> Result<ApplyResult, ApplyError> {
    if ops.is_empty() {
        return Ok(ApplyResult { new_rev: store.rev(), applied: 0, delta: Delta::default() });
    }

    let mut scratch = store.as_slice().to_vec();
    let mut delta = DeltaBuilder::default();

    for op in ops {
        apply_op(&mut scratch, op, &mut delta)?;
    }

    store.replace(move |_| scratch);
    if ops.iter().any(Op::changes_tree) {
        store.mark_tree_changed();
    }

    Ok(ApplyResult { new_rev: store.rev(), applied: ops.len(), delta: delta.finish() })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Skill,
    Node,
    Edge,
    Action,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    AlreadyExists { kind: ElementKind, id: String },
    NotFound { kind: ElementKind, id: String },
    NotASkill { node_id: NodeId, found: NodeKind },
    NotAnAction { node_id: NodeId, found: NodeKind },
    SelfLoop { node_id: NodeId },
    DuplicateEdge { source_id: NodeId, target_id: NodeId },
}

impl ApplyError {
    /// True for errors caused by an id that no longer exists (stale references).
    pub fn is_stale_reference(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists { kind, id } => {
                write!(f, "element already exists ({kind:?}, id={id})")
            }
            Self::NotFound { kind, id } => write!(f, "element not found ({kind:?}, id={id})"),
            Self::NotASkill { node_id, found } => {
                write!(f, "node {node_id} is a {} node, expected a skill", found.as_str())
            }
            Self::NotAnAction { node_id, found } => {
                write!(f, "node {node_id} is a {} node, expected an action", found.as_str())
            }
            Self::SelfLoop { node_id } => write!(f, "cannot connect skill {node_id} to itself"),
            Self::DuplicateEdge { source_id, target_id } => {
                write!(f, "skills {source_id} and {target_id} are already connected")
            }
        }
    }
}

impl std::error::Error for ApplyError {}

// Extracted op-application implementation for element mutations.
include!("ops_impl.rs");

#[cfg(test)]
mod tests;
