// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use smallvec::SmallVec;

use crate::model::{EdgeId, NodeId};

/// Upper bound on tracked node selections (the Connect workflow needs a pair).
pub const MAX_SELECTED_NODES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Unchanged,
    Added { evicted: Option<NodeId> },
}

/// Selected skills (ordered, oldest first) and selected edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    node_ids: SmallVec<[NodeId; MAX_SELECTED_NODES]>,
    edge_ids: BTreeSet<EdgeId>,
}

impl SelectionSet {
    /// Adds `node_id`; selecting a third node evicts the oldest one.
    pub fn select_node(&mut self, node_id: NodeId) -> SelectOutcome {
        if self.node_ids.contains(&node_id) {
            return SelectOutcome::Unchanged;
        }
        let evicted = if self.node_ids.len() >= MAX_SELECTED_NODES {
            Some(self.node_ids.remove(0))
        } else {
            None
        };
        self.node_ids.push(node_id);
        SelectOutcome::Added { evicted }
    }

    pub fn unselect_node(&mut self, node_id: &NodeId) -> bool {
        let before = self.node_ids.len();
        self.node_ids.retain(|selected| selected != node_id);
        self.node_ids.len() != before
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_ids
    }

    pub fn single(&self) -> Option<&NodeId> {
        match self.node_ids.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    pub fn pair(&self) -> Option<(&NodeId, &NodeId)> {
        match self.node_ids.as_slice() {
            [first, second] => Some((first, second)),
            _ => None,
        }
    }

    pub fn select_edge(&mut self, edge_id: EdgeId) -> bool {
        self.edge_ids.insert(edge_id)
    }

    pub fn unselect_edge(&mut self, edge_id: &EdgeId) -> bool {
        self.edge_ids.remove(edge_id)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = &EdgeId> + '_ {
        self.edge_ids.iter()
    }

    pub fn has_edges(&self) -> bool {
        !self.edge_ids.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty() && self.edge_ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.node_ids.clear();
        self.edge_ids.clear();
    }
}
