// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use crate::model::{Element, GraphEdge, GraphNode, NodeId};

/// Canonical, order-preserving collection of nodes and edges.
///
/// The renderer reads `all()` as a projection. Mutation happens only through `replace`, which
/// swaps in a whole new list, so a reader holding the previous `Arc` never sees a half-applied
/// update. No invariants are checked here; callers (the ops layer) enforce them.
#[derive(Debug, Clone)]
pub struct ElementStore {
    elements: Arc<[Element]>,
    rev: u64,
    tree_rev: u64,
}

impl Default for ElementStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ElementStore {
    pub fn new(elements: Vec<Element>) -> Self {
        Self { elements: elements.into(), rev: 0, tree_rev: 0 }
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|element| element.id() == id)
    }

    pub fn all(&self) -> Arc<[Element]> {
        Arc::clone(&self.elements)
    }

    pub fn as_slice(&self) -> &[Element] {
        &self.elements
    }

    /// Replaces the whole list with `updater(current)` and bumps the revision.
    pub fn replace<F>(&mut self, updater: F)
    where
        F: FnOnce(&[Element]) -> Vec<Element>,
    {
        let next = updater(&self.elements);
        self.elements = next.into();
        self.rev = self.rev.saturating_add(1);
    }

    /// Monotonic counter bumped by every `replace`; the renderer re-reads when it changes.
    pub fn rev(&self) -> u64 {
        self.rev
    }

    /// Bumped only when something worth persisting changed. Spawning or moving affordance
    /// buttons leaves it alone.
    pub fn tree_rev(&self) -> u64 {
        self.tree_rev
    }

    pub(crate) fn mark_tree_changed(&mut self) {
        self.tree_rev = self.tree_rev.saturating_add(1);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.get(id.as_str()).and_then(Element::as_node)
    }

    pub fn skill(&self, id: &NodeId) -> Option<&GraphNode> {
        self.node(id).filter(|node| node.is_skill())
    }

    pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
        self.get(id).and_then(Element::as_edge)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.elements.iter().filter_map(Element::as_node)
    }

    pub fn skills(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.nodes().filter(|node| node.is_skill())
    }

    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> + '_ {
        self.elements.iter().filter_map(Element::as_edge)
    }

    /// Any edge between `a` and `b`, regardless of direction.
    pub fn edge_between(&self, a: &NodeId, b: &NodeId) -> Option<&GraphEdge> {
        self.edges().find(|edge| edge.joins(a, b))
    }
}
