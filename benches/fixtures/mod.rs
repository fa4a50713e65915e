// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use skilltree::icons::{BuiltinIcons, IconProvider, DEFAULT_SKILL_ICON};
use skilltree::model::{
    connect_edge_id, skill_id, Element, GraphEdge, GraphNode, NodeId, Position, UnlockState,
};
use skilltree::store::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Small,
    Medium,
    Large,
}

impl Case {
    pub const ALL: [Case; 3] = [Case::Small, Case::Medium, Case::Large];

    pub fn id(self) -> &'static str {
        match self {
            Case::Small => "small",
            Case::Medium => "medium",
            Case::Large => "large",
        }
    }

    /// `(layers, skills per layer)`.
    fn shape(self) -> (u64, u64) {
        match self {
            Case::Small => (4, 5),
            Case::Medium => (10, 20),
            Case::Large => (25, 80),
        }
    }
}

/// Layered DAG: one Available root feeding layer 1, every later skill fed by one or two skills
/// of the previous layer. Skill numbers are `layer * width + column + 1`.
pub fn layered_tree(case: Case) -> Vec<Element> {
    let (layers, width) = case.shape();
    let icon = BuiltinIcons.resolve(DEFAULT_SKILL_ICON);
    let mut elements = Vec::new();

    let root = skill_id(0);
    push_skill(&mut elements, root.clone(), UnlockState::Available, Position::new(0.0, -150.0), &icon);

    for layer in 0..layers {
        for column in 0..width {
            let id = number(layer, column, width);
            let position = Position::new(column as f64 * 120.0, layer as f64 * 150.0);
            push_skill(&mut elements, id.clone(), UnlockState::Hidden, position, &icon);

            if layer == 0 {
                push_edge(&mut elements, &root, &id);
                continue;
            }
            push_edge(&mut elements, &number(layer - 1, column, width), &id);
            if column % 3 == 0 && column + 1 < width {
                push_edge(&mut elements, &number(layer - 1, column + 1, width), &id);
            }
        }
    }
    elements
}

/// `layered_tree` plus one edge from the deepest layer back to the root.
pub fn cyclic_tree(case: Case) -> Vec<Element> {
    let (layers, width) = case.shape();
    let mut elements = layered_tree(case);
    push_edge(&mut elements, &number(layers - 1, 0, width), &skill_id(0));
    elements
}

pub fn snapshot(case: Case) -> Snapshot {
    Snapshot { elements: layered_tree(case), ..Snapshot::default() }
}

pub fn root() -> NodeId {
    skill_id(0)
}

/// Two skills of the last layer that are never connected to each other.
pub fn unconnected_pair(case: Case) -> (NodeId, NodeId) {
    let (layers, width) = case.shape();
    (number(layers - 1, 0, width), number(layers - 1, width - 1, width))
}

fn number(layer: u64, column: u64, width: u64) -> NodeId {
    skill_id(layer * width + column + 1)
}

fn push_skill(
    elements: &mut Vec<Element>,
    id: NodeId,
    state: UnlockState,
    position: Position,
    icon: &skilltree::icons::IconHandle,
) {
    let label = format!("Skill {id}");
    let skill = GraphNode::skill(id, label, icon.clone(), state, position);
    let flourish = GraphNode::flourish_for(&skill);
    elements.push(Element::Node(skill));
    elements.push(Element::Node(flourish));
}

fn push_edge(elements: &mut Vec<Element>, source: &NodeId, target: &NodeId) {
    let edge_id = connect_edge_id(source, target);
    elements.push(Element::Edge(GraphEdge::new(edge_id, source.clone(), target.clone())));
}
