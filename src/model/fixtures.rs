// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::element::{Element, GraphEdge, GraphNode, Position, UnlockState};
use super::ids::{connect_edge_id, NodeId};
use crate::icons::{BuiltinIcons, IconProvider, DEFAULT_SKILL_ICON};

pub(crate) fn nid(value: &str) -> NodeId {
    NodeId::new(value).expect("node id")
}

/// Pushes a Skill node and its Flourish twin.
pub(crate) fn push_skill(
    elements: &mut Vec<Element>,
    id: &str,
    initial_state: UnlockState,
    position: Position,
) {
    let skill = GraphNode::skill(
        nid(id),
        id.to_uppercase(),
        BuiltinIcons.resolve(DEFAULT_SKILL_ICON),
        initial_state,
        position,
    );
    let flourish = GraphNode::flourish_for(&skill);
    elements.push(Element::Node(skill));
    elements.push(Element::Node(flourish));
}

pub(crate) fn push_edge(elements: &mut Vec<Element>, source: &str, target: &str) {
    let (source, target) = (nid(source), nid(target));
    elements.push(Element::Edge(GraphEdge::new(connect_edge_id(&source, &target), source, target)));
}

/// `a (Available, root) -> b (Hidden) -> c (Hidden)`.
pub(crate) fn chain_abc() -> Vec<Element> {
    let mut elements = Vec::new();
    push_skill(&mut elements, "a", UnlockState::Available, Position::new(0.0, 0.0));
    push_skill(&mut elements, "b", UnlockState::Hidden, Position::new(0.0, 100.0));
    push_skill(&mut elements, "c", UnlockState::Hidden, Position::new(0.0, 200.0));
    push_edge(&mut elements, "a", "b");
    push_edge(&mut elements, "b", "c");
    elements
}

/// A diamond with two branches that merge: `a -> b, a -> c, b -> d, c -> d`.
pub(crate) fn diamond() -> Vec<Element> {
    let mut elements = Vec::new();
    push_skill(&mut elements, "a", UnlockState::Available, Position::new(0.0, 0.0));
    push_skill(&mut elements, "b", UnlockState::Hidden, Position::new(-80.0, 100.0));
    push_skill(&mut elements, "c", UnlockState::Hidden, Position::new(80.0, 100.0));
    push_skill(&mut elements, "d", UnlockState::Hidden, Position::new(0.0, 200.0));
    push_edge(&mut elements, "a", "b");
    push_edge(&mut elements, "a", "c");
    push_edge(&mut elements, "b", "d");
    push_edge(&mut elements, "c", "d");
    elements
}
