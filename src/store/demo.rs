// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::icons::{BuiltinIcons, IconProvider};
use crate::model::{
    connect_edge_id, skill_id, Element, GraphEdge, GraphNode, Position, UnlockState,
};

use super::Snapshot;

/// Small playable tree used by `--demo`: one Available root with two branches that merge.
pub fn demo_snapshot() -> Snapshot {
    let skills = [
        (1, "Archery", "sword", UnlockState::Available, Position::new(0.0, 0.0)),
        (2, "Tracking", "eye", UnlockState::Hidden, Position::new(-140.0, 160.0)),
        (3, "Camouflage", "leaf", UnlockState::Hidden, Position::new(140.0, 160.0)),
        (4, "Volley", "bolt", UnlockState::Hidden, Position::new(0.0, 320.0)),
    ];
    let descriptions = [
        "Loose arrows at a single target.",
        "Read footprints and follow a trail.",
        "Blend into foliage while standing still.",
        "Rain arrows over an area.",
    ];
    let edges = [(1, 2), (1, 3), (2, 4), (3, 4)];

    let mut elements = Vec::with_capacity(skills.len() * 2 + edges.len());
    for ((n, label, icon, state, position), description) in skills.into_iter().zip(descriptions) {
        let mut skill =
            GraphNode::skill(skill_id(n), label, BuiltinIcons.resolve(icon), state, position);
        skill.set_description(description);
        let flourish = GraphNode::flourish_for(&skill);
        elements.push(Element::Node(skill));
        elements.push(Element::Node(flourish));
    }
    for (source, target) in edges {
        let (source_id, target_id) = (skill_id(source), skill_id(target));
        let edge_id = connect_edge_id(&source_id, &target_id);
        elements.push(Element::Edge(GraphEdge::new(edge_id, source_id, target_id)));
    }

    Snapshot { elements, tree_name: "Ranger".to_owned(), ..Snapshot::default() }
}
