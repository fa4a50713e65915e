// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Element mutation helpers used by `apply_ops`.
/// Keeps `ops::mod` focused on public op types and orchestration.
fn apply_op(elements: &mut Vec<Element>, op: &Op, delta: &mut DeltaBuilder) -> Result<(), ApplyError> {
    match op {
        Op::AddSkill { node_id, label, icon, initial_state, position } => {
            let twin = crate::model::flourish_id(node_id);
            for id in [node_id, &twin] {
                if element_index(elements, id.as_str()).is_some() {
                    return Err(ApplyError::AlreadyExists {
                        kind: ElementKind::Node,
                        id: id.to_string(),
                    });
                }
            }

            let skill =
                GraphNode::skill(node_id.clone(), label.clone(), icon.clone(), *initial_state, *position);
            let flourish = GraphNode::flourish_for(&skill);
            delta.record_added(ElementRef::Node(skill.id().clone()));
            delta.record_added(ElementRef::Node(flourish.id().clone()));
            elements.push(Element::Node(skill));
            elements.push(Element::Node(flourish));
            Ok(())
        }
        Op::RemoveSkill { node_id } => {
            require_skill(elements, node_id)?;

            elements.retain(|element| {
                let remove = match element {
                    Element::Node(node) => {
                        node.id() == node_id
                            || (node.kind() == NodeKind::Flourish
                                && node.parent_skill_id() == Some(node_id))
                    }
                    Element::Edge(edge) => edge.touches(node_id),
                };
                if remove {
                    delta.record_removed(element_ref(element));
                }
                !remove
            });
            Ok(())
        }
        Op::AddEdge { edge_id, source_id, target_id } => {
            if source_id == target_id {
                return Err(ApplyError::SelfLoop { node_id: source_id.clone() });
            }
            require_skill(elements, source_id)?;
            require_skill(elements, target_id)?;
            if element_index(elements, edge_id.as_str()).is_some() {
                return Err(ApplyError::AlreadyExists {
                    kind: ElementKind::Edge,
                    id: edge_id.to_string(),
                });
            }
            let duplicate = elements
                .iter()
                .filter_map(Element::as_edge)
                .any(|edge| edge.joins(source_id, target_id));
            if duplicate {
                return Err(ApplyError::DuplicateEdge {
                    source_id: source_id.clone(),
                    target_id: target_id.clone(),
                });
            }

            elements.push(Element::Edge(GraphEdge::new(
                edge_id.clone(),
                source_id.clone(),
                target_id.clone(),
            )));
            delta.record_added(ElementRef::Edge(edge_id.clone()));
            Ok(())
        }
        Op::RemoveEdge { edge_id } => {
            let Some(index) = elements
                .iter()
                .position(|element| element.as_edge().is_some_and(|edge| edge.id() == edge_id))
            else {
                return Err(ApplyError::NotFound {
                    kind: ElementKind::Edge,
                    id: edge_id.to_string(),
                });
            };
            elements.remove(index);
            delta.record_removed(ElementRef::Edge(edge_id.clone()));
            Ok(())
        }
        Op::RenameNode { node_id, label } => {
            let index = require_skill(elements, node_id)?;
            if let Some(node) = elements[index].as_node_mut() {
                node.set_label(label.clone());
            }
            delta.record_updated(ElementRef::Node(node_id.clone()));
            Ok(())
        }
        Op::SetDescription { node_id, description } => {
            let index = require_skill(elements, node_id)?;
            if let Some(node) = elements[index].as_node_mut() {
                node.set_description(description.clone());
            }
            delta.record_updated(ElementRef::Node(node_id.clone()));
            Ok(())
        }
        Op::SetInitialState { node_id, state } => {
            let index = require_skill(elements, node_id)?;
            if let Some(node) = elements[index].as_node_mut() {
                node.set_initial_state(*state);
                node.set_temp_state(Some(*state));
            }
            delta.record_updated(ElementRef::Node(node_id.clone()));
            mirror_to_flourish(elements, index, delta);
            Ok(())
        }
        Op::SetIcon { node_id, icon } => {
            let index = require_skill(elements, node_id)?;
            if let Some(node) = elements[index].as_node_mut() {
                node.set_icon(Some(icon.clone()));
            }
            delta.record_updated(ElementRef::Node(node_id.clone()));
            Ok(())
        }
        Op::MoveNode { node_id, position } => {
            let Some(index) = node_index(elements, node_id) else {
                return Err(ApplyError::NotFound {
                    kind: ElementKind::Node,
                    id: node_id.to_string(),
                });
            };
            let mut is_skill = false;
            if let Some(node) = elements[index].as_node_mut() {
                node.set_position(*position);
                is_skill = node.is_skill();
            }
            delta.record_updated(ElementRef::Node(node_id.clone()));

            if is_skill {
                let twin = crate::model::flourish_id(node_id);
                if let Some(twin_index) = node_index(elements, &twin) {
                    if let Some(flourish) = elements[twin_index].as_node_mut() {
                        flourish.set_position(flourish_position(*position));
                    }
                    delta.record_updated(ElementRef::Node(twin));
                }
            }
            Ok(())
        }
        Op::SetProgress { node_id, state, temp_state, locked } => {
            let index = require_skill(elements, node_id)?;
            if let Some(node) = elements[index].as_node_mut() {
                node.set_state(*state);
                node.set_temp_state(*temp_state);
                node.set_locked(*locked);
            }
            delta.record_updated(ElementRef::Node(node_id.clone()));
            mirror_to_flourish(elements, index, delta);
            Ok(())
        }
        Op::SpawnActions { nodes } => {
            for node in nodes {
                if !node.is_action() {
                    return Err(ApplyError::NotAnAction {
                        node_id: node.id().clone(),
                        found: node.kind(),
                    });
                }
                if element_index(elements, node.id().as_str()).is_some() {
                    return Err(ApplyError::AlreadyExists {
                        kind: ElementKind::Action,
                        id: node.id().to_string(),
                    });
                }
                elements.push(Element::Node(node.clone()));
                delta.record_added(ElementRef::Node(node.id().clone()));
            }
            Ok(())
        }
        Op::MoveActions { moves } => {
            for (node_id, position) in moves {
                let Some(index) = node_index(elements, node_id) else {
                    continue;
                };
                if let Some(node) = elements[index].as_node_mut().filter(|node| node.is_action()) {
                    node.set_position(*position);
                    delta.record_updated(ElementRef::Node(node_id.clone()));
                }
            }
            Ok(())
        }
        Op::RemoveActions { node_ids } => {
            elements.retain(|element| {
                let remove = element
                    .as_node()
                    .is_some_and(|node| node.is_action() && node_ids.contains(node.id()));
                if remove {
                    delta.record_removed(element_ref(element));
                }
                !remove
            });
            Ok(())
        }
    }
}

fn element_index(elements: &[Element], id: &str) -> Option<usize> {
    elements.iter().position(|element| element.id() == id)
}

fn node_index(elements: &[Element], node_id: &NodeId) -> Option<usize> {
    elements
        .iter()
        .position(|element| element.as_node().is_some_and(|node| node.id() == node_id))
}

fn require_skill(elements: &[Element], node_id: &NodeId) -> Result<usize, ApplyError> {
    let Some(index) = node_index(elements, node_id) else {
        return Err(ApplyError::NotFound { kind: ElementKind::Skill, id: node_id.to_string() });
    };
    match elements[index].as_node().map(GraphNode::kind) {
        Some(NodeKind::Skill) => Ok(index),
        Some(found) => Err(ApplyError::NotASkill { node_id: node_id.clone(), found }),
        None => Err(ApplyError::NotFound { kind: ElementKind::Skill, id: node_id.to_string() }),
    }
}

/// Copies progression fields from the Skill at `skill_index` onto its Flourish twin.
fn mirror_to_flourish(elements: &mut [Element], skill_index: usize, delta: &mut DeltaBuilder) {
    let Some(skill) = elements[skill_index].as_node().cloned() else {
        return;
    };
    let twin = crate::model::flourish_id(skill.id());
    let Some(twin_index) = node_index(elements, &twin) else {
        return;
    };
    if let Some(flourish) = elements[twin_index].as_node_mut() {
        flourish.mirror_states_from(&skill);
    }
    delta.record_updated(ElementRef::Node(twin));
}

fn element_ref(element: &Element) -> ElementRef {
    match element {
        Element::Node(node) => ElementRef::Node(node.id().clone()),
        Element::Edge(edge) => ElementRef::Edge(edge.id().clone()),
    }
}
