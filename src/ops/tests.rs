// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::icons::{BuiltinIcons, IconProvider};
use crate::model::fixtures::{chain_abc, nid};
use crate::model::{
    connect_edge_id, ActionBinding, ActionTarget, AffordanceAction, EdgeId, GraphNode, GroupId,
    NodeKind, Position, UnlockState, FLOURISH_OFFSET_Y,
};
use crate::store::ElementStore;

use super::{apply_ops, ApplyError, ElementKind, ElementRef, Op};

fn eid(value: &str) -> EdgeId {
    EdgeId::new(value).expect("edge id")
}

#[test]
fn add_skill_adds_flourish_twin_and_bumps_rev() {
    let mut store = ElementStore::default();

    let result = apply_ops(
        &mut store,
        &[Op::AddSkill {
            node_id: nid("node-1"),
            label: "Skill 1".to_owned(),
            icon: BuiltinIcons.resolve("star"),
            initial_state: UnlockState::Available,
            position: Position::new(5.0, 5.0),
        }],
    )
    .expect("apply");

    assert_eq!(result.new_rev, 1);
    assert_eq!(result.applied, 1);
    assert_eq!(
        result.delta.added,
        vec![ElementRef::Node(nid("flourish-node-1")), ElementRef::Node(nid("node-1"))]
    );

    let flourish = store.node(&nid("flourish-node-1")).expect("flourish");
    assert_eq!(flourish.kind(), NodeKind::Flourish);
    assert_eq!(flourish.position(), Position::new(5.0, 5.0 + FLOURISH_OFFSET_Y));
}

#[test]
fn remove_skill_removes_twin_and_incident_edges_in_one_replace() {
    let mut store = ElementStore::new(chain_abc());
    let rev_before = store.rev();

    let result = apply_ops(&mut store, &[Op::RemoveSkill { node_id: nid("b") }]).expect("apply");

    assert_eq!(store.rev(), rev_before + 1);
    assert!(store.node(&nid("b")).is_none());
    assert!(store.node(&nid("flourish-b")).is_none());
    assert_eq!(store.edges().count(), 0);
    assert_eq!(
        result.delta.removed,
        vec![
            ElementRef::Node(nid("b")),
            ElementRef::Node(nid("flourish-b")),
            ElementRef::Edge(eid("edge-a-b")),
            ElementRef::Edge(eid("edge-b-c")),
        ]
    );
    for edge in store.edges() {
        assert!(store.node(edge.source_id()).is_some());
        assert!(store.node(edge.target_id()).is_some());
    }
}

#[test]
fn add_edge_rejects_self_loops_and_duplicates_in_either_direction() {
    let mut store = ElementStore::new(chain_abc());

    let err = apply_ops(
        &mut store,
        &[Op::AddEdge { edge_id: eid("edge-a-a"), source_id: nid("a"), target_id: nid("a") }],
    )
    .unwrap_err();
    assert_eq!(err, ApplyError::SelfLoop { node_id: nid("a") });

    let err = apply_ops(
        &mut store,
        &[Op::AddEdge {
            edge_id: connect_edge_id(&nid("b"), &nid("a")),
            source_id: nid("b"),
            target_id: nid("a"),
        }],
    )
    .unwrap_err();
    assert!(matches!(err, ApplyError::DuplicateEdge { .. }));
    assert_eq!(store.rev(), 0);
}

#[test]
fn add_edge_requires_skill_endpoints() {
    let mut store = ElementStore::new(chain_abc());

    let err = apply_ops(
        &mut store,
        &[Op::AddEdge {
            edge_id: eid("edge-a-flourish-c"),
            source_id: nid("a"),
            target_id: nid("flourish-c"),
        }],
    )
    .unwrap_err();
    assert_eq!(err, ApplyError::NotASkill { node_id: nid("flourish-c"), found: NodeKind::Flourish });

    let err = apply_ops(
        &mut store,
        &[Op::AddEdge { edge_id: eid("edge-a-z"), source_id: nid("a"), target_id: nid("z") }],
    )
    .unwrap_err();
    assert!(err.is_stale_reference());
}

#[test]
fn failing_batch_leaves_store_untouched() {
    let mut store = ElementStore::new(chain_abc());
    let before = store.all();

    let err = apply_ops(
        &mut store,
        &[
            Op::RenameNode { node_id: nid("a"), label: "Renamed".to_owned() },
            Op::RemoveEdge { edge_id: eid("edge-missing") },
        ],
    )
    .unwrap_err();

    assert_eq!(err, ApplyError::NotFound { kind: ElementKind::Edge, id: "edge-missing".to_owned() });
    assert_eq!(store.rev(), 0);
    assert_eq!(&*store.all(), &*before);
    assert_eq!(store.node(&nid("a")).map(GraphNode::label), Some("A"));
}

#[test]
fn set_initial_state_updates_temp_state_and_mirrors_twin() {
    let mut store = ElementStore::new(chain_abc());

    let result = apply_ops(
        &mut store,
        &[Op::SetInitialState { node_id: nid("c"), state: UnlockState::Activated }],
    )
    .expect("apply");

    let skill = store.node(&nid("c")).expect("skill");
    assert_eq!(skill.initial_state(), UnlockState::Activated);
    assert_eq!(skill.temp_state(), Some(UnlockState::Activated));
    let twin = store.node(&nid("flourish-c")).expect("twin");
    assert_eq!(twin.initial_state(), UnlockState::Activated);
    assert_eq!(twin.temp_state(), Some(UnlockState::Activated));
    assert_eq!(
        result.delta.updated,
        vec![ElementRef::Node(nid("c")), ElementRef::Node(nid("flourish-c"))]
    );
}

#[test]
fn move_node_drags_flourish_twin() {
    let mut store = ElementStore::new(chain_abc());

    apply_ops(&mut store, &[Op::MoveNode { node_id: nid("a"), position: Position::new(40.0, -3.0) }])
        .expect("apply");

    assert_eq!(store.node(&nid("a")).map(GraphNode::position), Some(Position::new(40.0, -3.0)));
    assert_eq!(
        store.node(&nid("flourish-a")).map(GraphNode::position),
        Some(Position::new(40.0, -3.0 + FLOURISH_OFFSET_Y))
    );
}

#[test]
fn set_progress_mirrors_locked_and_states() {
    let mut store = ElementStore::new(chain_abc());

    apply_ops(
        &mut store,
        &[Op::SetProgress {
            node_id: nid("a"),
            state: Some(UnlockState::Activated),
            temp_state: None,
            locked: true,
        }],
    )
    .expect("apply");

    let twin = store.node(&nid("flourish-a")).expect("twin");
    assert_eq!(twin.state(), Some(UnlockState::Activated));
    assert_eq!(twin.temp_state(), None);
    assert!(twin.locked());
}

#[test]
fn action_nodes_spawn_move_and_remove_idempotently() {
    let mut store = ElementStore::new(chain_abc());
    let binding =
        ActionBinding::new(AffordanceAction::Rename, ActionTarget::Node(nid("a")), GroupId(1));
    let action_id = binding.node_id();
    let action = GraphNode::action(action_id.clone(), "Rename", binding, Position::new(-60.0, -55.0));

    apply_ops(&mut store, &[Op::SpawnActions { nodes: vec![action.clone()] }]).expect("spawn");
    assert_eq!(store.node(&action_id).map(GraphNode::parent_skill_id), Some(Some(&nid("a"))));

    let err = apply_ops(&mut store, &[Op::SpawnActions { nodes: vec![action] }]).unwrap_err();
    assert!(matches!(err, ApplyError::AlreadyExists { kind: ElementKind::Action, .. }));

    apply_ops(
        &mut store,
        &[Op::MoveActions {
            moves: vec![(action_id.clone(), Position::new(0.0, 0.0)), (nid("gone"), Position::default())],
        }],
    )
    .expect("move");
    assert_eq!(store.node(&action_id).map(GraphNode::position), Some(Position::new(0.0, 0.0)));

    apply_ops(&mut store, &[Op::RemoveActions { node_ids: vec![action_id.clone(), nid("a")] }])
        .expect("remove");
    assert!(store.node(&action_id).is_none());
    // Only Action nodes are removed by RemoveActions.
    assert!(store.skill(&nid("a")).is_some());
}

#[test]
fn empty_batch_is_a_no_op() {
    let mut store = ElementStore::new(chain_abc());
    let result = apply_ops(&mut store, &[]).expect("apply");
    assert_eq!(result.applied, 0);
    assert!(result.delta.is_empty());
    assert_eq!(store.rev(), 0);
}

#[test]
fn affordance_ops_bump_rev_but_not_tree_rev() {
    let mut store = ElementStore::new(chain_abc());
    let binding =
        ActionBinding::new(AffordanceAction::Delete, ActionTarget::Node(nid("b")), GroupId(3));
    let action_id = binding.node_id();
    let action = GraphNode::action(action_id.clone(), "Delete", binding, Position::new(60.0, 45.0));

    apply_ops(&mut store, &[Op::SpawnActions { nodes: vec![action] }]).expect("spawn");
    apply_ops(&mut store, &[Op::RemoveActions { node_ids: vec![action_id] }]).expect("remove");
    assert_eq!(store.rev(), 2);
    assert_eq!(store.tree_rev(), 0);

    apply_ops(&mut store, &[Op::RenameNode { node_id: nid("b"), label: "Dash".into() }])
        .expect("rename");
    assert_eq!(store.rev(), 3);
    assert_eq!(store.tree_rev(), 1);
}

#[test]
fn set_description_targets_skills_only() {
    let mut store = ElementStore::new(chain_abc());

    apply_ops(
        &mut store,
        &[Op::SetDescription { node_id: nid("a"), description: "Opens the trail.".into() }],
    )
    .expect("describe");
    assert_eq!(store.skill(&nid("a")).map(GraphNode::description), Some("Opens the trail."));

    let err = apply_ops(
        &mut store,
        &[Op::SetDescription { node_id: nid("flourish-a"), description: "x".into() }],
    )
    .unwrap_err();
    assert!(matches!(err, ApplyError::NotASkill { found: NodeKind::Flourish, .. }));
}
