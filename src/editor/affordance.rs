// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Transient on-canvas controls ("affordances").
//!
//! Affordances are Action nodes spawned in small groups around a skill, a pair of skills or an
//! edge. They are never persisted. Each group holds one [`Subscription`] per anchor node on the
//! shared [`PositionFeed`]; when an anchor moves, the group's members are repositioned, and when
//! the group is dropped its subscriptions are released.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::debug;

use crate::model::{
    ActionBinding, ActionTarget, AffordanceAction, EdgeId, GraphNode, GroupId, NodeId, Position,
    UnlockState,
};
use crate::ops::{apply_ops, ApplyError, Op};
use crate::store::ElementStore;

const STATE_SELECTOR_SPACING: f64 = 65.0;
const STATE_SELECTOR_LIFT: f64 = 45.0;
const NODE_TOOLS_SPACING: f64 = 60.0;
const NODE_TOOLS_LIFT: f64 = 55.0;
const EDGE_TOOLS_LIFT: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKind {
    /// Activated / Available / Hidden buttons above a single selected skill.
    StateSelector,
    /// Rename / Change Icon / Delete buttons above a double-tapped skill.
    NodeTools,
    /// Connect button between two selected skills.
    Connect,
    /// Delete Edge button above a selected edge.
    EdgeTools,
}

#[derive(Debug, Default)]
struct FeedInner {
    next_id: u64,
    listeners: BTreeMap<u64, (NodeId, GroupId)>,
}

/// Registry of groups listening for position changes of anchor nodes.
#[derive(Debug, Clone, Default)]
pub struct PositionFeed {
    inner: Arc<Mutex<FeedInner>>,
}

impl PositionFeed {
    fn lock(&self) -> MutexGuard<'_, FeedInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self, node_id: NodeId, group: GroupId) -> Subscription {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id = inner.next_id.wrapping_add(1);
        inner.listeners.insert(id, (node_id.clone(), group));
        Subscription { id, node_id, feed: Arc::downgrade(&self.inner) }
    }

    /// Groups currently listening to `node_id`, in subscription order.
    pub fn listeners_of(&self, node_id: &NodeId) -> Vec<GroupId> {
        let inner = self.lock();
        let mut groups: Vec<GroupId> = inner
            .listeners
            .values()
            .filter(|(watched, _)| watched == node_id)
            .map(|(_, group)| *group)
            .collect();
        groups.dedup();
        groups
    }

    /// Number of live subscriptions.
    pub fn active(&self) -> usize {
        self.lock().listeners.len()
    }
}

/// Scoped listener registration; dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    node_id: NodeId,
    feed: Weak<Mutex<FeedInner>>,
}

impl Subscription {
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.feed.upgrade() {
            inner.lock().unwrap_or_else(PoisonError::into_inner).listeners.remove(&self.id);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Anchor {
    Node(NodeId),
    Between(NodeId, NodeId),
}

impl Anchor {
    fn nodes(&self) -> Vec<&NodeId> {
        match self {
            Self::Node(node_id) => vec![node_id],
            Self::Between(a, b) => vec![a, b],
        }
    }

    /// Anchor point, optionally with one node's position overridden by a pending move.
    fn position(&self, store: &ElementStore, moved: Option<(&NodeId, Position)>) -> Option<Position> {
        let position_of = |node_id: &NodeId| match moved {
            Some((moved_id, position)) if moved_id == node_id => Some(position),
            _ => store.node(node_id).map(GraphNode::position),
        };
        match self {
            Self::Node(node_id) => position_of(node_id),
            Self::Between(a, b) => Some(position_of(a)?.midpoint(position_of(b)?)),
        }
    }
}

#[derive(Debug)]
struct Member {
    node_id: NodeId,
    dx: f64,
    dy: f64,
}

#[derive(Debug)]
struct SpawnGroup {
    id: GroupId,
    kind: GroupKind,
    anchor: Anchor,
    members: Vec<Member>,
    _subscriptions: Vec<Subscription>,
}

impl SpawnGroup {
    fn member_ids(&self) -> Vec<NodeId> {
        self.members.iter().map(|member| member.node_id.clone()).collect()
    }
}

struct Button {
    action: AffordanceAction,
    target: ActionTarget,
    dx: f64,
    dy: f64,
    selected: bool,
}

/// Owns the live affordance groups. At most one group of each kind exists at a time.
#[derive(Debug, Default)]
pub struct AffordanceManager {
    feed: PositionFeed,
    groups: Vec<SpawnGroup>,
    next_group: u64,
}

impl AffordanceManager {
    pub fn feed(&self) -> &PositionFeed {
        &self.feed
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn kinds(&self) -> Vec<GroupKind> {
        self.groups.iter().map(|group| group.kind).collect()
    }

    pub fn has(&self, kind: GroupKind) -> bool {
        self.groups.iter().any(|group| group.kind == kind)
    }

    pub fn kind_of(&self, group: GroupId) -> Option<GroupKind> {
        self.groups.iter().find(|candidate| candidate.id == group).map(|group| group.kind)
    }

    /// The skill a single-node group of `kind` decorates.
    pub fn anchor_node(&self, kind: GroupKind) -> Option<&NodeId> {
        self.groups.iter().find(|group| group.kind == kind).and_then(|group| match &group.anchor {
            Anchor::Node(node_id) => Some(node_id),
            Anchor::Between(..) => None,
        })
    }

    pub fn spawn_state_selector(
        &mut self,
        store: &mut ElementStore,
        node_id: &NodeId,
    ) -> Result<Option<GroupId>, ApplyError> {
        let Some(current) = store.skill(node_id).map(GraphNode::initial_state) else {
            return Ok(None);
        };
        let buttons = UnlockState::ALL
            .into_iter()
            .zip([-1.0, 0.0, 1.0])
            .map(|(state, slot)| Button {
                action: AffordanceAction::SetState(state),
                target: ActionTarget::Node(node_id.clone()),
                dx: slot * STATE_SELECTOR_SPACING,
                dy: -STATE_SELECTOR_LIFT,
                selected: state == current,
            })
            .collect();
        self.spawn(store, GroupKind::StateSelector, Anchor::Node(node_id.clone()), buttons)
    }

    pub fn spawn_node_tools(
        &mut self,
        store: &mut ElementStore,
        node_id: &NodeId,
    ) -> Result<Option<GroupId>, ApplyError> {
        if store.skill(node_id).is_none() {
            return Ok(None);
        }
        let buttons = [
            (AffordanceAction::Rename, -NODE_TOOLS_SPACING),
            (AffordanceAction::ChangeIcon, 0.0),
            (AffordanceAction::Delete, NODE_TOOLS_SPACING),
        ]
        .into_iter()
        .map(|(action, dx)| Button {
            action,
            target: ActionTarget::Node(node_id.clone()),
            dx,
            dy: -NODE_TOOLS_LIFT,
            selected: false,
        })
        .collect();
        self.spawn(store, GroupKind::NodeTools, Anchor::Node(node_id.clone()), buttons)
    }

    pub fn spawn_connect(
        &mut self,
        store: &mut ElementStore,
        source_id: &NodeId,
        target_id: &NodeId,
    ) -> Result<Option<GroupId>, ApplyError> {
        let buttons = vec![Button {
            action: AffordanceAction::Connect,
            target: ActionTarget::Pair { source_id: source_id.clone(), target_id: target_id.clone() },
            dx: 0.0,
            dy: 0.0,
            selected: false,
        }];
        let anchor = Anchor::Between(source_id.clone(), target_id.clone());
        self.spawn(store, GroupKind::Connect, anchor, buttons)
    }

    /// Spawns the Delete Edge button over `edge_id`; tapping it removes every edge in `edges`.
    pub fn spawn_edge_tools(
        &mut self,
        store: &mut ElementStore,
        edge_id: &EdgeId,
        edges: Vec<EdgeId>,
    ) -> Result<Option<GroupId>, ApplyError> {
        let Some(edge) = store.edge(edge_id.as_str()) else {
            return self.dismiss_kind(store, GroupKind::EdgeTools).map(|()| None);
        };
        let anchor = Anchor::Between(edge.source_id().clone(), edge.target_id().clone());
        let mut edges = edges;
        // The anchored edge comes first so the button id names it.
        edges.retain(|other| other != edge_id);
        edges.insert(0, edge_id.clone());
        let buttons = vec![Button {
            action: AffordanceAction::DeleteEdge,
            target: ActionTarget::Edges(edges),
            dx: 0.0,
            dy: -EDGE_TOOLS_LIFT,
            selected: false,
        }];
        self.spawn(store, GroupKind::EdgeTools, anchor, buttons)
    }

    fn spawn(
        &mut self,
        store: &mut ElementStore,
        kind: GroupKind,
        anchor: Anchor,
        buttons: Vec<Button>,
    ) -> Result<Option<GroupId>, ApplyError> {
        let mut ops = Vec::new();
        if let Some(index) = self.groups.iter().position(|group| group.kind == kind) {
            let replaced = self.groups.remove(index);
            ops.push(Op::RemoveActions { node_ids: replaced.member_ids() });
        }

        let Some(origin) = anchor.position(store, None) else {
            debug!(?kind, "affordance anchor is gone; not spawning");
            if !ops.is_empty() {
                apply_ops(store, &ops)?;
            }
            return Ok(None);
        };

        let group = GroupId(self.next_group);
        self.next_group = self.next_group.wrapping_add(1);

        let mut nodes = Vec::with_capacity(buttons.len());
        let mut members = Vec::with_capacity(buttons.len());
        for button in buttons {
            let binding =
                ActionBinding::new(button.action, button.target, group).with_selected(button.selected);
            let node_id = binding.node_id();
            let position = origin.offset(button.dx, button.dy);
            nodes.push(GraphNode::action(node_id.clone(), button.action.label(), binding, position));
            members.push(Member { node_id, dx: button.dx, dy: button.dy });
        }
        ops.push(Op::SpawnActions { nodes });
        apply_ops(store, &ops)?;

        let subscriptions =
            anchor.nodes().into_iter().map(|node_id| self.feed.subscribe(node_id.clone(), group)).collect();
        debug!(?kind, group = group.0, "spawned affordance group");
        self.groups.push(SpawnGroup { id: group, kind, anchor, members, _subscriptions: subscriptions });
        Ok(Some(group))
    }

    /// Removes a group and its Action nodes; unknown groups are ignored.
    pub fn dismiss(&mut self, store: &mut ElementStore, group: GroupId) -> Result<(), ApplyError> {
        let Some(index) = self.groups.iter().position(|candidate| candidate.id == group) else {
            return Ok(());
        };
        let removed = self.groups.remove(index);
        apply_ops(store, &[Op::RemoveActions { node_ids: removed.member_ids() }]).map(|_| ())
    }

    pub fn dismiss_kind(&mut self, store: &mut ElementStore, kind: GroupKind) -> Result<(), ApplyError> {
        match self.groups.iter().find(|group| group.kind == kind).map(|group| group.id) {
            Some(group) => self.dismiss(store, group),
            None => Ok(()),
        }
    }

    /// Removes every group and sweeps any Action node left in the store.
    pub fn purge(&mut self, store: &mut ElementStore) -> Result<(), ApplyError> {
        self.groups.clear();
        let node_ids: Vec<NodeId> =
            store.nodes().filter(|node| node.is_action()).map(|node| node.id().clone()).collect();
        if node_ids.is_empty() {
            return Ok(());
        }
        apply_ops(store, &[Op::RemoveActions { node_ids }]).map(|_| ())
    }

    /// Drops all groups without touching the store (used when the store is replaced wholesale).
    pub fn forget(&mut self) {
        self.groups.clear();
    }

    /// Repositions every group anchored on `moved` as if it were already at `position`.
    pub fn follow_ops(&self, store: &ElementStore, moved: &NodeId, position: Position) -> Option<Op> {
        let listening = self.feed.listeners_of(moved);
        if listening.is_empty() {
            return None;
        }

        let mut moves = Vec::new();
        for group in self.groups.iter().filter(|group| listening.contains(&group.id)) {
            let Some(origin) = group.anchor.position(store, Some((moved, position))) else {
                continue;
            };
            moves.extend(
                group
                    .members
                    .iter()
                    .map(|member| (member.node_id.clone(), origin.offset(member.dx, member.dy))),
            );
        }
        (!moves.is_empty()).then_some(Op::MoveActions { moves })
    }
}

#[cfg(test)]
mod tests {
    use super::{AffordanceManager, GroupKind, PositionFeed};
    use crate::model::fixtures::{chain_abc, nid};
    use crate::model::{AffordanceAction, EdgeId, GraphNode, GroupId, Position, UnlockState};
    use crate::ops::apply_ops;
    use crate::store::ElementStore;

    fn action_positions(store: &ElementStore) -> Vec<(String, Position)> {
        store
            .nodes()
            .filter(|node| node.is_action())
            .map(|node| (node.id().to_string(), node.position()))
            .collect()
    }

    #[test]
    fn node_tools_sit_above_the_skill() {
        let mut store = ElementStore::new(chain_abc());
        let mut manager = AffordanceManager::default();

        let group = manager.spawn_node_tools(&mut store, &nid("b")).expect("spawn");

        assert!(group.is_some());
        assert_eq!(
            action_positions(&store),
            vec![
                ("rename-b".to_owned(), Position::new(-60.0, 45.0)),
                ("change-icon-b".to_owned(), Position::new(0.0, 45.0)),
                ("delete-b".to_owned(), Position::new(60.0, 45.0)),
            ]
        );
        assert_eq!(manager.anchor_node(GroupKind::NodeTools), Some(&nid("b")));
        assert_eq!(manager.feed().active(), 1);
    }

    #[test]
    fn state_selector_flags_the_current_initial_state() {
        let mut store = ElementStore::new(chain_abc());
        let mut manager = AffordanceManager::default();

        manager.spawn_state_selector(&mut store, &nid("a")).expect("spawn");

        let selected: Vec<(AffordanceAction, bool)> = store
            .nodes()
            .filter_map(GraphNode::action_binding)
            .map(|binding| (binding.action(), binding.selected()))
            .collect();
        assert_eq!(
            selected,
            vec![
                (AffordanceAction::SetState(UnlockState::Activated), false),
                (AffordanceAction::SetState(UnlockState::Available), true),
                (AffordanceAction::SetState(UnlockState::Hidden), false),
            ]
        );
        let xs: Vec<f64> = action_positions(&store).iter().map(|(_, p)| p.x).collect();
        assert_eq!(xs, vec![-65.0, 0.0, 65.0]);
    }

    #[test]
    fn connect_follows_both_endpoints() {
        let mut store = ElementStore::new(chain_abc());
        let mut manager = AffordanceManager::default();
        manager.spawn_connect(&mut store, &nid("a"), &nid("c")).expect("spawn");
        assert_eq!(action_positions(&store), vec![("connect-a-c".to_owned(), Position::new(0.0, 100.0))]);
        assert_eq!(manager.feed().active(), 2);

        let op = manager
            .follow_ops(&store, &nid("c"), Position::new(100.0, 300.0))
            .expect("connect listens to c");
        apply_ops(&mut store, &[op]).expect("move");

        assert_eq!(action_positions(&store), vec![("connect-a-c".to_owned(), Position::new(50.0, 150.0))]);
        assert!(manager.follow_ops(&store, &nid("b"), Position::default()).is_none());
    }

    #[test]
    fn spawning_a_kind_again_replaces_the_previous_group() {
        let mut store = ElementStore::new(chain_abc());
        let mut manager = AffordanceManager::default();

        manager.spawn_state_selector(&mut store, &nid("a")).expect("spawn");
        manager.spawn_state_selector(&mut store, &nid("b")).expect("spawn");

        let ids: Vec<String> = action_positions(&store).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["activated-b", "available-b", "hidden-b"]);
        assert_eq!(manager.kinds(), vec![GroupKind::StateSelector]);
        assert_eq!(manager.feed().active(), 1);
    }

    #[test]
    fn purge_releases_every_subscription_once() {
        let mut store = ElementStore::new(chain_abc());
        let mut manager = AffordanceManager::default();
        manager.spawn_node_tools(&mut store, &nid("a")).expect("spawn");
        manager.spawn_connect(&mut store, &nid("a"), &nid("b")).expect("spawn");
        manager
            .spawn_edge_tools(&mut store, &EdgeId::new("edge-b-c").expect("edge id"), Vec::new())
            .expect("spawn");
        assert_eq!(manager.feed().active(), 5);

        manager.purge(&mut store).expect("purge");

        assert!(manager.is_empty());
        assert_eq!(manager.feed().active(), 0);
        assert!(action_positions(&store).is_empty());
    }

    #[test]
    fn dismiss_removes_only_that_group() {
        let mut store = ElementStore::new(chain_abc());
        let mut manager = AffordanceManager::default();
        let tools = manager.spawn_node_tools(&mut store, &nid("a")).expect("spawn").expect("group");
        manager.spawn_connect(&mut store, &nid("a"), &nid("c")).expect("spawn");

        manager.dismiss(&mut store, tools).expect("dismiss");
        manager.dismiss(&mut store, GroupId(999)).expect("unknown group");

        assert_eq!(manager.kinds(), vec![GroupKind::Connect]);
        assert_eq!(manager.kind_of(tools), None);
        assert_eq!(action_positions(&store).len(), 1);
    }

    #[test]
    fn stale_anchor_spawns_nothing() {
        let mut store = ElementStore::new(chain_abc());
        let mut manager = AffordanceManager::default();

        assert_eq!(manager.spawn_node_tools(&mut store, &nid("ghost")).expect("spawn"), None);
        assert_eq!(manager.spawn_connect(&mut store, &nid("a"), &nid("ghost")).expect("spawn"), None);
        assert!(manager.is_empty());
        assert_eq!(store.rev(), 0);
    }

    #[test]
    fn subscriptions_outliving_the_feed_drop_quietly() {
        let feed = PositionFeed::default();
        let subscription = feed.subscribe(nid("a"), GroupId(1));
        assert_eq!(feed.listeners_of(&nid("a")), vec![GroupId(1)]);
        drop(feed);
        assert_eq!(subscription.node_id(), &nid("a"));
        drop(subscription);
    }
}
