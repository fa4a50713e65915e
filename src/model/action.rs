// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Bindings carried by transient Action nodes (affordances).

use std::fmt;

use super::element::UnlockState;
use super::ids::{derived, EdgeId, NodeId};

/// The operation an affordance performs when tapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AffordanceAction {
    Rename,
    Delete,
    ChangeIcon,
    Connect,
    SetState(UnlockState),
    DeleteEdge,
}

impl AffordanceAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Rename => "Rename",
            Self::Delete => "Delete",
            Self::ChangeIcon => "Change Icon",
            Self::Connect => "Connect",
            Self::SetState(state) => state.label(),
            Self::DeleteEdge => "Delete Edge",
        }
    }

    fn slug(self) -> &'static str {
        match self {
            Self::Rename => "rename",
            Self::Delete => "delete",
            Self::ChangeIcon => "change-icon",
            Self::Connect => "connect",
            Self::SetState(state) => state.as_str(),
            Self::DeleteEdge => "delete-edge",
        }
    }
}

impl fmt::Display for AffordanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What an affordance operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionTarget {
    Node(NodeId),
    Pair { source_id: NodeId, target_id: NodeId },
    Edges(Vec<EdgeId>),
}

impl ActionTarget {
    /// The single node an affordance decorates, if any.
    pub fn anchor_node(&self) -> Option<&NodeId> {
        match self {
            Self::Node(node_id) => Some(node_id),
            Self::Pair { .. } | Self::Edges(_) => None,
        }
    }

    fn id_suffix(&self) -> String {
        match self {
            Self::Node(node_id) => node_id.to_string(),
            Self::Pair { source_id, target_id } => format!("{source_id}-{target_id}"),
            Self::Edges(edge_ids) => edge_ids.first().map(ToString::to_string).unwrap_or_default(),
        }
    }
}

/// Identifies the spawn group an affordance belongs to; siblings share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionBinding {
    action: AffordanceAction,
    target: ActionTarget,
    group: GroupId,
    selected: bool,
}

impl ActionBinding {
    pub fn new(action: AffordanceAction, target: ActionTarget, group: GroupId) -> Self {
        Self { action, target, group, selected: false }
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn action(&self) -> AffordanceAction {
        self.action
    }

    pub fn target(&self) -> &ActionTarget {
        &self.target
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    /// Visual "current value" flag used by the state selector buttons.
    pub fn selected(&self) -> bool {
        self.selected
    }

    /// Store id of the Action node carrying this binding, e.g. `rename-node-1`.
    pub fn node_id(&self) -> NodeId {
        let suffix = self.target.id_suffix();
        derived(&[self.action.slug(), "-", suffix.as_str()])
    }
}
