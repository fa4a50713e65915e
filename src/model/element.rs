// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use super::action::ActionBinding;
use super::ids::{flourish_id, EdgeId, NodeId};
use crate::icons::IconHandle;

/// Vertical distance between a Skill node and its Flourish twin.
pub const FLOURISH_OFFSET_Y: f64 = 12.0;

/// Tri-state unlock status of a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum UnlockState {
    #[default]
    Hidden,
    Available,
    Activated,
}

impl UnlockState {
    pub const ALL: [Self; 3] = [Self::Activated, Self::Available, Self::Hidden];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Available => "available",
            Self::Activated => "activated",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hidden => "Hidden",
            Self::Available => "Available",
            Self::Activated => "Activated",
        }
    }
}

impl fmt::Display for UnlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseUnlockStateError {
    value: String,
}

impl fmt::Display for ParseUnlockStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown unlock state '{}' (expected hidden, available or activated)", self.value)
    }
}

impl std::error::Error for ParseUnlockStateError {}

impl FromStr for UnlockState {
    type Err = ParseUnlockStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hidden" => Ok(Self::Hidden),
            "available" => Ok(Self::Available),
            "activated" => Ok(Self::Activated),
            _ => Err(ParseUnlockStateError { value: s.to_owned() }),
        }
    }
}

/// Editor mode: authoring (Builder) or play-through (Player).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Builder,
    Player,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Builder => "builder",
            Self::Player => "player",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Builder => Self::Player,
            Self::Player => Self::Builder,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Skill,
    Flourish,
    Action,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skill => "skill",
            Self::Flourish => "flourish",
            Self::Action => "action",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }

    pub fn midpoint(self, other: Self) -> Self {
        Self { x: (self.x + other.x) / 2.0, y: (self.y + other.y) / 2.0 }
    }
}

/// Pan/zoom/size of the renderer's viewport, as last reported by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    pub pan: Position,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { zoom: 1.0, pan: Position::default(), width: 0.0, height: 0.0 }
    }
}

impl Viewport {
    /// Model-space point at the visual center of the viewport.
    pub fn center(&self) -> Position {
        let zoom = if self.zoom > 0.0 && self.zoom.is_finite() { self.zoom } else { 1.0 };
        Position {
            x: (self.width / 2.0 - self.pan.x) / zoom,
            y: (self.height / 2.0 - self.pan.y) / zoom,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    id: NodeId,
    kind: NodeKind,
    label: String,
    description: String,
    icon: Option<IconHandle>,
    initial_state: UnlockState,
    state: Option<UnlockState>,
    temp_state: Option<UnlockState>,
    locked: bool,
    position: Position,
    parent_skill_id: Option<NodeId>,
    action: Option<ActionBinding>,
}

impl GraphNode {
    /// A Builder-mode skill: `tempState` mirrors `initialState` so a later mode round-trip
    /// has an authoritative value to restore.
    pub fn skill(
        id: NodeId,
        label: impl Into<String>,
        icon: IconHandle,
        initial_state: UnlockState,
        position: Position,
    ) -> Self {
        Self {
            id,
            kind: NodeKind::Skill,
            label: label.into(),
            description: String::new(),
            icon: Some(icon),
            initial_state,
            state: None,
            temp_state: Some(initial_state),
            locked: false,
            position,
            parent_skill_id: None,
            action: None,
        }
    }

    /// The decorative twin of `skill`, positioned below it and mirroring its states.
    pub fn flourish_for(skill: &GraphNode) -> Self {
        Self {
            id: flourish_id(&skill.id),
            kind: NodeKind::Flourish,
            label: String::new(),
            description: String::new(),
            icon: None,
            initial_state: skill.initial_state,
            state: skill.state,
            temp_state: skill.temp_state,
            locked: skill.locked,
            position: flourish_position(skill.position),
            parent_skill_id: Some(skill.id.clone()),
            action: None,
        }
    }

    pub fn action(
        id: NodeId,
        label: impl Into<String>,
        binding: ActionBinding,
        position: Position,
    ) -> Self {
        Self {
            id,
            kind: NodeKind::Action,
            label: label.into(),
            description: String::new(),
            icon: None,
            initial_state: UnlockState::default(),
            state: None,
            temp_state: None,
            locked: false,
            position,
            parent_skill_id: binding.target().anchor_node().cloned(),
            action: Some(binding),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_skill(&self) -> bool {
        self.kind == NodeKind::Skill
    }

    pub fn is_action(&self) -> bool {
        self.kind == NodeKind::Action
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Free-form info text; empty when the skill has none.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn icon(&self) -> Option<&IconHandle> {
        self.icon.as_ref()
    }

    pub fn set_icon(&mut self, icon: Option<IconHandle>) {
        self.icon = icon;
    }

    pub fn initial_state(&self) -> UnlockState {
        self.initial_state
    }

    pub fn set_initial_state(&mut self, initial_state: UnlockState) {
        self.initial_state = initial_state;
    }

    pub fn state(&self) -> Option<UnlockState> {
        self.state
    }

    pub fn set_state(&mut self, state: Option<UnlockState>) {
        self.state = state;
    }

    pub fn temp_state(&self) -> Option<UnlockState> {
        self.temp_state
    }

    pub fn set_temp_state(&mut self, temp_state: Option<UnlockState>) {
        self.temp_state = temp_state;
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn parent_skill_id(&self) -> Option<&NodeId> {
        self.parent_skill_id.as_ref()
    }

    pub fn set_parent_skill_id(&mut self, parent_skill_id: Option<NodeId>) {
        self.parent_skill_id = parent_skill_id;
    }

    pub fn action_binding(&self) -> Option<&ActionBinding> {
        self.action.as_ref()
    }

    /// Copies the progression fields a Flourish twin mirrors from its Skill.
    pub fn mirror_states_from(&mut self, skill: &GraphNode) {
        self.initial_state = skill.initial_state;
        self.state = skill.state;
        self.temp_state = skill.temp_state;
        self.locked = skill.locked;
    }
}

pub fn flourish_position(skill_position: Position) -> Position {
    skill_position.offset(0.0, FLOURISH_OFFSET_Y)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    id: EdgeId,
    source_id: NodeId,
    target_id: NodeId,
}

impl GraphEdge {
    pub fn new(id: EdgeId, source_id: NodeId, target_id: NodeId) -> Self {
        Self { id, source_id, target_id }
    }

    pub fn id(&self) -> &EdgeId {
        &self.id
    }

    pub fn source_id(&self) -> &NodeId {
        &self.source_id
    }

    pub fn target_id(&self) -> &NodeId {
        &self.target_id
    }

    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.source_id == node_id || &self.target_id == node_id
    }

    /// True when this edge joins `a` and `b` in either direction.
    pub fn joins(&self, a: &NodeId, b: &NodeId) -> bool {
        (&self.source_id == a && &self.target_id == b)
            || (&self.source_id == b && &self.target_id == a)
    }

    /// The endpoint opposite `node_id`, when the edge touches it.
    pub fn other_end(&self, node_id: &NodeId) -> Option<&NodeId> {
        if &self.source_id == node_id {
            Some(&self.target_id)
        } else if &self.target_id == node_id {
            Some(&self.source_id)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Node(GraphNode),
    Edge(GraphEdge),
}

impl Element {
    pub fn id(&self) -> &str {
        match self {
            Self::Node(node) => node.id().as_str(),
            Self::Edge(edge) => edge.id().as_str(),
        }
    }

    pub fn as_node(&self) -> Option<&GraphNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Edge(_) => None,
        }
    }

    pub fn as_node_mut(&mut self) -> Option<&mut GraphNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Edge(_) => None,
        }
    }

    pub fn as_edge(&self) -> Option<&GraphEdge> {
        match self {
            Self::Node(_) => None,
            Self::Edge(edge) => Some(edge),
        }
    }
}
