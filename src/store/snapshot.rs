// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Serializable snapshot of a skill tree.
//!
//! The JSON shape is `{ elements, treeName, zoom, pan, mode }`. Loading is forgiving: missing
//! fields take safe defaults and individual elements that cannot be used are dropped with a
//! warning instead of failing the whole load. Only JSON that does not parse at all is an error.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::icons::{IconProvider, DEFAULT_SKILL_ICON};
use crate::model::{
    EdgeId, Element, GraphEdge, GraphNode, Mode, NodeId, NodeKind, Position, UnlockState,
};

pub const DEFAULT_TREE_NAME: &str = "Untitled Skill Tree";

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub elements: Vec<Element>,
    pub tree_name: String,
    pub zoom: f64,
    pub pan: Position,
    pub mode: Mode,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            tree_name: DEFAULT_TREE_NAME.to_owned(),
            zoom: 1.0,
            pan: Position::default(),
            mode: Mode::Builder,
        }
    }
}

#[derive(Debug)]
pub enum SnapshotError {
    Json { source: serde_json::Error },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json { source } => write!(f, "invalid snapshot json: {source}"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json { source } => Some(source),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotJson {
    #[serde(default)]
    elements: Vec<serde_json::Value>,
    #[serde(default = "default_tree_name")]
    tree_name: String,
    #[serde(default = "default_zoom")]
    zoom: f64,
    #[serde(default)]
    pan: PositionJson,
    #[serde(default)]
    mode: ModeJson,
}

fn default_tree_name() -> String {
    DEFAULT_TREE_NAME.to_owned()
}

fn default_zoom() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "group", rename_all = "lowercase")]
enum ElementJson {
    Node(NodeJson),
    Edge(EdgeJson),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeJson {
    id: String,
    #[serde(default)]
    kind: NodeKindJson,
    #[serde(default)]
    label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
    #[serde(default)]
    initial_state: UnlockStateJson,
    #[serde(default)]
    state: Option<UnlockStateJson>,
    #[serde(default)]
    temp_state: Option<UnlockStateJson>,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    position: PositionJson,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_skill_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EdgeJson {
    id: String,
    source_id: String,
    target_id: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct PositionJson {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum NodeKindJson {
    #[default]
    Skill,
    Flourish,
    Action,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum UnlockStateJson {
    #[default]
    Hidden,
    Available,
    Activated,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ModeJson {
    #[default]
    Builder,
    Player,
}

impl From<UnlockState> for UnlockStateJson {
    fn from(state: UnlockState) -> Self {
        match state {
            UnlockState::Hidden => Self::Hidden,
            UnlockState::Available => Self::Available,
            UnlockState::Activated => Self::Activated,
        }
    }
}

impl From<UnlockStateJson> for UnlockState {
    fn from(state: UnlockStateJson) -> Self {
        match state {
            UnlockStateJson::Hidden => Self::Hidden,
            UnlockStateJson::Available => Self::Available,
            UnlockStateJson::Activated => Self::Activated,
        }
    }
}

impl From<NodeKind> for NodeKindJson {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Skill => Self::Skill,
            NodeKind::Flourish => Self::Flourish,
            NodeKind::Action => Self::Action,
        }
    }
}

impl From<Mode> for ModeJson {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Builder => Self::Builder,
            Mode::Player => Self::Player,
        }
    }
}

impl From<ModeJson> for Mode {
    fn from(mode: ModeJson) -> Self {
        match mode {
            ModeJson::Builder => Self::Builder,
            ModeJson::Player => Self::Player,
        }
    }
}

impl From<Position> for PositionJson {
    fn from(position: Position) -> Self {
        Self { x: position.x, y: position.y }
    }
}

impl From<PositionJson> for Position {
    fn from(position: PositionJson) -> Self {
        let finite = |value: f64| if value.is_finite() { value } else { 0.0 };
        Position::new(finite(position.x), finite(position.y))
    }
}

/// Serializes the persistent part of a snapshot. Action nodes are never written.
pub fn serialize(snapshot: &Snapshot) -> Result<String, SnapshotError> {
    let elements = snapshot
        .elements
        .iter()
        .filter_map(element_to_json)
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| SnapshotError::Json { source })?;

    let json = SnapshotJson {
        elements,
        tree_name: snapshot.tree_name.clone(),
        zoom: snapshot.zoom,
        pan: snapshot.pan.into(),
        mode: snapshot.mode.into(),
    };
    serde_json::to_string_pretty(&json).map_err(|source| SnapshotError::Json { source })
}

fn element_to_json(element: &Element) -> Option<ElementJson> {
    match element {
        Element::Node(node) if node.is_action() => None,
        Element::Node(node) => Some(ElementJson::Node(NodeJson {
            id: node.id().to_string(),
            kind: node.kind().into(),
            label: node.label().to_owned(),
            description: node.description().to_owned(),
            icon: node.icon().map(|icon| icon.name().to_owned()),
            initial_state: node.initial_state().into(),
            state: node.state().map(Into::into),
            temp_state: node.temp_state().map(Into::into),
            locked: node.locked(),
            position: node.position().into(),
            parent_skill_id: node.parent_skill_id().map(ToString::to_string),
        })),
        Element::Edge(edge) => Some(ElementJson::Edge(EdgeJson {
            id: edge.id().to_string(),
            source_id: edge.source_id().to_string(),
            target_id: edge.target_id().to_string(),
        })),
    }
}

enum Parsed {
    Skill(GraphNode),
    Edge(GraphEdge),
}

/// Parses and repairs a snapshot.
///
/// Repairs applied, each logged at `warn`:
/// - elements with an unknown shape or an invalid id are dropped;
/// - Action nodes and duplicate ids are dropped;
/// - Flourish twins are rebuilt from their Skill (orphans are dropped);
/// - edges whose endpoints are not skills, self-loops and duplicate pairs are dropped.
pub fn deserialize(json: &str, icons: &dyn IconProvider) -> Result<Snapshot, SnapshotError> {
    let raw: SnapshotJson =
        serde_json::from_str(json).map_err(|source| SnapshotError::Json { source })?;

    let mut parsed = Vec::with_capacity(raw.elements.len());
    let mut seen_ids = BTreeSet::new();
    let mut flourish_parents = Vec::new();

    for (index, value) in raw.elements.into_iter().enumerate() {
        let element = match serde_json::from_value::<ElementJson>(value) {
            Ok(element) => element,
            Err(err) => {
                warn!(index, error = %err, "dropping unreadable snapshot element");
                continue;
            }
        };

        match element {
            ElementJson::Node(node) => match node.kind {
                NodeKindJson::Action => {
                    warn!(id = %node.id, "dropping persisted action node");
                }
                NodeKindJson::Flourish => {
                    let parent = node.parent_skill_id.clone().or_else(|| {
                        node.id.strip_prefix("flourish-").map(ToOwned::to_owned)
                    });
                    flourish_parents.push((node.id, parent));
                }
                NodeKindJson::Skill => {
                    let Some(skill) = skill_from_json(node, icons) else {
                        continue;
                    };
                    if !seen_ids.insert(skill.id().to_string()) {
                        warn!(id = %skill.id(), "dropping duplicate skill id");
                        continue;
                    }
                    parsed.push(Parsed::Skill(skill));
                }
            },
            ElementJson::Edge(edge) => {
                if let Some(edge) = edge_from_json(edge) {
                    parsed.push(Parsed::Edge(edge));
                }
            }
        }
    }

    let skill_ids: BTreeSet<NodeId> = parsed
        .iter()
        .filter_map(|parsed| match parsed {
            Parsed::Skill(skill) => Some(skill.id().clone()),
            Parsed::Edge(_) => None,
        })
        .collect();

    let mut twinned = BTreeSet::new();
    for (id, parent) in flourish_parents {
        match parent.as_deref().and_then(|parent| NodeId::new(parent).ok()) {
            Some(parent) if skill_ids.contains(&parent) => {
                twinned.insert(parent);
            }
            _ => warn!(id = %id, "dropping flourish node without a skill"),
        }
    }

    let mut elements = Vec::with_capacity(parsed.len() * 2);
    let mut pairs: Vec<(NodeId, NodeId)> = Vec::new();
    for item in parsed {
        match item {
            Parsed::Skill(skill) => {
                if !twinned.contains(skill.id()) {
                    warn!(id = %skill.id(), "skill has no flourish twin; recreating it");
                }
                let flourish = GraphNode::flourish_for(&skill);
                elements.push(Element::Node(skill));
                elements.push(Element::Node(flourish));
            }
            Parsed::Edge(edge) => {
                if !skill_ids.contains(edge.source_id()) || !skill_ids.contains(edge.target_id()) {
                    warn!(id = %edge.id(), "dropping edge with a missing skill endpoint");
                    continue;
                }
                if edge.source_id() == edge.target_id() {
                    warn!(id = %edge.id(), "dropping self-loop edge");
                    continue;
                }
                let duplicate = pairs.iter().any(|(a, b)| edge.joins(a, b));
                if duplicate || !seen_ids.insert(edge.id().to_string()) {
                    warn!(id = %edge.id(), "dropping duplicate edge");
                    continue;
                }
                pairs.push((edge.source_id().clone(), edge.target_id().clone()));
                elements.push(Element::Edge(edge));
            }
        }
    }

    let zoom = if raw.zoom.is_finite() && raw.zoom > 0.0 { raw.zoom } else { 1.0 };

    Ok(Snapshot {
        elements,
        tree_name: raw.tree_name,
        zoom,
        pan: raw.pan.into(),
        mode: raw.mode.into(),
    })
}

fn skill_from_json(node: NodeJson, icons: &dyn IconProvider) -> Option<GraphNode> {
    let id = match NodeId::new(&node.id) {
        Ok(id) => id,
        Err(err) => {
            warn!(id = %node.id, error = %err, "dropping skill with invalid id");
            return None;
        }
    };
    let icon = icons.resolve(node.icon.as_deref().unwrap_or(DEFAULT_SKILL_ICON));
    if icon.is_warning() {
        warn!(id = %id, icon = ?node.icon, "unknown icon; using the warning icon");
    }

    let mut skill =
        GraphNode::skill(id, node.label, icon, node.initial_state.into(), node.position.into());
    skill.set_description(node.description);
    skill.set_state(node.state.map(Into::into));
    skill.set_temp_state(node.temp_state.map(Into::into));
    skill.set_locked(node.locked);
    Some(skill)
}

fn edge_from_json(edge: EdgeJson) -> Option<GraphEdge> {
    let ids = (
        EdgeId::new(&edge.id),
        NodeId::new(&edge.source_id),
        NodeId::new(&edge.target_id),
    );
    match ids {
        (Ok(id), Ok(source_id), Ok(target_id)) => Some(GraphEdge::new(id, source_id, target_id)),
        _ => {
            warn!(id = %edge.id, "dropping edge with an invalid id");
            None
        }
    }
}
