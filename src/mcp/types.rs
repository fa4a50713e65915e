// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct McpPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpSkill {
    pub node_id: String,
    pub label: String,
    /// Requested icon name; kept even when the catalog does not know it.
    pub icon: String,
    /// True when `icon` is unknown and the warning icon is drawn instead.
    pub icon_missing: bool,
    pub description: String,
    /// `hidden`, `available` or `activated`.
    pub initial_state: String,
    /// Live play-through state; only set in player mode.
    pub state: Option<String>,
    /// Parked play-through state; only set in builder mode after a play session.
    pub temp_state: Option<String>,
    pub locked: bool,
    pub position: McpPosition,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpEdge {
    pub edge_id: String,
    pub source_id: String,
    pub target_id: String,
}

/// A tappable affordance button currently on the canvas.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpAffordance {
    pub node_id: String,
    pub label: String,
    pub selected: bool,
    pub position: McpPosition,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpSelection {
    pub node_ids: Vec<String>,
    pub edge_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpLabelEdit {
    pub node_id: String,
    pub draft: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TreeReadResponse {
    pub tree_name: String,
    pub mode: String,
    pub rev: u64,
    pub zoom: f64,
    pub pan: McpPosition,
    pub skills: Vec<McpSkill>,
    pub edges: Vec<McpEdge>,
    pub affordances: Vec<McpAffordance>,
    pub selection: McpSelection,
    pub label_edit: Option<McpLabelEdit>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TreeValidateResponse {
    pub valid: bool,
    /// Closed node path (first id repeated at the end) when the tree has a cycle.
    pub cycle: Option<Vec<String>>,
    pub hidden_roots: Vec<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TreeExportResponse {
    pub json: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TreeImportParams {
    /// Snapshot JSON as produced by `tree.export`.
    pub json: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TreeImportResponse {
    pub rev: u64,
    pub tree_name: String,
    /// Mode the tree opened in; a player snapshot that fails validation opens in `builder`.
    pub mode: String,
    pub skills: u64,
    pub edges: u64,
    pub effects: Vec<McpEffect>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TreeSaveResponse {
    pub path: String,
    pub rev: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SkillAddResponse {
    pub node_id: String,
    /// Skill the new one was connected from, if there was an edit target.
    pub connected_from: Option<String>,
    pub rev: u64,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SkillSearchParams {
    pub query: String,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SkillSearchHit {
    pub node_id: String,
    pub label: String,
    /// `exact`, `label_prefix`, `word_prefix`, `contains`, `fuzzy` or `description`.
    pub kind: String,
    pub score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SkillSearchResponse {
    pub matches: Vec<SkillSearchHit>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SkillSetIconParams {
    pub node_id: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SkillSetIconResponse {
    pub icon: String,
    /// True when the requested name was unknown and the warning icon was used instead.
    pub is_warning: bool,
    pub rev: u64,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SkillSetDescriptionParams {
    pub node_id: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SkillSetDescriptionResponse {
    pub node_id: String,
    pub description: String,
    pub rev: u64,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SkillInfoParams {
    pub node_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SkillInfoResponse {
    pub node_id: String,
    pub label: String,
    /// Icon to draw; absent while the skill is masked.
    pub icon: Option<String>,
    pub description: String,
    pub state: String,
    /// True when a hidden skill is shown as `Unknown` in player mode.
    pub masked: bool,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PointerTapNodeParams {
    pub node_id: String,
    /// Milliseconds on the caller's clock; defaults to milliseconds since server start.
    pub at_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SelectionNodeParams {
    pub node_id: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SelectionEdgeParams {
    pub edge_id: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NodeMoveParams {
    pub node_id: String,
    pub x: f64,
    pub y: f64,
}

/// Fields left out keep their current value.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ViewportSetParams {
    pub zoom: Option<f64>,
    pub pan: Option<McpPosition>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct KeyPressParams {
    /// `escape`, `delete` or `enter`.
    pub key: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LabelDraftParams {
    pub draft: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LabelDraftResponse {
    pub node_id: String,
    pub draft: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ModeSetParams {
    /// `builder` or `player`.
    pub mode: String,
}

/// Something the host should do after an event, flattened for JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct McpEffect {
    pub kind: String,
    pub node_id: Option<String>,
    pub label: Option<String>,
    pub message: Option<String>,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EventResponse {
    pub rev: u64,
    pub mode: String,
    pub effects: Vec<McpEffect>,
}
