// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// MCP server helper functions:
/// id/key/mode parsing, editor-to-payload mapping and error mapping.
fn parse_node_id(value: &str) -> Result<NodeId, ErrorData> {
    NodeId::new(value).map_err(|err| {
        ErrorData::invalid_params(
            format!("invalid node_id: {err}"),
            Some(serde_json::json!({ "node_id": value })),
        )
    })
}

fn parse_edge_id(value: &str) -> Result<EdgeId, ErrorData> {
    EdgeId::new(value).map_err(|err| {
        ErrorData::invalid_params(
            format!("invalid edge_id: {err}"),
            Some(serde_json::json!({ "edge_id": value })),
        )
    })
}

fn parse_key(value: &str) -> Result<Key, ErrorData> {
    match value.trim().to_ascii_lowercase().as_str() {
        "escape" | "esc" => Ok(Key::Escape),
        "delete" | "backspace" => Ok(Key::Delete),
        "enter" | "return" => Ok(Key::Enter),
        _ => Err(ErrorData::invalid_params(
            "unknown key (expected escape, delete or enter)",
            Some(serde_json::json!({ "key": value })),
        )),
    }
}

fn parse_mode(value: &str) -> Result<Mode, ErrorData> {
    match value.trim().to_ascii_lowercase().as_str() {
        "builder" => Ok(Mode::Builder),
        "player" => Ok(Mode::Player),
        _ => Err(ErrorData::invalid_params(
            "unknown mode (expected builder or player)",
            Some(serde_json::json!({ "mode": value })),
        )),
    }
}

fn mcp_position(position: Position) -> McpPosition {
    McpPosition { x: position.x, y: position.y }
}

fn skill_to_mcp(skill: &GraphNode) -> McpSkill {
    McpSkill {
        node_id: skill.id().to_string(),
        label: skill.label().to_owned(),
        icon: skill.icon().map(|icon| icon.name().to_owned()).unwrap_or_default(),
        icon_missing: skill.icon().is_some_and(IconHandle::is_warning),
        description: skill.description().to_owned(),
        initial_state: skill.initial_state().as_str().to_owned(),
        state: skill.state().map(|state| state.as_str().to_owned()),
        temp_state: skill.temp_state().map(|state| state.as_str().to_owned()),
        locked: skill.locked(),
        position: mcp_position(skill.position()),
    }
}

fn tree_read_response(editor: &Editor) -> TreeReadResponse {
    let store = editor.store();
    let viewport = editor.viewport();
    TreeReadResponse {
        tree_name: editor.tree_name().to_owned(),
        mode: editor.mode().as_str().to_owned(),
        rev: editor.rev(),
        zoom: viewport.zoom,
        pan: mcp_position(viewport.pan),
        skills: store.skills().map(skill_to_mcp).collect(),
        edges: store
            .edges()
            .map(|edge| McpEdge {
                edge_id: edge.id().to_string(),
                source_id: edge.source_id().to_string(),
                target_id: edge.target_id().to_string(),
            })
            .collect(),
        affordances: store
            .nodes()
            .filter_map(|node| {
                let binding = node.action_binding()?;
                Some(McpAffordance {
                    node_id: node.id().to_string(),
                    label: node.label().to_owned(),
                    selected: binding.selected(),
                    position: mcp_position(node.position()),
                })
            })
            .collect(),
        selection: McpSelection {
            node_ids: editor.selection().node_ids().iter().map(ToString::to_string).collect(),
            edge_ids: editor.selection().edge_ids().map(ToString::to_string).collect(),
        },
        label_edit: editor.label_edit().map(|edit| McpLabelEdit {
            node_id: edit.node_id.to_string(),
            draft: edit.draft.clone(),
        }),
    }
}

fn validate_response(report: &ValidationReport) -> TreeValidateResponse {
    TreeValidateResponse {
        valid: report.is_valid(),
        cycle: report
            .cycle
            .as_ref()
            .map(|path| path.iter().map(ToString::to_string).collect()),
        hidden_roots: report.hidden_roots.iter().map(ToString::to_string).collect(),
        errors: report.errors().iter().map(ToString::to_string).collect(),
    }
}

fn effect_to_mcp(effect: &Effect) -> McpEffect {
    let mut out = McpEffect { kind: String::new(), node_id: None, label: None, message: None, mode: None };
    match effect {
        Effect::DoubleTap { node_id } => {
            out.kind = "double_tap".to_owned();
            out.node_id = Some(node_id.to_string());
        }
        Effect::LabelEditStarted { node_id, label } => {
            out.kind = "label_edit_started".to_owned();
            out.node_id = Some(node_id.to_string());
            out.label = Some(label.clone());
        }
        Effect::LabelCommitted { node_id, label } => {
            out.kind = "label_committed".to_owned();
            out.node_id = Some(node_id.to_string());
            out.label = Some(label.clone());
        }
        Effect::ChooseIcon { node_id } => {
            out.kind = "choose_icon".to_owned();
            out.node_id = Some(node_id.to_string());
        }
        Effect::UnselectNode { node_id } => {
            out.kind = "unselect_node".to_owned();
            out.node_id = Some(node_id.to_string());
        }
        Effect::ClearRendererSelection => out.kind = "clear_renderer_selection".to_owned(),
        Effect::Notice { message } => {
            out.kind = "notice".to_owned();
            out.message = Some(message.clone());
        }
        Effect::ModeChanged { mode } => {
            out.kind = "mode_changed".to_owned();
            out.mode = Some(mode.as_str().to_owned());
        }
        Effect::ShowInfo { node_id } => {
            out.kind = "show_info".to_owned();
            out.node_id = Some(node_id.to_string());
        }
    }
    out
}

fn skill_info_response(info: SkillInfo) -> SkillInfoResponse {
    SkillInfoResponse {
        node_id: info.node_id.into_string(),
        label: info.label,
        icon: info.icon.map(|icon| icon.glyph().to_owned()),
        description: info.description,
        state: info.state.as_str().to_owned(),
        masked: info.masked,
    }
}

/// Everything a tree file stores. Affordance churn and canvas resizes leave it unchanged.
fn save_marker(editor: &Editor) -> (u64, Mode, f64, Position) {
    let viewport = editor.viewport();
    (editor.tree_rev(), editor.mode(), viewport.zoom, viewport.pan)
}

fn event_response(outcome: &Outcome, mode: Mode) -> EventResponse {
    EventResponse {
        rev: outcome.rev,
        mode: mode.as_str().to_owned(),
        effects: outcome.effects.iter().map(effect_to_mcp).collect(),
    }
}

fn map_apply_error(err: ApplyError) -> ErrorData {
    let message = err.to_string();
    match err {
        ApplyError::NotFound { kind, id } => ErrorData::resource_not_found(
            message,
            Some(serde_json::json!({ "kind": format!("{kind:?}"), "id": id })),
        ),
        ApplyError::AlreadyExists { kind, id } => ErrorData::invalid_params(
            message,
            Some(serde_json::json!({ "kind": format!("{kind:?}"), "id": id })),
        ),
        ApplyError::NotASkill { node_id, .. } | ApplyError::NotAnAction { node_id, .. } => {
            ErrorData::invalid_params(message, Some(serde_json::json!({ "node_id": node_id.as_str() })))
        }
        ApplyError::SelfLoop { node_id } => {
            ErrorData::invalid_params(message, Some(serde_json::json!({ "node_id": node_id.as_str() })))
        }
        ApplyError::DuplicateEdge { source_id, target_id } => ErrorData::invalid_params(
            message,
            Some(serde_json::json!({
                "source_id": source_id.as_str(),
                "target_id": target_id.as_str(),
            })),
        ),
    }
}

fn map_editor_error(err: EditorError) -> ErrorData {
    match err {
        EditorError::Locked { mode } => ErrorData::invalid_request(
            err.to_string(),
            Some(serde_json::json!({ "mode": mode.as_str() })),
        ),
        EditorError::InvalidTree { ref report } => {
            let details = validate_response(report);
            ErrorData::invalid_request(
                format!("tree is not playable: {err}"),
                Some(serde_json::json!({
                    "cycle": details.cycle,
                    "hidden_roots": details.hidden_roots,
                    "errors": details.errors,
                })),
            )
        }
        EditorError::Apply(err) => map_apply_error(err),
    }
}

fn map_store_error(err: StoreError) -> ErrorData {
    warn!(error = %err, "failed to persist skill tree");
    ErrorData::internal_error(format!("failed to persist tree: {err}"), None)
}
