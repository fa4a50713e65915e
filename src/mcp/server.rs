// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;
use std::time::Instant;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::{Json, Parameters};
use rmcp::model::{ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData, ServerHandler, ServiceExt};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::editor::{Editor, EditorError, EditorEvent, Effect, Key, Mode, Outcome};
use crate::icons::IconHandle;
use crate::model::{EdgeId, GraphNode, NodeId, Position};
use crate::ops::ApplyError;
use crate::query::{search_skills, SkillInfo, ValidationReport};
use crate::store::{deserialize, serialize, StoreError, TreeFile};

use super::types::*;

const DEFAULT_SEARCH_LIMIT: usize = 20;

#[derive(Debug)]
struct McpState {
    editor: Editor,
}

#[derive(Clone)]
pub struct SkillTreeMcp {
    state: Arc<Mutex<McpState>>,
    tree_file: Option<Arc<TreeFile>>,
    started: Instant,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SkillTreeMcp {
    pub fn new(editor: Editor) -> Self {
        Self {
            state: Arc::new(Mutex::new(McpState { editor })),
            tree_file: None,
            started: Instant::now(),
            tool_router: Self::tool_router(),
        }
    }

    /// Like `new`, but every mutating tool writes the tree back to `tree_file`.
    pub fn new_persistent(editor: Editor, tree_file: TreeFile) -> Self {
        Self {
            state: Arc::new(Mutex::new(McpState { editor })),
            tree_file: Some(Arc::new(tree_file)),
            started: Instant::now(),
            tool_router: Self::tool_router(),
        }
    }

    pub async fn serve_stdio(self) -> Result<(), rmcp::RmcpError> {
        let service = self.serve((tokio::io::stdin(), tokio::io::stdout())).await?;
        service.waiting().await?;
        Ok(())
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn persist(&self, editor: &Editor) -> Result<(), ErrorData> {
        let Some(tree_file) = self.tree_file.as_ref() else {
            return Ok(());
        };
        tree_file.save(&editor.snapshot()).map_err(map_store_error)
    }

    /// Feeds one renderer event to the editor and autosaves when something persistable changed.
    async fn dispatch(&self, event: EditorEvent) -> Result<Json<EventResponse>, ErrorData> {
        let mut state = self.state.lock().await;
        let before = save_marker(&state.editor);
        debug!(?event, "mcp event");
        let outcome = state.editor.handle(event);
        if save_marker(&state.editor) != before {
            self.persist(&state.editor)?;
        }
        Ok(Json(event_response(&outcome, state.editor.mode())))
    }

    /// Read the whole tree: skills, edges, on-canvas affordances, selection and label edit.
    #[tool(name = "tree.read")]
    async fn tree_read(&self) -> Result<Json<TreeReadResponse>, ErrorData> {
        let state = self.state.lock().await;
        Ok(Json(tree_read_response(&state.editor)))
    }

    /// Check whether the tree can be played (no cycles, no hidden roots).
    #[tool(name = "tree.validate")]
    async fn tree_validate(&self) -> Result<Json<TreeValidateResponse>, ErrorData> {
        let state = self.state.lock().await;
        Ok(Json(validate_response(&state.editor.validate())))
    }

    /// Export the tree as snapshot JSON.
    #[tool(name = "tree.export")]
    async fn tree_export(&self) -> Result<Json<TreeExportResponse>, ErrorData> {
        let state = self.state.lock().await;
        let json = serialize(&state.editor.snapshot()).map_err(|err| {
            ErrorData::internal_error(format!("failed to serialize tree: {err}"), None)
        })?;
        Ok(Json(TreeExportResponse { json }))
    }

    /// Replace the tree with snapshot JSON; unparsable input leaves the current tree untouched.
    /// A player-mode snapshot resumes play only if the tree validates; otherwise it opens in
    /// builder mode and the effects carry a notice.
    #[tool(name = "tree.import")]
    async fn tree_import(
        &self,
        params: Parameters<TreeImportParams>,
    ) -> Result<Json<TreeImportResponse>, ErrorData> {
        let mut state = self.state.lock().await;
        let snapshot = deserialize(&params.0.json, state.editor.icons()).map_err(|err| {
            ErrorData::invalid_params(format!("cannot import tree: {err}"), None)
        })?;
        let outcome = state.editor.load_snapshot(snapshot);
        self.persist(&state.editor)?;

        let editor = &state.editor;
        info!(rev = editor.rev(), mode = %editor.mode(), "imported tree over mcp");
        Ok(Json(TreeImportResponse {
            rev: editor.rev(),
            tree_name: editor.tree_name().to_owned(),
            mode: editor.mode().as_str().to_owned(),
            skills: editor.store().skills().count() as u64,
            edges: editor.store().edges().count() as u64,
            effects: outcome.effects.iter().map(effect_to_mcp).collect(),
        }))
    }

    /// Write the tree to the attached tree file.
    #[tool(name = "tree.save")]
    async fn tree_save(&self) -> Result<Json<TreeSaveResponse>, ErrorData> {
        let Some(tree_file) = self.tree_file.as_ref() else {
            return Err(ErrorData::invalid_request("no tree file attached", None));
        };
        let state = self.state.lock().await;
        tree_file.save(&state.editor.snapshot()).map_err(map_store_error)?;
        Ok(Json(TreeSaveResponse {
            path: tree_file.path().display().to_string(),
            rev: state.editor.rev(),
        }))
    }

    /// Add a skill at the viewport center, connected from the skill being edited if any.
    #[tool(name = "skill.add")]
    async fn skill_add(&self) -> Result<Json<SkillAddResponse>, ErrorData> {
        let mut state = self.state.lock().await;
        let connected_from = state.editor.edit_target();
        let node_id = state.editor.add_skill().map_err(map_editor_error)?;
        self.persist(&state.editor)?;
        Ok(Json(SkillAddResponse {
            node_id: node_id.into_string(),
            connected_from: connected_from.map(NodeId::into_string),
            rev: state.editor.rev(),
        }))
    }

    /// Find skills by label (exact, prefix, substring or close spelling), then by description.
    /// In player mode skills that are still hidden are left out.
    #[tool(name = "skill.search")]
    async fn skill_search(
        &self,
        params: Parameters<SkillSearchParams>,
    ) -> Result<Json<SkillSearchResponse>, ErrorData> {
        let limit = params
            .0
            .limit
            .map(|limit| usize::try_from(limit).unwrap_or(usize::MAX))
            .unwrap_or(DEFAULT_SEARCH_LIMIT);
        let state = self.state.lock().await;
        let editor = &state.editor;
        let matches = search_skills(editor.store(), &params.0.query, editor.mode(), limit)
            .into_iter()
            .map(|hit| SkillSearchHit {
                node_id: hit.node_id.into_string(),
                label: hit.label,
                kind: hit.kind.as_str().to_owned(),
                score: hit.score,
            })
            .collect();
        Ok(Json(SkillSearchResponse { matches }))
    }

    /// Answer a ChooseIcon effect; unknown names fall back to the warning icon.
    #[tool(name = "skill.set_icon")]
    async fn skill_set_icon(
        &self,
        params: Parameters<SkillSetIconParams>,
    ) -> Result<Json<SkillSetIconResponse>, ErrorData> {
        let node_id = parse_node_id(&params.0.node_id)?;
        let mut state = self.state.lock().await;
        let icon = state.editor.set_icon(&node_id, &params.0.icon).map_err(map_editor_error)?;
        self.persist(&state.editor)?;
        Ok(Json(SkillSetIconResponse {
            icon: icon.name().to_owned(),
            is_warning: icon.is_warning(),
            rev: state.editor.rev(),
        }))
    }

    /// Set the info text of a skill (builder mode). An empty text clears it.
    #[tool(name = "skill.set_description")]
    async fn skill_set_description(
        &self,
        params: Parameters<SkillSetDescriptionParams>,
    ) -> Result<Json<SkillSetDescriptionResponse>, ErrorData> {
        let SkillSetDescriptionParams { node_id, description } = params.0;
        let node_id = parse_node_id(&node_id)?;
        let mut state = self.state.lock().await;
        state.editor.set_description(&node_id, description).map_err(map_editor_error)?;
        self.persist(&state.editor)?;
        let description = state
            .editor
            .store()
            .skill(&node_id)
            .map(|skill| skill.description().to_owned())
            .unwrap_or_default();
        Ok(Json(SkillSetDescriptionResponse {
            node_id: node_id.into_string(),
            description,
            rev: state.editor.rev(),
        }))
    }

    /// Info card for a skill, as the current mode shows it. Answers a show_info effect.
    #[tool(name = "skill.info")]
    async fn skill_info(
        &self,
        params: Parameters<SkillInfoParams>,
    ) -> Result<Json<SkillInfoResponse>, ErrorData> {
        let node_id = parse_node_id(&params.0.node_id)?;
        let state = self.state.lock().await;
        let Some(info) = state.editor.skill_info(&node_id) else {
            return Err(ErrorData::resource_not_found(
                format!("skill {node_id} not found"),
                Some(serde_json::json!({ "node_id": node_id.as_str() })),
            ));
        };
        Ok(Json(skill_info_response(info)))
    }

    /// Tap a node (skills, affordance buttons). Two taps on a skill inside the double-tap
    /// window form a double tap.
    #[tool(name = "pointer.tap_node")]
    async fn pointer_tap_node(
        &self,
        params: Parameters<PointerTapNodeParams>,
    ) -> Result<Json<EventResponse>, ErrorData> {
        let node_id = parse_node_id(&params.0.node_id)?;
        let at_ms = params.0.at_ms.unwrap_or_else(|| self.now_ms());
        self.dispatch(EditorEvent::TapNode { node_id, at_ms }).await
    }

    /// Tap empty canvas: cancels edits, clears selection and affordances.
    #[tool(name = "pointer.tap_background")]
    async fn pointer_tap_background(&self) -> Result<Json<EventResponse>, ErrorData> {
        self.dispatch(EditorEvent::TapBackground).await
    }

    /// Report a skill (un)selection made in the renderer.
    #[tool(name = "selection.node")]
    async fn selection_node(
        &self,
        params: Parameters<SelectionNodeParams>,
    ) -> Result<Json<EventResponse>, ErrorData> {
        let node_id = parse_node_id(&params.0.node_id)?;
        let event = if params.0.selected {
            EditorEvent::SelectNode { node_id }
        } else {
            EditorEvent::UnselectNode { node_id }
        };
        self.dispatch(event).await
    }

    /// Report an edge (un)selection made in the renderer.
    #[tool(name = "selection.edge")]
    async fn selection_edge(
        &self,
        params: Parameters<SelectionEdgeParams>,
    ) -> Result<Json<EventResponse>, ErrorData> {
        let edge_id = parse_edge_id(&params.0.edge_id)?;
        let event = if params.0.selected {
            EditorEvent::SelectEdge { edge_id }
        } else {
            EditorEvent::UnselectEdge { edge_id }
        };
        self.dispatch(event).await
    }

    /// Drag a skill; its twin and any affordances anchored on it follow.
    #[tool(name = "node.move")]
    async fn node_move(&self, params: Parameters<NodeMoveParams>) -> Result<Json<EventResponse>, ErrorData> {
        let node_id = parse_node_id(&params.0.node_id)?;
        if !params.0.x.is_finite() || !params.0.y.is_finite() {
            return Err(ErrorData::invalid_params(
                "position must be finite",
                Some(serde_json::json!({ "x": params.0.x, "y": params.0.y })),
            ));
        }
        let position = Position::new(params.0.x, params.0.y);
        self.dispatch(EditorEvent::NodeMoved { node_id, position }).await
    }

    /// Update zoom, pan or canvas size; new skills are placed at the resulting center.
    #[tool(name = "viewport.set")]
    async fn viewport_set(
        &self,
        params: Parameters<ViewportSetParams>,
    ) -> Result<Json<EventResponse>, ErrorData> {
        let mut viewport = self.state.lock().await.editor.viewport();
        if let Some(zoom) = params.0.zoom {
            if !(zoom.is_finite() && zoom > 0.0) {
                return Err(ErrorData::invalid_params(
                    "zoom must be positive",
                    Some(serde_json::json!({ "zoom": zoom })),
                ));
            }
            viewport.zoom = zoom;
        }
        if let Some(pan) = params.0.pan {
            viewport.pan = Position::new(pan.x, pan.y);
        }
        if let Some(width) = params.0.width {
            viewport.width = width.max(0.0);
        }
        if let Some(height) = params.0.height {
            viewport.height = height.max(0.0);
        }
        self.dispatch(EditorEvent::ViewportChanged(viewport)).await
    }

    /// Press `escape`, `delete` or `enter`.
    #[tool(name = "key.press")]
    async fn key_press(&self, params: Parameters<KeyPressParams>) -> Result<Json<EventResponse>, ErrorData> {
        let key = parse_key(&params.0.key)?;
        self.dispatch(EditorEvent::Key(key)).await
    }

    /// Replace the draft of the active label edit (started by tapping a Rename button).
    #[tool(name = "label.draft")]
    async fn label_draft(
        &self,
        params: Parameters<LabelDraftParams>,
    ) -> Result<Json<LabelDraftResponse>, ErrorData> {
        let mut state = self.state.lock().await;
        if !state.editor.set_label_draft(params.0.draft) {
            return Err(ErrorData::invalid_request("no label edit is active", None));
        }
        let Some(edit) = state.editor.label_edit() else {
            return Err(ErrorData::internal_error("label edit vanished", None));
        };
        Ok(Json(LabelDraftResponse {
            node_id: edit.node_id.to_string(),
            draft: edit.draft.clone(),
        }))
    }

    /// Commit the active label edit.
    #[tool(name = "label.commit")]
    async fn label_commit(&self) -> Result<Json<EventResponse>, ErrorData> {
        let mut state = self.state.lock().await;
        let before = save_marker(&state.editor);
        let outcome = state.editor.commit_label();
        if save_marker(&state.editor) != before {
            self.persist(&state.editor)?;
        }
        Ok(Json(event_response(&outcome, state.editor.mode())))
    }

    /// Switch to `builder` or `player`; entering player mode requires a valid tree.
    #[tool(name = "mode.set")]
    async fn mode_set(&self, params: Parameters<ModeSetParams>) -> Result<Json<EventResponse>, ErrorData> {
        let mode = parse_mode(&params.0.mode)?;
        let mut state = self.state.lock().await;
        let outcome = state.editor.set_mode(mode).map_err(map_editor_error)?;
        self.persist(&state.editor)?;
        Ok(Json(event_response(&outcome, state.editor.mode())))
    }

    /// Flip between builder and player mode.
    #[tool(name = "mode.toggle")]
    async fn mode_toggle(&self) -> Result<Json<EventResponse>, ErrorData> {
        let mut state = self.state.lock().await;
        let outcome = state.editor.toggle_mode().map_err(map_editor_error)?;
        self.persist(&state.editor)?;
        Ok(Json(event_response(&outcome, state.editor.mode())))
    }
}

#[tool_handler]
impl ServerHandler for SkillTreeMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Skill tree builder/player (tools: tree.read, tree.validate, tree.export, tree.import, tree.save, skill.add, skill.search, skill.set_icon, skill.set_description, skill.info, pointer.tap_node, pointer.tap_background, selection.node, selection.edge, node.move, viewport.set, key.press, label.draft, label.commit, mode.set, mode.toggle)"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// Mapping helpers between editor types and MCP payloads.
include!("server/helpers.rs");
