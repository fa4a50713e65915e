// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Interactive editing state machine.
//!
//! [`Editor`] owns every piece of mutable interaction state (store, tap tracker, selection,
//! affordances, mode and label edit) and is driven by discrete [`EditorEvent`]s. Each event is
//! handled synchronously; the returned [`Outcome`] lists what the host must do next and the
//! store revision the renderer should re-read.

pub mod affordance;
pub mod event;
pub mod gesture;
pub mod mode;
pub mod selection;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

pub use affordance::{AffordanceManager, GroupKind, PositionFeed, Subscription};
pub use event::{Effect, EditorEvent, Key, Outcome};
pub use gesture::{Tap, TapTracker, DEFAULT_DOUBLE_TAP_WINDOW};
pub use mode::{DoubleTapAction, Mode, ModeBehavior};
pub use selection::{SelectOutcome, SelectionSet, MAX_SELECTED_NODES};

use crate::icons::{BuiltinIcons, IconHandle, IconProvider, DEFAULT_SKILL_ICON};
use crate::model::{
    free_connect_edge_id, skill_id, skill_id_number, ActionBinding, ActionTarget,
    AffordanceAction, EdgeId, Element, GraphNode, NodeId, NodeKind, Position, UnlockState,
    Viewport,
};
use crate::ops::{apply_ops, ApplyError, Op};
use crate::query::{skill_info, validate, SkillInfo, ValidationReport};
use crate::store::{ElementStore, Snapshot, DEFAULT_TREE_NAME};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorConfig {
    /// Two taps on the same node closer than this are a double tap.
    pub double_tap_window: Duration,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self { double_tap_window: DEFAULT_DOUBLE_TAP_WINDOW }
    }
}

/// An in-progress rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEdit {
    pub node_id: NodeId,
    pub draft: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// Structural edits are refused while playing.
    Locked { mode: Mode },
    /// The tree cannot enter Player mode.
    InvalidTree { report: ValidationReport },
    Apply(ApplyError),
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked { mode } => write!(f, "skills cannot be edited in {mode} mode"),
            Self::InvalidTree { report } => {
                for (idx, err) in report.errors().iter().enumerate() {
                    if idx > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{err}")?;
                }
                Ok(())
            }
            Self::Apply(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for EditorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Apply(err) => Some(err),
            Self::Locked { .. } | Self::InvalidTree { .. } => None,
        }
    }
}

impl From<ApplyError> for EditorError {
    fn from(err: ApplyError) -> Self {
        Self::Apply(err)
    }
}

pub struct Editor {
    store: ElementStore,
    icons: Box<dyn IconProvider + Send + Sync>,
    taps: TapTracker,
    selection: SelectionSet,
    affordances: AffordanceManager,
    mode: Mode,
    label_edit: Option<LabelEdit>,
    viewport: Viewport,
    tree_name: String,
    config: EditorConfig,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("rev", &self.store.rev())
            .field("elements", &self.store.len())
            .field("mode", &self.mode)
            .field("selection", &self.selection)
            .field("label_edit", &self.label_edit)
            .finish_non_exhaustive()
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            store: ElementStore::default(),
            icons: Box::new(BuiltinIcons),
            taps: TapTracker::new(config.double_tap_window),
            selection: SelectionSet::default(),
            affordances: AffordanceManager::default(),
            mode: Mode::Builder,
            label_edit: None,
            viewport: Viewport::default(),
            tree_name: DEFAULT_TREE_NAME.to_owned(),
            config,
        }
    }

    pub fn with_icons(mut self, icons: impl IconProvider + Send + Sync + 'static) -> Self {
        self.icons = Box::new(icons);
        self
    }

    pub fn config(&self) -> EditorConfig {
        self.config
    }

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    /// Renderer projection of the current elements.
    pub fn elements(&self) -> Arc<[Element]> {
        self.store.all()
    }

    pub fn rev(&self) -> u64 {
        self.store.rev()
    }

    /// Revision of the persistable tree; affordance churn does not move it.
    pub fn tree_rev(&self) -> u64 {
        self.store.tree_rev()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn behavior(&self) -> &'static ModeBehavior {
        ModeBehavior::of(self.mode)
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn affordances(&self) -> &AffordanceManager {
        &self.affordances
    }

    pub fn label_edit(&self) -> Option<&LabelEdit> {
        self.label_edit.as_ref()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn tree_name(&self) -> &str {
        &self.tree_name
    }

    pub fn set_tree_name(&mut self, tree_name: impl Into<String>) {
        self.tree_name = tree_name.into();
    }

    pub fn icons(&self) -> &dyn IconProvider {
        self.icons.as_ref()
    }

    pub fn handle(&mut self, event: EditorEvent) -> Outcome {
        let mut effects = Vec::new();
        match event {
            EditorEvent::TapNode { node_id, at_ms } => self.on_tap_node(&node_id, at_ms, &mut effects),
            EditorEvent::TapBackground => self.on_tap_background(&mut effects),
            EditorEvent::SelectNode { node_id } => self.on_select_node(node_id, &mut effects),
            EditorEvent::UnselectNode { node_id } => self.on_unselect_node(&node_id),
            EditorEvent::SelectEdge { edge_id } => self.on_select_edge(edge_id),
            EditorEvent::UnselectEdge { edge_id } => self.on_unselect_edge(&edge_id),
            EditorEvent::NodeMoved { node_id, position } => self.on_node_moved(&node_id, position),
            EditorEvent::ViewportChanged(viewport) => self.viewport = viewport,
            EditorEvent::Key(Key::Escape) => self.cancel_in_place(),
            EditorEvent::Key(Key::Enter) => self.commit_label_into(&mut effects),
            EditorEvent::Key(Key::Delete) => self.on_delete_key(&mut effects),
        }
        self.outcome(effects)
    }

    fn outcome(&self, effects: Vec<Effect>) -> Outcome {
        Outcome { effects, rev: self.store.rev() }
    }

    fn on_tap_node(&mut self, node_id: &NodeId, at_ms: u64, effects: &mut Vec<Effect>) {
        let Some(node) = self.store.node(node_id) else {
            debug!(%node_id, "tap on a node that no longer exists");
            return;
        };
        let kind = node.kind();
        let binding = node.action_binding().cloned();

        match kind {
            NodeKind::Action => {
                if let Some(binding) = binding {
                    self.run_affordance(binding, effects);
                }
            }
            NodeKind::Flourish => debug!(%node_id, "flourish nodes are not interactive"),
            NodeKind::Skill => match self.taps.observe(node_id, at_ms) {
                Tap::Double => {
                    debug!(%node_id, at_ms, "double tap");
                    effects.push(Effect::DoubleTap { node_id: node_id.clone() });
                    match self.behavior().double_tap {
                        DoubleTapAction::OpenNodeTools => self.open_node_tools(node_id),
                        DoubleTapAction::Progress => self.progress(node_id),
                    }
                }
                Tap::Single => {
                    if self.behavior().single_tap_info {
                        effects.push(Effect::ShowInfo { node_id: node_id.clone() });
                    }
                    let reshow = self.behavior().selection_affordances
                        && self.label_edit.is_none()
                        && self.affordances.is_empty()
                        && self.selection.single() == Some(node_id);
                    if reshow {
                        settle(self.affordances.spawn_state_selector(&mut self.store, node_id));
                    }
                }
            },
        }
    }

    fn open_node_tools(&mut self, node_id: &NodeId) {
        settle(self.affordances.purge(&mut self.store));
        settle(self.affordances.spawn_node_tools(&mut self.store, node_id));
    }

    fn progress(&mut self, node_id: &NodeId) {
        let ops = mode::progression_ops(&self.store, node_id);
        if ops.is_empty() {
            debug!(%node_id, "double tap does not change progress");
            return;
        }
        self.commit(&ops);
    }

    fn on_tap_background(&mut self, effects: &mut Vec<Effect>) {
        self.label_edit = None;
        self.selection.clear();
        self.taps.reset();
        settle(self.affordances.purge(&mut self.store));
        effects.push(Effect::ClearRendererSelection);
    }

    fn on_select_node(&mut self, node_id: NodeId, effects: &mut Vec<Effect>) {
        if self.store.skill(&node_id).is_none() {
            debug!(%node_id, "selection of a non-skill node is not tracked");
            return;
        }
        match self.selection.select_node(node_id) {
            SelectOutcome::Unchanged => return,
            SelectOutcome::Added { evicted } => {
                if let Some(evicted) = evicted {
                    effects.push(Effect::UnselectNode { node_id: evicted });
                }
            }
        }
        self.refresh_selection_affordances();
    }

    fn on_unselect_node(&mut self, node_id: &NodeId) {
        if self.selection.unselect_node(node_id) {
            self.refresh_selection_affordances();
        }
    }

    /// Tears down existing affordances and shows the ones matching the selection cardinality.
    fn refresh_selection_affordances(&mut self) {
        if !self.behavior().selection_affordances {
            return;
        }
        settle(self.affordances.purge(&mut self.store));

        if let Some(node_id) = self.selection.single().cloned() {
            settle(self.affordances.spawn_state_selector(&mut self.store, &node_id));
        } else if let Some((source_id, target_id)) = self.selection.pair() {
            let (source_id, target_id) = (source_id.clone(), target_id.clone());
            if self.store.edge_between(&source_id, &target_id).is_some() {
                debug!(%source_id, %target_id, "skills already connected; no Connect offered");
            } else {
                settle(self.affordances.spawn_connect(&mut self.store, &source_id, &target_id));
            }
        } else {
            self.respawn_edge_tools();
        }
    }

    fn on_select_edge(&mut self, edge_id: EdgeId) {
        if self.store.edge(edge_id.as_str()).is_none() {
            debug!(%edge_id, "selection of an unknown edge");
            return;
        }
        if !self.selection.select_edge(edge_id.clone()) {
            return;
        }
        if self.behavior().edge_affordances {
            let edges: Vec<EdgeId> = self.selection.edge_ids().cloned().collect();
            settle(self.affordances.spawn_edge_tools(&mut self.store, &edge_id, edges));
        }
    }

    fn on_unselect_edge(&mut self, edge_id: &EdgeId) {
        if self.selection.unselect_edge(edge_id) && self.behavior().edge_affordances {
            self.respawn_edge_tools();
        }
    }

    fn respawn_edge_tools(&mut self) {
        let edges: Vec<EdgeId> = self.selection.edge_ids().cloned().collect();
        match edges.first().cloned() {
            Some(first) => {
                settle(self.affordances.spawn_edge_tools(&mut self.store, &first, edges));
            }
            None => {
                settle(self.affordances.dismiss_kind(&mut self.store, GroupKind::EdgeTools));
            }
        }
    }

    fn on_node_moved(&mut self, node_id: &NodeId, position: Position) {
        if self.behavior().nodes_locked {
            debug!(%node_id, "nodes are locked; ignoring move");
            return;
        }
        if self.store.skill(node_id).is_none() {
            debug!(%node_id, "only skills move; ignoring");
            return;
        }
        let mut ops = vec![Op::MoveNode { node_id: node_id.clone(), position }];
        ops.extend(self.affordances.follow_ops(&self.store, node_id, position));
        self.commit(&ops);
    }

    fn on_delete_key(&mut self, effects: &mut Vec<Effect>) {
        if self.label_edit.is_some() || !self.behavior().delete_key_edits {
            return;
        }

        let ops: Vec<Op> = if self.selection.has_edges() {
            self.selection
                .edge_ids()
                .filter(|edge_id| self.store.edge(edge_id.as_str()).is_some())
                .map(|edge_id| Op::RemoveEdge { edge_id: edge_id.clone() })
                .collect()
        } else {
            self.selection
                .node_ids()
                .iter()
                .filter(|node_id| self.store.skill(node_id).is_some())
                .map(|node_id| Op::RemoveSkill { node_id: node_id.clone() })
                .collect()
        };
        if ops.is_empty() {
            return;
        }

        settle(self.affordances.purge(&mut self.store));
        self.commit(&ops);
        self.selection.clear();
        effects.push(Effect::ClearRendererSelection);
    }

    fn run_affordance(&mut self, binding: ActionBinding, effects: &mut Vec<Effect>) {
        if self.behavior().nodes_locked {
            debug!("affordance tapped while locked; clearing affordances");
            settle(self.affordances.purge(&mut self.store));
            return;
        }
        let group = binding.group();

        match (binding.action(), binding.target()) {
            (AffordanceAction::Rename, ActionTarget::Node(node_id)) => {
                match self.store.skill(node_id).map(|skill| skill.label().to_owned()) {
                    Some(label) => {
                        self.label_edit =
                            Some(LabelEdit { node_id: node_id.clone(), draft: label.clone() });
                        effects.push(Effect::LabelEditStarted { node_id: node_id.clone(), label });
                    }
                    None => debug!(%node_id, "rename target is gone"),
                }
                settle(self.affordances.dismiss(&mut self.store, group));
            }
            (AffordanceAction::Delete, ActionTarget::Node(node_id)) => {
                settle(self.affordances.purge(&mut self.store));
                if self.commit(&[Op::RemoveSkill { node_id: node_id.clone() }]) {
                    info!(%node_id, "deleted skill");
                }
                if self.label_edit.as_ref().is_some_and(|edit| &edit.node_id == node_id) {
                    self.label_edit = None;
                }
                self.finish_action(effects);
            }
            (AffordanceAction::ChangeIcon, ActionTarget::Node(node_id)) => {
                if self.store.skill(node_id).is_some() {
                    effects.push(Effect::ChooseIcon { node_id: node_id.clone() });
                }
                settle(self.affordances.dismiss(&mut self.store, group));
            }
            (AffordanceAction::Connect, ActionTarget::Pair { source_id, target_id }) => {
                settle(self.affordances.dismiss(&mut self.store, group));
                self.commit(&[Op::AddEdge {
                    edge_id: self.free_edge_id(source_id, target_id),
                    source_id: source_id.clone(),
                    target_id: target_id.clone(),
                }]);
                self.finish_action(effects);
            }
            (AffordanceAction::SetState(state), ActionTarget::Node(node_id)) => {
                self.commit(&[Op::SetInitialState { node_id: node_id.clone(), state }]);
                settle(self.affordances.dismiss(&mut self.store, group));
            }
            (AffordanceAction::DeleteEdge, ActionTarget::Edges(edge_ids)) => {
                settle(self.affordances.dismiss(&mut self.store, group));
                let ops: Vec<Op> = edge_ids
                    .iter()
                    .filter(|edge_id| self.store.edge(edge_id.as_str()).is_some())
                    .map(|edge_id| Op::RemoveEdge { edge_id: edge_id.clone() })
                    .collect();
                if !ops.is_empty() {
                    self.commit(&ops);
                }
                self.finish_action(effects);
            }
            (action, target) => {
                warn!(?action, ?target, "affordance binding does not match its action");
                settle(self.affordances.dismiss(&mut self.store, group));
            }
        }
    }

    /// Common tail of completed edits: selection cleared on both sides, affordances gone.
    fn finish_action(&mut self, effects: &mut Vec<Effect>) {
        self.selection.clear();
        settle(self.affordances.purge(&mut self.store));
        effects.push(Effect::ClearRendererSelection);
    }

    /// Applies `ops`; failures are logged and leave the store unchanged.
    fn commit(&mut self, ops: &[Op]) -> bool {
        settle(apply_ops(&mut self.store, ops)).is_some()
    }

    fn free_edge_id(&self, source_id: &NodeId, target_id: &NodeId) -> EdgeId {
        free_connect_edge_id(source_id, target_id, |id| self.store.get(id).is_some())
    }

    fn ensure_unlocked(&self) -> Result<(), EditorError> {
        if self.behavior().nodes_locked {
            return Err(EditorError::Locked { mode: self.mode });
        }
        Ok(())
    }

    /// Skill the user is currently working on: an open label edit or Rename/Delete triad.
    pub fn edit_target(&self) -> Option<NodeId> {
        self.label_edit
            .as_ref()
            .map(|edit| &edit.node_id)
            .or_else(|| self.affordances.anchor_node(GroupKind::NodeTools))
            .filter(|node_id| self.store.skill(node_id).is_some())
            .cloned()
    }

    /// Adds a skill at the viewport center, connected from the current edit target if any.
    ///
    /// The first skill of a tree starts Available so the tree stays playable; later ones start
    /// Hidden.
    pub fn add_skill(&mut self) -> Result<NodeId, EditorError> {
        self.ensure_unlocked()?;

        let next = self
            .store
            .nodes()
            .filter_map(|node| skill_id_number(node.id()))
            .max()
            .unwrap_or(0)
            .saturating_add(1);
        let node_id = skill_id(next);
        let initial_state = if self.store.skills().next().is_none() {
            UnlockState::Available
        } else {
            UnlockState::Hidden
        };

        let mut ops = vec![Op::AddSkill {
            node_id: node_id.clone(),
            label: format!("Skill {next}"),
            icon: self.icons.resolve(DEFAULT_SKILL_ICON),
            initial_state,
            position: self.viewport.center(),
        }];
        if let Some(parent_id) = self.edit_target() {
            ops.push(Op::AddEdge {
                edge_id: self.free_edge_id(&parent_id, &node_id),
                source_id: parent_id,
                target_id: node_id.clone(),
            });
        }
        apply_ops(&mut self.store, &ops)?;
        info!(%node_id, "added skill");
        Ok(node_id)
    }

    /// Replaces the draft of the active label edit. Returns false when no edit is active.
    pub fn set_label_draft(&mut self, draft: impl Into<String>) -> bool {
        match self.label_edit.as_mut() {
            Some(edit) => {
                edit.draft = draft.into();
                true
            }
            None => false,
        }
    }

    pub fn commit_label(&mut self) -> Outcome {
        let mut effects = Vec::new();
        self.commit_label_into(&mut effects);
        self.outcome(effects)
    }

    fn commit_label_into(&mut self, effects: &mut Vec<Effect>) {
        let Some(edit) = self.label_edit.take() else {
            return;
        };
        let label = edit.draft.trim().to_owned();
        if label.is_empty() {
            debug!(node_id = %edit.node_id, "empty label; keeping the old one");
        } else if self.commit(&[Op::RenameNode { node_id: edit.node_id.clone(), label: label.clone() }])
        {
            effects.push(Effect::LabelCommitted { node_id: edit.node_id, label });
        }
        self.finish_action(effects);
    }

    /// Escape: discards the label edit and every affordance. The selection is kept.
    pub fn cancel(&mut self) -> Outcome {
        self.cancel_in_place();
        self.outcome(Vec::new())
    }

    fn cancel_in_place(&mut self) {
        self.label_edit = None;
        settle(self.affordances.purge(&mut self.store));
    }

    /// Answer from the icon picker.
    pub fn set_icon(&mut self, node_id: &NodeId, name: &str) -> Result<IconHandle, EditorError> {
        self.ensure_unlocked()?;
        let icon = self.icons.resolve(name);
        apply_ops(&mut self.store, &[Op::SetIcon { node_id: node_id.clone(), icon: icon.clone() }])?;
        Ok(icon)
    }

    /// Answer from the info text editor. A blank text clears the description.
    pub fn set_description(
        &mut self,
        node_id: &NodeId,
        description: impl Into<String>,
    ) -> Result<(), EditorError> {
        self.ensure_unlocked()?;
        let description: String = description.into();
        let description = description.trim();
        apply_ops(
            &mut self.store,
            &[Op::SetDescription { node_id: node_id.clone(), description: description.to_owned() }],
        )?;
        Ok(())
    }

    /// Info card for a skill as the current mode presents it.
    pub fn skill_info(&self, node_id: &NodeId) -> Option<SkillInfo> {
        skill_info(&self.store, node_id, self.mode)
    }

    /// Switches mode. Entering Player mode is refused (with nothing mutated) when the tree does
    /// not validate.
    pub fn set_mode(&mut self, target: Mode) -> Result<Outcome, EditorError> {
        if target == self.mode {
            return Ok(self.outcome(Vec::new()));
        }

        self.label_edit = None;
        self.taps.reset();
        self.affordances.purge(&mut self.store)?;

        let ops = match target {
            Mode::Player => {
                let report = validate(self.store.as_slice());
                if !report.is_valid() {
                    info!(errors = report.errors().len(), "tree is not playable; staying in builder");
                    return Err(EditorError::InvalidTree { report });
                }
                mode::enter_player_ops(&self.store)
            }
            Mode::Builder => mode::leave_player_ops(&self.store),
        };
        apply_ops(&mut self.store, &ops)?;

        self.mode = target;
        self.selection.clear();
        info!(mode = %target, "mode changed");
        Ok(self.outcome(vec![Effect::ModeChanged { mode: target }, Effect::ClearRendererSelection]))
    }

    pub fn toggle_mode(&mut self) -> Result<Outcome, EditorError> {
        self.set_mode(self.mode.toggled())
    }

    /// Like `set_mode`, but a refusal becomes a user-facing notice.
    pub fn request_mode(&mut self, target: Mode) -> Outcome {
        match self.set_mode(target) {
            Ok(outcome) => outcome,
            Err(err) => self.outcome(vec![Effect::Notice { message: err.to_string() }]),
        }
    }

    pub fn validate(&self) -> ValidationReport {
        validate(self.store.as_slice())
    }

    /// Persistable view of the editor: every non-Action element plus viewport and mode.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            elements: self
                .store
                .as_slice()
                .iter()
                .filter(|element| !element.as_node().is_some_and(GraphNode::is_action))
                .cloned()
                .collect(),
            tree_name: self.tree_name.clone(),
            zoom: self.viewport.zoom,
            pan: self.viewport.pan,
            mode: self.mode,
        }
    }

    /// Replaces the tree with `snapshot` and resets all interaction state.
    ///
    /// The tree always lands in Builder shape first: `state` is folded into `tempState`, a
    /// missing `tempState` becomes `initialState` and nothing is locked. A Player snapshot then
    /// goes through the regular mode switch, so an unplayable tree stays in Builder mode and the
    /// outcome carries a notice instead.
    pub fn load_snapshot(&mut self, snapshot: Snapshot) -> Outcome {
        let Snapshot { elements, tree_name, zoom, pan, mode } = snapshot;
        let elements = builder_shape(elements, mode);
        let count = elements.len();
        self.store.replace(move |_| elements);
        self.store.mark_tree_changed();

        self.affordances.forget();
        self.selection.clear();
        self.label_edit = None;
        self.taps.reset();
        self.viewport.zoom = zoom;
        self.viewport.pan = pan;
        self.tree_name = tree_name;
        self.mode = Mode::Builder;
        info!(elements = count, mode = %mode, tree = %self.tree_name, "loaded snapshot");

        match mode {
            Mode::Builder => self.outcome(Vec::new()),
            Mode::Player => self.request_mode(Mode::Player),
        }
    }
}

/// Drops Action nodes and rewrites skills (and their twins) into unlocked Builder form.
fn builder_shape(elements: Vec<Element>, saved_mode: Mode) -> Vec<Element> {
    let mut elements: Vec<Element> = elements
        .into_iter()
        .filter(|element| !element.as_node().is_some_and(GraphNode::is_action))
        .collect();

    let mut skills = BTreeMap::new();
    for node in elements.iter_mut().filter_map(Element::as_node_mut) {
        if !node.is_skill() {
            continue;
        }
        let parked = match saved_mode {
            Mode::Player => node.state().or(node.temp_state()),
            Mode::Builder => node.temp_state(),
        };
        node.set_temp_state(Some(parked.unwrap_or(node.initial_state())));
        node.set_state(None);
        node.set_locked(false);
        skills.insert(node.id().clone(), node.clone());
    }
    for node in elements.iter_mut().filter_map(Element::as_node_mut) {
        if node.kind() != NodeKind::Flourish {
            continue;
        }
        if let Some(skill) = node.parent_skill_id().and_then(|id| skills.get(id)) {
            node.mirror_states_from(skill);
        }
    }
    elements
}

/// Logs a failed store update: stale references are expected and quiet, anything else warns.
fn settle<T>(result: Result<T, ApplyError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) if err.is_stale_reference() => {
            debug!(error = %err, "ignoring stale reference");
            None
        }
        Err(err) => {
            warn!(error = %err, "store update rejected");
            None
        }
    }
}
