// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::icons::IconHandle;
use crate::model::{Mode, NodeId, UnlockState};
use crate::store::ElementStore;

pub const HIDDEN_LABEL: &str = "Unknown";
pub const HIDDEN_DESCRIPTION: &str =
    "This node is currently hidden. You must unlock it to view its description.";
pub const NO_DESCRIPTION: &str = "No description available.";

/// What an info card shows for one skill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillInfo {
    pub node_id: NodeId,
    pub label: String,
    /// `None` while the skill is masked.
    pub icon: Option<IconHandle>,
    pub description: String,
    /// Live state in Player mode, authored `initialState` otherwise.
    pub state: UnlockState,
    /// True when a Hidden skill is shown without its label, icon and description.
    pub masked: bool,
}

/// Info card for a Skill node, or `None` when `node_id` is not a skill.
///
/// In Player mode a skill whose live state is Hidden keeps its secrets: the card shows a
/// placeholder label and text and no icon. Builder mode always shows the authored content.
pub fn skill_info(store: &ElementStore, node_id: &NodeId, mode: Mode) -> Option<SkillInfo> {
    let skill = store.skill(node_id)?;
    let state = match mode {
        Mode::Player => skill.state().unwrap_or(skill.initial_state()),
        Mode::Builder => skill.initial_state(),
    };

    if mode == Mode::Player && state == UnlockState::Hidden {
        return Some(SkillInfo {
            node_id: node_id.clone(),
            label: HIDDEN_LABEL.to_owned(),
            icon: None,
            description: HIDDEN_DESCRIPTION.to_owned(),
            state,
            masked: true,
        });
    }

    let description = match skill.description().trim() {
        "" => NO_DESCRIPTION.to_owned(),
        _ => skill.description().to_owned(),
    };
    Some(SkillInfo {
        node_id: node_id.clone(),
        label: skill.label().to_owned(),
        icon: skill.icon().cloned(),
        description,
        state,
        masked: false,
    })
}
