// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{EdgeId, Mode, NodeId, Position, Viewport};

/// Input reported by the renderer (or a driver standing in for it).
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// Tap on a node; `at_ms` is the caller's monotonic clock in milliseconds.
    TapNode { node_id: NodeId, at_ms: u64 },
    TapBackground,
    SelectNode { node_id: NodeId },
    UnselectNode { node_id: NodeId },
    SelectEdge { edge_id: EdgeId },
    UnselectEdge { edge_id: EdgeId },
    /// A node was dragged to `position`.
    NodeMoved { node_id: NodeId, position: Position },
    ViewportChanged(Viewport),
    Key(Key),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Delete,
    Enter,
}

/// Something the host has to act on after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    DoubleTap { node_id: NodeId },
    /// Show a text field pre-filled with `label` for `node_id`.
    LabelEditStarted { node_id: NodeId, label: String },
    LabelCommitted { node_id: NodeId, label: String },
    /// Ask the icon picker for a new icon for `node_id`.
    ChooseIcon { node_id: NodeId },
    /// The renderer should drop `node_id` from its own selection.
    UnselectNode { node_id: NodeId },
    ClearRendererSelection,
    /// User-facing message.
    Notice { message: String },
    ModeChanged { mode: Mode },
    /// Show the info card for `node_id` (see `Editor::skill_info`).
    ShowInfo { node_id: NodeId },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outcome {
    pub effects: Vec<Effect>,
    /// Store revision after handling the event.
    pub rev: u64,
}

impl Outcome {
    pub fn has(&self, predicate: impl Fn(&Effect) -> bool) -> bool {
        self.effects.iter().any(predicate)
    }
}
