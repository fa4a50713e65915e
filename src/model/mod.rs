// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A skill tree is an ordered list of elements: Skill nodes (each with a decorative Flourish
//! twin), directed edges between skills, and transient Action nodes spawned as on-canvas
//! controls.

pub mod action;
pub mod element;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;

pub use action::{ActionBinding, ActionTarget, AffordanceAction, GroupId};
pub use element::{
    flourish_position, Element, GraphEdge, GraphNode, Mode, NodeKind, ParseUnlockStateError,
    Position, UnlockState, Viewport, FLOURISH_OFFSET_Y,
};
pub use ids::{
    connect_edge_id, flourish_id, free_connect_edge_id, skill_id, skill_id_number, EdgeId, Id,
    IdError, NodeId,
};
