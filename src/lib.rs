// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Skilltree: a skill tree builder/player core with an MCP automation surface.
//!
//! The renderer is external. It reports taps, selections, drags and key presses to
//! [`editor::Editor`], reads the element list back from the store and performs the returned
//! effects.

pub mod editor;
pub mod icons;
pub mod mcp;
pub mod model;
pub mod ops;
pub mod query;
pub mod store;
