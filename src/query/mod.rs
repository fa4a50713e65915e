// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only queries over the element store.

pub mod info;
pub mod search;
pub mod validate;

pub use info::{skill_info, SkillInfo};
pub use search::{search_skills, MatchKind, SkillMatch};
pub use validate::{validate, validate_tree, ValidationError, ValidationReport};
