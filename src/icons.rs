// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Icon resolution.
//!
//! Nodes reference icons by name; the provider turns a name into a handle the renderer can
//! draw. Names that cannot be resolved are drawn with the warning icon, but the handle keeps the
//! requested name so saving and reloading (possibly with a richer catalog) can resolve it again.

use smol_str::SmolStr;

pub const WARNING_ICON: &str = "warning";
pub const DEFAULT_SKILL_ICON: &str = "star";

const BUILTIN_ICONS: &[&str] =
    &["star", "sword", "shield", "flame", "leaf", "bolt", "book", "eye", "heart", "gem"];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconHandle {
    name: SmolStr,
    missing: bool,
}

impl IconHandle {
    pub fn found(name: impl AsRef<str>) -> Self {
        Self { name: SmolStr::new(name.as_ref()), missing: false }
    }

    /// A handle for a name the provider does not know. Blank names become `warning`.
    pub fn missing(name: &str) -> Self {
        let name = name.trim();
        let name = if name.is_empty() { WARNING_ICON } else { name };
        Self { name: SmolStr::new(name), missing: true }
    }

    /// The requested name; this is what gets persisted.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The icon to draw.
    pub fn glyph(&self) -> &str {
        if self.missing {
            WARNING_ICON
        } else {
            &self.name
        }
    }

    pub fn is_warning(&self) -> bool {
        self.missing
    }
}

pub trait IconProvider {
    /// Resolves `name`, falling back to a warning handle when unknown.
    fn resolve(&self, name: &str) -> IconHandle;

    fn names(&self) -> Vec<&str>;
}

/// The icon catalog compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinIcons;

impl IconProvider for BuiltinIcons {
    fn resolve(&self, name: &str) -> IconHandle {
        let trimmed = name.trim();
        match BUILTIN_ICONS.iter().copied().find(|known| known.eq_ignore_ascii_case(trimmed)) {
            Some(known) => IconHandle { name: SmolStr::new_static(known), missing: false },
            None => IconHandle::missing(trimmed),
        }
    }

    fn names(&self) -> Vec<&str> {
        BUILTIN_ICONS.to_vec()
    }
}
