// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Element storage and persistence.
//!
//! `ElementStore` is the in-memory source of truth the renderer reads; `snapshot` converts it to
//! and from the persisted JSON shape and `tree_file` writes that JSON to disk atomically.

pub mod demo;
pub mod elements;
pub mod snapshot;
pub mod tree_file;

pub use demo::demo_snapshot;
pub use elements::ElementStore;
pub use snapshot::{deserialize, serialize, Snapshot, SnapshotError, DEFAULT_TREE_NAME};
pub use tree_file::{StoreError, TreeFile, WriteDurability};
