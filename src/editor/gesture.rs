// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

use crate::model::NodeId;

pub const DEFAULT_DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tap {
    Single,
    Double,
}

/// Tells single taps from double taps using the last tapped id and its timestamp.
///
/// Nothing waits: every tap is classified immediately and only changes how the next tap on the
/// same node is read. The renderer has no native double-click signal, so timestamps come from
/// the caller.
#[derive(Debug, Clone)]
pub struct TapTracker {
    last_tapped_id: Option<NodeId>,
    last_tap_ms: u64,
    window_ms: u64,
}

impl Default for TapTracker {
    fn default() -> Self {
        Self::new(DEFAULT_DOUBLE_TAP_WINDOW)
    }
}

impl TapTracker {
    pub fn new(window: Duration) -> Self {
        let window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        Self { last_tapped_id: None, last_tap_ms: 0, window_ms }
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Classifies a tap on `node_id` at `at_ms`. A double tap clears the tracker so a third tap
    /// starts a new pair.
    pub fn observe(&mut self, node_id: &NodeId, at_ms: u64) -> Tap {
        let is_double = self.last_tapped_id.as_ref() == Some(node_id)
            && at_ms
                .checked_sub(self.last_tap_ms)
                .is_some_and(|elapsed| elapsed < self.window_ms);

        if is_double {
            self.reset();
            Tap::Double
        } else {
            self.last_tapped_id = Some(node_id.clone());
            self.last_tap_ms = at_ms;
            Tap::Single
        }
    }

    pub fn reset(&mut self) {
        self.last_tapped_id = None;
        self.last_tap_ms = 0;
    }

    pub fn last_tapped_id(&self) -> Option<&NodeId> {
        self.last_tapped_id.as_ref()
    }
}
