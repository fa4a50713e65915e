// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Builder/Player behavior and the progress transfer between the two modes.

use tracing::debug;

pub use crate::model::Mode;
use crate::model::{NodeId, UnlockState};
use crate::ops::Op;
use crate::store::ElementStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoubleTapAction {
    /// Open the Rename / Change Icon / Delete triad.
    OpenNodeTools,
    /// Advance or revert the skill's play-through state.
    Progress,
}

/// Per-mode dispatch table, looked up once per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeBehavior {
    pub double_tap: DoubleTapAction,
    /// Node selection spawns the state selector / Connect affordances.
    pub selection_affordances: bool,
    /// Edge selection spawns the Delete Edge affordance.
    pub edge_affordances: bool,
    /// The Delete key removes the selected skills or edges.
    pub delete_key_edits: bool,
    /// Structural edits (add, rename, icon, delete, connect) are refused.
    pub nodes_locked: bool,
    /// A single tap asks the host to show the skill's info card.
    pub single_tap_info: bool,
}

const BUILDER: ModeBehavior = ModeBehavior {
    double_tap: DoubleTapAction::OpenNodeTools,
    selection_affordances: true,
    edge_affordances: true,
    delete_key_edits: true,
    nodes_locked: false,
    single_tap_info: false,
};

const PLAYER: ModeBehavior = ModeBehavior {
    double_tap: DoubleTapAction::Progress,
    selection_affordances: false,
    edge_affordances: false,
    delete_key_edits: false,
    nodes_locked: true,
    single_tap_info: true,
};

impl ModeBehavior {
    pub fn of(mode: Mode) -> &'static Self {
        match mode {
            Mode::Builder => &BUILDER,
            Mode::Player => &PLAYER,
        }
    }
}

/// Ops that move every skill into Player mode.
///
/// When any skill still carries a `tempState` from an earlier play-through, progress is
/// restored from it (skills without one fall back to `initialState`); otherwise every skill
/// starts fresh from `initialState`.
pub fn enter_player_ops(store: &ElementStore) -> Vec<Op> {
    let restore = store.skills().any(|skill| skill.temp_state().is_some());
    debug!(restore, "entering player mode");

    store
        .skills()
        .map(|skill| {
            let state = if restore {
                skill.temp_state().unwrap_or(skill.initial_state())
            } else {
                skill.initial_state()
            };
            Op::SetProgress {
                node_id: skill.id().clone(),
                state: Some(state),
                temp_state: None,
                locked: true,
            }
        })
        .collect()
}

/// Ops that park play-through progress in `tempState` and unlock every skill.
pub fn leave_player_ops(store: &ElementStore) -> Vec<Op> {
    store
        .skills()
        .map(|skill| Op::SetProgress {
            node_id: skill.id().clone(),
            state: None,
            temp_state: skill.state(),
            locked: false,
        })
        .collect()
}

/// Ops for a Player-mode double tap on `node_id`.
///
/// Available becomes Activated and promotes every Hidden neighbour (through an edge in either
/// direction) to Available. Activated reverts to Available without touching neighbours. Hidden
/// skills, and ids that are not skills, produce no ops.
pub fn progression_ops(store: &ElementStore, node_id: &NodeId) -> Vec<Op> {
    let Some(skill) = store.skill(node_id) else {
        return Vec::new();
    };

    match skill.state() {
        Some(UnlockState::Available) => {
            let mut ops = vec![Op::SetProgress {
                node_id: node_id.clone(),
                state: Some(UnlockState::Activated),
                temp_state: skill.temp_state(),
                locked: skill.locked(),
            }];
            let mut promoted: Vec<&NodeId> = Vec::new();
            for neighbour_id in store.edges().filter_map(|edge| edge.other_end(node_id)) {
                if promoted.contains(&neighbour_id) {
                    continue;
                }
                let Some(neighbour) = store.skill(neighbour_id) else {
                    continue;
                };
                if neighbour.state() == Some(UnlockState::Hidden) {
                    promoted.push(neighbour_id);
                    ops.push(Op::SetProgress {
                        node_id: neighbour_id.clone(),
                        state: Some(UnlockState::Available),
                        temp_state: neighbour.temp_state(),
                        locked: neighbour.locked(),
                    });
                }
            }
            ops
        }
        Some(UnlockState::Activated) => vec![Op::SetProgress {
            node_id: node_id.clone(),
            state: Some(UnlockState::Available),
            temp_state: skill.temp_state(),
            locked: skill.locked(),
        }],
        Some(UnlockState::Hidden) | None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        enter_player_ops, leave_player_ops, progression_ops, DoubleTapAction, Mode, ModeBehavior,
    };
    use crate::model::fixtures::{chain_abc, diamond, nid, push_edge, push_skill};
    use crate::model::{Element, GraphNode, Position, UnlockState};
    use crate::ops::apply_ops;
    use crate::store::ElementStore;

    fn state_of(store: &ElementStore, id: &str) -> Option<UnlockState> {
        store.node(&nid(id)).and_then(GraphNode::state)
    }

    fn played(elements: Vec<Element>) -> ElementStore {
        let mut store = ElementStore::new(elements);
        let ops = enter_player_ops(&store);
        apply_ops(&mut store, &ops).expect("enter player");
        store
    }

    #[test]
    fn behavior_table_differs_per_mode() {
        assert_eq!(ModeBehavior::of(Mode::Builder).double_tap, DoubleTapAction::OpenNodeTools);
        assert_eq!(ModeBehavior::of(Mode::Player).double_tap, DoubleTapAction::Progress);
        assert!(ModeBehavior::of(Mode::Player).nodes_locked);
        assert!(!ModeBehavior::of(Mode::Builder).nodes_locked);
        assert!(ModeBehavior::of(Mode::Player).single_tap_info);
        assert!(!ModeBehavior::of(Mode::Builder).single_tap_info);
    }

    #[test]
    fn entering_player_locks_and_starts_from_authored_states() {
        let store = played(chain_abc());

        for skill in store.skills() {
            assert!(skill.locked());
            assert_eq!(skill.temp_state(), None);
            assert_eq!(skill.state(), Some(skill.initial_state()));
        }
        let twin = store.node(&nid("flourish-a")).expect("twin");
        assert_eq!(twin.state(), Some(UnlockState::Available));
        assert!(twin.locked());
    }

    #[test]
    fn cascade_promotes_direct_neighbours_only() {
        let mut store = played(chain_abc());

        let ops = progression_ops(&store, &nid("a"));
        apply_ops(&mut store, &ops).expect("progress");

        assert_eq!(state_of(&store, "a"), Some(UnlockState::Activated));
        assert_eq!(state_of(&store, "b"), Some(UnlockState::Available));
        assert_eq!(state_of(&store, "c"), Some(UnlockState::Hidden));
    }

    #[test]
    fn cascade_follows_edges_in_either_direction() {
        let mut elements = Vec::new();
        push_skill(&mut elements, "x", UnlockState::Hidden, Position::default());
        push_skill(&mut elements, "y", UnlockState::Available, Position::new(0.0, 80.0));
        push_edge(&mut elements, "x", "y");
        let mut store = played(elements);

        let ops = progression_ops(&store, &nid("y"));
        apply_ops(&mut store, &ops).expect("progress");

        assert_eq!(state_of(&store, "y"), Some(UnlockState::Activated));
        assert_eq!(state_of(&store, "x"), Some(UnlockState::Available));
    }

    #[test]
    fn merging_branches_promote_each_neighbour_once() {
        let mut store = played(diamond());
        for id in ["a", "b"] {
            let ops = progression_ops(&store, &nid(id));
            apply_ops(&mut store, &ops).expect("progress");
        }

        assert_eq!(state_of(&store, "c"), Some(UnlockState::Available));
        assert_eq!(state_of(&store, "d"), Some(UnlockState::Available));
        let ops = progression_ops(&store, &nid("c"));
        // c activates; d is already Available so only c changes.
        assert_eq!(ops.len(), 1);
    }

    #[test]
    fn reverting_does_not_cascade_and_hidden_ignores_taps() {
        let mut store = played(chain_abc());
        let ops = progression_ops(&store, &nid("a"));
        apply_ops(&mut store, &ops).expect("activate");

        let ops = progression_ops(&store, &nid("a"));
        apply_ops(&mut store, &ops).expect("revert");
        assert_eq!(state_of(&store, "a"), Some(UnlockState::Available));
        assert_eq!(state_of(&store, "b"), Some(UnlockState::Available));

        assert!(progression_ops(&store, &nid("c")).is_empty());
        assert!(progression_ops(&store, &nid("flourish-a")).is_empty());
    }

    #[test]
    fn leave_then_enter_restores_progress() {
        let mut store = played(chain_abc());
        let ops = progression_ops(&store, &nid("a"));
        apply_ops(&mut store, &ops).expect("activate");

        let ops = leave_player_ops(&store);
        apply_ops(&mut store, &ops).expect("leave");
        assert_eq!(state_of(&store, "a"), None);
        assert_eq!(store.node(&nid("a")).and_then(GraphNode::temp_state), Some(UnlockState::Activated));
        assert!(store.skills().all(|skill| !skill.locked()));

        let ops = enter_player_ops(&store);
        apply_ops(&mut store, &ops).expect("enter");
        assert_eq!(state_of(&store, "a"), Some(UnlockState::Activated));
        assert_eq!(state_of(&store, "b"), Some(UnlockState::Available));
        assert_eq!(state_of(&store, "c"), Some(UnlockState::Hidden));
    }
}
