// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Playability checks run before a tree can be played.
//!
//! Only the skill subgraph is inspected: Skill nodes and edges whose endpoints are both skills.
//! Flourish twins and Action nodes never take part.

use std::collections::BTreeMap;
use std::fmt;

use crate::model::{Element, GraphNode, NodeId, UnlockState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    /// First directed cycle found, as a closed path (`a, b, a`).
    pub cycle: Option<Vec<NodeId>>,
    /// Roots (skills without incoming edges) whose `initialState` is Hidden.
    pub hidden_roots: Vec<NodeId>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.cycle.is_none() && self.hidden_roots.is_empty()
    }

    pub fn errors(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Some(path) = &self.cycle {
            errors.push(ValidationError::Cycle { path: path.clone() });
        }
        errors.extend(
            self.hidden_roots
                .iter()
                .map(|node_id| ValidationError::HiddenRoot { node_id: node_id.clone() }),
        );
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Cycle { path: Vec<NodeId> },
    HiddenRoot { node_id: NodeId },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cycle { path } => {
                f.write_str("Skill tree contains a cycle: ")?;
                for (idx, node_id) in path.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" -> ")?;
                    }
                    write!(f, "{node_id}")?;
                }
                Ok(())
            }
            Self::HiddenRoot { node_id } => {
                write!(f, "Root skill {node_id} is hidden; players could never reach it")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    OnStack,
    Done,
}

/// Runs the cycle check and the hidden-root check over `elements`.
pub fn validate(elements: &[Element]) -> ValidationReport {
    let skills: Vec<&GraphNode> =
        elements.iter().filter_map(Element::as_node).filter(|node| node.is_skill()).collect();
    let index: BTreeMap<&str, usize> =
        skills.iter().enumerate().map(|(idx, node)| (node.id().as_str(), idx)).collect();

    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); skills.len()];
    let mut has_incoming = vec![false; skills.len()];
    for edge in elements.iter().filter_map(Element::as_edge) {
        let (Some(&from), Some(&to)) =
            (index.get(edge.source_id().as_str()), index.get(edge.target_id().as_str()))
        else {
            continue;
        };
        outgoing[from].push(to);
        has_incoming[to] = true;
    }

    let cycle = find_cycle(&outgoing)
        .map(|path| path.into_iter().map(|idx| skills[idx].id().clone()).collect());

    let hidden_roots = skills
        .iter()
        .zip(&has_incoming)
        .filter(|(node, incoming)| !**incoming && node.initial_state() == UnlockState::Hidden)
        .map(|(node, _)| node.id().clone())
        .collect();

    ValidationReport { cycle, hidden_roots }
}

/// True when the tree can enter Player mode.
pub fn validate_tree(elements: &[Element]) -> bool {
    validate(elements).is_valid()
}

/// Iterative depth-first search; a back-edge to a node still on the stack closes a cycle.
fn find_cycle(outgoing: &[Vec<usize>]) -> Option<Vec<usize>> {
    let mut visit = vec![Visit::New; outgoing.len()];
    // (node, index of the next outgoing edge to follow)
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for start in 0..outgoing.len() {
        if visit[start] != Visit::New {
            continue;
        }
        visit[start] = Visit::OnStack;
        stack.push((start, 0));

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let Some(&next) = outgoing[node].get(frame.1) else {
                visit[node] = Visit::Done;
                stack.pop();
                continue;
            };
            frame.1 += 1;

            match visit[next] {
                Visit::New => {
                    visit[next] = Visit::OnStack;
                    stack.push((next, 0));
                }
                Visit::OnStack => {
                    let from = stack.iter().position(|(idx, _)| *idx == next).unwrap_or(0);
                    let mut path: Vec<usize> = stack[from..].iter().map(|(idx, _)| *idx).collect();
                    path.push(next);
                    return Some(path);
                }
                Visit::Done => {}
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{validate, validate_tree, ValidationError};
    use crate::model::fixtures::{chain_abc, diamond, nid, push_edge, push_skill};
    use crate::model::{Element, Position, UnlockState};

    fn with_edges(
        states: &[(&str, UnlockState)],
        edges: &[(&str, &str)],
    ) -> Vec<Element> {
        let mut elements = Vec::new();
        for (idx, (id, state)) in states.iter().enumerate() {
            push_skill(&mut elements, id, *state, Position::new(idx as f64 * 50.0, 0.0));
        }
        for (source, target) in edges {
            push_edge(&mut elements, source, target);
        }
        elements
    }

    #[rstest]
    #[case::empty(Vec::new(), true)]
    #[case::chain(chain_abc(), true)]
    #[case::diamond(diamond(), true)]
    #[case::lone_available(with_edges(&[("a", UnlockState::Available)], &[]), true)]
    #[case::lone_hidden(with_edges(&[("a", UnlockState::Hidden)], &[]), false)]
    #[case::two_cycle(
        with_edges(&[("a", UnlockState::Available), ("b", UnlockState::Hidden)], &[("a", "b"), ("b", "a")]),
        false
    )]
    #[case::activated_root(
        with_edges(&[("a", UnlockState::Activated), ("b", UnlockState::Hidden)], &[("a", "b")]),
        true
    )]
    fn validates_cycles_and_roots(#[case] elements: Vec<Element>, #[case] expected: bool) {
        assert_eq!(validate_tree(&elements), expected);
    }

    #[test]
    fn reports_the_cycle_as_a_closed_path() {
        let elements = with_edges(
            &[("a", UnlockState::Available), ("b", UnlockState::Hidden), ("c", UnlockState::Hidden)],
            &[("a", "b"), ("b", "c"), ("c", "b")],
        );

        let report = validate(&elements);

        assert_eq!(report.cycle, Some(vec![nid("b"), nid("c"), nid("b")]));
        assert!(report.hidden_roots.is_empty());
        assert_eq!(
            report.errors()[0].to_string(),
            "Skill tree contains a cycle: b -> c -> b"
        );
    }

    #[test]
    fn a_cycle_without_roots_reports_no_hidden_roots() {
        // Every node has an incoming edge, so there is no root to be hidden.
        let elements = with_edges(
            &[("a", UnlockState::Hidden), ("b", UnlockState::Hidden)],
            &[("a", "b"), ("b", "a")],
        );

        let report = validate(&elements);
        assert!(report.cycle.is_some());
        assert!(report.hidden_roots.is_empty());
    }

    #[test]
    fn hidden_roots_are_listed_in_store_order() {
        let elements = with_edges(
            &[("x", UnlockState::Hidden), ("y", UnlockState::Available), ("z", UnlockState::Hidden)],
            &[("y", "x")],
        );

        let report = validate(&elements);
        assert_eq!(report.hidden_roots, vec![nid("z")]);
        assert_eq!(
            report.errors(),
            vec![ValidationError::HiddenRoot { node_id: nid("z") }]
        );
    }

    /// Exhaustive check over every 3-skill graph: the tree is valid exactly when there is no
    /// directed cycle and no Hidden root.
    #[test]
    fn agrees_with_reachability_on_all_three_node_graphs() {
        let ids = ["a", "b", "c"];
        let pairs: Vec<(usize, usize)> =
            (0..3).flat_map(|s| (0..3).map(move |t| (s, t))).filter(|(s, t)| s != t).collect();
        let states = [UnlockState::Hidden, UnlockState::Available];

        for mask in 0u32..(1 << pairs.len()) {
            let chosen: Vec<(usize, usize)> = pairs
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .map(|(_, pair)| *pair)
                .collect();

            // Transitive closure by repeated relaxation.
            let mut reach = [[false; 3]; 3];
            for (s, t) in &chosen {
                reach[*s][*t] = true;
            }
            for k in 0..3 {
                for i in 0..3 {
                    for j in 0..3 {
                        if reach[i][k] && reach[k][j] {
                            reach[i][j] = true;
                        }
                    }
                }
            }
            let has_cycle = (0..3).any(|i| reach[i][i]);

            for state_mask in 0u32..8 {
                let node_states: Vec<(&str, UnlockState)> = (0..3)
                    .map(|i| (ids[i], states[((state_mask >> i) & 1) as usize]))
                    .collect();
                let hidden_root = (0..3).any(|i| {
                    node_states[i].1 == UnlockState::Hidden
                        && !chosen.iter().any(|(_, t)| *t == i)
                });
                let edges: Vec<(&str, &str)> =
                    chosen.iter().map(|(s, t)| (ids[*s], ids[*t])).collect();

                let elements = with_edges(&node_states, &edges);
                assert_eq!(
                    validate_tree(&elements),
                    !has_cycle && !hidden_root,
                    "edges={edges:?} states={node_states:?}"
                );
            }
        }
    }
}
