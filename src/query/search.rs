// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Skill lookup by label, with typo tolerance and a description fallback.

use crate::model::{GraphNode, Mode, NodeId, UnlockState};
use crate::store::ElementStore;

/// Minimum normalized similarity for a typo match against one label word.
const FUZZY_THRESHOLD: f64 = 0.7;

/// How a skill matched, from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchKind {
    Description,
    Fuzzy,
    Contains,
    WordPrefix,
    LabelPrefix,
    Exact,
}

impl MatchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Fuzzy => "fuzzy",
            Self::Contains => "contains",
            Self::WordPrefix => "word_prefix",
            Self::LabelPrefix => "label_prefix",
            Self::Exact => "exact",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillMatch {
    pub node_id: NodeId,
    pub label: String,
    pub kind: MatchKind,
    pub score: u32,
}

/// Ranks skills against `needle`.
///
/// Label matches win over description matches. Within the label, an exact match beats a
/// prefix, a prefix of any word beats a plain substring, and a close spelling of one word
/// (rapidfuzz ratio) comes last. Player mode leaves out skills that are still Hidden, since
/// their names are not supposed to be known yet. Ties break on the label, then the id.
pub fn search_skills(
    store: &ElementStore,
    needle: &str,
    mode: Mode,
    limit: usize,
) -> Vec<SkillMatch> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut matches: Vec<SkillMatch> = store
        .skills()
        .filter(|skill| mode != Mode::Player || !is_hidden_in_play(skill))
        .filter_map(|skill| {
            let (kind, score) = rank(&needle, skill)?;
            Some(SkillMatch {
                node_id: skill.id().clone(),
                label: skill.label().to_owned(),
                kind,
                score,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.label.cmp(&b.label))
            .then_with(|| a.node_id.cmp(&b.node_id))
    });
    matches.truncate(limit);
    matches
}

fn is_hidden_in_play(skill: &GraphNode) -> bool {
    skill.state().unwrap_or(skill.initial_state()) == UnlockState::Hidden
}

fn rank(needle: &str, skill: &GraphNode) -> Option<(MatchKind, u32)> {
    let label = skill.label().trim().to_lowercase();

    if label == needle {
        return Some((MatchKind::Exact, 1000));
    }
    if label.starts_with(needle) {
        return Some((MatchKind::LabelPrefix, 900));
    }
    if words(&label).any(|word| word.starts_with(needle)) {
        return Some((MatchKind::WordPrefix, 800));
    }
    if label.contains(needle) {
        return Some((MatchKind::Contains, 700));
    }

    let similarity = words(&label)
        .map(|word| similarity(needle, word))
        .chain(std::iter::once(similarity(needle, &label)))
        .fold(0.0_f64, f64::max);
    if similarity >= FUZZY_THRESHOLD {
        return Some((MatchKind::Fuzzy, (similarity * 600.0).round() as u32));
    }

    if skill.description().to_lowercase().contains(needle) {
        return Some((MatchKind::Description, 300));
    }
    None
}

fn words(label: &str) -> impl Iterator<Item = &str> {
    label.split(|ch: char| !ch.is_alphanumeric()).filter(|word| !word.is_empty())
}

fn similarity(a: &str, b: &str) -> f64 {
    rapidfuzz::fuzz::ratio(a.chars(), b.chars())
}

#[cfg(test)]
mod tests {
    use super::{search_skills, MatchKind};
    use crate::model::fixtures::{nid, push_skill};
    use crate::model::{Mode, Position, UnlockState};
    use crate::ops::{apply_ops, Op};
    use crate::store::ElementStore;

    fn store() -> ElementStore {
        let skills = [
            ("fire", "Fire", UnlockState::Available),
            ("fireball", "Fireball", UnlockState::Available),
            ("wall", "Wall of Fire", UnlockState::Hidden),
            ("bonfire", "Bonfire", UnlockState::Available),
            ("heal", "Heal", UnlockState::Available),
        ];
        let mut elements = Vec::new();
        for (id, _, state) in skills {
            push_skill(&mut elements, id, state, Position::default());
        }
        let mut store = ElementStore::new(elements);
        let mut ops: Vec<Op> = skills
            .iter()
            .map(|(id, label, _)| Op::RenameNode { node_id: nid(id), label: (*label).to_owned() })
            .collect();
        ops.push(Op::SetDescription {
            node_id: nid("heal"),
            description: "Restores a little health every turn.".to_owned(),
        });
        apply_ops(&mut store, &ops).expect("label");
        store
    }

    fn kinds(store: &ElementStore, needle: &str, mode: Mode) -> Vec<(String, MatchKind)> {
        search_skills(store, needle, mode, 10)
            .into_iter()
            .map(|hit| (hit.label, hit.kind))
            .collect()
    }

    #[test]
    fn label_matches_rank_by_how_much_of_the_label_they_cover() {
        assert_eq!(
            kinds(&store(), "FIRE", Mode::Builder),
            vec![
                ("Fire".to_owned(), MatchKind::Exact),
                ("Fireball".to_owned(), MatchKind::LabelPrefix),
                ("Wall of Fire".to_owned(), MatchKind::WordPrefix),
                ("Bonfire".to_owned(), MatchKind::Contains),
            ]
        );
    }

    #[test]
    fn misspelled_words_still_match() {
        let hits = search_skills(&store(), "fierball", Mode::Builder, 10);
        assert_eq!(hits.first().map(|hit| hit.node_id.clone()), Some(nid("fireball")));
        assert_eq!(hits[0].kind, MatchKind::Fuzzy);
        assert!(hits[0].score < 700);
    }

    #[test]
    fn descriptions_are_a_fallback() {
        let hits = search_skills(&store(), "every turn", Mode::Builder, 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].node_id, nid("heal"));
        assert_eq!(hits[0].kind, MatchKind::Description);
    }

    #[test]
    fn player_mode_leaves_out_hidden_skills() {
        let store = store();
        assert!(kinds(&store, "wall", Mode::Builder).iter().any(|(label, _)| label == "Wall of Fire"));
        assert!(kinds(&store, "wall", Mode::Player).is_empty());
    }

    #[test]
    fn empty_needle_or_limit_returns_nothing() {
        assert!(search_skills(&store(), "   ", Mode::Builder, 10).is_empty());
        assert!(search_skills(&store(), "fire", Mode::Builder, 0).is_empty());
        assert_eq!(search_skills(&store(), "fire", Mode::Builder, 1).len(), 1);
    }

    #[test]
    fn renamed_skills_are_found_by_their_new_label() {
        let mut store = store();
        apply_ops(&mut store, &[Op::RenameNode { node_id: nid("heal"), label: "Mend".to_owned() }])
            .expect("rename");
        let hits = search_skills(&store, "mend", Mode::Builder, 5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].node_id, nid("heal"));
    }
}
