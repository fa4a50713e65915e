// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use smol_str::SmolStr;

/// A stable identifier shared by the element store, the renderer and persisted snapshots.
///
/// Ids are opaque strings; the only enforced rule is that they are non-empty and contain no
/// whitespace, because derived ids (`flourish-<id>`, `edge-<a>-<b>`) are built by
/// concatenation and must stay unambiguous when echoed back by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: SmolStr,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub fn new(value: impl AsRef<str>) -> Result<Self, IdError> {
        let value = value.as_ref();
        validate_id(value)?;
        Ok(Self { value: SmolStr::new(value), _marker: PhantomData })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value.to_string()
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<T> Borrow<str> for Id<T> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<T> TryFrom<String> for Id<T> {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    Empty,
    ContainsWhitespace,
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("id must not be empty"),
            Self::ContainsWhitespace => f.write_str("id must not contain whitespace"),
        }
    }
}

impl std::error::Error for IdError {}

fn validate_id(value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Empty);
    }
    if value.chars().any(char::is_whitespace) {
        return Err(IdError::ContainsWhitespace);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeIdTag {}
pub type NodeId = Id<NodeIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeIdTag {}
pub type EdgeId = Id<EdgeIdTag>;

const SKILL_ID_PREFIX: &str = "node-";
const FLOURISH_ID_PREFIX: &str = "flourish-";

/// Id of the decorative twin that accompanies every Skill node.
pub fn flourish_id(skill_id: &NodeId) -> NodeId {
    derived(&[FLOURISH_ID_PREFIX, skill_id.as_str()])
}

/// Id of the edge created by the Connect workflow.
pub fn connect_edge_id(source_id: &NodeId, target_id: &NodeId) -> EdgeId {
    derived(&["edge-", source_id.as_str(), "-", target_id.as_str()])
}

/// `connect_edge_id`, or the first `<id>-<n>` (n from 2) that `is_taken` rejects.
///
/// Hyphenated skill ids can make two different pairs spell the same edge id:
/// `a-b` to `c` and `a` to `b-c` both give `edge-a-b-c`.
pub fn free_connect_edge_id(
    source_id: &NodeId,
    target_id: &NodeId,
    is_taken: impl Fn(&str) -> bool,
) -> EdgeId {
    let base = connect_edge_id(source_id, target_id);
    if !is_taken(base.as_str()) {
        return base;
    }
    let mut buf = itoa::Buffer::new();
    let mut n: u64 = 2;
    loop {
        let candidate: EdgeId = derived(&[base.as_str(), "-", buf.format(n)]);
        if !is_taken(candidate.as_str()) {
            return candidate;
        }
        n = n.saturating_add(1);
    }
}

/// Id of a freshly added skill: `node-<n>`.
pub fn skill_id(n: u64) -> NodeId {
    let mut buf = itoa::Buffer::new();
    derived(&[SKILL_ID_PREFIX, buf.format(n)])
}

/// Numeric suffix of a `node-<n>` id, if it has one.
pub fn skill_id_number(id: &NodeId) -> Option<u64> {
    id.as_str().strip_prefix(SKILL_ID_PREFIX)?.parse().ok()
}

pub(crate) fn derived<T>(parts: &[&str]) -> Id<T> {
    let mut value = String::with_capacity(parts.iter().map(|part| part.len()).sum());
    for part in parts {
        value.push_str(part);
    }
    // Every part is itself a validated id or a whitespace-free literal.
    Id { value: SmolStr::new(value), _marker: PhantomData }
}
