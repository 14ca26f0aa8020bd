//! Persisted fold state keyed by group identity.
//!
//! Keys look like `<kind>:<seg1>:<seg2>…` where the segments are the titles
//! of the group and its ancestors, each escaped so that `:` inside a message
//! cannot collide with the separator. Older settings files stored the same
//! path unescaped; those entries are still honored and migrated on read.

use std::collections::BTreeMap;

use crate::node::NodeKind;

/// Escape one key segment. `%` goes first so the output is reversible.
pub fn escape_segment(segment: &str) -> String {
    segment.replace('%', "%25").replace(':', "%3A")
}

/// Current-format key for a group. `None` for an empty path.
pub fn expansion_key(kind: NodeKind, segments: &[String]) -> Option<String> {
    if segments.is_empty() {
        return None;
    }
    let escaped: Vec<String> = segments.iter().map(|s| escape_segment(s)).collect();
    Some(format!("{}:{}", kind.as_str(), escaped.join(":")))
}

/// Legacy key: identical layout with raw segments.
pub fn legacy_expansion_key(kind: NodeKind, segments: &[String]) -> Option<String> {
    if segments.is_empty() {
        return None;
    }
    Some(format!("{}:{}", kind.as_str(), segments.join(":")))
}

/// Both keys under which a group's fold state may be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeKeys {
    pub key: String,
    pub legacy: String,
}

impl NodeKeys {
    pub fn for_group(kind: NodeKind, segments: &[String]) -> Option<Self> {
        Some(Self {
            key: expansion_key(kind, segments)?,
            legacy: legacy_expansion_key(kind, segments)?,
        })
    }
}

/// Map of group key to expanded flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    entries: BTreeMap<String, bool>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<bool> {
        self.entries.get(key).copied()
    }

    pub fn as_map(&self) -> &BTreeMap<String, bool> {
        &self.entries
    }

    pub fn into_map(self) -> BTreeMap<String, bool> {
        self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Stored flag for a group, preferring the current key.
    ///
    /// A hit on the legacy key is rewritten under the current key and the
    /// legacy entry removed, unless both spellings are the same string.
    ///
    /// Legacy keys are unescaped, so they can collide with a current key: a
    /// group titled `a%3Ab` has legacy key `session:a%3Ab`, which is the
    /// current key of a sibling titled `a:b`. When only the sibling has an
    /// entry, looking up (or updating) the first group takes that entry over.
    pub fn lookup(&mut self, keys: &NodeKeys) -> Option<bool> {
        if let Some(expanded) = self.get(&keys.key) {
            return Some(expanded);
        }
        let expanded = self.get(&keys.legacy)?;
        if keys.key != keys.legacy {
            self.entries.insert(keys.key.clone(), expanded);
            self.entries.remove(&keys.legacy);
            tracing::debug!(key = %keys.key, legacy = %keys.legacy, "migrated legacy expansion key");
        }
        Some(expanded)
    }

    /// Record a fold change. Any legacy spelling is purged first so a stale
    /// entry can never win later.
    pub fn update(&mut self, keys: &NodeKeys, expanded: bool) {
        self.entries.remove(&keys.legacy);
        self.entries.insert(keys.key.clone(), expanded);
    }
}

impl From<BTreeMap<String, bool>> for ExpansionState {
    fn from(entries: BTreeMap<String, bool>) -> Self {
        Self { entries }
    }
}
