//! Progress blob: every reviewed item key mapped to its state.

use std::collections::btree_map::{self, BTreeMap};

use serde::{Deserialize, Serialize};

use crate::types::ReviewState;

/// All review states for one learner, keyed by item identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressSnapshot {
    states: BTreeMap<String, ReviewState>,
}

/// Result of a lenient decode.
#[derive(Debug, Clone, Default)]
pub struct DecodedProgress {
    pub snapshot: ProgressSnapshot,
    /// Keys whose records were unusable and now count as new items.
    pub dropped: Vec<String>,
}

impl ProgressSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a stored blob without ever failing.
    ///
    /// Records with bad fields are repaired with defaults; records that are
    /// not objects are dropped. Anything that is not a JSON object decodes to
    /// an empty snapshot.
    pub fn from_json(raw: &str) -> DecodedProgress {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) => Self::from_value(value),
            Err(_) => DecodedProgress::default(),
        }
    }

    /// Same as [`ProgressSnapshot::from_json`] for an already parsed value.
    pub fn from_value(value: serde_json::Value) -> DecodedProgress {
        let serde_json::Value::Object(entries) = value else {
            return DecodedProgress::default();
        };

        let mut decoded = DecodedProgress::default();
        for (key, entry) in entries {
            if key.is_empty() || !entry.is_object() {
                decoded.dropped.push(key);
                continue;
            }
            match serde_json::from_value::<ReviewState>(entry) {
                Ok(state) => {
                    decoded.snapshot.states.insert(key, state);
                }
                Err(_) => decoded.dropped.push(key),
            }
        }
        decoded
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.states)
    }

    pub fn get(&self, key: &str) -> Option<&ReviewState> {
        self.states.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, state: ReviewState) -> Option<ReviewState> {
        self.states.insert(key.into(), state)
    }

    pub fn remove(&mut self, key: &str) -> Option<ReviewState> {
        self.states.remove(key)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ReviewState> {
        self.states.iter()
    }

    /// Fold another snapshot into this one. Per key the state reviewed most
    /// recently wins; on equal timestamps the existing state is kept.
    /// Returns how many keys changed.
    pub fn merge(&mut self, incoming: ProgressSnapshot) -> usize {
        let mut changed = 0;
        for (key, state) in incoming.states {
            if supersedes(self.states.get(&key), &state) {
                self.states.insert(key, state);
                changed += 1;
            }
        }
        changed
    }
}

/// Whether `candidate` should replace `existing` during a merge.
pub fn supersedes(existing: Option<&ReviewState>, candidate: &ReviewState) -> bool {
    match existing {
        Some(current) => candidate.last_reviewed_at() > current.last_reviewed_at(),
        None => true,
    }
}

impl IntoIterator for ProgressSnapshot {
    type Item = (String, ReviewState);
    type IntoIter = btree_map::IntoIter<String, ReviewState>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.into_iter()
    }
}

impl<'a> IntoIterator for &'a ProgressSnapshot {
    type Item = (&'a String, &'a ReviewState);
    type IntoIter = btree_map::Iter<'a, String, ReviewState>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}

impl FromIterator<(String, ReviewState)> for ProgressSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, ReviewState)>>(iter: I) -> Self {
        Self {
            states: iter.into_iter().collect(),
        }
    }
}
