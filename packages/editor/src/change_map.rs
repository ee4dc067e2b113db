//! Key path → change index computed by diffing two snapshots.
//!
//! Objects are diffed key by key; arrays and scalars are compared whole and
//! replaced with a single `Set` when they differ. The resulting changes are
//! independent of each other, so they can be applied in any order.

use crate::atomic_change::{AtomicChange, KeyPath, Snapshot};
use crate::errors::ChangeError;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeMap {
    changes: BTreeMap<KeyPath, AtomicChange>,
}

impl ChangeMap {
    /// Structural diff of two JSON trees
    pub fn between(before: &Value, after: &Value) -> Self {
        let mut map = Self::default();
        map.diff(KeyPath::root(), before, after);
        map
    }

    /// Structural diff of two snapshots
    pub fn between_snapshots<T: Snapshot>(before: &T, after: &T) -> Result<Self, ChangeError> {
        Ok(Self::between(
            &serde_json::to_value(before)?,
            &serde_json::to_value(after)?,
        ))
    }

    fn diff(&mut self, path: KeyPath, before: &Value, after: &Value) {
        match (before, after) {
            (Value::Object(old), Value::Object(new)) => {
                for (key, old_value) in old {
                    match new.get(key) {
                        Some(new_value) => self.diff(path.clone().key(key), old_value, new_value),
                        None => self.insert(AtomicChange::delete(
                            path.clone().key(key),
                            old_value.clone(),
                        )),
                    }
                }
                for (key, new_value) in new {
                    if !old.contains_key(key) {
                        self.insert(AtomicChange::set(path.clone().key(key), None, new_value.clone()));
                    }
                }
            }
            _ if before != after => {
                self.insert(AtomicChange::set(path, Some(before.clone()), after.clone()));
            }
            _ => {}
        }
    }

    fn insert(&mut self, change: AtomicChange) {
        self.changes.insert(change.key.clone(), change);
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn get(&self, key: &KeyPath) -> Option<&AtomicChange> {
        self.changes.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&KeyPath, &AtomicChange)> {
        self.changes.iter()
    }

    /// Whether any change lies at or below `prefix`
    pub fn touches(&self, prefix: &KeyPath) -> bool {
        self.changes.keys().any(|key| key.starts_with(prefix))
    }

    pub fn to_changes(&self) -> Vec<AtomicChange> {
        self.changes.values().cloned().collect()
    }

    pub fn into_changes(self) -> Vec<AtomicChange> {
        self.changes.into_values().collect()
    }
}
