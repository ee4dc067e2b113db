//! # Atomic Changes
//!
//! Field-level, reversible mutations addressed by a key path into a JSON view
//! of a snapshot. Every structural edit of a diagram is expressed as an
//! ordered batch of these; nothing mutates a snapshot in place.
//!
//! ## Semantics
//!
//! - `Set` on an object key inserts or replaces the value
//! - `Set` on an array index replaces the slot when `currVal` is present and
//!   inserts at the index when it is absent
//! - `Delete` removes the key or array slot; `currVal` records what was there
//! - [`apply_inverse`] inverts each change and folds them in reverse order, so
//!   `apply_inverse(apply(s, c), c) == s` for any batch valid against `s`

use crate::errors::ChangeError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Anything that can be viewed as a JSON tree and rebuilt from one
pub trait Snapshot: Serialize + DeserializeOwned + Clone {}

impl<T> Snapshot for T where T: Serialize + DeserializeOwned + Clone {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeType {
    Set,
    Delete,
}

/// One step of a key path: an object key or an array index
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(index) => write!(f, "{}", index),
            PathSegment::Key(key) => f.write_str(key),
        }
    }
}

/// Location of a value inside a snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyPath(Vec<PathSegment>);

impl KeyPath {
    /// The empty path, addressing the whole snapshot
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.0.push(PathSegment::Key(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.0.push(PathSegment::Index(index));
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn starts_with(&self, prefix: &KeyPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Object key at position `depth`, if that segment is a key
    pub fn key_at(&self, depth: usize) -> Option<&str> {
        match self.0.get(depth) {
            Some(PathSegment::Key(key)) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.0 {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

/// A single reversible mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicChange {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub key: KeyPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curr_val: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_val: Option<Value>,
}

impl AtomicChange {
    /// Set `key` to `new_val`; `curr_val` is what the key held before, if anything
    pub fn set(key: KeyPath, curr_val: Option<Value>, new_val: Value) -> Self {
        Self {
            change_type: ChangeType::Set,
            key,
            curr_val,
            new_val: Some(new_val),
        }
    }

    /// Remove `key`, which currently holds `curr_val`
    pub fn delete(key: KeyPath, curr_val: Value) -> Self {
        Self {
            change_type: ChangeType::Delete,
            key,
            curr_val: Some(curr_val),
            new_val: None,
        }
    }

    /// The change that undoes this one
    pub fn invert(&self) -> Self {
        match (self.change_type, &self.curr_val) {
            (ChangeType::Set, None) => Self {
                change_type: ChangeType::Delete,
                key: self.key.clone(),
                curr_val: self.new_val.clone(),
                new_val: None,
            },
            (ChangeType::Set, Some(curr)) => Self {
                change_type: ChangeType::Set,
                key: self.key.clone(),
                curr_val: self.new_val.clone(),
                new_val: Some(curr.clone()),
            },
            (ChangeType::Delete, curr) => Self {
                change_type: ChangeType::Set,
                key: self.key.clone(),
                curr_val: None,
                new_val: curr.clone(),
            },
        }
    }

    /// Apply this change to a JSON tree in place
    pub fn apply_to(&self, root: &mut Value) -> Result<(), ChangeError> {
        let Some((last, parents)) = self.key.0.split_last() else {
            return match self.change_type {
                ChangeType::Set => {
                    *root = self.required_new_val()?.clone();
                    Ok(())
                }
                ChangeType::Delete => Err(ChangeError::InvalidPath(self.key.clone())),
            };
        };

        let mut target = root;
        for segment in parents {
            target = match (segment, target) {
                (PathSegment::Key(key), Value::Object(map)) => map.get_mut(key),
                (PathSegment::Index(index), Value::Array(items)) => items.get_mut(*index),
                _ => None,
            }
            .ok_or_else(|| ChangeError::InvalidPath(self.key.clone()))?;
        }

        match (self.change_type, last, target) {
            (ChangeType::Set, PathSegment::Key(key), Value::Object(map)) => {
                map.insert(key.clone(), self.required_new_val()?.clone());
            }
            (ChangeType::Set, PathSegment::Index(index), Value::Array(items)) => {
                let value = self.required_new_val()?.clone();
                let len = items.len();
                match &self.curr_val {
                    Some(_) if *index < len => items[*index] = value,
                    None if *index <= len => items.insert(*index, value),
                    _ => return Err(ChangeError::InvalidPath(self.key.clone())),
                }
            }
            (ChangeType::Delete, PathSegment::Key(key), Value::Object(map)) => {
                map.remove(key)
                    .ok_or_else(|| ChangeError::MissingValue(self.key.clone()))?;
            }
            (ChangeType::Delete, PathSegment::Index(index), Value::Array(items)) => {
                if *index >= items.len() {
                    return Err(ChangeError::MissingValue(self.key.clone()));
                }
                items.remove(*index);
            }
            _ => return Err(ChangeError::InvalidPath(self.key.clone())),
        }

        Ok(())
    }

    fn required_new_val(&self) -> Result<&Value, ChangeError> {
        self.new_val
            .as_ref()
            .ok_or_else(|| ChangeError::MissingNewValue(self.key.clone()))
    }
}

/// Fold `changes` into a JSON tree, in order
pub fn apply_to_value(value: &mut Value, changes: &[AtomicChange]) -> Result<(), ChangeError> {
    for change in changes {
        change.apply_to(value)?;
    }
    Ok(())
}

/// The batch that undoes `changes`: each change inverted, in reverse order
pub fn invert_all(changes: &[AtomicChange]) -> Vec<AtomicChange> {
    changes.iter().rev().map(AtomicChange::invert).collect()
}

/// Return a new snapshot with `changes` folded in, in order
pub fn apply<T: Snapshot>(state: &T, changes: &[AtomicChange]) -> Result<T, ChangeError> {
    if changes.is_empty() {
        return Ok(state.clone());
    }

    let mut value = serde_json::to_value(state)?;
    apply_to_value(&mut value, changes)?;
    Ok(serde_json::from_value(value)?)
}

/// Return the snapshot `changes` were applied to
pub fn apply_inverse<T: Snapshot>(state: &T, changes: &[AtomicChange]) -> Result<T, ChangeError> {
    apply(state, &invert_all(changes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn path(keys: &[&str]) -> KeyPath {
        keys.iter().fold(KeyPath::root(), |path, key| path.key(*key))
    }

    #[test]
    fn test_set_and_delete_object_keys() {
        let mut value = json!({ "a": { "b": 1 } });

        AtomicChange::set(path(&["a", "c"]), None, json!(2))
            .apply_to(&mut value)
            .unwrap();
        assert_eq!(value, json!({ "a": { "b": 1, "c": 2 } }));

        AtomicChange::delete(path(&["a", "b"]), json!(1))
            .apply_to(&mut value)
            .unwrap();
        assert_eq!(value, json!({ "a": { "c": 2 } }));
    }

    #[test]
    fn test_array_insert_replace_and_remove() {
        let mut value = json!({ "items": ["x", "z"] });
        let items = KeyPath::root().key("items");

        AtomicChange::set(items.clone().index(1), None, json!("y"))
            .apply_to(&mut value)
            .unwrap();
        assert_eq!(value, json!({ "items": ["x", "y", "z"] }));

        AtomicChange::set(items.clone().index(0), Some(json!("x")), json!("w"))
            .apply_to(&mut value)
            .unwrap();
        assert_eq!(value, json!({ "items": ["w", "y", "z"] }));

        AtomicChange::delete(items.index(2), json!("z"))
            .apply_to(&mut value)
            .unwrap();
        assert_eq!(value, json!({ "items": ["w", "y"] }));
    }

    #[test]
    fn test_array_set_bounds() {
        let mut value = json!({ "items": ["a"] });
        let items = KeyPath::root().key("items");

        // Appending at the end is an insert
        AtomicChange::set(items.clone().index(1), None, json!("b"))
            .apply_to(&mut value)
            .unwrap();
        assert_eq!(value, json!({ "items": ["a", "b"] }));

        let err = AtomicChange::set(items.clone().index(3), None, json!("c"))
            .apply_to(&mut value)
            .unwrap_err();
        assert_eq!(err, ChangeError::InvalidPath(items.clone().index(3)));

        let err = AtomicChange::set(items.clone().index(2), Some(json!("x")), json!("c"))
            .apply_to(&mut value)
            .unwrap_err();
        assert_eq!(err, ChangeError::InvalidPath(items.index(2)));
        assert_eq!(value, json!({ "items": ["a", "b"] }));
    }

    #[test]
    fn test_inverse_restores_original_value() {
        let original = json!({ "a": 1, "list": [1, 2, 3], "nested": { "k": "v" } });
        let changes = vec![
            AtomicChange::set(path(&["a"]), Some(json!(1)), json!(10)),
            AtomicChange::set(KeyPath::root().key("list").index(3), None, json!(4)),
            AtomicChange::delete(KeyPath::root().key("list").index(0), json!(1)),
            AtomicChange::delete(path(&["nested", "k"]), json!("v")),
            AtomicChange::set(path(&["nested", "k2"]), None, json!(true)),
        ];

        let mut value = original.clone();
        apply_to_value(&mut value, &changes).unwrap();
        assert_eq!(
            value,
            json!({ "a": 10, "list": [2, 3, 4], "nested": { "k2": true } })
        );

        apply_to_value(&mut value, &invert_all(&changes)).unwrap();
        assert_eq!(value, original);
    }

    #[test]
    fn test_invalid_paths_are_rejected() {
        let mut value = json!({ "a": 1 });

        let err = AtomicChange::set(path(&["missing", "b"]), None, json!(1))
            .apply_to(&mut value)
            .unwrap_err();
        assert_eq!(err, ChangeError::InvalidPath(path(&["missing", "b"])));

        let err = AtomicChange::delete(path(&["b"]), json!(1))
            .apply_to(&mut value)
            .unwrap_err();
        assert_eq!(err, ChangeError::MissingValue(path(&["b"])));

        let err = AtomicChange::delete(KeyPath::root(), json!(1))
            .apply_to(&mut value)
            .unwrap_err();
        assert_eq!(err, ChangeError::InvalidPath(KeyPath::root()));
    }

    #[test]
    fn test_root_set_replaces_everything() {
        let mut value = json!({ "a": 1 });
        let change = AtomicChange::set(KeyPath::root(), Some(json!({ "a": 1 })), json!([1]));

        change.apply_to(&mut value).unwrap();
        assert_eq!(value, json!([1]));

        change.invert().apply_to(&mut value).unwrap();
        assert_eq!(value, json!({ "a": 1 }));
    }

    #[test]
    fn test_typed_apply_round_trip() {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        struct Doc {
            title: String,
            tags: Vec<String>,
        }

        let doc = Doc {
            title: "draft".to_string(),
            tags: vec!["a".to_string()],
        };
        let changes = vec![
            AtomicChange::set(path(&["title"]), Some(json!("draft")), json!("final")),
            AtomicChange::set(KeyPath::root().key("tags").index(1), None, json!("b")),
        ];

        let next = apply(&doc, &changes).unwrap();
        assert_eq!(next.title, "final");
        assert_eq!(next.tags, vec!["a", "b"]);
        assert_eq!(apply_inverse(&next, &changes).unwrap(), doc);
    }

    #[test]
    fn test_key_path_display_and_serde() {
        let key = KeyPath::root().key("elements").key("fox").index(2);
        assert_eq!(key.to_string(), "/elements/fox/2");
        assert_eq!(serde_json::to_value(&key).unwrap(), json!(["elements", "fox", 2]));
        assert_eq!(KeyPath::root().to_string(), "/");
    }
}
