//! # Undo/Redo History
//!
//! Linear history of change batches over an immutable snapshot type.
//!
//! ## Design
//!
//! - Every operation returns a new `HistoryState`; the receiver is untouched
//! - `curr_state` always equals `base_state` with batches `0..=curr_change`
//!   folded in
//! - Undo applies the inverse of the current batch and moves the cursor back
//! - Redo reapplies the next batch and moves the cursor forward
//! - Staging a batch discards every batch after the cursor
//! - With a level limit, the oldest batch is folded into `base_state` once the
//!   limit is exceeded
//!
//! ## Child histories
//!
//! A child is a scratch history seeded from the parent's current state. It is
//! edited freely and then imported back as one batch, the structural diff
//! between the child's base and current state.
//!
//! ```rust
//! use diagrammer_editor::{AtomicChange, HistoryState, KeyPath};
//! use serde_json::json;
//!
//! let history = HistoryState::new(json!({ "count": 0 }));
//! let change = AtomicChange::set(KeyPath::root().key("count"), Some(json!(0)), json!(1));
//!
//! let history = history.stage_change(vec![change]).unwrap();
//! assert_eq!(history.curr_state(), &json!({ "count": 1 }));
//!
//! let history = history.undo_change().unwrap();
//! assert_eq!(history.curr_state(), &json!({ "count": 0 }));
//! assert!(history.can_redo());
//! ```

use crate::atomic_change::{self, AtomicChange, Snapshot};
use crate::change_map::ChangeMap;
use crate::errors::HistoryError;
use tracing::{debug, trace};

pub type HistoryResult<T> = Result<T, HistoryError>;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryState<T> {
    /// State before the oldest retained batch
    base_state: T,

    curr_state: T,

    /// Staged batches, oldest first
    changes: Vec<Vec<AtomicChange>>,

    /// Structural summary of each batch, parallel to `changes`
    change_maps: Vec<ChangeMap>,

    /// Index of the last applied batch, `None` when everything is undone
    curr_change: Option<usize>,

    /// Maximum number of retained batches (0 = unlimited)
    max_levels: usize,
}

impl<T: Snapshot> HistoryState<T> {
    /// Empty, unlimited history starting at `state`
    pub fn new(state: T) -> Self {
        Self::with_max_levels(state, 0)
    }

    pub fn with_max_levels(state: T, max_levels: usize) -> Self {
        Self {
            base_state: state.clone(),
            curr_state: state,
            changes: Vec::new(),
            change_maps: Vec::new(),
            curr_change: None,
            max_levels,
        }
    }

    pub fn base_state(&self) -> &T {
        &self.base_state
    }

    pub fn curr_state(&self) -> &T {
        &self.curr_state
    }

    pub fn changes(&self) -> &[Vec<AtomicChange>] {
        &self.changes
    }

    pub fn change_maps(&self) -> &[ChangeMap] {
        &self.change_maps
    }

    pub fn curr_change(&self) -> Option<usize> {
        self.curr_change
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Structural summary of the batch that produced `curr_state`
    pub fn last_change_map(&self) -> Option<&ChangeMap> {
        self.curr_change.and_then(|index| self.change_maps.get(index))
    }

    /// Index the next redo would apply
    fn next_change(&self) -> usize {
        self.curr_change.map_or(0, |index| index + 1)
    }

    pub fn can_undo(&self) -> bool {
        self.curr_change.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.next_change() < self.changes.len()
    }

    /// Apply a batch and record it as the newest undo step.
    ///
    /// An empty batch leaves the history as it is.
    pub fn stage_change(&self, changes: Vec<AtomicChange>) -> HistoryResult<Self> {
        if changes.is_empty() {
            return Ok(self.clone());
        }

        let before = serde_json::to_value(&self.curr_state).map_err(atomic_change_error)?;
        let mut after = before.clone();
        atomic_change::apply_to_value(&mut after, &changes)?;
        let curr_state: T = serde_json::from_value(after.clone()).map_err(atomic_change_error)?;
        let change_map = ChangeMap::between(&before, &after);

        let mut next = self.clone();
        let keep = self.next_change();
        next.changes.truncate(keep);
        next.change_maps.truncate(keep);
        next.changes.push(changes);
        next.change_maps.push(change_map);
        next.curr_state = curr_state;
        next.curr_change = Some(next.changes.len() - 1);

        while next.max_levels > 0 && next.changes.len() > next.max_levels {
            let oldest = next.changes.remove(0);
            next.change_maps.remove(0);
            next.base_state = atomic_change::apply(&next.base_state, &oldest)?;
            next.curr_change = next.curr_change.and_then(|index| index.checked_sub(1));
            trace!(max_levels = next.max_levels, "Folded oldest batch into base state");
        }

        debug!(
            batches = next.changes.len(),
            changes = next.changes.last().map_or(0, Vec::len),
            "Staged change batch"
        );

        Ok(next)
    }

    pub fn undo_change(&self) -> HistoryResult<Self> {
        let index = self.curr_change.ok_or(HistoryError::NothingToUndo)?;

        let mut next = self.clone();
        next.curr_state = atomic_change::apply_inverse(&self.curr_state, &self.changes[index])?;
        next.curr_change = index.checked_sub(1);

        debug!(undone = index, "Undid change batch");
        Ok(next)
    }

    pub fn redo_change(&self) -> HistoryResult<Self> {
        let index = self.next_change();
        let batch = self.changes.get(index).ok_or(HistoryError::NothingToRedo)?;

        let mut next = self.clone();
        next.curr_state = atomic_change::apply(&self.curr_state, batch)?;
        next.curr_change = Some(index);

        debug!(redone = index, "Redid change batch");
        Ok(next)
    }

    /// Fresh history whose base is this history's current state.
    ///
    /// The child ignores this history's level limit, so its base stays equal
    /// to the state it was created from until it is imported.
    pub fn create_child(&self) -> Self {
        Self::new(self.curr_state.clone())
    }

    /// Stage everything `child` did as a single batch.
    ///
    /// Fails with [`HistoryError::StaleChild`] when this history moved on
    /// since the child was created.
    pub fn import_child(&self, child: &HistoryState<T>) -> HistoryResult<Self> {
        let parent_curr = serde_json::to_value(&self.curr_state).map_err(atomic_change_error)?;
        let child_base = serde_json::to_value(&child.base_state).map_err(atomic_change_error)?;
        if parent_curr != child_base {
            return Err(HistoryError::StaleChild);
        }

        let child_curr = serde_json::to_value(&child.curr_state).map_err(atomic_change_error)?;
        let diff = ChangeMap::between(&child_base, &child_curr);

        debug!(changes = diff.len(), "Importing child history");
        self.stage_change(diff.into_changes())
    }
}

fn atomic_change_error(e: serde_json::Error) -> HistoryError {
    HistoryError::Change(e.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atomic_change::KeyPath;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn set_count(from: i64, to: i64) -> Vec<AtomicChange> {
        vec![AtomicChange::set(
            KeyPath::root().key("count"),
            Some(json!(from)),
            json!(to),
        )]
    }

    fn counter() -> HistoryState<Value> {
        HistoryState::new(json!({ "count": 0 }))
    }

    #[test]
    fn test_stage_undo_redo() {
        let history = counter()
            .stage_change(set_count(0, 1))
            .unwrap()
            .stage_change(set_count(1, 2))
            .unwrap();
        assert_eq!(history.curr_change(), Some(1));
        assert_eq!(history.curr_state(), &json!({ "count": 2 }));

        let undone = history.undo_change().unwrap().undo_change().unwrap();
        assert_eq!(undone.curr_state(), &json!({ "count": 0 }));
        assert_eq!(undone.curr_change(), None);
        assert!(!undone.can_undo());
        assert_eq!(undone.undo_change(), Err(HistoryError::NothingToUndo));

        let redone = undone.redo_change().unwrap();
        assert_eq!(redone.curr_state(), &json!({ "count": 1 }));
        assert_eq!(redone.redo_change().unwrap(), history);
    }

    #[test]
    fn test_staging_discards_redo_branch() {
        let history = counter()
            .stage_change(set_count(0, 1))
            .unwrap()
            .stage_change(set_count(1, 2))
            .unwrap()
            .undo_change()
            .unwrap()
            .stage_change(set_count(1, 5))
            .unwrap();

        assert_eq!(history.changes().len(), 2);
        assert!(!history.can_redo());
        assert_eq!(history.redo_change(), Err(HistoryError::NothingToRedo));
        assert_eq!(history.curr_state(), &json!({ "count": 5 }));
    }

    #[test]
    fn test_operations_leave_receiver_untouched() {
        let history = counter().stage_change(set_count(0, 1)).unwrap();
        let snapshot = history.clone();

        let _ = history.undo_change().unwrap();
        let _ = history.stage_change(set_count(1, 9)).unwrap();
        assert_eq!(history, snapshot);
    }

    #[test]
    fn test_max_levels_folds_oldest_batch_into_base() {
        let history = HistoryState::with_max_levels(json!({ "count": 0 }), 2)
            .stage_change(set_count(0, 1))
            .unwrap()
            .stage_change(set_count(1, 2))
            .unwrap()
            .stage_change(set_count(2, 3))
            .unwrap();

        assert_eq!(history.changes().len(), 2);
        assert_eq!(history.base_state(), &json!({ "count": 1 }));
        assert_eq!(history.curr_change(), Some(1));

        let bottom = history.undo_change().unwrap().undo_change().unwrap();
        assert_eq!(bottom.curr_state(), &json!({ "count": 1 }));
        assert!(!bottom.can_undo());
    }

    #[test]
    fn test_empty_batch_is_not_recorded() {
        let history = counter().stage_change(Vec::new()).unwrap();
        assert!(history.changes().is_empty());
        assert!(history.last_change_map().is_none());
    }

    #[test]
    fn test_child_import_stages_one_batch() {
        let parent = counter();
        let child = parent
            .create_child()
            .stage_change(set_count(0, 1))
            .unwrap()
            .stage_change(set_count(1, 2))
            .unwrap();

        let merged = parent.import_child(&child).unwrap();
        assert_eq!(merged.changes().len(), 1);
        assert_eq!(merged.curr_state(), &json!({ "count": 2 }));

        let map = merged.last_change_map().unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.touches(&KeyPath::root().key("count")));

        assert_eq!(merged.undo_change().unwrap().curr_state(), &json!({ "count": 0 }));
    }

    #[test]
    fn test_stale_child_is_rejected() {
        let parent = counter();
        let child = parent.create_child().stage_change(set_count(0, 1)).unwrap();
        let moved = parent.stage_change(set_count(0, 7)).unwrap();

        assert_eq!(moved.import_child(&child), Err(HistoryError::StaleChild));
    }

    #[test]
    fn test_unchanged_child_imports_nothing() {
        let parent = counter().stage_change(set_count(0, 1)).unwrap();
        let child = parent.create_child();

        assert_eq!(parent.import_child(&child).unwrap(), parent);
    }
}
