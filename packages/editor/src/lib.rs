//! # Diagrammer Editor
//!
//! Editing engine for sentence diagrams.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ grammar: element types, schema, scanner     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: DiagramState + change batches       │
//! │  - Schema-checked reference edits           │
//! │  - Reversible atomic changes                │
//! │  - Linear undo/redo with child histories    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ display: categories, spans, labels          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Snapshots are immutable**: every edit produces a new state
//! 2. **Edits are data**: operations return `Vec<AtomicChange>` instead of
//!    mutating, so the same batch can be applied, inverted and replayed
//! 3. **All or nothing**: a failing operation returns an error and no changes
//!
//! ## Usage
//!
//! ```rust
//! use diagrammer_editor::{DiagramState, HistoryState};
//! use diagrammer_grammar::ElementType;
//!
//! let state = DiagramState::from_text("Dogs bark.").unwrap();
//! let history = HistoryState::new(state);
//!
//! let mut ids = || "dogsNoun".to_string();
//! let (id, change) = history
//!     .curr_state()
//!     .create_add_item(ElementType::Noun, &mut ids)
//!     .unwrap();
//! let history = history.stage_change(vec![change]).unwrap();
//!
//! let changes = history
//!     .curr_state()
//!     .create_add_reference(ElementType::Noun, &id, "words", "dogs")
//!     .unwrap();
//! let history = history.stage_change(changes).unwrap();
//!
//! let dogs = history.curr_state().get_item("dogs").unwrap();
//! assert_eq!(dogs.parent.as_deref(), Some("dogsNoun"));
//!
//! let history = history.undo_change().unwrap();
//! assert_eq!(history.curr_state().get_item("dogs").unwrap().parent, None);
//! ```

pub mod atomic_change;
pub mod change_map;
pub mod diagram_state;
mod errors;
mod history;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use atomic_change::{apply, apply_inverse, AtomicChange, ChangeType, KeyPath, PathSegment, Snapshot};
pub use change_map::ChangeMap;
pub use diagram_state::{
    get_element_references, get_referencing_properties, DiagramState, DiagramStateItem,
    ReferencingProperties,
};
pub use errors::{ChangeError, DiagramError, DiagramResult, ErrorKind, HistoryError};
pub use history::{HistoryResult, HistoryState};

/// History over diagram snapshots
pub type DiagramHistory = HistoryState<DiagramState>;
