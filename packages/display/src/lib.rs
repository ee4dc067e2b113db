//! # Diagram Display
//!
//! Read-only views over a [`DiagramState`](diagrammer_editor::DiagramState)
//! that a renderer needs to draw a sentence diagram.
//!
//! ## Architecture
//!
//! ```text
//! DiagramState (snapshot)
//!     ↓
//! DisplayModel::init      → category buckets + word spans
//! get_label_data          → one label per display ancestor
//! get_display_lexemes     → labelled runs of words, whitespace between
//! ```
//!
//! Everything here is recomputed from scratch per snapshot. There is no cache
//! to invalidate.
//!
//! ## Display settings
//!
//! [`DisplaySettings`] pick the category layer labels climb to, plus a set of
//! expanded elements that stop the climb early. [`DisplaySettings::focused`]
//! expands the neighbourhood of a focused element.
//!
//! ```
//! use diagrammer_display::{get_label_data, DisplaySettings};
//! use diagrammer_editor::DiagramState;
//!
//! let state = DiagramState::from_text("Birds sing.").unwrap();
//! let labels = get_label_data(&state, &DisplaySettings::default()).unwrap();
//! assert_eq!(labels.len(), 2);
//! assert_eq!(labels[0].text, "Birds");
//! ```

pub mod display_model;
mod errors;
pub mod lexemes;
pub mod utils;

pub use display_model::{append_word, DisplayElement, DisplayModel, WordSpan};
pub use errors::{DisplayError, DisplayResult};
pub use lexemes::{
    get_display_ancestor, get_display_lexemes, get_label_data, DisplaySettings, LabelData, LexemeSpan,
};
pub use utils::{get_ancestors, get_children, get_expanded_elements, get_siblings};
