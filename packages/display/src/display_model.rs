//! # Display Model
//!
//! Read model derived from a [`DiagramState`]: which elements are visible at
//! the top of each display category, and which words each element spans.
//!
//! ## Category buckets
//!
//! An element is listed in its category's bucket unless it is displayed
//! inside a parent of the same category. A parent "displays" a child only
//! through the schema's display properties; a noun phrase shows its `head`
//! inline but lists its modifiers separately.
//!
//! ## Word spans
//!
//! Word indices are accumulated per element and compressed into runs:
//! adjacent indices collapse into `[start, end]`, isolated ones stay numbers.
//!
//! ```text
//! the quick brown fox  →  foxNounPhrase: [[0, 3]]
//! the ... dog          →  someNounPhrase: [0, [7, 8]]
//! ```
//!
//! The model is rebuilt from scratch for every snapshot.

use crate::errors::{DisplayError, DisplayResult};
use diagrammer_editor::{DiagramState, DiagramStateItem};
use diagrammer_grammar::{get_element_definition, Category, ElementId, ElementType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, instrument};

/// A single word index or an inclusive run of them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WordSpan {
    Single(usize),
    Range(usize, usize),
}

impl WordSpan {
    pub fn start(&self) -> usize {
        match *self {
            WordSpan::Single(index) | WordSpan::Range(index, _) => index,
        }
    }

    pub fn end(&self) -> usize {
        match *self {
            WordSpan::Single(index) | WordSpan::Range(_, index) => index,
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start() <= index && index <= self.end()
    }

    fn from_bounds(start: usize, end: usize) -> Self {
        if start == end {
            WordSpan::Single(start)
        } else {
            WordSpan::Range(start, end)
        }
    }
}

/// Add a word index to a compressed span list, keeping it sorted and merged
pub fn append_word(spans: &mut Vec<WordSpan>, index: usize) {
    if spans.iter().any(|span| span.contains(index)) {
        return;
    }

    match spans.last_mut() {
        Some(last) if last.end() + 1 == index => {
            *last = WordSpan::Range(last.start(), index);
            return;
        }
        Some(last) if last.end() < index => {
            spans.push(WordSpan::Single(index));
            return;
        }
        None => {
            spans.push(WordSpan::Single(index));
            return;
        }
        _ => {}
    }

    // Out-of-order insert: expand, insert and recompress
    let mut indices: Vec<usize> = spans
        .iter()
        .flat_map(|span| span.start()..=span.end())
        .chain(std::iter::once(index))
        .collect();
    indices.sort_unstable();

    spans.clear();
    let mut run: Option<(usize, usize)> = None;
    for index in indices {
        run = match run {
            Some((start, end)) if end + 1 == index => Some((start, index)),
            Some((start, end)) => {
                spans.push(WordSpan::from_bounds(start, end));
                Some((index, index))
            }
            None => Some((index, index)),
        };
    }
    if let Some((start, end)) = run {
        spans.push(WordSpan::from_bounds(start, end));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayElement {
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub category: Category,
    pub words: Vec<WordSpan>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayModel {
    /// Visible top-level elements per category, in order of first word
    pub categories: BTreeMap<Category, Vec<ElementId>>,
    pub elements: BTreeMap<ElementId, DisplayElement>,
}

/// Whether `parent` shows `child_id` through one of its display properties
fn displays(parent: &DiagramStateItem, child_id: &str) -> bool {
    let Ok(definition) = get_element_definition(parent.element_type) else {
        return false;
    };

    definition.display_properties().any(|property| {
        parent
            .value
            .property(property.name)
            .map_or(false, |value| value.contains(child_id))
    })
}

impl DisplayModel {
    #[instrument(skip(state), fields(words = state.word_order.len()))]
    pub fn init(state: &DiagramState) -> DisplayResult<Self> {
        let mut model = Self::default();

        for (index, word_id) in state.word_order.iter().enumerate() {
            model.process_word(state, word_id, index)?;
        }

        debug!(
            elements = model.elements.len(),
            categories = model.categories.len(),
            "Built display model"
        );
        Ok(model)
    }

    /// Walk from a word up its ref chain, recording the word on every element
    fn process_word(&mut self, state: &DiagramState, word_id: &str, index: usize) -> DisplayResult<()> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = state.get_item(word_id)?;

        loop {
            let id = current.id();
            if !visited.insert(id) {
                return Err(DisplayError::Cycle(word_id.to_string()));
            }

            let category = current.element_type.category();
            let entry = self
                .elements
                .entry(id.to_string())
                .or_insert_with(|| DisplayElement {
                    element_type: current.element_type,
                    category,
                    words: Vec::new(),
                });
            append_word(&mut entry.words, index);

            let Some(parent_id) = &current.parent else {
                self.add_to_category(category, id);
                return Ok(());
            };

            let parent = state.get_item(parent_id)?;
            if parent.element_type.category() != category {
                self.add_to_category(category, id);
            } else if !displays(parent, id) {
                self.add_to_category(category, id);
            }

            current = parent;
        }
    }

    fn add_to_category(&mut self, category: Category, id: &str) {
        let bucket = self.categories.entry(category).or_default();
        if !bucket.iter().any(|existing| existing == id) {
            bucket.push(id.to_string());
        }
    }

    /// Visible top-level elements of `category`
    pub fn category(&self, category: Category) -> &[ElementId] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn element(&self, id: &str) -> Option<&DisplayElement> {
        self.elements.get(id)
    }
}
