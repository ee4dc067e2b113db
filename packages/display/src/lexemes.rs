//! Lexeme projection: which element's label covers each word.
//!
//! Every word climbs its ref chain until it leaves the active display
//! category. An expanded ancestor on the way stops the climb early.

use crate::display_model::{append_word, WordSpan};
use crate::errors::{DisplayError, DisplayResult};
use crate::utils::{get_ancestors, get_expanded_elements};
use diagrammer_editor::DiagramState;
use diagrammer_grammar::{Category, ElementId, ElementType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Active display layer and the elements opened below it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    pub category: Category,
    #[serde(default)]
    pub expanded: BTreeSet<ElementId>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            category: Category::Phrase,
            expanded: BTreeSet::new(),
        }
    }
}

impl DisplaySettings {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            expanded: BTreeSet::new(),
        }
    }

    pub fn with_expanded<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ElementId>,
    {
        self.expanded.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Settings with the neighbourhood of `id` expanded
    pub fn focused(state: &DiagramState, category: Category, id: &str) -> DisplayResult<Self> {
        Ok(Self::new(category).with_expanded(get_expanded_elements(state, id)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelData {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub category: Category,
    pub words: Vec<WordSpan>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LexemeSpan {
    #[serde(rename_all = "camelCase")]
    Label {
        id: ElementId,
        #[serde(rename = "type")]
        element_type: ElementType,
        words: WordSpan,
        text: String,
    },
    Whitespace,
}

/// The element whose label covers `word_id` under `settings`
pub fn get_display_ancestor(
    state: &DiagramState,
    word_id: &str,
    settings: &DisplaySettings,
) -> DisplayResult<ElementId> {
    let chain: Vec<ElementId> = std::iter::once(word_id.to_string())
        .chain(get_ancestors(state, word_id)?)
        .collect();

    let mut cat_index: Option<usize> = None;
    for (index, id) in chain.iter().enumerate() {
        let item = state.get_item(id)?;
        if item.element_type.category() > settings.category {
            break;
        }
        cat_index = Some(index);
        if settings.expanded.contains(id) {
            break;
        }
    }

    match cat_index {
        Some(index) => Ok(chain[index].clone()),
        None => Err(DisplayError::NoDisplayAncestor(word_id.to_string())),
    }
}

/// (word index, lexeme, display ancestor) for every word in text order
fn project_words<'a>(
    state: &'a DiagramState,
    settings: &DisplaySettings,
) -> DisplayResult<Vec<(usize, &'a str, ElementId)>> {
    state
        .word_order
        .iter()
        .enumerate()
        .map(|(index, word_id)| {
            let item = state.get_item(word_id)?;
            let lexeme = item.value.lexeme().unwrap_or(word_id.as_str());
            Ok((index, lexeme, get_display_ancestor(state, word_id, settings)?))
        })
        .collect()
}

/// One label per display ancestor, ordered by its first word
pub fn get_label_data(state: &DiagramState, settings: &DisplaySettings) -> DisplayResult<Vec<LabelData>> {
    let mut labels: Vec<LabelData> = Vec::new();

    for (index, lexeme, ancestor) in project_words(state, settings)? {
        if let Some(label) = labels.iter_mut().find(|label| label.id == ancestor) {
            append_word(&mut label.words, index);
            label.text.push(' ');
            label.text.push_str(lexeme);
            continue;
        }

        let element_type = state.get_item(&ancestor)?.element_type;
        labels.push(LabelData {
            id: ancestor,
            element_type,
            category: element_type.category(),
            words: vec![WordSpan::Single(index)],
            text: lexeme.to_string(),
        });
    }

    debug!(
        labels = labels.len(),
        category = %settings.category,
        expanded = settings.expanded.len(),
        "Computed label data"
    );
    Ok(labels)
}

/// Runs of adjacent words sharing a display ancestor, separated by whitespace
pub fn get_display_lexemes(state: &DiagramState, settings: &DisplaySettings) -> DisplayResult<Vec<LexemeSpan>> {
    let mut spans: Vec<LexemeSpan> = Vec::new();

    for (index, lexeme, ancestor) in project_words(state, settings)? {
        if let Some(LexemeSpan::Label { id, words, text, .. }) = spans.last_mut() {
            if *id == ancestor {
                *words = WordSpan::Range(words.start(), index);
                text.push(' ');
                text.push_str(lexeme);
                continue;
            }
        }

        if !spans.is_empty() {
            spans.push(LexemeSpan::Whitespace);
        }
        let element_type = state.get_item(&ancestor)?.element_type;
        spans.push(LexemeSpan::Label {
            id: ancestor,
            element_type,
            words: WordSpan::Single(index),
            text: lexeme.to_string(),
        });
    }

    Ok(spans)
}
