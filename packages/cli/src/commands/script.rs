//! Edit scripts: a JSON array of editing commands replayed through history.
//!
//! ```json
//! [
//!   { "command": "addElement", "type": "noun", "id": "foxNoun" },
//!   { "command": "addReference", "type": "noun", "id": "foxNoun", "property": "words", "child": "fox" },
//!   { "command": "undo" }
//! ]
//! ```

use diagrammer_editor::{AtomicChange, DiagramError, DiagramHistory, DiagramState, HistoryError};
use diagrammer_grammar::{
    get_element_definition, ElementId, ElementReference, ElementType, IdGenerator, PropertyValue,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum EditCommand {
    /// Add a blank element; the id is generated when omitted
    AddElement {
        #[serde(rename = "type")]
        element_type: ElementType,
        #[serde(default)]
        id: Option<ElementId>,
    },
    DeleteElement {
        id: ElementId,
    },
    AddReference {
        #[serde(rename = "type")]
        element_type: ElementType,
        id: ElementId,
        property: String,
        child: ElementId,
    },
    DeleteReference {
        #[serde(rename = "type")]
        element_type: ElementType,
        id: ElementId,
        property: String,
        child: ElementId,
    },
    /// Replace a property wholesale; an empty list clears it
    SetReference {
        id: ElementId,
        property: String,
        children: Vec<ElementId>,
    },
    DeleteProperty {
        id: ElementId,
        property: String,
    },
    DeleteEmpty,
    Undo,
    Redo,
}

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("step {step}: {source}")]
    Diagram {
        step: usize,
        #[source]
        source: DiagramError,
    },

    #[error("step {step}: {source}")]
    History {
        step: usize,
        #[source]
        source: HistoryError,
    },
}

/// Build the value for a wholesale property replacement
fn property_value(
    state: &DiagramState,
    id: &str,
    property: &str,
    children: &[ElementId],
) -> Result<Option<PropertyValue>, DiagramError> {
    let parent = state.get_item(id)?;
    let definition = get_element_definition(parent.element_type)?;
    let is_array = definition
        .property(property)
        .map_or(false, |definition| definition.is_array);

    let references = children
        .iter()
        .map(|child| Ok(ElementReference::new(child.clone(), state.get_item(child)?.element_type)))
        .collect::<Result<Vec<_>, DiagramError>>()?;

    Ok(match references.len() {
        0 => None,
        1 if !is_array => references.into_iter().next().map(PropertyValue::Single),
        _ => Some(PropertyValue::Array(references)),
    })
}

fn changes_for(
    state: &DiagramState,
    command: &EditCommand,
    ids: &mut impl IdGenerator,
) -> Result<Vec<AtomicChange>, DiagramError> {
    match command {
        EditCommand::AddElement { element_type, id } => {
            let (_, change) = match id {
                Some(id) => {
                    let mut fixed = || id.clone();
                    state.create_add_item(*element_type, &mut fixed)?
                }
                None => state.create_add_item(*element_type, ids)?,
            };
            Ok(vec![change])
        }
        EditCommand::DeleteElement { id } => state.create_delete_item(id),
        EditCommand::AddReference {
            element_type,
            id,
            property,
            child,
        } => state.create_add_reference(*element_type, id, property, child),
        EditCommand::DeleteReference {
            element_type,
            id,
            property,
            child,
        } => state.create_delete_reference(*element_type, id, property, child),
        EditCommand::SetReference { id, property, children } => {
            let value = property_value(state, id, property, children)?;
            state.set_reference(id, property, value)
        }
        EditCommand::DeleteProperty { id, property } => state.create_delete_property(id, property),
        EditCommand::DeleteEmpty => state.create_delete_empty_elements(),
        EditCommand::Undo | EditCommand::Redo => Ok(Vec::new()),
    }
}

/// Replay `commands` on top of `history`, one batch per command
pub fn replay(
    mut history: DiagramHistory,
    commands: &[EditCommand],
    ids: &mut impl IdGenerator,
) -> Result<DiagramHistory, ScriptError> {
    for (step, command) in commands.iter().enumerate() {
        let step = step + 1;
        history = match command {
            EditCommand::Undo => history
                .undo_change()
                .map_err(|source| ScriptError::History { step, source })?,
            EditCommand::Redo => history
                .redo_change()
                .map_err(|source| ScriptError::History { step, source })?,
            command => {
                let changes = changes_for(history.curr_state(), command, ids)
                    .map_err(|source| ScriptError::Diagram { step, source })?;
                debug!(step, changes = changes.len(), "Replayed edit command");
                history
                    .stage_change(changes)
                    .map_err(|source| ScriptError::History { step, source })?
            }
        };
    }

    Ok(history)
}

/// Parse a script from JSON text
pub fn parse_script(source: &str) -> serde_json::Result<Vec<EditCommand>> {
    serde_json::from_str(source)
}
