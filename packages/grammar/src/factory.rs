//! Element factory: blank, schema-conformant values for new elements.

use crate::element::{Clause, Element, ElementId, PartOfSpeech, Phrase, Properties, Sentence};
use crate::element_type::{Category, ElementType};
use crate::error::{SchemaError, SchemaResult};

/// Build a blank value of `element_type` with no properties populated.
///
/// Words cannot be initialized this way since they only come from scanned
/// text; use [`Element::word`] for them.
pub fn init_element(element_type: ElementType, id: impl Into<ElementId>) -> SchemaResult<Element> {
    let id = id.into();

    let element = match element_type.category() {
        Category::Word => return Err(SchemaError::NotInitializable(element_type)),
        Category::PartOfSpeech => Element::PartOfSpeech(PartOfSpeech {
            id,
            properties: Properties::new(),
        }),
        Category::Phrase => Element::Phrase(Phrase {
            id,
            phrase_type: element_type
                .phrase_kind()
                .ok_or(SchemaError::NotInitializable(element_type))?,
            properties: Properties::new(),
        }),
        Category::Clause if element_type == ElementType::Sentence => Element::Sentence(Sentence {
            id,
            properties: Properties::new(),
        }),
        Category::Clause => Element::Clause(Clause {
            id,
            clause_type: element_type
                .clause_kind()
                .ok_or(SchemaError::NotInitializable(element_type))?,
            properties: Properties::new(),
        }),
    };

    Ok(element)
}
