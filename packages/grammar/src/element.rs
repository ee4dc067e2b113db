//! Element values stored in a diagram.
//!
//! An element is a tagged union over the four shapes the schema knows about:
//! words (leaves holding a lexeme), parts of speech, phrases and clauses (plus
//! the top-level sentence container). Non-word shapes hold their references in
//! a property map whose keys and arity are governed by [`crate::schema`].

use crate::element_type::{Category, ClauseKind, ElementType, PhraseKind};
use crate::error::{SchemaError, SchemaResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Opaque identifier, unique within a diagram
pub type ElementId = String;

/// Typed pointer from a parent property to a child element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementReference {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub element_type: ElementType,
}

impl ElementReference {
    pub fn new(id: impl Into<ElementId>, element_type: ElementType) -> Self {
        Self {
            id: id.into(),
            element_type,
        }
    }
}

/// Value of one property: a single reference or an ordered list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Single(ElementReference),
    Array(Vec<ElementReference>),
}

impl PropertyValue {
    /// All references held by this value, in order
    pub fn references(&self) -> &[ElementReference] {
        match self {
            PropertyValue::Single(reference) => std::slice::from_ref(reference),
            PropertyValue::Array(references) => references,
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.references().iter().map(|r| r.id.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids().any(|candidate| candidate == id)
    }

    /// Number of slots referencing `id`
    pub fn count(&self, id: &str) -> usize {
        self.ids().filter(|candidate| *candidate == id).count()
    }

    pub fn is_array(&self) -> bool {
        matches!(self, PropertyValue::Array(_))
    }
}

/// Property name → value, for every populated property of an element
pub type Properties = BTreeMap<String, PropertyValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: ElementId,
    pub lexeme: String,
}

/// Part of speech, or a coordinated group of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartOfSpeech {
    pub id: ElementId,
    #[serde(flatten)]
    pub properties: Properties,
}

/// Phrase, or a coordinated group of phrases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phrase {
    pub id: ElementId,
    pub phrase_type: PhraseKind,
    #[serde(flatten)]
    pub properties: Properties,
}

/// Clause, or a coordinated group of clauses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clause {
    pub id: ElementId,
    pub clause_type: ClauseKind,
    #[serde(flatten)]
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub id: ElementId,
    #[serde(flatten)]
    pub properties: Properties,
}

/// Any element value.
///
/// Serialized without a tag: the owning item's `type` decides the shape, see
/// [`Element::from_value`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Element {
    Word(Word),
    PartOfSpeech(PartOfSpeech),
    Phrase(Phrase),
    Clause(Clause),
    Sentence(Sentence),
}

impl Element {
    pub fn word(id: impl Into<ElementId>, lexeme: impl Into<String>) -> Self {
        Element::Word(Word {
            id: id.into(),
            lexeme: lexeme.into(),
        })
    }

    pub fn id(&self) -> &str {
        match self {
            Element::Word(word) => &word.id,
            Element::PartOfSpeech(pos) => &pos.id,
            Element::Phrase(phrase) => &phrase.id,
            Element::Clause(clause) => &clause.id,
            Element::Sentence(sentence) => &sentence.id,
        }
    }

    /// Property map, `None` for words
    pub fn properties(&self) -> Option<&Properties> {
        match self {
            Element::Word(_) => None,
            Element::PartOfSpeech(pos) => Some(&pos.properties),
            Element::Phrase(phrase) => Some(&phrase.properties),
            Element::Clause(clause) => Some(&clause.properties),
            Element::Sentence(sentence) => Some(&sentence.properties),
        }
    }

    pub fn properties_mut(&mut self) -> Option<&mut Properties> {
        match self {
            Element::Word(_) => None,
            Element::PartOfSpeech(pos) => Some(&mut pos.properties),
            Element::Phrase(phrase) => Some(&mut phrase.properties),
            Element::Clause(clause) => Some(&mut clause.properties),
            Element::Sentence(sentence) => Some(&mut sentence.properties),
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties().and_then(|properties| properties.get(name))
    }

    pub fn lexeme(&self) -> Option<&str> {
        match self {
            Element::Word(word) => Some(&word.lexeme),
            _ => None,
        }
    }

    /// True when no property holds a reference
    pub fn is_empty(&self) -> bool {
        self.properties()
            .map_or(true, |properties| properties.values().all(|v| v.references().is_empty()))
    }

    /// Whether this value has the shape `element_type` requires
    pub fn matches_type(&self, element_type: ElementType) -> bool {
        match (self, element_type.category()) {
            (Element::Word(_), Category::Word) => true,
            (Element::PartOfSpeech(_), Category::PartOfSpeech) => true,
            (Element::Phrase(phrase), Category::Phrase) => {
                element_type.phrase_kind() == Some(phrase.phrase_type)
            }
            (Element::Clause(clause), Category::Clause) => {
                element_type.clause_kind() == Some(clause.clause_type)
            }
            (Element::Sentence(_), _) => element_type == ElementType::Sentence,
            _ => false,
        }
    }

    /// Decode a JSON value into the shape `element_type` requires
    pub fn from_value(element_type: ElementType, value: Value) -> SchemaResult<Self> {
        let invalid = |e: serde_json::Error| SchemaError::invalid_value(element_type, e.to_string());

        let element = match element_type.category() {
            Category::Word => Element::Word(serde_json::from_value(value).map_err(invalid)?),
            Category::PartOfSpeech => {
                Element::PartOfSpeech(serde_json::from_value(value).map_err(invalid)?)
            }
            Category::Phrase => Element::Phrase(serde_json::from_value(value).map_err(invalid)?),
            Category::Clause if element_type == ElementType::Sentence => {
                Element::Sentence(serde_json::from_value(value).map_err(invalid)?)
            }
            Category::Clause => Element::Clause(serde_json::from_value(value).map_err(invalid)?),
        };

        if !element.matches_type(element_type) {
            return Err(SchemaError::invalid_value(
                element_type,
                format!("value '{}' has the shape of a different element type", element.id()),
            ));
        }

        Ok(element)
    }
}
