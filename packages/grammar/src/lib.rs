//! # Diagrammer Grammar
//!
//! Domain ontology for sentence diagrams: the closed set of element types, the
//! static grammar schema, element values and their factory, id generation and
//! the sentence scanner that seeds a diagram with words.
//!
//! ```rust
//! use diagrammer_grammar::{get_element_definition, ElementType};
//!
//! let definition = get_element_definition(ElementType::NounPhrase).unwrap();
//! let head = definition.property("head").unwrap();
//!
//! assert!(!head.is_array);
//! assert!(head.allows(ElementType::Pronoun));
//! assert!(!head.allows(ElementType::Word));
//! ```

pub mod element;
pub mod element_type;
pub mod error;
pub mod factory;
pub mod id_generator;
pub mod schema;
pub mod tokenizer;

pub use element::{
    Clause, Element, ElementId, ElementReference, PartOfSpeech, Phrase, Properties,
    PropertyValue, Sentence, Word,
};
pub use element_type::{Category, ClauseKind, ElementType, PhraseKind};
pub use error::{SchemaError, SchemaResult};
pub use factory::init_element;
pub use id_generator::{get_diagram_seed, IdGenerator, SerialIds};
pub use schema::{get_element_definition, ElementDefinition, PropertyDefinition};
pub use tokenizer::{assign_word_ids, scan, tokenize, Token, WordToken};
