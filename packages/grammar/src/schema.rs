//! # Grammar Schema
//!
//! Static table describing, for every element type, which properties it has,
//! whether each property holds one reference or a list of them, and which
//! element types each property may reference.
//!
//! The table is the domain ontology. It is never mutated at runtime; every
//! structural edit validates against it before producing changes.
//!
//! Each property also carries a `displayed` flag: the curated subset of
//! properties through which a parent visually contains its child when the
//! diagram is grouped by category (a noun phrase displays its head but not its
//! modifiers).

use crate::element_type::ElementType::{self, *};
use crate::error::{SchemaError, SchemaResult};
use std::collections::BTreeMap;

/// One property of an element definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDefinition {
    pub name: &'static str,
    pub is_array: bool,
    pub allowed: &'static [ElementType],
    pub displayed: bool,
}

impl PropertyDefinition {
    /// Whether `element_type` is a legal target for this property
    pub fn allows(&self, element_type: ElementType) -> bool {
        self.allowed.contains(&element_type)
    }
}

/// Schema entry for one element type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementDefinition {
    pub element_type: ElementType,
    /// Properties in declaration order
    pub properties: &'static [PropertyDefinition],
}

impl ElementDefinition {
    pub fn property(&self, name: &str) -> Option<&'static PropertyDefinition> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Properties through which this element visually contains its children
    pub fn display_properties(&self) -> impl Iterator<Item = &'static PropertyDefinition> {
        self.properties.iter().filter(|p| p.displayed)
    }

    /// `{ property: (isArray, allowedTypes) }` view of the definition
    pub fn as_map(&self) -> BTreeMap<&'static str, (bool, Vec<ElementType>)> {
        self.properties
            .iter()
            .map(|p| (p.name, (p.is_array, p.allowed.to_vec())))
            .collect()
    }
}

/// Look up the definition of `element_type`.
///
/// Total over every type except [`ElementType::Word`], which never references
/// other elements and therefore has no definition.
pub fn get_element_definition(element_type: ElementType) -> SchemaResult<ElementDefinition> {
    let properties = definition_properties(element_type)
        .ok_or(SchemaError::NoDefinition(element_type))?;

    Ok(ElementDefinition {
        element_type,
        properties,
    })
}

// Struct literals keep the tables below promotable to `'static`.
macro_rules! prop {
    ($name:literal, $is_array:literal, $allowed:expr, $displayed:literal $(,)?) => {
        PropertyDefinition {
            name: $name,
            is_array: $is_array,
            allowed: $allowed,
            displayed: $displayed,
        }
    };
}

const NOMINAL: &[ElementType] = &[
    NounPhrase,
    CoordinatedNounPhrase,
    GerundPhrase,
    CoordinatedGerundPhrase,
    InfinitivePhrase,
    NounClause,
    CoordinatedNounClause,
];

const OBJECT: &[ElementType] = &[
    NounPhrase,
    CoordinatedNounPhrase,
    GerundPhrase,
    CoordinatedGerundPhrase,
    InfinitivePhrase,
    NounClause,
    CoordinatedNounClause,
    Pronoun,
];

const SUBJECT: &[ElementType] = OBJECT;

const COMPLEMENT: &[ElementType] = &[
    NounPhrase,
    CoordinatedNounPhrase,
    GerundPhrase,
    CoordinatedGerundPhrase,
    InfinitivePhrase,
    NounClause,
    CoordinatedNounClause,
    Adjective,
    AdjectivePhrase,
    CoordinatedAdjectivePhrase,
];

const VERBAL_COMPLEMENT: &[ElementType] = &[
    NounPhrase,
    CoordinatedNounPhrase,
    GerundPhrase,
    CoordinatedGerundPhrase,
    InfinitivePhrase,
    NounClause,
    CoordinatedNounClause,
    AdjectivePhrase,
];

const ADVERBIAL: &[ElementType] = &[
    Adverb,
    CoordinatedAdverb,
    AdverbPhrase,
    CoordinatedAdverbPhrase,
    PrepositionPhrase,
    CoordinatedPrepositionPhrase,
    InfinitivePhrase,
    AdverbialClause,
    CoordinatedAdverbialClause,
];

const NOUN_MODIFIER: &[ElementType] = &[
    Adjective,
    CoordinatedAdjective,
    AdjectivePhrase,
    CoordinatedAdjectivePhrase,
    PrepositionPhrase,
    CoordinatedPrepositionPhrase,
    ParticiplePhrase,
    CoordinatedParticiplePhrase,
    InfinitivePhrase,
    RelativeClause,
    CoordinatedRelativeClause,
];

const PREDICATE: &[ElementType] = &[VerbPhrase, CoordinatedVerbPhrase];
const DETERMINERS: &[ElementType] = &[Determiner, CoordinatedDeterminer];
const COORDINATORS: &[ElementType] = &[Coordinator];

const WORDS: &[PropertyDefinition] = &[prop!("words", true, &[Word], true)];

macro_rules! coordinated {
    ($($item:expr),+) => {
        &[
            prop!("items", true, &[$($item),+], true),
            prop!("coordinators", true, COORDINATORS, true),
        ]
    };
}

macro_rules! verbal_phrase {
    ($head:expr, $coordinated:expr, $coordinated_phrase:expr) => {
        &[
            prop!("head", false, &[$head, $coordinated, $coordinated_phrase], true),
            prop!("directObject", false, NOMINAL, false),
            prop!("subjectComplement", false, VERBAL_COMPLEMENT, false),
            prop!("modifiers", true, ADVERBIAL, false),
        ]
    };
}

macro_rules! clause {
    ($($dependent:expr),*) => {
        &[
            prop!("dependentWord", false, &[$($dependent),*], true),
            prop!("subject", false, SUBJECT, true),
            prop!("predicate", false, PREDICATE, true),
        ]
    };
}

fn definition_properties(element_type: ElementType) -> Option<&'static [PropertyDefinition]> {
    let properties: &'static [PropertyDefinition] = match element_type {
        Word => return None,

        Noun | Pronoun | Verb | Adjective | Adverb | Preposition | Determiner | Coordinator
        | Subordinator | Infinitive | Participle | Gerund => WORDS,

        CoordinatedNoun => coordinated!(Noun),
        CoordinatedPronoun => coordinated!(Pronoun),
        CoordinatedVerb => coordinated!(Verb),
        CoordinatedAdjective => coordinated!(Adjective),
        CoordinatedAdverb => coordinated!(Adverb),
        CoordinatedPreposition => coordinated!(Preposition),
        CoordinatedDeterminer => coordinated!(Determiner),
        CoordinatedInfinitive => coordinated!(Infinitive),
        CoordinatedParticiple => coordinated!(Participle),
        CoordinatedGerund => coordinated!(Gerund),

        NounPhrase => &[
            prop!("head", false, &[Noun, Pronoun, CoordinatedNounPhrase], true),
            prop!("determiner", false, DETERMINERS, false),
            prop!("modifiers", true, NOUN_MODIFIER, false),
        ],
        VerbPhrase => &[
            prop!("head", false, &[Verb, CoordinatedVerb, CoordinatedVerbPhrase], true),
            prop!("directObject", false, NOMINAL, false),
            prop!("indirectObject", false, NOMINAL, false),
            prop!("subjectComplement", false, COMPLEMENT, false),
            prop!("modifiers", true, ADVERBIAL, false),
        ],
        AdjectivePhrase => &[
            prop!(
                "head",
                false,
                &[Adjective, CoordinatedAdjective, CoordinatedAdjectivePhrase],
                true,
            ),
            prop!("determiner", false, DETERMINERS, false),
            prop!(
                "modifiers",
                true,
                &[Adverb, CoordinatedAdverb, AdverbPhrase, CoordinatedAdverbPhrase],
                false,
            ),
            prop!(
                "complement",
                false,
                &[PrepositionPhrase, CoordinatedPrepositionPhrase, InfinitivePhrase],
                false,
            ),
        ],
        AdverbPhrase => &[
            prop!("head", false, &[Adverb, CoordinatedAdverb, CoordinatedAdverbPhrase], true),
            prop!("modifiers", true, &[Adverb, AdverbPhrase], false),
            prop!(
                "complement",
                false,
                &[PrepositionPhrase, CoordinatedPrepositionPhrase],
                false,
            ),
        ],
        PrepositionPhrase => &[
            prop!(
                "head",
                false,
                &[Preposition, CoordinatedPreposition, CoordinatedPrepositionPhrase],
                true,
            ),
            prop!("object", false, OBJECT, false),
        ],
        InfinitivePhrase => {
            verbal_phrase!(Infinitive, CoordinatedInfinitive, CoordinatedInfinitivePhrase)
        }
        ParticiplePhrase => {
            verbal_phrase!(Participle, CoordinatedParticiple, CoordinatedParticiplePhrase)
        }
        GerundPhrase => verbal_phrase!(Gerund, CoordinatedGerund, CoordinatedGerundPhrase),

        CoordinatedNounPhrase => coordinated!(NounPhrase, CoordinatedNoun),
        CoordinatedVerbPhrase => coordinated!(VerbPhrase),
        CoordinatedAdjectivePhrase => coordinated!(AdjectivePhrase),
        CoordinatedAdverbPhrase => coordinated!(AdverbPhrase),
        CoordinatedPrepositionPhrase => coordinated!(PrepositionPhrase),
        CoordinatedInfinitivePhrase => coordinated!(InfinitivePhrase),
        CoordinatedParticiplePhrase => coordinated!(ParticiplePhrase),
        CoordinatedGerundPhrase => coordinated!(GerundPhrase),

        IndependentClause => &[
            prop!("subject", false, SUBJECT, true),
            prop!("predicate", false, PREDICATE, true),
        ],
        NounClause => clause!(Subordinator, Pronoun, Adverb, Determiner),
        RelativeClause => clause!(Pronoun, Determiner, Adverb),
        AdverbialClause => clause!(Subordinator),

        CoordinatedIndependentClause => coordinated!(IndependentClause),
        CoordinatedNounClause => coordinated!(NounClause),
        CoordinatedRelativeClause => coordinated!(RelativeClause),
        CoordinatedAdverbialClause => coordinated!(AdverbialClause),

        Sentence => &[prop!(
            "clauses",
            true,
            &[IndependentClause, CoordinatedIndependentClause],
            true,
        )],
    };

    Some(properties)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_but_word_has_a_definition() {
        for ty in ElementType::ALL {
            let definition = get_element_definition(*ty);
            if *ty == Word {
                assert_eq!(definition, Err(SchemaError::NoDefinition(Word)));
            } else {
                let definition = definition.unwrap();
                assert!(!definition.properties.is_empty(), "{ty} has no properties");
            }
        }
    }

    #[test]
    fn test_noun_phrase_head_is_restricted() {
        let definition = get_element_definition(NounPhrase).unwrap();
        let head = definition.property("head").unwrap();

        assert!(!head.is_array);
        assert_eq!(head.allowed, &[Noun, Pronoun, CoordinatedNounPhrase]);
        assert!(!head.allows(Word));
        assert!(!head.allows(NounPhrase));
    }

    #[test]
    fn test_property_names_are_unique_per_definition() {
        for ty in ElementType::ALL.iter().filter(|ty| **ty != Word) {
            let definition = get_element_definition(*ty).unwrap();
            let map = definition.as_map();
            assert_eq!(map.len(), definition.properties.len(), "{ty} repeats a property");
        }
    }

    #[test]
    fn test_relative_clause_dependent_word_can_double_as_subject() {
        let definition = get_element_definition(RelativeClause).unwrap();
        assert!(definition.property("dependentWord").unwrap().allows(Pronoun));
        assert!(definition.property("subject").unwrap().allows(Pronoun));
    }

    #[test]
    fn test_display_properties_exclude_modifiers() {
        let definition = get_element_definition(NounPhrase).unwrap();
        let displayed: Vec<_> = definition.display_properties().map(|p| p.name).collect();
        assert_eq!(displayed, vec!["head"]);

        let definition = get_element_definition(CoordinatedVerbPhrase).unwrap();
        let displayed: Vec<_> = definition.display_properties().map(|p| p.name).collect();
        assert_eq!(displayed, vec!["items", "coordinators"]);
    }

    #[test]
    fn test_allowed_types_never_include_sentence() {
        for ty in ElementType::ALL.iter().filter(|ty| **ty != Word) {
            let definition = get_element_definition(*ty).unwrap();
            for property in definition.properties {
                assert!(!property.allows(Sentence), "{ty}.{} allows sentence", property.name);
            }
        }
    }
}
