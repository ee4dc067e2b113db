//! Element type tags and their display categories.
//!
//! Every node in a diagram carries one of these tags. The set is closed: the
//! grammar schema in [`crate::schema`] has an entry for every tag except
//! [`ElementType::Word`].

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! element_types {
    ($($variant:ident => $name:literal,)*) => {
        /// Tag identifying the shape and schema of an element
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum ElementType {
            $(
                #[serde(rename = $name)]
                $variant,
            )*
        }

        impl ElementType {
            /// Every element type, in declaration order
            pub const ALL: &'static [ElementType] = &[$(ElementType::$variant,)*];

            /// The camelCase tag used in serialized diagrams
            pub fn as_str(self) -> &'static str {
                match self {
                    $(ElementType::$variant => $name,)*
                }
            }
        }

        impl FromStr for ElementType {
            type Err = SchemaError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(ElementType::$variant),)*
                    _ => Err(SchemaError::UnknownType(s.to_string())),
                }
            }
        }
    };
}

element_types! {
    Word => "word",

    Noun => "noun",
    Pronoun => "pronoun",
    Verb => "verb",
    Adjective => "adjective",
    Adverb => "adverb",
    Preposition => "preposition",
    Determiner => "determiner",
    Coordinator => "coordinator",
    Subordinator => "subordinator",
    Infinitive => "infinitive",
    Participle => "participle",
    Gerund => "gerund",

    CoordinatedNoun => "coordinatedNoun",
    CoordinatedPronoun => "coordinatedPronoun",
    CoordinatedVerb => "coordinatedVerb",
    CoordinatedAdjective => "coordinatedAdjective",
    CoordinatedAdverb => "coordinatedAdverb",
    CoordinatedPreposition => "coordinatedPreposition",
    CoordinatedDeterminer => "coordinatedDeterminer",
    CoordinatedInfinitive => "coordinatedInfinitive",
    CoordinatedParticiple => "coordinatedParticiple",
    CoordinatedGerund => "coordinatedGerund",

    NounPhrase => "nounPhrase",
    VerbPhrase => "verbPhrase",
    AdjectivePhrase => "adjectivePhrase",
    AdverbPhrase => "adverbPhrase",
    PrepositionPhrase => "prepositionPhrase",
    InfinitivePhrase => "infinitivePhrase",
    ParticiplePhrase => "participlePhrase",
    GerundPhrase => "gerundPhrase",

    CoordinatedNounPhrase => "coordinatedNounPhrase",
    CoordinatedVerbPhrase => "coordinatedVerbPhrase",
    CoordinatedAdjectivePhrase => "coordinatedAdjectivePhrase",
    CoordinatedAdverbPhrase => "coordinatedAdverbPhrase",
    CoordinatedPrepositionPhrase => "coordinatedPrepositionPhrase",
    CoordinatedInfinitivePhrase => "coordinatedInfinitivePhrase",
    CoordinatedParticiplePhrase => "coordinatedParticiplePhrase",
    CoordinatedGerundPhrase => "coordinatedGerundPhrase",

    IndependentClause => "independentClause",
    NounClause => "nounClause",
    RelativeClause => "relativeClause",
    AdverbialClause => "adverbialClause",

    CoordinatedIndependentClause => "coordinatedIndependentClause",
    CoordinatedNounClause => "coordinatedNounClause",
    CoordinatedRelativeClause => "coordinatedRelativeClause",
    CoordinatedAdverbialClause => "coordinatedAdverbialClause",

    Sentence => "sentence",
}

/// Granularity level an element is displayed at.
///
/// Ordered from finest to coarsest so a display layer can be compared with
/// `<=` when climbing from a word to its ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Word,
    PartOfSpeech,
    Phrase,
    Clause,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Word,
        Category::PartOfSpeech,
        Category::Phrase,
        Category::Clause,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Word => "word",
            Category::PartOfSpeech => "partOfSpeech",
            Category::Phrase => "phrase",
            Category::Clause => "clause",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownCategory(s.to_string()))
    }
}

/// Part of speech a phrase is built around (`phraseType` of a phrase value)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PhraseKind {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Preposition,
    Infinitive,
    Participle,
    Gerund,
}

/// Kind of clause (`clauseType` of a clause value)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClauseKind {
    Independent,
    Noun,
    Relative,
    Adverbial,
}

impl ElementType {
    /// Display category of this type
    pub fn category(self) -> Category {
        use ElementType::*;

        match self {
            Word => Category::Word,
            Noun | Pronoun | Verb | Adjective | Adverb | Preposition | Determiner | Coordinator
            | Subordinator | Infinitive | Participle | Gerund | CoordinatedNoun
            | CoordinatedPronoun | CoordinatedVerb | CoordinatedAdjective | CoordinatedAdverb
            | CoordinatedPreposition | CoordinatedDeterminer | CoordinatedInfinitive
            | CoordinatedParticiple | CoordinatedGerund => Category::PartOfSpeech,
            NounPhrase | VerbPhrase | AdjectivePhrase | AdverbPhrase | PrepositionPhrase
            | InfinitivePhrase | ParticiplePhrase | GerundPhrase | CoordinatedNounPhrase
            | CoordinatedVerbPhrase | CoordinatedAdjectivePhrase | CoordinatedAdverbPhrase
            | CoordinatedPrepositionPhrase | CoordinatedInfinitivePhrase
            | CoordinatedParticiplePhrase | CoordinatedGerundPhrase => Category::Phrase,
            IndependentClause | NounClause | RelativeClause | AdverbialClause
            | CoordinatedIndependentClause | CoordinatedNounClause | CoordinatedRelativeClause
            | CoordinatedAdverbialClause | Sentence => Category::Clause,
        }
    }

    /// The `phraseType` seeded into phrase values, `None` for non-phrases
    pub fn phrase_kind(self) -> Option<PhraseKind> {
        use ElementType::*;

        match self {
            NounPhrase | CoordinatedNounPhrase => Some(PhraseKind::Noun),
            VerbPhrase | CoordinatedVerbPhrase => Some(PhraseKind::Verb),
            AdjectivePhrase | CoordinatedAdjectivePhrase => Some(PhraseKind::Adjective),
            AdverbPhrase | CoordinatedAdverbPhrase => Some(PhraseKind::Adverb),
            PrepositionPhrase | CoordinatedPrepositionPhrase => Some(PhraseKind::Preposition),
            InfinitivePhrase | CoordinatedInfinitivePhrase => Some(PhraseKind::Infinitive),
            ParticiplePhrase | CoordinatedParticiplePhrase => Some(PhraseKind::Participle),
            GerundPhrase | CoordinatedGerundPhrase => Some(PhraseKind::Gerund),
            _ => None,
        }
    }

    /// The `clauseType` seeded into clause values, `None` for non-clauses
    pub fn clause_kind(self) -> Option<ClauseKind> {
        use ElementType::*;

        match self {
            IndependentClause | CoordinatedIndependentClause => Some(ClauseKind::Independent),
            NounClause | CoordinatedNounClause => Some(ClauseKind::Noun),
            RelativeClause | CoordinatedRelativeClause => Some(ClauseKind::Relative),
            AdverbialClause | CoordinatedAdverbialClause => Some(ClauseKind::Adverbial),
            _ => None,
        }
    }

    pub fn is_coordinated(self) -> bool {
        self.as_str().starts_with("coordinated")
    }

    pub fn is_word(self) -> bool {
        self == ElementType::Word
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
