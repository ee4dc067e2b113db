//! Ready-made diagrams for tests and benchmarks.

use crate::diagram_state::DiagramState;
use crate::errors::DiagramResult;
use diagrammer_grammar::{ElementId, ElementType};

use ElementType::*;

pub const QUICK_BROWN_FOX: &str = "The quick brown fox jumps over the lazy dog.";
pub const DOG_WHO_BARKED: &str = "The dog who barked ran.";

/// Builds a diagram step by step through the public edit operations
pub struct DiagramBuilder {
    state: DiagramState,
}

impl DiagramBuilder {
    pub fn from_text(text: &str) -> DiagramResult<Self> {
        Ok(Self {
            state: DiagramState::from_text(text)?,
        })
    }

    /// Add an element with a fixed id
    pub fn element(mut self, element_type: ElementType, id: &str) -> DiagramResult<Self> {
        let mut ids = || ElementId::from(id);
        let (_, change) = self.state.create_add_item(element_type, &mut ids)?;
        self.state = self.state.apply(&[change])?;
        Ok(self)
    }

    /// Attach each child to `property` of the parent, in order
    pub fn reference(
        mut self,
        parent_type: ElementType,
        parent_id: &str,
        property: &str,
        children: &[&str],
    ) -> DiagramResult<Self> {
        for child in children {
            let changes = self
                .state
                .create_add_reference(parent_type, parent_id, property, child)?;
            self.state = self.state.apply(&changes)?;
        }
        Ok(self)
    }

    pub fn build(self) -> DiagramState {
        self.state
    }
}

fn build_quick_brown_fox() -> DiagramResult<DiagramState> {
    Ok(DiagramBuilder::from_text(QUICK_BROWN_FOX)?
        .element(Determiner, "the1Det")?
        .reference(Determiner, "the1Det", "words", &["the1"])?
        .element(Adjective, "quickBrownAdj")?
        .reference(Adjective, "quickBrownAdj", "words", &["quick", "brown"])?
        .element(AdjectivePhrase, "quickBrownAdjPhrase")?
        .reference(AdjectivePhrase, "quickBrownAdjPhrase", "determiner", &["the1Det"])?
        .reference(AdjectivePhrase, "quickBrownAdjPhrase", "head", &["quickBrownAdj"])?
        .element(Noun, "foxNoun")?
        .reference(Noun, "foxNoun", "words", &["fox"])?
        .element(NounPhrase, "foxNounPhrase")?
        .reference(NounPhrase, "foxNounPhrase", "head", &["foxNoun"])?
        .reference(NounPhrase, "foxNounPhrase", "modifiers", &["quickBrownAdjPhrase"])?
        .element(Verb, "jumpsVerb")?
        .reference(Verb, "jumpsVerb", "words", &["jumps"])?
        .element(Preposition, "overPrep")?
        .reference(Preposition, "overPrep", "words", &["over"])?
        .element(Determiner, "the2Det")?
        .reference(Determiner, "the2Det", "words", &["the2"])?
        .element(Adjective, "lazyAdj")?
        .reference(Adjective, "lazyAdj", "words", &["lazy"])?
        .element(AdjectivePhrase, "lazyAdjPhrase")?
        .reference(AdjectivePhrase, "lazyAdjPhrase", "determiner", &["the2Det"])?
        .reference(AdjectivePhrase, "lazyAdjPhrase", "head", &["lazyAdj"])?
        .element(Noun, "dogNoun")?
        .reference(Noun, "dogNoun", "words", &["dog"])?
        .element(NounPhrase, "dogNounPhrase")?
        .reference(NounPhrase, "dogNounPhrase", "head", &["dogNoun"])?
        .reference(NounPhrase, "dogNounPhrase", "modifiers", &["lazyAdjPhrase"])?
        .element(PrepositionPhrase, "overPrepPhrase")?
        .reference(PrepositionPhrase, "overPrepPhrase", "head", &["overPrep"])?
        .reference(PrepositionPhrase, "overPrepPhrase", "object", &["dogNounPhrase"])?
        .element(VerbPhrase, "jumpsVerbPhrase")?
        .reference(VerbPhrase, "jumpsVerbPhrase", "head", &["jumpsVerb"])?
        .reference(VerbPhrase, "jumpsVerbPhrase", "modifiers", &["overPrepPhrase"])?
        .element(IndependentClause, "indClause")?
        .reference(IndependentClause, "indClause", "subject", &["foxNounPhrase"])?
        .reference(IndependentClause, "indClause", "predicate", &["jumpsVerbPhrase"])?
        .build())
}

fn build_dog_who_barked() -> DiagramResult<DiagramState> {
    Ok(DiagramBuilder::from_text(DOG_WHO_BARKED)?
        .element(Determiner, "theDet")?
        .reference(Determiner, "theDet", "words", &["the"])?
        .element(Noun, "dogNoun")?
        .reference(Noun, "dogNoun", "words", &["dog"])?
        .element(Pronoun, "whoPronoun")?
        .reference(Pronoun, "whoPronoun", "words", &["who"])?
        .element(Verb, "barkedVerb")?
        .reference(Verb, "barkedVerb", "words", &["barked"])?
        .element(VerbPhrase, "barkedVerbPhrase")?
        .reference(VerbPhrase, "barkedVerbPhrase", "head", &["barkedVerb"])?
        .element(RelativeClause, "whoRelClause")?
        .reference(RelativeClause, "whoRelClause", "dependentWord", &["whoPronoun"])?
        .reference(RelativeClause, "whoRelClause", "subject", &["whoPronoun"])?
        .reference(RelativeClause, "whoRelClause", "predicate", &["barkedVerbPhrase"])?
        .element(NounPhrase, "dogNounPhrase")?
        .reference(NounPhrase, "dogNounPhrase", "determiner", &["theDet"])?
        .reference(NounPhrase, "dogNounPhrase", "head", &["dogNoun"])?
        .reference(NounPhrase, "dogNounPhrase", "modifiers", &["whoRelClause"])?
        .element(Verb, "ranVerb")?
        .reference(Verb, "ranVerb", "words", &["ran"])?
        .element(VerbPhrase, "ranVerbPhrase")?
        .reference(VerbPhrase, "ranVerbPhrase", "head", &["ranVerb"])?
        .element(IndependentClause, "indClause")?
        .reference(IndependentClause, "indClause", "subject", &["dogNounPhrase"])?
        .reference(IndependentClause, "indClause", "predicate", &["ranVerbPhrase"])?
        .build())
}

/// "The quick brown fox jumps over the lazy dog." fully diagrammed
pub fn quick_brown_fox() -> DiagramState {
    build_quick_brown_fox().expect("quick brown fox fixture is a valid diagram")
}

/// "The dog who barked ran.", with `who` as both dependent word and subject
/// of the relative clause
pub fn dog_who_barked() -> DiagramState {
    build_dog_who_barked().expect("relative clause fixture is a valid diagram")
}
