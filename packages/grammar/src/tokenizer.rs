//! Sentence scanner.
//!
//! Splits free-form sentence text into word tokens. Whitespace is skipped and
//! punctuation is tokenized separately so it never ends up inside a word.

use crate::element::ElementId;
use logos::Logos;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Range;

/// Token types for sentence text
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"\s+")]
pub enum Token<'src> {
    // Letters and digits, with inner apostrophes or hyphens (don't, well-known)
    #[regex(r"[\p{L}\p{N}]+(['’\-][\p{L}\p{N}]+)*", |lex| lex.slice())]
    Word(&'src str),

    #[regex(r"[\p{P}\p{S}]", |lex| lex.slice())]
    Punctuation(&'src str),
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(s) => write!(f, "word '{}'", s),
            Token::Punctuation(s) => write!(f, "punctuation '{}'", s),
        }
    }
}

/// A word scanned from sentence text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordToken {
    pub lexeme: String,
    pub span: Range<usize>,
}

/// Tokenize a sentence, keeping punctuation
pub fn tokenize(source: &str) -> Vec<(Token<'_>, Range<usize>)> {
    let lexer = Token::lexer(source);
    lexer
        .spanned()
        .filter_map(|(result, span)| result.ok().map(|token| (token, span)))
        .collect()
}

/// Scan the words of a sentence in left-to-right order
pub fn scan(source: &str) -> Vec<WordToken> {
    tokenize(source)
        .into_iter()
        .filter_map(|(token, span)| match token {
            Token::Word(lexeme) => Some(WordToken {
                lexeme: lexeme.to_string(),
                span,
            }),
            Token::Punctuation(_) => None,
        })
        .collect()
}

/// Give every word a readable id.
///
/// The id is the lowercased lexeme; lexemes that occur more than once are
/// suffixed with their occurrence number (`the1`, `the2`). A suffixed id that
/// another word already owns is skipped (`1` twice beside `11` gives `12`, `13`).
pub fn assign_word_ids(words: &[WordToken]) -> Vec<(ElementId, String)> {
    let mut totals: HashMap<String, usize> = HashMap::new();
    for word in words {
        *totals.entry(word.lexeme.to_lowercase()).or_default() += 1;
    }

    // Lexemes that occur once keep their plain id
    let mut taken: HashSet<String> = totals
        .iter()
        .filter(|(_, total)| **total == 1)
        .map(|(key, _)| key.clone())
        .collect();

    let mut seen: HashMap<String, usize> = HashMap::new();
    words
        .iter()
        .map(|word| {
            let key = word.lexeme.to_lowercase();
            let id = if totals[&key] > 1 {
                let occurrence = seen.entry(key.clone()).or_default();
                loop {
                    *occurrence += 1;
                    let candidate = format!("{}{}", key, occurrence);
                    if taken.insert(candidate.clone()) {
                        break candidate;
                    }
                }
            } else {
                key
            };
            (id, word.lexeme.clone())
        })
        .collect()
}
