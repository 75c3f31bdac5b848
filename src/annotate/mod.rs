//! Linguistic annotation abstraction
//!
//! Defines a common interface for annotators (tokenization, sentence
//! splitting, lemmatization, coarse POS tagging), so the pipeline and the
//! statistics code do not depend on a concrete NLP backend.
//!
//! The production backend wraps nlprule's German tokenizer; tests use a
//! deterministic mock.

pub mod nlprule_backend;
pub mod stopwords;

pub use nlprule_backend::NlpruleAnnotator;
pub use stopwords::StopwordFilter;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Coarse part-of-speech category from the universal tag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PosTag {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
}

impl PosTag {
    /// All tags in canonical order.
    pub fn all() -> &'static [PosTag] {
        use PosTag::*;
        &[
            Adj, Adp, Adv, Aux, Cconj, Det, Intj, Noun, Num, Part, Pron, Propn, Punct, Sconj,
            Sym, Verb, X,
        ]
    }

    /// Uppercase label as used in the universal tag set.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adj => "ADJ",
            Self::Adp => "ADP",
            Self::Adv => "ADV",
            Self::Aux => "AUX",
            Self::Cconj => "CCONJ",
            Self::Det => "DET",
            Self::Intj => "INTJ",
            Self::Noun => "NOUN",
            Self::Num => "NUM",
            Self::Part => "PART",
            Self::Pron => "PRON",
            Self::Propn => "PROPN",
            Self::Punct => "PUNCT",
            Self::Sconj => "SCONJ",
            Self::Sym => "SYM",
            Self::Verb => "VERB",
            Self::X => "X",
        }
    }
}

impl std::fmt::Display for PosTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single token produced by an annotator.
///
/// Tokens are transient: they exist only within one processing pass and are
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Surface form as it appears in the text
    pub text: String,
    /// Dictionary base form
    pub lemma: String,
    /// Coarse part-of-speech category
    pub pos: PosTag,
}

impl Token {
    pub fn new(text: impl Into<String>, lemma: impl Into<String>, pos: PosTag) -> Self {
        Self {
            text: text.into(),
            lemma: lemma.into(),
            pos,
        }
    }

    /// Whether the surface form is punctuation or whitespace only.
    pub fn is_punct_or_space(&self) -> bool {
        self.pos == PosTag::Punct
            || self.text.chars().all(|c| c.is_ascii_punctuation() || c.is_whitespace())
    }
}

/// One sentence of annotated tokens.
#[derive(Debug, Clone, Default)]
pub struct Sentence {
    pub tokens: Vec<Token>,
}

impl Sentence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }
}

/// A fully annotated document: the annotator's sentence segmentation is
/// retained because sentence counts feed the text statistics.
#[derive(Debug, Clone, Default)]
pub struct AnnotatedDoc {
    pub sentences: Vec<Sentence>,
}

impl AnnotatedDoc {
    pub fn new(sentences: Vec<Sentence>) -> Self {
        Self { sentences }
    }

    /// Iterate all tokens across sentences in document order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.sentences.iter().flat_map(|s| s.tokens.iter())
    }

    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(|s| s.tokens.len()).sum()
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }
}

/// Unified interface for linguistic annotators.
///
/// Implementations are constructed once at startup and passed by reference
/// into every operation that needs annotation. Any backend failure
/// propagates to the caller unmodified; there are no retries.
pub trait Annotator {
    /// Annotate a text: tokenize, split sentences, lemmatize and tag.
    fn annotate(&self, text: &str) -> Result<AnnotatedDoc>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_set_is_complete() {
        assert_eq!(PosTag::all().len(), 17);
        assert_eq!(PosTag::all().first(), Some(&PosTag::Adj));
        assert_eq!(PosTag::all().last(), Some(&PosTag::X));
    }

    #[test]
    fn punct_detection_covers_pos_and_surface() {
        assert!(Token::new(".", ".", PosTag::Punct).is_punct_or_space());
        assert!(Token::new("-", "-", PosTag::X).is_punct_or_space());
        assert!(Token::new(" ", " ", PosTag::X).is_punct_or_space());
        assert!(!Token::new("Hund", "Hund", PosTag::Noun).is_punct_or_space());
    }

    #[test]
    fn doc_counts_span_sentences() {
        let doc = AnnotatedDoc::new(vec![
            Sentence::new(vec![
                Token::new("Der", "der", PosTag::Det),
                Token::new("Hund", "Hund", PosTag::Noun),
            ]),
            Sentence::new(vec![Token::new("Ja", "ja", PosTag::Intj)]),
        ]);
        assert_eq!(doc.token_count(), 3);
        assert_eq!(doc.sentence_count(), 2);
        assert_eq!(doc.tokens().count(), 3);
    }
}
