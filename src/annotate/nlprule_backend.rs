//! nlprule-backed annotator
//!
//! Wraps nlprule's German tokenizer binary, which performs tokenization,
//! sentence splitting, lemmatization and part-of-speech tagging in one
//! pass. nlprule tags with the LanguageTool inventory; this module maps
//! those tags onto the universal coarse tag set.

use std::path::Path;

use anyhow::{Context, Result};
use nlprule::Tokenizer;

use super::{AnnotatedDoc, Annotator, PosTag, Sentence, Token};

/// Annotator backed by an nlprule tokenizer binary (e.g. `de_tokenizer.bin`).
pub struct NlpruleAnnotator {
    tokenizer: Tokenizer,
}

impl NlpruleAnnotator {
    /// Load the tokenizer binary from disk.
    ///
    /// Binaries are distributed with nlprule's releases; the German one is
    /// `de_tokenizer.bin`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let tokenizer = Tokenizer::new(path)
            .with_context(|| format!("Failed to load nlprule tokenizer from {:?}", path))?;
        Ok(Self { tokenizer })
    }

    /// Wrap an already constructed tokenizer.
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }
}

impl Annotator for NlpruleAnnotator {
    fn annotate(&self, text: &str) -> Result<AnnotatedDoc> {
        let mut sentences = Vec::new();

        for sentence in self.tokenizer.pipe(text) {
            let mut tokens = Vec::new();

            for token in sentence.tokens() {
                let surface = token.word().text().as_str();
                if surface.is_empty() {
                    continue;
                }

                // The first reading carries the most probable lemma and tag.
                let (lemma, pos) = match token.word().tags().first() {
                    Some(data) => {
                        let lemma = data.lemma().as_str();
                        (lemma.to_string(), map_languagetool_tag(data.pos().as_str()))
                    }
                    None => (surface.to_string(), PosTag::X),
                };

                let lemma = if lemma.is_empty() {
                    surface.to_string()
                } else {
                    lemma
                };

                tokens.push(Token::new(surface, lemma, pos));
            }

            if !tokens.is_empty() {
                sentences.push(Sentence::new(tokens));
            }
        }

        Ok(AnnotatedDoc::new(sentences))
    }
}

/// Map a German LanguageTool tag (e.g. `SUB:NOM:SIN:MAS`, `VER:3:SIN:PRÄ`)
/// onto the universal coarse tag set.
///
/// The mapping keys on the category prefix; inflection features after the
/// first `:` are irrelevant for coarse tagging.
pub fn map_languagetool_tag(tag: &str) -> PosTag {
    let category = tag.split(':').next().unwrap_or(tag);

    match category {
        "SUB" => PosTag::Noun,
        "EIG" => PosTag::Propn,
        "VER" => {
            // Modal and auxiliary readings are tagged VER:MOD / VER:AUX
            let second = tag.split(':').nth(1).unwrap_or("");
            if second == "AUX" || second == "MOD" {
                PosTag::Aux
            } else {
                PosTag::Verb
            }
        }
        "ADJ" | "PA1" | "PA2" => PosTag::Adj,
        "ADV" => PosTag::Adv,
        "ART" => PosTag::Det,
        "PRO" => PosTag::Pron,
        "PRP" => PosTag::Adp,
        "KON" => {
            if tag.starts_with("KON:UNT") {
                PosTag::Sconj
            } else {
                PosTag::Cconj
            }
        }
        "NEG" | "ZUS" | "PRT" => PosTag::Part,
        "INJ" => PosTag::Intj,
        "ZAL" => PosTag::Num,
        "PKT" | "SENT_END" => PosTag::Punct,
        _ => PosTag::X,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_core_categories() {
        assert_eq!(map_languagetool_tag("SUB:NOM:SIN:MAS"), PosTag::Noun);
        assert_eq!(map_languagetool_tag("EIG:NOM:SIN:FEM"), PosTag::Propn);
        assert_eq!(map_languagetool_tag("VER:3:SIN:PRÄ"), PosTag::Verb);
        assert_eq!(map_languagetool_tag("VER:MOD:3:SIN:PRÄ"), PosTag::Aux);
        assert_eq!(map_languagetool_tag("ADJ:PRD:GRU"), PosTag::Adj);
        assert_eq!(map_languagetool_tag("ART:DEF:NOM:SIN:MAS"), PosTag::Det);
        assert_eq!(map_languagetool_tag("PRP:DAT"), PosTag::Adp);
    }

    #[test]
    fn distinguishes_conjunction_kinds() {
        assert_eq!(map_languagetool_tag("KON:NEB"), PosTag::Cconj);
        assert_eq!(map_languagetool_tag("KON:UNT"), PosTag::Sconj);
    }

    #[test]
    fn unknown_tags_fall_back_to_x() {
        assert_eq!(map_languagetool_tag("ABK"), PosTag::X);
        assert_eq!(map_languagetool_tag(""), PosTag::X);
    }
}
