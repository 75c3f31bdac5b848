//! Behavior tests for corpus preparation: filtering, chunking and
//! vectorization against a deterministic mock annotator.

use anyhow::Result;

use super::{chunk_lemmas, prepare, Chunking, PrepareConfig};
use crate::annotate::{AnnotatedDoc, Annotator, PosTag, Sentence, StopwordFilter, Token};

/// Deterministic annotator: sentences split on periods, tokens on
/// whitespace, lemmas via a small lookup with lowercasing as fallback.
struct MockAnnotator;

impl Annotator for MockAnnotator {
    fn annotate(&self, text: &str) -> Result<AnnotatedDoc> {
        let mut sentences = Vec::new();
        for raw in text.split('.') {
            let tokens: Vec<Token> = raw
                .split_whitespace()
                .map(|w| Token::new(w, lemma_of(w), pos_of(w)))
                .collect();
            if !tokens.is_empty() {
                sentences.push(Sentence::new(tokens));
            }
        }
        Ok(AnnotatedDoc::new(sentences))
    }
}

fn lemma_of(word: &str) -> String {
    match word {
        "lief" => "laufen".to_string(),
        "schlief" => "schlafen".to_string(),
        _ => word.to_lowercase(),
    }
}

fn pos_of(word: &str) -> PosTag {
    match word {
        "der" | "die" | "das" => PosTag::Det,
        "lief" | "schlief" => PosTag::Verb,
        "schnell" => PosTag::Adv,
        w if w.chars().all(|c| c.is_ascii_punctuation()) => PosTag::Punct,
        w if w.chars().next().is_some_and(|c| c.is_uppercase()) => PosTag::Noun,
        _ => PosTag::X,
    }
}

fn lemmas(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

// =========================================================================
// PREPARE
// =========================================================================

#[test]
fn end_to_end_two_trivial_documents() {
    let docs = ["der Hund lief schnell", "die Katze schlief"];
    let config = PrepareConfig::new();

    let prepared = prepare(&docs, &MockAnnotator, &config).unwrap();

    // one entry per distinct lemma across both documents
    assert_eq!(prepared.dictionary.len(), 7);
    assert_eq!(prepared.corpus.len(), 2);

    // total pair-count equals each input's retained token count
    let total: u32 = prepared.corpus[0].iter().map(|(_, c)| c).sum();
    assert_eq!(total, 4);
    let total: u32 = prepared.corpus[1].iter().map(|(_, c)| c).sum();
    assert_eq!(total, 3);

    // tagged documents are returned pre-filtering
    assert_eq!(prepared.tagged_docs.len(), 2);
    assert_eq!(prepared.tagged_docs[0].token_count(), 4);
}

#[test]
fn stopword_lemmas_are_dropped() {
    let docs = ["der Hund lief"];
    let mut stopwords = StopwordFilter::new([]);
    stopwords.extend(["der".to_string()]);
    let config = PrepareConfig::new().with_stopwords(stopwords);

    let prepared = prepare(&docs, &MockAnnotator, &config).unwrap();
    assert_eq!(prepared.dictionary.len(), 2);
    assert!(prepared.dictionary.id("der").is_none());
    assert!(prepared.dictionary.id("laufen").is_some());
}

#[test]
fn pos_whitelist_keeps_only_allowed_tags() {
    let docs = ["der Hund lief schnell"];
    let config = PrepareConfig::new().with_allowed_pos(vec![PosTag::Verb, PosTag::Noun]);

    let prepared = prepare(&docs, &MockAnnotator, &config).unwrap();
    let kept: Vec<&str> = prepared.dictionary.lemmas().collect();
    assert_eq!(kept, vec!["hund", "laufen"]);
}

#[test]
fn punctuation_tokens_never_reach_the_dictionary() {
    let docs = ["Der Hund , lief"];
    let prepared = prepare(&docs, &MockAnnotator, &PrepareConfig::new()).unwrap();
    assert!(prepared.dictionary.id(",").is_none());
    assert_eq!(prepared.dictionary.len(), 3);
}

#[test]
fn empty_input_yields_empty_structures() {
    let prepared = prepare(&[], &MockAnnotator, &PrepareConfig::new()).unwrap();
    assert!(prepared.dictionary.is_empty());
    assert!(prepared.corpus.is_empty());
    assert!(prepared.tagged_docs.is_empty());
}

#[test]
fn rerunning_prepare_yields_identical_dictionary() {
    let docs = ["der Hund lief schnell", "die Katze schlief", "der Hund schlief"];
    let config = PrepareConfig::new();

    let first = prepare(&docs, &MockAnnotator, &config).unwrap();
    let second = prepare(&docs, &MockAnnotator, &config).unwrap();

    assert_eq!(first.dictionary.len(), second.dictionary.len());
    for lemma in first.dictionary.lemmas() {
        assert_eq!(first.dictionary.id(lemma), second.dictionary.id(lemma));
    }
    assert_eq!(first.corpus, second.corpus);
}

// =========================================================================
// CHUNKING
// =========================================================================

#[test]
fn default_chunking_produces_ceil_len_over_stride_windows() {
    let words: Vec<String> = (0..25).map(|i| format!("w{i}")).collect();
    let chunks = chunk_lemmas(&words, Chunking::new(20, 3));

    // ceil(25 / 3) = 9
    assert_eq!(chunks.len(), 9);
    assert_eq!(chunks[0].len(), 20);
    assert_eq!(chunks[8], vec!["w24".to_string()]);
}

#[test]
fn chunk_windows_keep_original_order_and_overlap() {
    let words = lemmas(&["a", "b", "c", "d", "e", "f"]);
    let chunks = chunk_lemmas(&words, Chunking::new(4, 2));

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0], lemmas(&["a", "b", "c", "d"]));
    assert_eq!(chunks[1], lemmas(&["c", "d", "e", "f"]));
    assert_eq!(chunks[2], lemmas(&["e", "f"]));
}

#[test]
fn empty_sequence_produces_no_chunks() {
    assert!(chunk_lemmas(&[], Chunking::new(20, 3)).is_empty());
}

#[test]
fn chunked_prepare_builds_dictionary_over_all_windows() {
    let docs = ["der Hund lief schnell und die Katze schlief tief"];
    let config = PrepareConfig::new().with_chunking(3, 2);

    let prepared = prepare(&docs, &MockAnnotator, &config).unwrap();

    // 9 retained tokens, stride 2 -> ceil(9 / 2) = 5 model documents
    assert_eq!(prepared.corpus.len(), 5);
    // chunking multiplies documents but not the vocabulary
    assert_eq!(prepared.dictionary.len(), 9);
}
