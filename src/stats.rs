//! Descriptive statistics over annotated documents
//!
//! Tag distribution percentages and sentence/word-length averages. The
//! distribution rounds the ratio to 3 decimals before scaling by 100,
//! keeping output parity with previously published result tables.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use crate::annotate::{AnnotatedDoc, PosTag};

/// Percentage share of each coarse tag across all tokens of a document.
///
/// Fails if the document has no tokens.
pub fn pos_distribution(doc: &AnnotatedDoc) -> Result<BTreeMap<PosTag, f64>> {
    let total = doc.token_count();
    if total == 0 {
        anyhow::bail!("Cannot compute a POS distribution over a document with no tokens");
    }

    let mut counts: BTreeMap<PosTag, usize> = BTreeMap::new();
    for token in doc.tokens() {
        *counts.entry(token.pos).or_insert(0) += 1;
    }

    Ok(counts
        .into_iter()
        .map(|(tag, count)| {
            // ratio is rounded before scaling; do not reorder
            let ratio = round_to(count as f64 / total as f64, 3);
            (tag, ratio * 100.0)
        })
        .collect())
}

/// Word-length and sentence-length averages of a document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextStatistics {
    /// Average token length in characters
    pub avg_word_len: f64,
    /// Average sentence length in tokens
    pub avg_sentence_words: f64,
    /// Average sentence length in characters
    pub avg_sentence_chars: f64,
}

/// Compute the three length averages, each rounded to 2 decimals.
/// Character counts are Unicode scalar counts, so umlauts count as one.
///
/// Fails if the document has no tokens or no sentences.
pub fn text_statistics(doc: &AnnotatedDoc) -> Result<TextStatistics> {
    let token_count = doc.token_count();
    if token_count == 0 {
        anyhow::bail!("Cannot compute text statistics over a document with no tokens");
    }
    let sentence_count = doc.sentence_count();
    if sentence_count == 0 {
        anyhow::bail!("Cannot compute text statistics over a document with no sentences");
    }

    let letter_count: usize = doc.tokens().map(|t| t.text.chars().count()).sum();

    Ok(TextStatistics {
        avg_word_len: round_to(letter_count as f64 / token_count as f64, 2),
        avg_sentence_words: round_to(token_count as f64 / sentence_count as f64, 2),
        avg_sentence_chars: round_to(letter_count as f64 / sentence_count as f64, 2),
    })
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
