//! Book store
//!
//! Holds cleaned texts keyed by short identifiers. Books are kept in an
//! explicit ordered sequence so that exported text order is stable and
//! stays aligned with external key lists.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use super::markup;

/// A single ingested book.
#[derive(Debug, Clone)]
pub struct Book {
    /// Short identifier, unique within the store
    pub key: String,
    /// Cleaned text (whitespace collapsed, plays with tagged speaker cues)
    pub text: String,
    /// Set at ingestion, immutable thereafter
    pub is_play: bool,
}

/// Ordered collection of books with play-aware cleanup.
#[derive(Debug, Clone, Default)]
pub struct CorpusStore {
    books: Vec<Book>,
    count: usize,
}

impl CorpusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the file at `path` as UTF-8, clean it and store it under `key`.
    ///
    /// For plays, speaker-cue lines are rewritten to a removable
    /// `**Names:` tag before whitespace collapsing (see
    /// [`remove_speaker_markup`](Self::remove_speaker_markup)).
    /// Re-adding an existing key overwrites that entry in place.
    pub fn add(&mut self, path: impl AsRef<Path>, key: &str, is_play: bool) -> Result<()> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read book {:?}", path))?;
        self.add_text(key, &raw, is_play);
        Ok(())
    }

    /// Clean an already loaded text and store it under `key`.
    pub fn add_text(&mut self, key: &str, raw: &str, is_play: bool) {
        let cleaned = if is_play {
            markup::collapse_whitespace(&markup::tag_speaker_cues(raw))
        } else {
            markup::collapse_whitespace(raw)
        };

        let book = Book {
            key: key.to_string(),
            text: cleaned,
            is_play,
        };

        if let Some(existing) = self.books.iter_mut().find(|b| b.key == key) {
            warn!(key, "overwriting existing book entry");
            *existing = book;
        } else {
            self.books.push(book);
        }
        self.count += 1;
    }

    /// Strip the tagged speaker-cue prefixes from every play entry.
    ///
    /// Idempotent; non-play entries are untouched. Tagged asides (stage
    /// directions) stay in the text as narration.
    pub fn remove_speaker_markup(&mut self) {
        for book in &mut self.books {
            if book.is_play {
                book.text = markup::strip_speaker_tags(&book.text);
            }
        }
    }

    /// Cleaned texts in insertion order, without their keys.
    pub fn export_texts(&self) -> Vec<&str> {
        self.books.iter().map(|b| b.text.as_str()).collect()
    }

    /// Books in insertion order.
    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.books.iter()
    }

    pub fn get(&self, key: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.key == key)
    }

    /// Number of distinct entries currently stored.
    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Total number of ingestions, counting overwrites.
    pub fn ingested(&self) -> usize {
        self.count
    }
}
