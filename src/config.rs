//! Run manifest for analysis runs
//!
//! Defines the books.toml schema: the book list, preparation options and
//! LDA hyperparameters.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::annotate::PosTag;

/// One book to ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookEntry {
    /// Path to the UTF-8 text file
    pub path: PathBuf,

    /// Short key to refer to the book
    pub key: String,

    /// Whether the book is a play (enables speaker-cue cleanup)
    #[serde(default)]
    pub is_play: bool,

    /// Analysis group; books in the same group share a corpus store
    #[serde(default = "default_group")]
    pub group: String,
}

/// Token filtering and chunking options for corpus preparation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareSection {
    /// Coarse tags to keep; unset keeps every non-stopword content token
    #[serde(default = "default_allowed_pos")]
    pub allowed_pos: Option<Vec<PosTag>>,

    /// Words added to the built-in German stopword list
    #[serde(default = "default_extra_stopwords")]
    pub extra_stopwords: Vec<String>,

    /// Lemmas per chunk window; unset disables chunking
    #[serde(default = "default_chunk_size")]
    pub chunk_size: Option<usize>,

    /// Window advance in lemmas; stride < size yields overlapping chunks
    #[serde(default = "default_chunk_stride")]
    pub chunk_stride: Option<usize>,
}

impl Default for PrepareSection {
    fn default() -> Self {
        Self {
            allowed_pos: default_allowed_pos(),
            extra_stopwords: default_extra_stopwords(),
            chunk_size: default_chunk_size(),
            chunk_stride: default_chunk_stride(),
        }
    }
}

/// LDA hyperparameters. Field names and defaults are part of the caller
/// contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LdaSection {
    /// Document-topic prior
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Topic-term prior
    #[serde(default = "default_eta")]
    pub eta: f64,

    /// Documents per sweep batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Full passes over the corpus
    #[serde(default = "default_passes")]
    pub passes: usize,

    /// RNG seed for reproducible runs
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for LdaSection {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            eta: default_eta(),
            batch_size: default_batch_size(),
            passes: default_passes(),
            seed: default_seed(),
        }
    }
}

/// Manifest loaded from books.toml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// Books to ingest
    #[serde(default, rename = "book")]
    pub books: Vec<BookEntry>,

    /// Group whose corpus feeds the topic model; defaults to the first group
    #[serde(default)]
    pub model_group: Option<String>,

    #[serde(default)]
    pub prepare: PrepareSection,

    #[serde(default)]
    pub lda: LdaSection,
}

fn default_group() -> String {
    "all".to_string()
}

fn default_allowed_pos() -> Option<Vec<PosTag>> {
    Some(vec![PosTag::Verb, PosTag::Noun, PosTag::Adj])
}

fn default_extra_stopwords() -> Vec<String> {
    // high-frequency verbs and artifacts that survive lemma filtering
    ["--", "sollen", "sagen", "gehen", "wohl", "kommen", "sehen", "tun", "lassen", "ab", "wer"]
        .iter()
        .map(|w| (*w).to_string())
        .collect()
}

fn default_chunk_size() -> Option<usize> {
    Some(20)
}

fn default_chunk_stride() -> Option<usize> {
    Some(3)
}

fn default_alpha() -> f64 {
    0.01
}

fn default_eta() -> f64 {
    0.9
}

fn default_batch_size() -> usize {
    100
}

fn default_passes() -> usize {
    4
}

fn default_seed() -> u64 {
    42
}

impl RunManifest {
    /// Load a manifest from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {:?}", path))?;
        let manifest: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
        Ok(manifest)
    }

    /// Save the manifest to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Group names in first-seen order.
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for book in &self.books {
            if !groups.contains(&book.group.as_str()) {
                groups.push(&book.group);
            }
        }
        groups
    }

    /// Books belonging to `group`, in manifest order.
    pub fn books_in_group<'a, 'b>(&'a self, group: &'b str) -> impl Iterator<Item = &'a BookEntry> + use<'a, 'b> {
        self.books.iter().filter(move |b| b.group == group)
    }

    /// The group whose corpus feeds the topic model.
    pub fn modeling_group(&self) -> Option<&str> {
        self.model_group
            .as_deref()
            .or_else(|| self.groups().first().copied())
    }

    /// Check the manifest for problems a run would only hit later.
    pub fn validate(&self) -> Result<()> {
        if self.books.is_empty() {
            anyhow::bail!("Manifest lists no books");
        }

        let mut seen = std::collections::HashSet::new();
        for book in &self.books {
            if !seen.insert(&book.key) {
                anyhow::bail!("Duplicate book key '{}'", book.key);
            }
        }

        if let Some(group) = &self.model_group {
            if !self.groups().contains(&group.as_str()) {
                anyhow::bail!("Model group '{}' has no books", group);
            }
        }

        match (self.prepare.chunk_size, self.prepare.chunk_stride) {
            (Some(0), _) => anyhow::bail!("chunk_size must be positive"),
            (_, Some(0)) => anyhow::bail!("chunk_stride must be positive"),
            (Some(_), None) | (None, Some(_)) => {
                anyhow::bail!("chunk_size and chunk_stride must be set together")
            }
            _ => {}
        }

        Ok(())
    }
}
