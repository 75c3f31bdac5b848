//! Corpus preparation for topic modeling
//!
//! Turns raw texts into a term dictionary and a bag-of-words corpus:
//! annotate, filter (punctuation, whitespace, stopwords, optional POS
//! whitelist), optionally chunk into overlapping lemma windows, then
//! vectorize. The annotated documents are returned alongside the corpus
//! so the statistics code can reuse them without a second annotation
//! pass.

pub mod dictionary;

#[cfg(test)]
mod pipeline_tests;

pub use dictionary::{BowDocument, Dictionary};

use anyhow::Result;

use crate::annotate::{AnnotatedDoc, Annotator, PosTag, StopwordFilter};

/// Overlapping window parameters for chunking filtered lemma sequences.
///
/// Stride < size yields overlap. The default run configuration (size 20,
/// stride 3) deliberately multiplies the number of model documents when
/// the raw document count is very small.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunking {
    pub size: usize,
    pub stride: usize,
}

impl Chunking {
    /// Create chunking parameters; size and stride are clamped to at
    /// least 1.
    pub fn new(size: usize, stride: usize) -> Self {
        Self {
            size: size.max(1),
            stride: stride.max(1),
        }
    }
}

/// Token filtering and chunking options for [`prepare`].
#[derive(Debug, Clone, Default)]
pub struct PrepareConfig {
    /// Lemmas to drop
    pub stopwords: StopwordFilter,

    /// Coarse tags to keep; `None` keeps all
    pub allowed_pos: Option<Vec<PosTag>>,

    /// Window parameters; `None` keeps one sequence per document
    pub chunking: Option<Chunking>,
}

impl PrepareConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stopwords(mut self, stopwords: StopwordFilter) -> Self {
        self.stopwords = stopwords;
        self
    }

    pub fn with_allowed_pos(mut self, tags: Vec<PosTag>) -> Self {
        self.allowed_pos = Some(tags);
        self
    }

    pub fn with_chunking(mut self, size: usize, stride: usize) -> Self {
        self.chunking = Some(Chunking::new(size, stride));
        self
    }
}

/// Everything [`prepare`] produces for one modeling run.
#[derive(Debug, Clone)]
pub struct Prepared {
    /// Term dictionary over all model documents
    pub dictionary: Dictionary,

    /// One bag-of-words document per input document, or per chunk when
    /// chunking is enabled
    pub corpus: Vec<BowDocument>,

    /// Annotated input documents, pre-filtering, in input order
    pub tagged_docs: Vec<AnnotatedDoc>,
}

/// Prepare raw texts for topic modeling.
///
/// Annotator and trainer failures propagate unmodified; there are no
/// retries. Empty input yields empty output structures.
pub fn prepare(
    documents: &[&str],
    annotator: &dyn Annotator,
    config: &PrepareConfig,
) -> Result<Prepared> {
    let mut tagged_docs = Vec::with_capacity(documents.len());
    for text in documents {
        tagged_docs.push(annotator.annotate(text)?);
    }

    let mut sequences: Vec<Vec<String>> = Vec::new();
    for doc in &tagged_docs {
        let lemmas = filter_lemmas(doc, config);
        match config.chunking {
            Some(chunking) => sequences.extend(chunk_lemmas(&lemmas, chunking)),
            None => sequences.push(lemmas),
        }
    }

    let dictionary = Dictionary::from_documents(sequences.iter());
    let corpus = sequences.iter().map(|s| dictionary.doc2bow(s)).collect();

    Ok(Prepared {
        dictionary,
        corpus,
        tagged_docs,
    })
}

/// Extract the filtered lemma sequence of one document: no punctuation,
/// no whitespace-only tokens, no stopword lemmas, and only allowed tags
/// when a whitelist is set.
pub fn filter_lemmas(doc: &AnnotatedDoc, config: &PrepareConfig) -> Vec<String> {
    doc.tokens()
        .filter(|t| !t.is_punct_or_space())
        .filter(|t| !config.stopwords.contains(&t.lemma))
        .filter(|t| match &config.allowed_pos {
            Some(tags) => tags.contains(&t.pos),
            None => true,
        })
        .map(|t| t.lemma.clone())
        .collect()
}

/// Split a lemma sequence into windows of `size` lemmas advancing by
/// `stride`. Produces ceil(len / stride) windows; the final windows may
/// be shorter. Window contents keep the original order.
pub fn chunk_lemmas(lemmas: &[String], chunking: Chunking) -> Vec<Vec<String>> {
    (0..lemmas.len())
        .step_by(chunking.stride)
        .map(|start| {
            let end = (start + chunking.size).min(lemmas.len());
            lemmas[start..end].to_vec()
        })
        .collect()
}
