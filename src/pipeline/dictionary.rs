//! Term dictionary and bag-of-words vectorization
//!
//! Maps lemmas to stable integer ids in first-seen order and converts
//! lemma sequences into sparse (id, count) documents.

use std::collections::{BTreeMap, HashMap};

/// Sparse bag-of-words document: (term id, count) pairs in ascending id
/// order.
pub type BowDocument = Vec<(u32, u32)>;

/// Bidirectional lemma ⇄ id mapping, append-only for the duration of a
/// pipeline run.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    id_by_lemma: HashMap<String, u32>,
    lemma_by_id: Vec<String>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dictionary over all documents, assigning each distinct
    /// lemma an id in first-seen order.
    pub fn from_documents<'a, I, D>(documents: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: IntoIterator<Item = &'a String>,
    {
        let mut dict = Self::new();
        for doc in documents {
            for lemma in doc {
                dict.add(lemma);
            }
        }
        dict
    }

    /// Return the id for `lemma`, assigning the next free id if unseen.
    pub fn add(&mut self, lemma: &str) -> u32 {
        if let Some(&id) = self.id_by_lemma.get(lemma) {
            return id;
        }
        let id = self.lemma_by_id.len() as u32;
        self.id_by_lemma.insert(lemma.to_string(), id);
        self.lemma_by_id.push(lemma.to_string());
        id
    }

    pub fn id(&self, lemma: &str) -> Option<u32> {
        self.id_by_lemma.get(lemma).copied()
    }

    pub fn lemma(&self, id: u32) -> Option<&str> {
        self.lemma_by_id.get(id as usize).map(|s| s.as_str())
    }

    /// Lemmas in id order.
    pub fn lemmas(&self) -> impl Iterator<Item = &str> {
        self.lemma_by_id.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.lemma_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lemma_by_id.is_empty()
    }

    /// Convert a lemma sequence to a sparse (id, count) document. Lemmas
    /// missing from the dictionary are skipped.
    pub fn doc2bow(&self, lemmas: &[String]) -> BowDocument {
        let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
        for lemma in lemmas {
            if let Some(id) = self.id(lemma) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        counts.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn ids_follow_first_seen_order() {
        let docs = vec![seq(&["hund", "laufen", "hund"]), seq(&["katze", "laufen"])];
        let dict = Dictionary::from_documents(docs.iter());

        assert_eq!(dict.len(), 3);
        assert_eq!(dict.id("hund"), Some(0));
        assert_eq!(dict.id("laufen"), Some(1));
        assert_eq!(dict.id("katze"), Some(2));
        assert_eq!(dict.lemma(2), Some("katze"));
    }

    #[test]
    fn rebuilding_from_same_input_is_identical() {
        let docs = vec![seq(&["a", "b", "c", "b"]), seq(&["d", "a"])];
        let first = Dictionary::from_documents(docs.iter());
        let second = Dictionary::from_documents(docs.iter());

        assert_eq!(first.len(), second.len());
        for lemma in first.lemmas() {
            assert_eq!(first.id(lemma), second.id(lemma));
        }
    }

    #[test]
    fn doc2bow_counts_and_orders_by_id() {
        let docs = vec![seq(&["hund", "laufen", "katze"])];
        let dict = Dictionary::from_documents(docs.iter());

        let bow = dict.doc2bow(&seq(&["katze", "hund", "katze", "unbekannt"]));
        assert_eq!(bow, vec![(0, 1), (2, 2)]);
    }

    #[test]
    fn empty_document_yields_empty_bow() {
        let dict = Dictionary::from_documents(vec![seq(&["a"])].iter());
        assert!(dict.doc2bow(&[]).is_empty());
    }
}
