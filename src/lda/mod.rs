//! Latent Dirichlet Allocation trainer
//!
//! Collapsed Gibbs sampler over bag-of-words corpora. Parameter names
//! and defaults (`alpha`, `eta`, `batch_size`, `passes`) are part of the
//! caller contract; `batch_size` controls how the document sweep is
//! batched and reported.

use anyhow::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::pipeline::{BowDocument, Dictionary};

/// Topics below this proportion are omitted from the sparse per-document
/// view.
const MIN_TOPIC_PROB: f64 = 0.001;

/// Training hyperparameters.
#[derive(Debug, Clone, Copy)]
pub struct LdaParams {
    /// Number of latent topics
    pub num_topics: usize,
    /// Document-topic prior
    pub alpha: f64,
    /// Topic-term prior
    pub eta: f64,
    /// Documents per sweep batch
    pub batch_size: usize,
    /// Full passes over the corpus
    pub passes: usize,
    /// RNG seed
    pub seed: u64,
}

impl LdaParams {
    /// Defaults for everything but the topic count.
    pub fn new(num_topics: usize) -> Self {
        Self {
            num_topics,
            alpha: 0.01,
            eta: 0.9,
            batch_size: 100,
            passes: 4,
            seed: 42,
        }
    }
}

/// Fitted topic model: smoothed count tables from the final sampler
/// state.
#[derive(Debug, Clone)]
pub struct LdaModel {
    num_topics: usize,
    vocab_size: usize,
    alpha: f64,
    eta: f64,
    /// topic x term counts
    topic_term: Vec<Vec<u32>>,
    /// per-topic totals
    topic_totals: Vec<u32>,
    /// document x topic counts
    doc_topic: Vec<Vec<u32>>,
}

/// Per-document topic proportions, sparse: (topic, proportion) pairs
/// above [`MIN_TOPIC_PROB`], descending by proportion.
pub type DocTopics = Vec<Vec<(usize, f64)>>;

impl LdaModel {
    pub fn num_topics(&self) -> usize {
        self.num_topics
    }

    /// Smoothed term distribution of one topic; sums to 1.
    pub fn topic_term_dist(&self, topic: usize) -> Vec<f64> {
        let denom = self.topic_totals[topic] as f64 + self.vocab_size as f64 * self.eta;
        self.topic_term[topic]
            .iter()
            .map(|&c| (c as f64 + self.eta) / denom)
            .collect()
    }

    /// Smoothed topic distribution of one training document; sums to 1.
    pub fn doc_topic_dist(&self, doc: usize) -> Vec<f64> {
        let total: u32 = self.doc_topic[doc].iter().sum();
        let denom = total as f64 + self.num_topics as f64 * self.alpha;
        self.doc_topic[doc]
            .iter()
            .map(|&c| (c as f64 + self.alpha) / denom)
            .collect()
    }

    /// Top `n` terms per topic with their probabilities, descending.
    pub fn top_terms(&self, dictionary: &Dictionary, n: usize) -> Vec<Vec<(String, f64)>> {
        (0..self.num_topics)
            .map(|topic| {
                let dist = self.topic_term_dist(topic);
                let mut terms: Vec<(String, f64)> = dist
                    .iter()
                    .enumerate()
                    .filter_map(|(id, &p)| {
                        dictionary.lemma(id as u32).map(|l| (l.to_string(), p))
                    })
                    .collect();
                terms.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
                terms.truncate(n);
                terms
            })
            .collect()
    }

    /// Sparse per-document topic view over the training corpus.
    fn doc_topics(&self) -> DocTopics {
        (0..self.doc_topic.len())
            .map(|d| {
                let mut topics: Vec<(usize, f64)> = self
                    .doc_topic_dist(d)
                    .into_iter()
                    .enumerate()
                    .filter(|(_, p)| *p >= MIN_TOPIC_PROB)
                    .collect();
                topics.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
                topics
            })
            .collect()
    }
}

/// Train an LDA model over a bag-of-words corpus.
///
/// Returns the fitted model plus the per-document topic-assignment view.
pub fn train(
    dictionary: &Dictionary,
    corpus: &[BowDocument],
    params: &LdaParams,
) -> Result<(LdaModel, DocTopics)> {
    if params.num_topics == 0 {
        anyhow::bail!("LDA needs at least one topic");
    }
    if dictionary.is_empty() || corpus.is_empty() {
        anyhow::bail!("Cannot train a topic model on an empty corpus");
    }

    let k = params.num_topics;
    let vocab = dictionary.len();
    let batch_size = params.batch_size.max(1);
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);

    // expand sparse documents into token instances
    let docs: Vec<Vec<usize>> = corpus
        .iter()
        .map(|bow| {
            bow.iter()
                .flat_map(|&(id, count)| std::iter::repeat(id as usize).take(count as usize))
                .collect()
        })
        .collect();

    let mut topic_term = vec![vec![0u32; vocab]; k];
    let mut topic_totals = vec![0u32; k];
    let mut doc_topic = vec![Vec::new(); docs.len()];
    let mut assignments: Vec<Vec<usize>> = Vec::with_capacity(docs.len());

    // random initialization
    for (d, doc) in docs.iter().enumerate() {
        doc_topic[d] = vec![0u32; k];
        let mut z = Vec::with_capacity(doc.len());
        for &w in doc {
            let topic = rng.gen_range(0..k);
            topic_term[topic][w] += 1;
            topic_totals[topic] += 1;
            doc_topic[d][topic] += 1;
            z.push(topic);
        }
        assignments.push(z);
    }

    let eta_sum = vocab as f64 * params.eta;
    let mut weights = vec![0.0f64; k];

    for pass in 0..params.passes {
        for (batch_idx, batch) in (0..docs.len()).collect::<Vec<_>>().chunks(batch_size).enumerate() {
            for &d in batch {
                for (i, &w) in docs[d].iter().enumerate() {
                    let old = assignments[d][i];
                    topic_term[old][w] -= 1;
                    topic_totals[old] -= 1;
                    doc_topic[d][old] -= 1;

                    let mut total = 0.0;
                    for t in 0..k {
                        let p = (doc_topic[d][t] as f64 + params.alpha)
                            * (topic_term[t][w] as f64 + params.eta)
                            / (topic_totals[t] as f64 + eta_sum);
                        total += p;
                        weights[t] = total;
                    }

                    let draw = rng.gen::<f64>() * total;
                    let new = weights.iter().position(|&cum| draw < cum).unwrap_or(k - 1);

                    topic_term[new][w] += 1;
                    topic_totals[new] += 1;
                    doc_topic[d][new] += 1;
                    assignments[d][i] = new;
                }
            }
            debug!(pass, batch = batch_idx, "sampled batch");
        }
    }

    let model = LdaModel {
        num_topics: k,
        vocab_size: vocab,
        alpha: params.alpha,
        eta: params.eta,
        topic_term,
        topic_totals,
        doc_topic,
    };
    let doc_topics = model.doc_topics();

    Ok((model, doc_topics))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_corpus() -> (Dictionary, Vec<BowDocument>) {
        let docs: Vec<Vec<String>> = vec![
            ["hund", "laufen", "hund", "bellen"],
            ["katze", "schlafen", "katze", "ofen"],
            ["hund", "bellen", "laufen", "hund"],
            ["katze", "ofen", "schlafen", "katze"],
        ]
        .into_iter()
        .map(|words| words.into_iter().map(String::from).collect())
        .collect();

        let dictionary = Dictionary::from_documents(docs.iter());
        let corpus = docs.iter().map(|d| dictionary.doc2bow(d)).collect();
        (dictionary, corpus)
    }

    #[test]
    fn rejects_zero_topics_and_empty_corpus() {
        let (dictionary, corpus) = toy_corpus();
        assert!(train(&dictionary, &corpus, &LdaParams::new(0)).is_err());
        assert!(train(&Dictionary::new(), &[], &LdaParams::new(2)).is_err());
    }

    #[test]
    fn distributions_are_normalized() {
        let (dictionary, corpus) = toy_corpus();
        let (model, doc_topics) = train(&dictionary, &corpus, &LdaParams::new(2)).unwrap();

        for topic in 0..model.num_topics() {
            let sum: f64 = model.topic_term_dist(topic).iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
        for d in 0..corpus.len() {
            let sum: f64 = model.doc_topic_dist(d).iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
        assert_eq!(doc_topics.len(), corpus.len());
    }

    #[test]
    fn same_seed_reproduces_the_model() {
        let (dictionary, corpus) = toy_corpus();
        let params = LdaParams::new(2);

        let (first, _) = train(&dictionary, &corpus, &params).unwrap();
        let (second, _) = train(&dictionary, &corpus, &params).unwrap();

        assert_eq!(
            first.top_terms(&dictionary, 4),
            second.top_terms(&dictionary, 4)
        );
    }

    #[test]
    fn top_terms_are_sorted_and_truncated() {
        let (dictionary, corpus) = toy_corpus();
        let (model, _) = train(&dictionary, &corpus, &LdaParams::new(2)).unwrap();

        let topics = model.top_terms(&dictionary, 3);
        assert_eq!(topics.len(), 2);
        for terms in topics {
            assert_eq!(terms.len(), 3);
            assert!(terms.windows(2).all(|w| w[0].1 >= w[1].1));
        }
    }
}
