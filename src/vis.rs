//! Topic visualization export
//!
//! Builds a serializable summary of a fitted model, persists it once to a
//! binary cache file, reloads it from that cache, and renders a
//! self-contained interactive HTML report. The save-then-reload step is
//! kept because visualization generation may run as a separate later step
//! from a cached artifact.

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::lda::LdaModel;
use crate::pipeline::{BowDocument, Dictionary};

/// Terms shown per topic in the report.
const TOP_TERMS: usize = 20;

/// One term of a topic with its in-topic weight and corpus frequency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermWeight {
    pub term: String,
    pub weight: f64,
    pub corpus_frequency: u32,
}

/// One topic of the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSummary {
    pub id: usize,
    /// Share of corpus tokens attributed to this topic
    pub proportion: f64,
    /// Top terms, descending by weight
    pub terms: Vec<TermWeight>,
}

/// The cached visualization artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreparedVis {
    pub label: String,
    pub num_topics: usize,
    /// Topics sorted by corpus share, descending
    pub topics: Vec<TopicSummary>,
    /// Per-document topic distributions of the training corpus
    pub doc_topics: Vec<Vec<f64>>,
}

/// Summarize a fitted model for visualization.
pub fn prepare_vis(
    label: &str,
    model: &LdaModel,
    corpus: &[BowDocument],
    dictionary: &Dictionary,
) -> PreparedVis {
    let doc_lengths: Vec<f64> = corpus
        .iter()
        .map(|bow| bow.iter().map(|&(_, c)| c as f64).sum())
        .collect();
    let total_tokens: f64 = doc_lengths.iter().sum();

    let mut term_frequencies = vec![0u32; dictionary.len()];
    for bow in corpus {
        for &(id, count) in bow {
            term_frequencies[id as usize] += count;
        }
    }

    let doc_topics: Vec<Vec<f64>> = (0..corpus.len()).map(|d| model.doc_topic_dist(d)).collect();

    // corpus share per topic: token-weighted average of document shares
    let mut proportions = vec![0.0f64; model.num_topics()];
    for (dist, len) in doc_topics.iter().zip(&doc_lengths) {
        for (topic, p) in dist.iter().enumerate() {
            proportions[topic] += p * len;
        }
    }
    if total_tokens > 0.0 {
        for p in &mut proportions {
            *p /= total_tokens;
        }
    }

    let top_terms = model.top_terms(dictionary, TOP_TERMS);
    let mut topics: Vec<TopicSummary> = top_terms
        .into_iter()
        .enumerate()
        .map(|(id, terms)| TopicSummary {
            id,
            proportion: proportions[id],
            terms: terms
                .into_iter()
                .map(|(term, weight)| {
                    let corpus_frequency = dictionary
                        .id(&term)
                        .map(|i| term_frequencies[i as usize])
                        .unwrap_or(0);
                    TermWeight {
                        term,
                        weight,
                        corpus_frequency,
                    }
                })
                .collect(),
        })
        .collect();
    topics.sort_by(|a, b| {
        b.proportion
            .partial_cmp(&a.proportion)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    PreparedVis {
        label: label.to_string(),
        num_topics: model.num_topics(),
        topics,
        doc_topics,
    }
}

/// Persist the artifact to its cache file. The write goes through a
/// temporary file in the same directory so a crashed run never leaves a
/// torn cache.
pub fn save_cache(vis: &PreparedVis, path: &Path) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary cache file in {:?}", dir))?;
    {
        let mut writer = BufWriter::new(&mut tmp);
        bincode::serialize_into(&mut writer, vis)
            .with_context(|| format!("Failed to serialize visualization cache {:?}", path))?;
        writer.flush()?;
    }
    tmp.persist(path)
        .with_context(|| format!("Failed to write visualization cache {:?}", path))?;
    Ok(())
}

/// Reload a cached artifact.
pub fn load_cache(path: &Path) -> Result<PreparedVis> {
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open visualization cache {:?}", path))?;
    let vis = bincode::deserialize_from(BufReader::new(file))
        .with_context(|| format!("Failed to read visualization cache {:?}", path))?;
    Ok(vis)
}

/// Render the artifact as a self-contained HTML page.
pub fn render_html(vis: &PreparedVis) -> Result<String> {
    let data = serde_json::to_string(vis)?;
    Ok(format!(
        r##"<!DOCTYPE html>
<html lang="de">
<head>
<meta charset="utf-8">
<title>Topics: {label} (k={k})</title>
<style>
  body {{ font-family: sans-serif; margin: 2rem; }}
  nav button {{ margin: 0 0.25rem 0.5rem 0; padding: 0.3rem 0.8rem; }}
  nav button.active {{ font-weight: bold; }}
  .bar {{ background: #4878a8; height: 0.9rem; display: inline-block; }}
  td {{ padding: 0.1rem 0.6rem 0.1rem 0; font-size: 0.9rem; }}
</style>
</head>
<body>
<h1>Topics: {label} (k={k})</h1>
<nav id="nav"></nav>
<table id="terms"></table>
<script>
const DATA = {data};
function show(i) {{
  const topic = DATA.topics[i];
  const max = Math.max(...topic.terms.map(t => t.weight));
  document.getElementById("terms").innerHTML =
    "<tr><th>Term</th><th>Weight</th><th></th><th>Frequency</th></tr>" +
    topic.terms.map(t =>
      "<tr><td>" + t.term + "</td><td>" + t.weight.toFixed(4) +
      "</td><td><span class='bar' style='width:" + (120 * t.weight / max) +
      "px'></span></td><td>" + t.corpus_frequency + "</td></tr>"
    ).join("");
  document.querySelectorAll("#nav button").forEach((b, j) =>
    b.classList.toggle("active", i === j));
}}
document.getElementById("nav").innerHTML = DATA.topics.map((t, i) =>
  "<button onclick='show(" + i + ")'>Topic " + t.id +
  " (" + (100 * t.proportion).toFixed(1) + "%)</button>"
).join("");
show(0);
</script>
</body>
</html>
"##,
        label = vis.label,
        k = vis.num_topics,
        data = data,
    ))
}

/// Full export flow: build the artifact, cache it under
/// `<out_dir>/<label>_<k>`, reload it from the cache, and write the HTML
/// report `<out_dir>/<label><k>.html`. Returns the report path.
pub fn export_visualization(
    label: &str,
    k: usize,
    model: &LdaModel,
    corpus: &[BowDocument],
    dictionary: &Dictionary,
    out_dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {:?}", out_dir))?;

    let cache_path = out_dir.join(format!("{label}_{k}"));
    let vis = prepare_vis(label, model, corpus, dictionary);
    save_cache(&vis, &cache_path)?;

    // regenerate from the cache so separate-step deployments share the code path
    let vis = load_cache(&cache_path)?;

    let html_path = out_dir.join(format!("{label}{k}.html"));
    fs::write(&html_path, render_html(&vis)?)
        .with_context(|| format!("Failed to write report {:?}", html_path))?;
    info!(?html_path, "wrote topic report");

    Ok(html_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lda::{train, LdaParams};

    fn fitted() -> (Dictionary, Vec<BowDocument>, LdaModel) {
        let docs: Vec<Vec<String>> = vec![
            vec!["hund".into(), "laufen".into(), "hund".into()],
            vec!["katze".into(), "schlafen".into()],
        ];
        let dictionary = Dictionary::from_documents(docs.iter());
        let corpus: Vec<BowDocument> = docs.iter().map(|d| dictionary.doc2bow(d)).collect();
        let (model, _) = train(&dictionary, &corpus, &LdaParams::new(2)).unwrap();
        (dictionary, corpus, model)
    }

    #[test]
    fn cache_round_trips() {
        let (dictionary, corpus, model) = fitted();
        let vis = prepare_vis("wk", &model, &corpus, &dictionary);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wk_2");
        save_cache(&vis, &path).unwrap();
        let reloaded = load_cache(&path).unwrap();

        assert_eq!(reloaded.label, "wk");
        assert_eq!(reloaded.num_topics, 2);
        assert_eq!(reloaded.topics.len(), vis.topics.len());
        assert_eq!(reloaded.doc_topics, vis.doc_topics);
    }

    #[test]
    fn topic_proportions_cover_the_corpus() {
        let (dictionary, corpus, model) = fitted();
        let vis = prepare_vis("wk", &model, &corpus, &dictionary);

        let sum: f64 = vis.topics.iter().map(|t| t.proportion).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        // sorted descending by corpus share
        assert!(vis
            .topics
            .windows(2)
            .all(|w| w[0].proportion >= w[1].proportion));
    }

    #[test]
    fn export_writes_cache_and_report() {
        let (dictionary, corpus, model) = fitted();
        let dir = tempfile::tempdir().unwrap();

        let html_path =
            export_visualization("wk", 2, &model, &corpus, &dictionary, dir.path()).unwrap();

        assert!(dir.path().join("wk_2").exists());
        assert_eq!(html_path, dir.path().join("wk2.html"));
        let html = fs::read_to_string(&html_path).unwrap();
        assert!(html.contains("Topics: wk"));
        assert!(html.contains("hund"));
    }
}
