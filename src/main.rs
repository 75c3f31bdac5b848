//! Stylometric analysis CLI
//!
//! Loads German literary texts, cleans play-formatting artifacts, trains
//! LDA topic models over lemmatized content words, and renders POS and
//! sentence/word-length statistics as bar charts.
//!
//! ## Quick Start
//!
//! ```bash
//! # Full pipeline: topic models for k = 5..6 plus statistics charts
//! ./stylolab run --books books.toml --tokenizer de_tokenizer.bin --out results
//!
//! # Statistics and charts only
//! ./stylolab stats --books books.toml --tokenizer de_tokenizer.bin --out results
//!
//! # Check the manifest without running anything
//! ./stylolab validate --books books.toml
//! ```
//!
//! Books are configured in `books.toml`; see `RunManifest` for the
//! schema. The tokenizer binary is nlprule's `de_tokenizer.bin`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use stylolab::annotate::{Annotator, NlpruleAnnotator, StopwordFilter};
use stylolab::config::RunManifest;
use stylolab::corpus::CorpusStore;
use stylolab::lda::{train, LdaParams};
use stylolab::pipeline::{prepare, Prepared, PrepareConfig};
use stylolab::plot::{
    plot_pos_distribution, plot_text_statistics, pos_series, POS_PANEL_1, POS_PANEL_2,
};
use stylolab::stats::{pos_distribution, text_statistics, TextStatistics};
use stylolab::vis::export_visualization;

#[derive(Parser)]
#[command(name = "stylolab")]
#[command(about = "Stylometric and topic analysis for German literary texts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: topic models, statistics and charts
    Run {
        /// Path to the books.toml manifest
        #[arg(short, long, default_value = "books.toml")]
        books: PathBuf,

        /// Path to the nlprule German tokenizer binary
        #[arg(short, long, default_value = "de_tokenizer.bin")]
        tokenizer: PathBuf,

        /// Output directory for charts, reports and the run summary
        #[arg(short, long, default_value = "results")]
        out: PathBuf,

        /// Smallest topic count to train
        #[arg(long, default_value = "5")]
        min_topics: usize,

        /// Largest topic count to train
        #[arg(long, default_value = "6")]
        max_topics: usize,

        /// Words printed per topic
        #[arg(long, default_value = "20")]
        num_words: usize,
    },

    /// Train and visualize topic models only
    Topics {
        /// Path to the books.toml manifest
        #[arg(short, long, default_value = "books.toml")]
        books: PathBuf,

        /// Path to the nlprule German tokenizer binary
        #[arg(short, long, default_value = "de_tokenizer.bin")]
        tokenizer: PathBuf,

        /// Output directory for visualization reports
        #[arg(short, long, default_value = "results")]
        out: PathBuf,

        /// Smallest topic count to train
        #[arg(long, default_value = "5")]
        min_topics: usize,

        /// Largest topic count to train
        #[arg(long, default_value = "6")]
        max_topics: usize,

        /// Words printed per topic
        #[arg(long, default_value = "20")]
        num_words: usize,
    },

    /// Compute statistics and render charts only
    Stats {
        /// Path to the books.toml manifest
        #[arg(short, long, default_value = "books.toml")]
        books: PathBuf,

        /// Path to the nlprule German tokenizer binary
        #[arg(short, long, default_value = "de_tokenizer.bin")]
        tokenizer: PathBuf,

        /// Output directory for charts
        #[arg(short, long, default_value = "results")]
        out: PathBuf,
    },

    /// Check a manifest without running anything
    Validate {
        /// Path to the books.toml manifest
        #[arg(short, long, default_value = "books.toml")]
        books: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            books,
            tokenizer,
            out,
            min_topics,
            max_topics,
            num_words,
        } => {
            let manifest = load_manifest(&books)?;
            let annotator = NlpruleAnnotator::from_path(&tokenizer)?;
            let stores = build_stores(&manifest)?;
            let topic_runs = run_topics(
                &manifest, &stores, &annotator, &out, min_topics, max_topics, num_words,
            )?;
            let book_stats = run_stats(&stores, &annotator, &out)?;
            write_summary(&out, &manifest, min_topics, max_topics, topic_runs, book_stats)?;
        }

        Commands::Topics {
            books,
            tokenizer,
            out,
            min_topics,
            max_topics,
            num_words,
        } => {
            let manifest = load_manifest(&books)?;
            let annotator = NlpruleAnnotator::from_path(&tokenizer)?;
            let stores = build_stores(&manifest)?;
            run_topics(&manifest, &stores, &annotator, &out, min_topics, max_topics, num_words)?;
        }

        Commands::Stats {
            books,
            tokenizer,
            out,
        } => {
            let manifest = load_manifest(&books)?;
            let annotator = NlpruleAnnotator::from_path(&tokenizer)?;
            let stores = build_stores(&manifest)?;
            run_stats(&stores, &annotator, &out)?;
        }

        Commands::Validate { books } => {
            validate_manifest(&books)?;
        }
    }

    Ok(())
}

fn load_manifest(path: &Path) -> Result<RunManifest> {
    eprintln!("Loading manifest from {:?}...", path);
    let manifest = RunManifest::load(path)?;
    manifest.validate()?;
    eprintln!(
        "  {} books in {} groups",
        manifest.books.len(),
        manifest.groups().len()
    );
    Ok(manifest)
}

/// Ingest all books, grouped as the manifest specifies, and strip the
/// tagged speaker markup from every play.
fn build_stores(manifest: &RunManifest) -> Result<Vec<(String, CorpusStore)>> {
    let mut stores = Vec::new();

    for group in manifest.groups() {
        let mut store = CorpusStore::new();
        for book in manifest.books_in_group(group) {
            eprintln!("  Adding '{}' from {:?}", book.key, book.path);
            store.add(&book.path, &book.key, book.is_play)?;
        }
        store.remove_speaker_markup();
        stores.push((group.to_string(), store));
    }

    Ok(stores)
}

/// One trained topic count for the run summary.
#[derive(serde::Serialize)]
struct TopicRun {
    num_topics: usize,
    topics: Vec<Vec<(String, f64)>>,
}

fn run_topics(
    manifest: &RunManifest,
    stores: &[(String, CorpusStore)],
    annotator: &dyn Annotator,
    out: &Path,
    min_topics: usize,
    max_topics: usize,
    num_words: usize,
) -> Result<Vec<TopicRun>> {
    let group = manifest
        .modeling_group()
        .ok_or_else(|| anyhow::anyhow!("Manifest lists no books"))?;
    let store = &stores
        .iter()
        .find(|(name, _)| name == group)
        .ok_or_else(|| anyhow::anyhow!("No corpus store for group '{}'", group))?
        .1;

    let mut stopwords = StopwordFilter::german();
    stopwords.extend(manifest.prepare.extra_stopwords.iter().cloned());

    let mut config = PrepareConfig::new().with_stopwords(stopwords);
    if let Some(tags) = &manifest.prepare.allowed_pos {
        config = config.with_allowed_pos(tags.clone());
    }
    if let (Some(size), Some(stride)) = (manifest.prepare.chunk_size, manifest.prepare.chunk_stride)
    {
        config = config.with_chunking(size, stride);
    }

    eprintln!("\nPreparing corpus for group '{}'...", group);
    let texts = store.export_texts();
    let Prepared {
        dictionary,
        corpus,
        tagged_docs: _,
    } = prepare(&texts, annotator, &config)?;
    eprintln!(
        "  {} model documents, {} dictionary entries",
        corpus.len(),
        dictionary.len()
    );

    let mut runs = Vec::new();
    for k in min_topics..=max_topics {
        eprintln!("\nTraining LDA with k = {k}...");
        let params = LdaParams {
            num_topics: k,
            alpha: manifest.lda.alpha,
            eta: manifest.lda.eta,
            batch_size: manifest.lda.batch_size,
            passes: manifest.lda.passes,
            seed: manifest.lda.seed,
        };
        let (model, doc_topics) = train(&dictionary, &corpus, &params)?;
        tracing::info!(k, docs = doc_topics.len(), "trained topic model");

        let topics = model.top_terms(&dictionary, num_words);
        println!("\nTopics for k = {k}");
        println!("{}", "─".repeat(72));
        for (topic, terms) in topics.iter().enumerate() {
            let words: Vec<&str> = terms.iter().map(|(w, _)| w.as_str()).collect();
            println!("{:>3}  {}", topic, words.join(" "));
        }

        export_visualization(group, k, &model, &corpus, &dictionary, out)?;

        runs.push(TopicRun {
            num_topics: k,
            topics,
        });
    }

    Ok(runs)
}

/// Per-book distribution and length statistics for the run summary.
#[derive(serde::Serialize)]
struct BookStats {
    key: String,
    pos_percentages: BTreeMap<String, f64>,
    statistics: TextStatistics,
}

fn run_stats(
    stores: &[(String, CorpusStore)],
    annotator: &dyn Annotator,
    out: &Path,
) -> Result<Vec<BookStats>> {
    std::fs::create_dir_all(out)?;

    let mut distributions = Vec::new();
    let mut length_stats = Vec::new();
    let mut book_stats = Vec::new();

    for (group, store) in stores {
        eprintln!("\nComputing statistics for group '{}'...", group);
        for book in store.books() {
            let doc = annotator.annotate(&book.text)?;
            let dist = pos_distribution(&doc)?;
            let stats = text_statistics(&doc)?;
            eprintln!(
                "  {:6} {:6} tokens  avg word {:5.2}  avg sentence {:6.2} words",
                book.key,
                doc.token_count(),
                stats.avg_word_len,
                stats.avg_sentence_words
            );

            book_stats.push(BookStats {
                key: book.key.clone(),
                pos_percentages: dist
                    .iter()
                    .map(|(tag, share)| (tag.to_string(), *share))
                    .collect(),
                statistics: stats,
            });
            distributions.push((book.key.clone(), dist));
            length_stats.push((book.key.clone(), stats));
        }
    }

    let panel_1 = pos_series(&distributions, &POS_PANEL_1);
    let panel_2 = pos_series(&distributions, &POS_PANEL_2);
    plot_pos_distribution(&out.join("pos_dist_1.png"), &POS_PANEL_1, &panel_1)?;
    plot_pos_distribution(&out.join("pos_dist_2.png"), &POS_PANEL_2, &panel_2)?;
    plot_text_statistics(&out.join("text_stats.png"), &length_stats)?;
    println!("\nCharts written to {:?}", out);

    Ok(book_stats)
}

fn write_summary(
    out: &Path,
    manifest: &RunManifest,
    min_topics: usize,
    max_topics: usize,
    topic_runs: Vec<TopicRun>,
    book_stats: Vec<BookStats>,
) -> Result<()> {
    #[derive(serde::Serialize)]
    struct SummaryConfig {
        model_group: Option<String>,
        min_topics: usize,
        max_topics: usize,
        alpha: f64,
        eta: f64,
        batch_size: usize,
        passes: usize,
    }

    #[derive(serde::Serialize)]
    struct RunSummary {
        timestamp: String,
        config: SummaryConfig,
        topic_runs: Vec<TopicRun>,
        books: Vec<BookStats>,
    }

    let summary = RunSummary {
        timestamp: chrono::Utc::now().to_rfc3339(),
        config: SummaryConfig {
            model_group: manifest.modeling_group().map(str::to_string),
            min_topics,
            max_topics,
            alpha: manifest.lda.alpha,
            eta: manifest.lda.eta,
            batch_size: manifest.lda.batch_size,
            passes: manifest.lda.passes,
        },
        topic_runs,
        books: book_stats,
    };

    std::fs::create_dir_all(out)?;
    let path = out.join("run_summary.json");
    let json = serde_json::to_string_pretty(&summary)?;
    std::fs::write(&path, json)?;
    println!("Run summary saved to {:?}", path);

    Ok(())
}

fn validate_manifest(path: &Path) -> Result<()> {
    println!("Validating {:?}...", path);
    let manifest = RunManifest::load(path)?;
    manifest.validate()?;

    println!("✓ Valid manifest");
    println!("  Books: {}", manifest.books.len());
    for group in manifest.groups() {
        let plays = manifest
            .books_in_group(group)
            .filter(|b| b.is_play)
            .count();
        println!(
            "  Group '{}': {} books ({} plays)",
            group,
            manifest.books_in_group(group).count(),
            plays
        );
    }
    if let Some(group) = manifest.modeling_group() {
        println!("  Modeling group: '{}'", group);
    }

    Ok(())
}
