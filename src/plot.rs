//! Bar-chart rendering
//!
//! Grouped bar charts for the POS-tag distribution (two tag panels) and
//! the text statistics, one series per book, written as PNG files.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use plotters::prelude::*;

use crate::annotate::PosTag;
use crate::stats::TextStatistics;

/// First chart panel of the tag set.
pub const POS_PANEL_1: [PosTag; 9] = [
    PosTag::Adj,
    PosTag::Adp,
    PosTag::Adv,
    PosTag::Aux,
    PosTag::Cconj,
    PosTag::Det,
    PosTag::Intj,
    PosTag::Noun,
    PosTag::Num,
];

/// Second chart panel of the tag set.
pub const POS_PANEL_2: [PosTag; 8] = [
    PosTag::Part,
    PosTag::Pron,
    PosTag::Propn,
    PosTag::Punct,
    PosTag::Sconj,
    PosTag::Sym,
    PosTag::Verb,
    PosTag::X,
];

/// Turn per-book distributions into chart series over a fixed tag panel,
/// filling 0 for tags a book never uses.
pub fn pos_series(
    distributions: &[(String, BTreeMap<PosTag, f64>)],
    tags: &[PosTag],
) -> Vec<(String, Vec<f64>)> {
    distributions
        .iter()
        .map(|(key, dist)| {
            let values = tags
                .iter()
                .map(|tag| dist.get(tag).copied().unwrap_or(0.0))
                .collect();
            (key.clone(), values)
        })
        .collect()
}

/// Turn per-book statistics into chart series over the three categories.
pub fn stats_series(stats: &[(String, TextStatistics)]) -> Vec<(String, Vec<f64>)> {
    stats
        .iter()
        .map(|(key, s)| {
            (
                key.clone(),
                vec![s.avg_word_len, s.avg_sentence_words, s.avg_sentence_chars],
            )
        })
        .collect()
}

/// Render one POS-distribution panel.
pub fn plot_pos_distribution(
    path: &Path,
    tags: &[PosTag],
    series: &[(String, Vec<f64>)],
) -> Result<()> {
    let labels: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
    grouped_bar_chart(path, "POS-tag distribution", "Percentage", 20.0, &labels, series)
}

/// Render the text-statistics chart.
pub fn plot_text_statistics(path: &Path, stats: &[(String, TextStatistics)]) -> Result<()> {
    let categories = [
        "Avg word lgth".to_string(),
        "Avg sent lgth (word)".to_string(),
        "Avg sent lgth (letter)".to_string(),
    ];
    let series = stats_series(stats);
    grouped_bar_chart(path, "Text statistics", "Avg", 140.0, &categories, &series)
}

fn grouped_bar_chart(
    path: &Path,
    title: &str,
    y_desc: &str,
    y_max: f64,
    categories: &[String],
    series: &[(String, Vec<f64>)],
) -> Result<()> {
    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let n_groups = categories.len();
    let n_series = series.len().max(1);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..n_groups as f64, 0f64..y_max)?;

    let labels = categories.to_vec();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n_groups)
        .x_label_formatter(&move |x| {
            labels.get(*x as usize).cloned().unwrap_or_default()
        })
        .y_desc(y_desc)
        .draw()?;

    // 0.8 of each group is bars, the rest padding
    let bar_width = 0.8 / n_series as f64;
    for (i, (name, values)) in series.iter().enumerate() {
        let color = Palette99::pick(i).mix(0.9);
        chart
            .draw_series(values.iter().enumerate().map(|(g, &v)| {
                let x0 = g as f64 + 0.1 + i as f64 * bar_width;
                Rectangle::new([(x0, 0.0), (x0 + bar_width, v.min(y_max))], color.filled())
            }))?
            .label(name.clone())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 4), (x + 12, y + 4)], color.filled())
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()
        .with_context(|| format!("Failed to write chart {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pos_series_fills_missing_tags_with_zero() {
        let mut dist = BTreeMap::new();
        dist.insert(PosTag::Noun, 40.0);
        dist.insert(PosTag::Verb, 25.0);
        let distributions = vec![("iph".to_string(), dist)];

        let series = pos_series(&distributions, &POS_PANEL_1);
        assert_eq!(series.len(), 1);
        let (key, values) = &series[0];
        assert_eq!(key, "iph");
        assert_eq!(values.len(), POS_PANEL_1.len());
        // NOUN is panel position 7, everything unlisted is 0
        assert_eq!(values[7], 40.0);
        assert_eq!(values[0], 0.0);
    }

    #[test]
    fn panels_cover_the_whole_tag_set() {
        let mut all: Vec<PosTag> = POS_PANEL_1.iter().chain(POS_PANEL_2.iter()).copied().collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), PosTag::all().len());
    }

    #[test]
    fn stats_series_orders_the_three_categories() {
        let stats = vec![(
            "nov".to_string(),
            TextStatistics {
                avg_word_len: 4.5,
                avg_sentence_words: 21.3,
                avg_sentence_chars: 96.1,
            },
        )];

        let series = stats_series(&stats);
        assert_eq!(series[0].1, vec![4.5, 21.3, 96.1]);
    }
}
