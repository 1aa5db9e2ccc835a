use anyhow::{Context, Result};
use review_sentiment::models::{KeywordEntry, SentimentLabel};
use review_sentiment::{logging, Analyzer, Upload};

fn format_keywords(entries: &[KeywordEntry]) -> String {
    if entries.is_empty() {
        return "-".to_string();
    }
    entries
        .iter()
        .map(|e| format!("{} ({})", e.term, e.count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn main() -> Result<()> {
    logging::init();

    let path = std::env::args()
        .nth(1)
        .context("usage: analyze_file <reviews.csv|reviews.json>")?;
    let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path))?;
    let file_name = std::path::Path::new(&path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(&path)
        .to_string();

    let analyzer = Analyzer::default();
    let result = analyzer.analyze(&Upload { file_name, bytes })?;
    let summary = &result.summary;

    println!("\n--- {} ({} bytes) ---", result.file_info.original_name, result.file_info.size);
    println!("Reviews:        {}", summary.total_reviews);
    for label in SentimentLabel::ALL {
        let share = summary.sentiment_distribution.get(label);
        println!("{:<15} {} ({}%)", format!("{}:", label), share.count, share.percentage);
    }
    println!("Average score:  {}", summary.average_score);
    if let Some(range) = summary.score_range {
        println!("Score range:    {} .. {}", range.min, range.max);
    }

    println!("\nTop keywords:   {}", format_keywords(&result.keywords.overall));
    for label in SentimentLabel::ALL {
        println!(
            "{:<15} {}",
            format!("{}:", label),
            format_keywords(result.keywords.by_sentiment.get(label))
        );
    }

    Ok(())
}
