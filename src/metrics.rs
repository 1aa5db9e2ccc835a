//! Corpus-level sentiment distribution and score statistics.

use crate::models::{AnalysisSummary, LabelShare, ScoreRange, ScoredReview, SentimentDistribution, SentimentLabel};

/// Rounds halves towards positive infinity (`-2.5 -> -2`, `2.5 -> 3`).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

pub fn calculate_metrics(reviews: &[ScoredReview]) -> AnalysisSummary {
    let total = reviews.len();

    let share = |label: SentimentLabel| {
        let count = reviews.iter().filter(|r| r.label == label).count();
        let percentage = if total > 0 {
            round_half_up(count as f64 / total as f64 * 100.0) as u32
        } else {
            0
        };
        LabelShare { count, percentage }
    };

    let average_score = if total > 0 {
        let sum: i64 = reviews.iter().map(|r| i64::from(r.score)).sum();
        round_half_up(sum as f64 / total as f64 * 100.0) / 100.0
    } else {
        0.0
    };

    let score_range = reviews.iter().map(|r| r.score).fold(None, |range, score| {
        Some(match range {
            None => ScoreRange { min: score, max: score },
            Some(ScoreRange { min, max }) => ScoreRange {
                min: min.min(score),
                max: max.max(score),
            },
        })
    });

    AnalysisSummary {
        total_reviews: total,
        sentiment_distribution: SentimentDistribution {
            positive: share(SentimentLabel::Positive),
            negative: share(SentimentLabel::Negative),
            neutral: share(SentimentLabel::Neutral),
        },
        average_score,
        score_range,
    }
}
