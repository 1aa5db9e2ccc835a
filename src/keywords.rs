//! Term-frequency keyword extraction, overall and per sentiment label.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

use crate::models::{KeywordAnalysis, KeywordEntry, ScoredReview, SentimentKeywords, SentimentLabel};

pub const OVERALL_LIMIT: usize = 15;
pub const PER_SENTIMENT_LIMIT: usize = 5;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

// Common English function words
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from",
        "has", "he", "in", "is", "it", "its", "of", "on", "that", "the",
        "to", "was", "will", "with", "i", "you", "we", "they", "this",
        "these", "those", "my", "your", "our", "their", "me", "him",
        "her", "us", "them", "am", "were", "been", "being", "have", "had",
        "having", "do", "does", "did", "doing", "can", "could", "should",
        "would", "may", "might", "must", "shall", "very", "really", "quite",
        "just", "only", "also", "even", "still", "already", "yet", "not",
        "no", "yes", "but", "however", "although", "though", "because",
        "since", "if", "when", "where", "why", "how", "what", "which",
        "who", "whom", "whose", "all", "any", "both", "each", "few",
        "more", "most", "other", "some", "such", "nor", "too", "so", "up",
        "down", "out", "off", "over", "under", "again", "further", "then",
        "once", "here", "there",
    ]
    .into_iter()
    .collect()
});

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Lower-cased content tokens of `text`: punctuation split out, and short
/// words, stopwords and bare numbers dropped.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_WORD
        .replace_all(&lowered, " ")
        .split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .filter(|word| !is_stopword(word))
        .filter(|word| !word.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

/// Most frequent terms across `reviews`, highest count first. Equal counts
/// keep the order in which the terms were first seen.
pub fn top_keywords<'a, I>(reviews: I, limit: usize) -> Vec<KeywordEntry>
where
    I: IntoIterator<Item = &'a ScoredReview>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<KeywordEntry> = Vec::new();

    for review in reviews {
        for term in extract_keywords(&review.text) {
            match index.get(&term) {
                Some(&slot) => counts[slot].count += 1,
                None => {
                    index.insert(term.clone(), counts.len());
                    counts.push(KeywordEntry { term, count: 1 });
                }
            }
        }
    }

    // stable, so first-seen order survives among ties
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

pub fn keywords_for_label(reviews: &[ScoredReview], label: SentimentLabel, limit: usize) -> Vec<KeywordEntry> {
    top_keywords(reviews.iter().filter(|r| r.label == label), limit)
}

/// Each bucket is counted on its own subset, not carved out of `overall`.
pub fn analyze_keywords(reviews: &[ScoredReview]) -> KeywordAnalysis {
    KeywordAnalysis {
        overall: top_keywords(reviews, OVERALL_LIMIT),
        by_sentiment: SentimentKeywords {
            positive: keywords_for_label(reviews, SentimentLabel::Positive, PER_SENTIMENT_LIMIT),
            negative: keywords_for_label(reviews, SentimentLabel::Negative, PER_SENTIMENT_LIMIT),
            neutral: keywords_for_label(reviews, SentimentLabel::Neutral, PER_SENTIMENT_LIMIT),
        },
    }
}
