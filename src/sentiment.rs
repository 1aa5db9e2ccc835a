//! Lexicon-based sentiment scoring.
//!
//! Review text is normalized, summed against a word-polarity lexicon and
//! mapped to a three-way label plus a confidence derived from the score
//! magnitude. The lexicon is pluggable through [`Lexicon`]; the built-in
//! [`AfinnLexicon`] carries AFINN-style integer weights in -5..=5.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::metrics::{calculate_metrics, round_half_up};
use crate::models::{AnalysisSummary, Progress, RawReview, ScoredReview, SentimentLabel};

/// Progress is reported every this many reviews, and once at the end.
pub const PROGRESS_BATCH_SIZE: usize = 1000;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

// Word weights, grouped by polarity and strength
static AFINN_WEIGHTS: Lazy<HashMap<&'static str, i32>> = Lazy::new(|| {
    let groups: [(i32, &[&str]); 10] = [
        (5, &["breathtaking", "hurrah", "outstanding", "superb", "thrilled"]),
        (4, &[
            "amazing", "awesome", "brilliant", "ecstatic", "euphoric", "exuberant", "fabulous",
            "fantastic", "fun", "funnier", "funny", "godsend", "heavenly", "lifesaver", "miracle",
            "rapturous", "stunning", "triumph", "wonderful", "wow", "win", "winner", "winning",
        ]),
        (3, &[
            "admire", "adore", "beautiful", "best", "charming", "cheerful", "delicious",
            "delight", "delighted", "delightful", "excellent", "excited", "exciting",
            "fantasy", "fav", "favorite", "favourite", "good", "gorgeous", "great", "happy",
            "impressed", "impressive", "incredible", "joy", "joyful", "love", "loved",
            "lovely", "loving", "marvelous", "nice", "perfect", "perfectly", "pleasant",
            "remarkable", "success", "successful", "terrific", "yummy",
        ]),
        (2, &[
            "accomplished", "amazed", "appreciate", "appreciated", "attractive", "better",
            "comfortable", "convenient", "cool", "effective", "efficient", "enjoy", "enjoyed",
            "enjoying", "exceeded", "fine", "fresh", "friendly", "glad", "helpful", "hope",
            "kind", "like", "liked", "pleased", "positive", "pretty", "promptly", "quality",
            "recommend", "recommended", "reliable", "satisfied", "smooth", "solid", "strong",
            "tasty", "thank", "thanks", "useful", "value", "valuable", "worth",
        ]),
        (1, &[
            "agree", "clean", "clear", "cute", "easy", "fair", "free", "healthy", "improve",
            "improved", "interesting", "okay", "ok", "ready", "safe", "save", "share", "sure",
            "vibrant", "want", "works", "yes",
        ]),
        (-1, &[
            "broke", "cheap", "confused", "doubt", "doubtful", "dull", "expensive", "lack",
            "lacking", "missing", "odd", "overpriced", "pay", "problem", "returned", "slow",
            "small", "stale", "strange", "tired", "unclear", "waste", "weird", "wasted",
        ]),
        (-2, &[
            "annoyed", "annoying", "avoid", "bland", "bored", "boring", "broken", "complain",
            "complaint", "cracked", "damaged", "defective", "difficult", "disappointed",
            "disappointing", "disappointment", "dislike", "failed", "fail", "failure", "fake",
            "flawed", "frustrated", "frustrating", "issue", "issues", "leak", "leaked", "mess",
            "mistake", "poor", "poorly", "problems", "regret", "sad", "sick", "sorry",
            "unhappy", "unreliable", "useless", "weak", "worse", "wrong",
        ]),
        (-3, &[
            "angry", "awful", "bad", "crap", "dead", "disgusted", "disgusting", "gross", "hate",
            "hated", "horrible", "nasty", "pathetic", "refund", "rotten", "ruined", "scam",
            "stupid", "terrible", "ugly", "unacceptable", "worst", "worthless",
        ]),
        (-4, &["fraud", "garbage", "junk", "rubbish", "trash"]),
        (-5, &["bastard", "bitch", "cunt", "motherfucker", "twat"]),
    ];

    groups
        .iter()
        .flat_map(|(weight, words)| words.iter().map(move |w| (*w, *weight)))
        .collect()
});

// A negator flips the sign of the word directly after it
static NEGATORS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "not", "no", "never", "cannot", "cant", "dont", "doesnt", "didnt", "isnt", "wasnt",
        "wont", "wouldnt", "shouldnt", "couldnt", "arent", "aint", "neither", "nor", "without",
    ]
    .into_iter()
    .collect()
});

// Stems left in front of a lone `t` once cleaning splits "don't" into "don t"
static CONTRACTION_STEMS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "don", "doesn", "didn", "isn", "wasn", "weren", "aren", "ain", "can", "couldn",
        "won", "wouldn", "shouldn", "hasn", "haven", "hadn", "mustn", "needn",
    ]
    .into_iter()
    .collect()
});

fn is_negation(before: Option<&str>, previous: Option<&str>) -> bool {
    match previous {
        Some("t") => before.map_or(false, |stem| CONTRACTION_STEMS.contains(stem)),
        Some(word) => NEGATORS.contains(word),
        None => false,
    }
}

/// Word-polarity scoring over already cleaned text.
pub trait Lexicon {
    fn score(&self, text: &str) -> i32;
}

impl<F> Lexicon for F
where
    F: Fn(&str) -> i32,
{
    fn score(&self, text: &str) -> i32 {
        self(text)
    }
}

/// Built-in AFINN-style word list with single-token negation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AfinnLexicon;

impl AfinnLexicon {
    pub fn weight(word: &str) -> Option<i32> {
        AFINN_WEIGHTS.get(word).copied()
    }
}

impl Lexicon for AfinnLexicon {
    fn score(&self, text: &str) -> i32 {
        let mut total = 0;
        let mut before: Option<&str> = None;
        let mut previous: Option<&str> = None;

        for token in text.split_whitespace() {
            if let Some(weight) = Self::weight(token) {
                total += if is_negation(before, previous) { -weight } else { weight };
            }
            before = previous;
            previous = Some(token);
        }

        total
    }
}

/// Lower-cases, strips tag-like markup and punctuation, and collapses whitespace.
pub fn clean_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let without_tags = HTML_TAG.replace_all(&lowered, "");
    let words_only = NON_WORD.replace_all(&without_tags, " ");
    WHITESPACE.replace_all(&words_only, " ").trim().to_string()
}

/// `min(|score| / 10, 1.0)`
pub fn confidence(score: i32) -> f64 {
    (f64::from(score.unsigned_abs()) / 10.0).min(1.0)
}

/// Scored reviews in input order plus their aggregate metrics.
#[derive(Debug, Clone)]
pub struct ProcessedReviews {
    pub reviews: Vec<ScoredReview>,
    pub summary: AnalysisSummary,
}

pub struct SentimentScorer<L = AfinnLexicon> {
    lexicon: L,
}

impl Default for SentimentScorer<AfinnLexicon> {
    fn default() -> Self {
        Self::new(AfinnLexicon)
    }
}

impl<L: Lexicon> SentimentScorer<L> {
    pub fn new(lexicon: L) -> Self {
        Self { lexicon }
    }

    pub fn analyze_review(&self, review: &RawReview) -> ScoredReview {
        let cleaned = clean_text(&review.review_text);
        let score = if cleaned.is_empty() {
            0
        } else {
            self.lexicon.score(&cleaned)
        };

        ScoredReview {
            id: review.review_id.clone(),
            text: review.review_text.clone(),
            cleaned_text: cleaned,
            score,
            label: SentimentLabel::from_score(score),
            confidence: confidence(score),
            product_id: review.product_id.clone(),
            product_name: review.product_name.clone(),
            rating: review.rating,
            date: review.date.clone(),
            review_date: review.review_date.clone(),
        }
    }

    pub fn process_reviews(&self, reviews: &[RawReview]) -> ProcessedReviews {
        self.process_reviews_with_progress(reviews, |_| {})
    }

    /// Scores `reviews` in order, calling `on_progress` every
    /// [`PROGRESS_BATCH_SIZE`] reviews and after the last one.
    pub fn process_reviews_with_progress<F>(
        &self,
        reviews: &[RawReview],
        mut on_progress: F,
    ) -> ProcessedReviews
    where
        F: FnMut(Progress),
    {
        let total = reviews.len();
        info!("Processing {} reviews for sentiment analysis", total);

        let mut scored = Vec::with_capacity(total);
        for (i, review) in reviews.iter().enumerate() {
            scored.push(self.analyze_review(review));

            let processed = i + 1;
            if processed % PROGRESS_BATCH_SIZE == 0 || processed == total {
                let progress = Progress {
                    processed,
                    total,
                    percentage: percent(processed, total),
                };
                info!(
                    "Sentiment analysis progress: {}/{} ({}%)",
                    progress.processed, progress.total, progress.percentage
                );
                on_progress(progress);
            }
        }

        let summary = calculate_metrics(&scored);
        ProcessedReviews {
            reviews: scored,
            summary,
        }
    }
}

fn percent(part: usize, total: usize) -> u32 {
    round_half_up(part as f64 / total as f64 * 100.0) as u32
}
