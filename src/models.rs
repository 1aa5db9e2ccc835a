//! Records flowing through the analysis pipeline and the result handed to the dashboard.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

// ============================================================================
// Input side
// ============================================================================

/// One review row after format normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RawReview {
    pub review_id: String,
    pub review_text: String,
    pub rating: i64,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub user_id: Option<String>,
    pub profile_name: Option<String>,
    /// ISO-8601 timestamp
    pub review_date: String,
    /// Free-form date carried over from JSON uploads
    pub date: Option<String>,
    pub summary: String,
    pub helpfulness_numerator: i64,
    pub helpfulness_denominator: i64,
}

// ============================================================================
// Scoring
// ============================================================================

/// Three-way sentiment class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    /// `> 2` is positive, `< -2` negative, everything in between neutral.
    pub fn from_score(score: i32) -> Self {
        if score > 2 {
            SentimentLabel::Positive
        } else if score < -2 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A review with its sentiment annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScoredReview {
    pub id: String,
    pub text: String,
    pub cleaned_text: String,
    pub score: i32,
    pub label: SentimentLabel,
    /// 0.0 - 1.0, saturates at |score| >= 10
    pub confidence: f64,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub rating: i64,
    pub date: Option<String>,
    pub review_date: String,
}

/// Batch progress reported while scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
    pub percentage: u32,
}

// ============================================================================
// Aggregates
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LabelShare {
    pub count: usize,
    /// Rounded independently per label; the three need not sum to 100.
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SentimentDistribution {
    pub positive: LabelShare,
    pub negative: LabelShare,
    pub neutral: LabelShare,
}

impl SentimentDistribution {
    pub fn get(&self, label: SentimentLabel) -> &LabelShare {
        match label {
            SentimentLabel::Positive => &self.positive,
            SentimentLabel::Negative => &self.negative,
            SentimentLabel::Neutral => &self.neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScoreRange {
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisSummary {
    pub total_reviews: usize,
    pub sentiment_distribution: SentimentDistribution,
    pub average_score: f64,
    /// `None` when there were no reviews
    pub score_range: Option<ScoreRange>,
}

// ============================================================================
// Keywords
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KeywordEntry {
    pub term: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SentimentKeywords {
    pub positive: Vec<KeywordEntry>,
    pub negative: Vec<KeywordEntry>,
    pub neutral: Vec<KeywordEntry>,
}

impl SentimentKeywords {
    pub fn get(&self, label: SentimentLabel) -> &[KeywordEntry] {
        match label {
            SentimentLabel::Positive => &self.positive,
            SentimentLabel::Negative => &self.negative,
            SentimentLabel::Neutral => &self.neutral,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KeywordAnalysis {
    pub overall: Vec<KeywordEntry>,
    pub by_sentiment: SentimentKeywords,
}

// ============================================================================
// Result object
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FileInfo {
    #[schema(example = "reviews.csv")]
    pub original_name: String,
    pub size: u64,
    #[serde(rename = "type")]
    #[schema(example = ".csv")]
    pub file_type: String,
}

/// Everything produced by one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResult {
    pub file_info: FileInfo,
    pub summary: AnalysisSummary,
    pub reviews: Vec<ScoredReview>,
    pub keywords: KeywordAnalysis,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_thresholds() {
        assert_eq!(SentimentLabel::from_score(3), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_score(-3), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_score(0), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(2), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(-2), SentimentLabel::Neutral);
    }

    #[test]
    fn test_result_serializes_with_dashboard_field_names() {
        let info = FileInfo {
            original_name: "reviews.json".to_string(),
            size: 42,
            file_type: ".json".to_string(),
        };
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["type"], ".json");

        let label = serde_json::to_value(SentimentLabel::Negative).unwrap();
        assert_eq!(label, "negative");
    }
}
