use thiserror::Error;

/// Failures surfaced to the caller of the analysis pipeline.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Only CSV and JSON files are allowed (got '{0}')")]
    UnsupportedFileType(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("No analysis data available. Please upload a file first.")]
    NoPriorResult,
}

/// Input that could not be turned into at least one review.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("JSON parsing error: {0}")]
    Json(String),

    #[error("JSON parsing error: JSON must contain an array of reviews")]
    NotAnArray,

    #[error("No valid reviews found in {format} input with required fields: {required}")]
    NoValidRows {
        format: &'static str,
        required: &'static str,
    },
}

impl From<csv::Error> for ParseError {
    fn from(e: csv::Error) -> Self {
        ParseError::Csv(e.to_string())
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        ParseError::Json(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
