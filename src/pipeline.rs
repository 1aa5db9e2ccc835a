//! Upload → parse → score → keywords, plus the latest-result slot.

use std::sync::{Arc, RwLock};
use tracing::info;

use crate::error::{AnalysisError, Result};
use crate::keywords::analyze_keywords;
use crate::models::{AnalysisResult, FileInfo};
use crate::parser::{parse_upload, FileKind, ParseOptions};
use crate::sentiment::{AfinnLexicon, Lexicon, SentimentScorer};

/// Raw upload handed over by the HTTP layer.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Holds the most recent successful analysis.
///
/// Last writer wins. `set` replaces the whole `Arc` under the write lock, so a
/// reader sees either the previous result or the new one, never a mix.
#[derive(Debug, Default)]
pub struct ResultStore {
    slot: RwLock<Option<Arc<AnalysisResult>>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, result: Arc<AnalysisResult>) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(result);
    }

    pub fn get(&self) -> Option<Arc<AnalysisResult>> {
        self.slot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Like [`get`](Self::get), but an empty slot is an error.
    pub fn latest(&self) -> Result<Arc<AnalysisResult>> {
        self.get().ok_or(AnalysisError::NoPriorResult)
    }
}

/// Runs the full pipeline and remembers the last result.
pub struct Analyzer<L = AfinnLexicon> {
    scorer: SentimentScorer<L>,
    options: ParseOptions,
    store: ResultStore,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(SentimentScorer::default(), ParseOptions::default())
    }
}

impl<L: Lexicon> Analyzer<L> {
    pub fn new(scorer: SentimentScorer<L>, options: ParseOptions) -> Self {
        Self {
            scorer,
            options,
            store: ResultStore::new(),
        }
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Analyzes one upload. On success the result replaces the stored one;
    /// on failure the stored result is left as it was.
    pub fn analyze(&self, upload: &Upload) -> Result<Arc<AnalysisResult>> {
        let kind = FileKind::from_file_name(&upload.file_name)?;

        info!("Parsing {} file {}...", kind.extension(), upload.file_name);
        let parsed = parse_upload(kind, &upload.bytes, &self.options)?;
        if parsed.capped {
            info!(
                "Row cap of {} reached, remaining rows ignored",
                self.options.csv_row_cap
            );
        }

        let processed = self.scorer.process_reviews(&parsed.reviews);
        info!("Sentiment analysis complete.");

        let keywords = analyze_keywords(&processed.reviews);
        info!("Keyword extraction complete.");

        let result = Arc::new(AnalysisResult {
            file_info: FileInfo {
                original_name: upload.file_name.clone(),
                size: upload.bytes.len() as u64,
                file_type: kind.extension().to_string(),
            },
            summary: processed.summary,
            reviews: processed.reviews,
            keywords,
        });

        self.store.set(result.clone());
        info!("Successfully processed {} reviews", result.summary.total_reviews);
        Ok(result)
    }

    pub fn latest(&self) -> Result<Arc<AnalysisResult>> {
        self.store.latest()
    }
}
