//! Review dataset analysis: parse uploads, score sentiment with a word
//! lexicon, aggregate the distribution and pull out frequent keywords.

pub mod api;
pub mod config;
pub mod error;
pub mod keywords;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod sentiment;

pub use error::{AnalysisError, ParseError, Result};
pub use pipeline::{Analyzer, ResultStore, Upload};
