//! Downstream summarization of segmented sections.
//!
//! Everything model-specific sits behind [`SummarizationService`]; this
//! crate only decides which sections to send, runs them concurrently and
//! stitches the results together.

use thiserror::Error;

pub mod mock;
pub mod service;
pub mod summarizer;

pub use service::{ServiceFuture, SummarizationService};
pub use summarizer::{
    DEFAULT_EXCLUDED_SECTIONS, DEFAULT_MAX_CONCURRENT, FileSummary, SectionReport,
    SectionSummarizer, SummaryConfig,
};

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("summarization service error: {0}")]
    Service(String),
    #[error("summarization cancelled")]
    Cancelled,
    #[error("summary task failed: {0}")]
    Join(String),
}
