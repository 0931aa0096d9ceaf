//! Concurrent per-section summarization.
//!
//! The service picks which sections matter; each chosen section then gets
//! its own task, with a semaphore capping how many run at once. Results are
//! collected in the order the service recommended them, and the summaries
//! are assembled into one document for a final file-level summary.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use sectionist_core::SectionMap;
use sectionist_core::config_file::SummaryFileConfig;
use sectionist_parsing::assemble;

use crate::SummaryError;
use crate::service::SummarizationService;

/// Sections that are never worth summarizing, even when recommended.
pub const DEFAULT_EXCLUDED_SECTIONS: &[&str] = &["Matchmaker Summary", "Kennel Card / Web Site Memo"];

pub const DEFAULT_MAX_CONCURRENT: usize = 4;

#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Upper bound on section summaries in flight at once.
    pub max_concurrent: usize,
    pub excluded_sections: Vec<String>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            excluded_sections: DEFAULT_EXCLUDED_SECTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl SummaryConfig {
    /// Apply the `[summary]` table of a config file over the defaults.
    pub fn from_file_config(file: &SummaryFileConfig) -> Self {
        let defaults = Self::default();
        Self {
            max_concurrent: file.max_concurrent.unwrap_or(defaults.max_concurrent),
            excluded_sections: file
                .excluded_sections
                .clone()
                .unwrap_or(defaults.excluded_sections),
        }
    }
}

/// Section summaries plus the titles that were left out.
#[derive(Debug, Clone, Default)]
pub struct SectionReport {
    pub summaries: SectionMap,
    /// Titles of the input map with no summary, in reading order.
    pub ignored: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FileSummary {
    pub report: SectionReport,
    pub document_summary: String,
}

pub struct SectionSummarizer {
    service: Arc<dyn SummarizationService>,
    config: SummaryConfig,
}

impl SectionSummarizer {
    pub fn new(service: Arc<dyn SummarizationService>) -> Self {
        Self::with_config(service, SummaryConfig::default())
    }

    pub fn with_config(service: Arc<dyn SummarizationService>, config: SummaryConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    /// Summarize the sections the service recommends, one task per section.
    ///
    /// The first failing section aborts the rest of the batch.
    pub async fn summarize_sections(
        &self,
        sections: &SectionMap,
        cancel: CancellationToken,
    ) -> Result<SectionReport, SummaryError> {
        let titles: Vec<String> = sections.titles().map(str::to_string).collect();
        let recommended = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SummaryError::Cancelled),
            r = self.service.select_sections(&titles) => r?,
        };
        let chosen = self.choose(sections, recommended);

        tracing::info!(
            service = self.service.name(),
            total = sections.len(),
            chosen = chosen.len(),
            "summarizing sections"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));
        let mut pending: Vec<(String, JoinHandle<Result<String, SummaryError>>)> =
            Vec::with_capacity(chosen.len());

        for (title, content) in chosen {
            let service = Arc::clone(&self.service);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let task_title = title.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| SummaryError::Cancelled)?;
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(SummaryError::Cancelled),
                    r = service.summarize_section(&task_title, &content) => r,
                }
            });
            pending.push((title, handle));
        }

        let mut summaries = SectionMap::new();
        let mut pending = pending.into_iter();
        while let Some((title, handle)) = pending.next() {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(e) => Err(SummaryError::Join(e.to_string())),
            };
            match outcome {
                Ok(summary) => {
                    tracing::debug!(title = %title, "section summarized");
                    summaries.insert(title, summary);
                }
                Err(e) => {
                    for (_, rest) in pending.by_ref() {
                        rest.abort();
                    }
                    tracing::warn!(title = %title, error = %e, "section summary failed, aborting batch");
                    return Err(e);
                }
            }
        }

        let ignored = sections
            .titles()
            .filter(|t| !summaries.contains_key(t))
            .map(str::to_string)
            .collect();

        Ok(SectionReport { summaries, ignored })
    }

    /// Summarize sections, then summarize the assembled section summaries.
    pub async fn summarize_file(
        &self,
        sections: &SectionMap,
        cancel: CancellationToken,
    ) -> Result<FileSummary, SummaryError> {
        let report = self.summarize_sections(sections, cancel.clone()).await?;
        let document = assemble(&report.summaries);

        let document_summary = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SummaryError::Cancelled),
            r = self.service.summarize_document(&document) => r?,
        };

        Ok(FileSummary {
            report,
            document_summary,
        })
    }

    /// Recommended titles that are neither excluded nor unknown, deduplicated,
    /// paired with their content.
    fn choose(&self, sections: &SectionMap, recommended: Vec<String>) -> Vec<(String, String)> {
        let excluded: HashSet<&str> = self
            .config
            .excluded_sections
            .iter()
            .map(String::as_str)
            .collect();
        let mut seen = HashSet::new();
        let mut chosen = Vec::new();

        for title in recommended {
            if excluded.contains(title.as_str()) {
                tracing::debug!(title = %title, "skipping excluded section");
                continue;
            }
            let Some(content) = sections.get(&title) else {
                tracing::warn!(title = %title, "service recommended an unknown section");
                continue;
            };
            if seen.insert(title.clone()) {
                chosen.push((title, content.to_string()));
            }
        }
        chosen
    }
}
