//! Mock summarization service for testing.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::SummaryError;
use crate::service::{ServiceFuture, SummarizationService};

/// Which titles [`MockSummarizer::select_sections`] recommends.
#[derive(Clone, Debug, Default)]
pub enum MockSelection {
    /// Recommend every title it is given, in order.
    #[default]
    All,
    /// Recommend exactly these titles, whether or not they exist.
    Titles(Vec<String>),
}

/// A hand-rolled mock implementing [`SummarizationService`] for tests.
///
/// Section summaries are `"summary of {title}"`; document summaries are
/// `"overview:\n{text}"`. Supports:
/// - A fixed title selection.
/// - Failing on one title.
/// - Optional per-call latency, with the peak number of concurrent section
///   calls recorded in [`peak_in_flight()`](MockSummarizer::peak_in_flight).
pub struct MockSummarizer {
    selection: MockSelection,
    fail_on: Option<String>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    summarized: Mutex<Vec<String>>,
}

impl Default for MockSummarizer {
    fn default() -> Self {
        Self::new(MockSelection::All)
    }
}

impl MockSummarizer {
    pub fn new(selection: MockSelection) -> Self {
        Self {
            selection,
            fail_on: None,
            delay: None,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            summarized: Mutex::new(Vec::new()),
        }
    }

    /// Fail `summarize_section` for `title`.
    pub fn failing_on(mut self, title: impl Into<String>) -> Self {
        self.fail_on = Some(title.into());
        self
    }

    /// Set simulated latency per section call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Most section calls observed running at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Titles that finished summarizing, in completion order.
    pub fn summarized(&self) -> Vec<String> {
        self.summarized.lock().unwrap().clone()
    }
}

impl SummarizationService for MockSummarizer {
    fn name(&self) -> &str {
        "mock"
    }

    fn select_sections<'a>(&'a self, titles: &'a [String]) -> ServiceFuture<'a, Vec<String>> {
        let selected = match &self.selection {
            MockSelection::All => titles.to_vec(),
            MockSelection::Titles(t) => t.clone(),
        };
        Box::pin(async move { Ok(selected) })
    }

    fn summarize_section<'a>(
        &'a self,
        title: &'a str,
        _content: &'a str,
    ) -> ServiceFuture<'a, String> {
        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

            if let Some(d) = self.delay {
                tokio::time::sleep(d).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_on.as_deref() == Some(title) {
                return Err(SummaryError::Service(format!("cannot summarize {title}")));
            }
            self.summarized.lock().unwrap().push(title.to_string());
            Ok(format!("summary of {title}"))
        })
    }

    fn summarize_document<'a>(&'a self, text: &'a str) -> ServiceFuture<'a, String> {
        Box::pin(async move { Ok(format!("overview:\n{text}")) })
    }
}
