use std::future::Future;
use std::pin::Pin;

use crate::SummaryError;

/// Boxed future returned by [`SummarizationService`] methods.
pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SummaryError>> + Send + 'a>>;

/// A text summarization service (typically backed by a language model).
///
/// Implementations own their prompts, model choice and transport; the
/// summarizer only hands them titles and text.
pub trait SummarizationService: Send + Sync {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Pick the titles worth summarizing out of `titles`.
    fn select_sections<'a>(&'a self, titles: &'a [String]) -> ServiceFuture<'a, Vec<String>>;

    /// Summarize one section.
    fn summarize_section<'a>(&'a self, title: &'a str, content: &'a str) -> ServiceFuture<'a, String>;

    /// Summarize an assembled document.
    fn summarize_document<'a>(&'a self, text: &'a str) -> ServiceFuture<'a, String>;
}
