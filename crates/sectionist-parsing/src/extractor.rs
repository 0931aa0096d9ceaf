use std::path::Path;

use sectionist_core::{BackendError, LineSegment, PdfBackend, PdfDocument, PdfPage, SectionMap};

use crate::config::ParsingConfig;
use crate::{ParsingError, assemble, extract, geometry, normalize, segmenter};

/// A configurable section extraction pipeline.
///
/// Holds a [`ParsingConfig`] and exposes each pipeline step as a method.
/// The default constructor uses built-in defaults; use
/// [`SectionExtractor::with_config`] to change the rule tolerance, the
/// artifact patterns, or the trailing-section policy.
#[derive(Debug, Clone, Default)]
pub struct SectionExtractor {
    config: ParsingConfig,
}

impl SectionExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(config: ParsingConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    /// Strip rendering artifacts from raw band text.
    pub fn clean(&self, text: &str) -> String {
        normalize::clean_with_config(text, &self.config)
    }

    /// Horizontal rules on `page`, top to bottom.
    pub fn horizontal_lines(&self, page: &dyn PdfPage) -> Result<Vec<LineSegment>, BackendError> {
        geometry::horizontal_lines_with_tolerance(page, self.config.horizontal_tolerance)
    }

    /// Segment an already-opened document. The document is closed on return.
    pub fn segment<D: PdfDocument>(&self, document: D) -> Result<SectionMap, ParsingError> {
        segmenter::segment_with_config(document, &self.config)
    }

    /// Open `path` with `backend` and segment it.
    pub fn segment_path(
        &self,
        path: &Path,
        backend: &dyn PdfBackend,
    ) -> Result<SectionMap, ParsingError> {
        let document = backend.open_path(path)?;
        tracing::debug!(path = %path.display(), "opened document");
        self.segment(document)
    }

    /// Decode `bytes` with `backend` and segment the result.
    pub fn segment_bytes(
        &self,
        bytes: &[u8],
        backend: &dyn PdfBackend,
    ) -> Result<SectionMap, ParsingError> {
        let document = backend.open_bytes(bytes)?;
        self.segment(document)
    }

    /// Full unsegmented text of the document at `path`.
    pub fn extract_text_path(
        &self,
        path: &Path,
        backend: &dyn PdfBackend,
    ) -> Result<String, ParsingError> {
        extract::extract_text(backend.open_path(path)?)
    }

    /// Flatten `sections` back into one document string.
    pub fn assemble(&self, sections: &SectionMap) -> String {
        assemble::assemble(sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParsingConfigBuilder;
    use sectionist_core::{MemoryBackend, MemoryDocument, MemoryPage};

    fn fixture() -> Vec<u8> {
        let doc = MemoryDocument::new(vec![
            MemoryPage::letter()
                .with_text(50.0, "Intake  Notes")
                .with_text(65.0, "01/02/2023 14:05 Arrived.")
                .with_rule(100.0)
                .with_text(150.0, "Medical")
                .with_rule(200.0),
        ]);
        serde_json::to_vec(&doc).unwrap()
    }

    #[test]
    fn test_segment_bytes_default_config() {
        let sections = SectionExtractor::new()
            .segment_bytes(&fixture(), &MemoryBackend)
            .unwrap();
        let pairs: Vec<_> = sections.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("Intake Notes", "Intake Notes\n Arrived.\n"),
                ("Medical", "Medical\n"),
            ]
        );
    }

    #[test]
    fn test_segment_bytes_open_error() {
        let result = SectionExtractor::new().segment_bytes(b"not a document", &MemoryBackend);
        assert!(matches!(
            result,
            Err(ParsingError::Backend(BackendError::OpenError(_)))
        ));
    }

    #[test]
    fn test_segment_path_missing_file() {
        let result =
            SectionExtractor::new().segment_path(Path::new("/nonexistent/x.json"), &MemoryBackend);
        assert!(matches!(
            result,
            Err(ParsingError::Backend(BackendError::Io(_)))
        ));
    }

    #[test]
    fn test_custom_tolerance_changes_cuts() {
        let doc = || {
            MemoryDocument::new(vec![
                MemoryPage::letter()
                    .with_text(50.0, "Top")
                    .with_drawing(sectionist_core::Drawing::from_lines([
                        LineSegment::from_coords(0.0, 100.0, 612.0, 102.0),
                    ]))
                    .with_text(150.0, "Bottom")
                    .with_rule(200.0),
            ])
        };

        let strict = SectionExtractor::new().segment(doc()).unwrap();
        assert_eq!(strict.titles().collect::<Vec<_>>(), vec!["Top"]);
        assert_eq!(strict.get("Top"), Some("Top\nBottom\n"));

        let config = ParsingConfigBuilder::new()
            .horizontal_tolerance(3.0)
            .build()
            .unwrap();
        let loose = SectionExtractor::with_config(config).segment(doc()).unwrap();
        assert_eq!(loose.titles().collect::<Vec<_>>(), vec!["Top", "Bottom"]);
    }

    #[test]
    fn test_assemble_roundtrip_shape() {
        let extractor = SectionExtractor::new();
        let sections = extractor.segment_bytes(&fixture(), &MemoryBackend).unwrap();
        assert_eq!(
            extractor.assemble(&sections),
            "Intake Notes\nIntake Notes\n Arrived.\n\n\nMedical\nMedical\n\n\n"
        );
    }
}
